//! Relational schema for the SQLite engine, versioned through `PRAGMA user_version`

use rusqlite::Connection;
use std::path::Path;

use crate::error::Result;

/// Ordered migrations; migration `i` moves the schema from version `i` to `i + 1`
const MIGRATIONS: &[&str] = &["
    CREATE TABLE IF NOT EXISTS tokens (
        id INTEGER PRIMARY KEY,
        token TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS documents (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS occurrences (
        id INTEGER PRIMARY KEY,
        token_id INTEGER NOT NULL REFERENCES tokens (id) ON DELETE CASCADE,
        document_id INTEGER NOT NULL REFERENCES documents (id) ON DELETE CASCADE,
        position INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_occurrences_token ON occurrences (token_id);
    CREATE INDEX IF NOT EXISTS idx_occurrences_document ON occurrences (document_id);
"];

/// Schema version this build expects
pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

pub fn version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Apply pending migrations. Returns `(old_version, new_version)`.
pub fn migrate(conn: &Connection) -> Result<(u32, u32)> {
    let old = version(conn)?;
    if old >= SCHEMA_VERSION {
        return Ok((old, old));
    }

    let tx = conn.unchecked_transaction()?;
    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(old as usize) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", idx as u32 + 1)?;
    }
    tx.commit()?;

    tracing::info!(from = old, to = SCHEMA_VERSION, "schema migrated");
    Ok((old, SCHEMA_VERSION))
}

/// Open the database at `path` and migrate it
pub fn migrate_database(path: &Path) -> Result<(u32, u32)> {
    let conn = Connection::open(path)?;
    migrate(&conn)
}

pub fn database_version(path: &Path) -> Result<u32> {
    let conn = Connection::open(path)?;
    version(&conn)
}
