//! SQLite engine: cached get-or-create identities and batched, timer-driven inserts

use crossbeam::channel::{self, Sender};
use parking_lot::{Mutex, RwLock};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{EngineStats, StorageEngine};
use crate::config::SqliteConfig;
use crate::error::{IndexError, Result};
use crate::schema;
use crate::source::{Postings, Source};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
enum Entity {
    Token,
    Document,
}

impl Entity {
    fn label(self) -> &'static str {
        match self {
            Entity::Token => "token",
            Entity::Document => "document",
        }
    }

    fn select_sql(self) -> &'static str {
        match self {
            Entity::Token => "SELECT id FROM tokens WHERE token = ?1",
            Entity::Document => "SELECT id FROM documents WHERE name = ?1",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            Entity::Token => "INSERT INTO tokens (token) VALUES (?1)",
            Entity::Document => "INSERT INTO documents (name) VALUES (?1)",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingOccurrence {
    token_id: i64,
    document_id: i64,
    position: u32,
}

/// State shared between the engine handle and its flush thread
struct Shared {
    conn: Mutex<Connection>,
    pending: Mutex<Vec<PendingOccurrence>>,
    token_ids: RwLock<HashMap<String, i64>>,
    document_ids: RwLock<HashMap<String, i64>>,
    config: SqliteConfig,
}

impl Shared {
    fn cache(&self, entity: Entity) -> &RwLock<HashMap<String, i64>> {
        match entity {
            Entity::Token => &self.token_ids,
            Entity::Document => &self.document_ids,
        }
    }

    /// Map a token or document name to its row id, creating the row at most once.
    fn resolve(&self, entity: Entity, value: &str) -> Result<i64> {
        let cache = self.cache(entity);
        if let Some(&id) = cache.read().get(value) {
            return Ok(id);
        }

        // Holding the write lock across lookup and insert keeps two callers in
        // this process from both inserting the same value.
        let mut cache = cache.write();
        if let Some(&id) = cache.get(value) {
            return Ok(id);
        }

        let conn = self.conn.lock();
        let id = match lookup(&conn, entity, value)? {
            Some(id) => id,
            None => insert_or_lookup(&conn, entity, value)?,
        };
        cache.insert(value.to_owned(), id);
        debug!(kind = entity.label(), value, id, "cached identity");
        Ok(id)
    }

    /// Drain the buffer and write it in one transaction.
    ///
    /// The drained batch is dropped if the write fails.
    fn flush(&self) -> Result<usize> {
        let batch = std::mem::take(&mut *self.pending.lock());
        if batch.is_empty() {
            return Ok(0);
        }

        match self.write_batch(&batch) {
            Ok(()) => {
                info!(count = batch.len(), "inserted occurrences");
                Ok(batch.len())
            }
            Err(err) => {
                error!(error = %err, dropped = batch.len(), "error inserting occurrences");
                Err(err)
            }
        }
    }

    fn write_batch(&self, batch: &[PendingOccurrence]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO occurrences (token_id, document_id, position) VALUES (?1, ?2, ?3)",
            )?;
            for occurrence in batch {
                stmt.execute(params![
                    occurrence.token_id,
                    occurrence.document_id,
                    occurrence.position
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn lookup(conn: &Connection, entity: Entity, value: &str) -> Result<Option<i64>> {
    let mut stmt = conn.prepare_cached(entity.select_sql())?;
    let id = stmt
        .query_row(params![value], |row| row.get(0))
        .optional()?;
    Ok(id)
}

/// Insert a new row; if another writer created it first, use theirs
fn insert_or_lookup(conn: &Connection, entity: Entity, value: &str) -> Result<i64> {
    let inserted = conn
        .prepare_cached(entity.insert_sql())
        .and_then(|mut stmt| stmt.execute(params![value]));

    match inserted {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
            debug!(kind = entity.label(), value, "created concurrently, re-resolving");
            lookup(conn, entity, value)?
                .ok_or(IndexError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        }
        Err(err) => Err(err.into()),
    }
}

struct Flusher {
    stop: Sender<()>,
    join: JoinHandle<()>,
}

fn spawn_flusher(shared: Arc<Shared>) -> Result<Flusher> {
    let (stop, stopped) = channel::bounded::<()>(0);
    let interval = shared.config.flush_interval;
    let join = thread::Builder::new()
        .name("lexindex-flush".to_string())
        .spawn(move || {
            let ticker = channel::tick(interval);
            loop {
                crossbeam::select! {
                    recv(ticker) -> _ => {
                        // Failures are logged inside flush; the next tick starts fresh
                        let _ = shared.flush();
                    }
                    recv(stopped) -> _ => break,
                }
            }
        })?;
    Ok(Flusher { stop, join })
}

/// Storage engine over a SQLite database migrated with [`schema::migrate`].
///
/// Occurrences are buffered and written every `flush_interval`. `get` reads
/// the database directly, so occurrences still in the buffer are not visible
/// to searches until the next flush.
pub struct SqliteEngine {
    shared: Arc<Shared>,
    flusher: Mutex<Option<Flusher>>,
}

impl SqliteEngine {
    /// Open an existing, migrated database
    pub fn open(path: &Path, config: SqliteConfig) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, config)
    }

    /// Private in-memory database, migrated on open
    pub fn open_in_memory(config: SqliteConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::migrate(&conn)?;
        Self::from_connection(conn, config)
    }

    pub fn from_connection(conn: Connection, config: SqliteConfig) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;

        let actual = schema::version(&conn)?;
        if actual < schema::SCHEMA_VERSION {
            return Err(IndexError::SchemaMissing {
                expected: schema::SCHEMA_VERSION,
                actual,
            });
        }

        let shared = Arc::new(Shared {
            conn: Mutex::new(conn),
            pending: Mutex::new(Vec::new()),
            token_ids: RwLock::new(HashMap::new()),
            document_ids: RwLock::new(HashMap::new()),
            config,
        });
        let flusher = spawn_flusher(Arc::clone(&shared))?;

        Ok(Self {
            shared,
            flusher: Mutex::new(Some(flusher)),
        })
    }

    /// Write buffered occurrences now. Returns how many were written.
    pub fn flush(&self) -> Result<usize> {
        self.shared.flush()
    }

    pub fn pending(&self) -> usize {
        self.shared.pending.lock().len()
    }

    pub fn stats(&self) -> Result<EngineStats> {
        let pending = self.pending();
        let conn = self.shared.conn.lock();
        let count = |table: &str| -> Result<usize> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
            Ok(n as usize)
        };
        Ok(EngineStats {
            documents: count("documents")?,
            tokens: count("tokens")?,
            occurrences: count("occurrences")?,
            pending,
        })
    }

    /// Stop the flush thread, then flush whatever it left behind
    fn shutdown(&self) -> Result<()> {
        let Some(flusher) = self.flusher.lock().take() else {
            return Ok(());
        };
        drop(flusher.stop);
        if flusher.join.join().is_err() {
            warn!("flush thread panicked");
        }
        self.shared.flush().map(|_| ())
    }
}

impl StorageEngine for SqliteEngine {
    fn add(&self, token: &str, position: u32, source: &Source) -> Result<()> {
        let token_id = self.shared.resolve(Entity::Token, token)?;
        let document_id = self.shared.resolve(Entity::Document, &source.name)?;
        self.shared.pending.lock().push(PendingOccurrence {
            token_id,
            document_id,
            position,
        });
        Ok(())
    }

    /// Postings straight from the database, positions in insertion order.
    /// Unflushed occurrences are not included.
    fn get(&self, tokens: &[String]) -> Result<Postings> {
        let mut postings = Postings::new();
        if tokens.is_empty() {
            return Ok(postings);
        }

        let conn = self.shared.conn.lock();
        for chunk in tokens.chunks(self.shared.config.lookup_chunk_size.max(1)) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT t.token, d.name, o.position FROM occurrences o
                 JOIN tokens t ON o.token_id = t.id
                 JOIN documents d ON o.document_id = d.id
                 WHERE t.token IN ({})
                 ORDER BY o.id",
                placeholders
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                ))
            })?;
            for row in rows {
                let (token, name, position) = row?;
                postings
                    .entry(token)
                    .or_default()
                    .entry(Source::new(name))
                    .or_default()
                    .push(position);
            }
        }
        Ok(postings)
    }

    fn close(&self) -> Result<()> {
        self.shutdown()
    }
}

impl Drop for SqliteEngine {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "final flush failed while dropping engine");
        }
    }
}
