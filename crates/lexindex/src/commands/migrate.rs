use anyhow::{bail, Context};
use lexindex_index::schema;

use crate::config::EngineTarget;

pub fn run(target: &EngineTarget, status: bool) -> anyhow::Result<()> {
    let EngineTarget::Sqlite(db) = target else {
        bail!("migrate needs a database target: pass --db or set LEXINDEX_DB");
    };

    let output = if status {
        let version = schema::database_version(db)
            .with_context(|| format!("failed to read schema of {}", db.display()))?;
        serde_json::json!({
            "database": db,
            "version": version,
            "latest": schema::SCHEMA_VERSION,
            "up_to_date": version >= schema::SCHEMA_VERSION,
        })
    } else {
        let (from, to) = schema::migrate_database(db)
            .with_context(|| format!("failed to migrate {}", db.display()))?;
        serde_json::json!({
            "database": db,
            "from": from,
            "to": to,
        })
    };
    println!("{output}");
    Ok(())
}
