#![allow(dead_code)]

use lexindex_index::{schema, Index, IndexConfig, SqliteConfig, SqliteEngine, StorageEngine};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const FILE1: &str = "an apple banana raspberry";
pub const FILE2: &str = "apple the banana orange";

/// SQLite engine on a freshly migrated file, flushed only on demand
pub fn sqlite_engine(dir: &Path) -> Arc<SqliteEngine> {
    let path = dir.join("index.db");
    schema::migrate_database(&path).unwrap();
    let config = SqliteConfig::new().with_flush_interval(Duration::from_secs(3600));
    Arc::new(SqliteEngine::open(&path, config).unwrap())
}

/// Index `docs` into `engine` and wait for the pipeline to drain
pub fn ingest(engine: Arc<dyn StorageEngine>, docs: &[(&str, &str)]) {
    let index = Index::new(engine, IndexConfig::new()).unwrap();
    for (name, text) in docs {
        index.add_source(name, Cursor::new(text.to_string())).unwrap();
    }
    index.close().unwrap();
}

pub fn names(results: &[lexindex_index::SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.document.name.as_str()).collect()
}
