//! Storage engines behind one Add/Get/Close contract

mod memory;
mod snapshot;
mod sqlite;

pub use memory::MemoryEngine;
pub use snapshot::{SnapshotFormat, SNAPSHOT_VERSION};
pub use sqlite::SqliteEngine;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::source::{Postings, Source};

/// Durable or queryable home of the postings.
///
/// `add` is only ever called from the ingestion pipeline's single consumer,
/// so implementations see one writer at a time. `get` may run concurrently
/// with `add` from any number of searching threads.
pub trait StorageEngine: Send + Sync {
    /// Record one occurrence of `token` at `position` in `source`
    fn add(&self, token: &str, position: u32, source: &Source) -> Result<()>;

    /// Complete current postings for every requested token that exists.
    /// Unknown tokens are omitted from the result, not reported as errors.
    fn get(&self, tokens: &[String]) -> Result<Postings>;

    /// Release held resources. Call once; the engine is unusable afterwards.
    fn close(&self) -> Result<()>;
}

/// Size of an engine's contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub documents: usize,
    pub tokens: usize,
    pub occurrences: usize,
    /// Occurrences accepted but not yet persisted
    pub pending: usize,
}

/// The two built-in engines, selected once at startup
pub enum Engine {
    Memory(MemoryEngine),
    Sqlite(SqliteEngine),
}

impl Engine {
    pub fn kind(&self) -> &'static str {
        match self {
            Engine::Memory(_) => "memory",
            Engine::Sqlite(_) => "sqlite",
        }
    }

    pub fn stats(&self) -> Result<EngineStats> {
        match self {
            Engine::Memory(engine) => Ok(engine.stats()),
            Engine::Sqlite(engine) => engine.stats(),
        }
    }

    pub fn as_memory(&self) -> Option<&MemoryEngine> {
        match self {
            Engine::Memory(engine) => Some(engine),
            Engine::Sqlite(_) => None,
        }
    }
}

impl StorageEngine for Engine {
    fn add(&self, token: &str, position: u32, source: &Source) -> Result<()> {
        match self {
            Engine::Memory(engine) => engine.add(token, position, source),
            Engine::Sqlite(engine) => engine.add(token, position, source),
        }
    }

    fn get(&self, tokens: &[String]) -> Result<Postings> {
        match self {
            Engine::Memory(engine) => engine.get(tokens),
            Engine::Sqlite(engine) => engine.get(tokens),
        }
    }

    fn close(&self) -> Result<()> {
        match self {
            Engine::Memory(engine) => engine.close(),
            Engine::Sqlite(engine) => engine.close(),
        }
    }
}

impl From<MemoryEngine> for Engine {
    fn from(engine: MemoryEngine) -> Self {
        Engine::Memory(engine)
    }
}

impl From<SqliteEngine> for Engine {
    fn from(engine: SqliteEngine) -> Self {
        Engine::Sqlite(engine)
    }
}
