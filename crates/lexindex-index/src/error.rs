//! Error type shared by the engines, the pipeline and the index facade

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON snapshot error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Snapshot error: incompatible version {actual}, expected <= {expected}")]
    IncompatibleSnapshot { expected: u32, actual: u32 },

    #[error("Schema version {actual} is behind {expected}; run migrations first")]
    SchemaMissing { expected: u32, actual: u32 },

    #[error("Pipeline closed")]
    PipelineClosed,

    #[error("Ingest consumer panicked")]
    ConsumerPanicked,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    /// Errors caused by a bad or unreachable engine target rather than by data
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            IndexError::Config(_) | IndexError::SchemaMissing { .. }
        )
    }
}
