//! Inverted index over text documents: storage engines, ingestion pipeline, ranked search

mod config;
mod engine;
mod error;
mod index;
mod pipeline;
pub mod schema;
mod scoring;
mod source;

pub use config::{IndexConfig, SqliteConfig};
pub use engine::{
    Engine, EngineStats, MemoryEngine, SnapshotFormat, SqliteEngine, StorageEngine,
    SNAPSHOT_VERSION,
};
pub use error::{IndexError, Result};
pub use index::{BuildReport, Index};
pub use lexindex_text::{Normalizer, Token};
pub use pipeline::{Pipeline, PipelineStats};
pub use scoring::{tally, Hit, ScoreByCount, Scorer, Tally};
pub use source::{Occurrences, Postings, SearchResult, Source};
