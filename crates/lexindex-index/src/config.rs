//! Tunables for the ingestion pipeline and the SQLite engine

use std::time::Duration;

/// Index facade configuration
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Pipeline queue capacity; producers block once it is full
    pub queue_capacity: usize,

    /// Documents scanned concurrently during a directory build
    pub max_producers: usize,
}

impl IndexConfig {
    pub fn new() -> Self {
        Self {
            queue_capacity: 1024,
            max_producers: 16,
        }
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_max_producers(mut self, max_producers: usize) -> Self {
        self.max_producers = max_producers;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// SQLite engine configuration
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// How often buffered occurrences are written out
    pub flush_interval: Duration,

    /// Max tokens per `IN (...)` clause when reading postings
    pub lookup_chunk_size: usize,
}

impl SqliteConfig {
    pub fn new() -> Self {
        Self {
            flush_interval: Duration::from_secs(10),
            lookup_chunk_size: 500,
        }
    }

    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::new()
    }
}
