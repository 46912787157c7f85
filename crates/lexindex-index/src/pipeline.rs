//! Ingestion pipeline: many producers, one bounded queue, one writer thread

use crossbeam::channel::{self, Sender};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use crate::engine::StorageEngine;
use crate::error::{IndexError, Result};
use crate::source::Source;

struct Submission {
    source: Arc<Source>,
    token: String,
    position: u32,
}

/// Outcome of a pipeline's lifetime, reported on close
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub written: usize,
    pub failed: usize,
}

/// Serializes writes into a storage engine.
///
/// Each producer's submissions reach the engine in the order it made them;
/// submissions from different producers interleave. `submit` blocks while the
/// queue is full. Closing drains the queue before the writer exits.
pub struct Pipeline {
    tx: RwLock<Option<Sender<Submission>>>,
    consumer: Mutex<Option<JoinHandle<PipelineStats>>>,
}

impl Pipeline {
    pub fn spawn(engine: Arc<dyn StorageEngine>, capacity: usize) -> Result<Self> {
        let (tx, rx) = channel::bounded::<Submission>(capacity);
        let consumer = thread::Builder::new()
            .name("lexindex-ingest".to_string())
            .spawn(move || {
                let mut stats = PipelineStats::default();
                while let Ok(item) = rx.recv() {
                    match engine.add(&item.token, item.position, &item.source) {
                        Ok(()) => stats.written += 1,
                        Err(err) => {
                            stats.failed += 1;
                            warn!(
                                token = %item.token,
                                document = %item.source,
                                position = item.position,
                                error = %err,
                                "dropping occurrence"
                            );
                        }
                    }
                }
                debug!(written = stats.written, failed = stats.failed, "ingest consumer finished");
                stats
            })?;

        Ok(Self {
            tx: RwLock::new(Some(tx)),
            consumer: Mutex::new(Some(consumer)),
        })
    }

    /// Queue one occurrence, blocking while the queue is full
    pub fn submit(&self, source: &Arc<Source>, token: String, position: u32) -> Result<()> {
        let tx = self
            .tx
            .read()
            .as_ref()
            .cloned()
            .ok_or(IndexError::PipelineClosed)?;
        tx.send(Submission {
            source: Arc::clone(source),
            token,
            position,
        })
        .map_err(|_| IndexError::PipelineClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.read().is_none()
    }

    /// Stop accepting submissions and wait for the queue to drain.
    /// Later calls return empty stats.
    pub fn close(&self) -> Result<PipelineStats> {
        drop(self.tx.write().take());
        let Some(consumer) = self.consumer.lock().take() else {
            return Ok(PipelineStats::default());
        };
        consumer.join().map_err(|_| IndexError::ConsumerPanicked)
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "ingest pipeline shut down uncleanly");
        }
    }
}
