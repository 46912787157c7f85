//! Index facade: normalizes text, feeds the ingestion pipeline, answers ranked queries

use crossbeam::channel;
use lexindex_text::{Normalizer, Token};
use parking_lot::Mutex;
use serde::Serialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::engine::StorageEngine;
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineStats};
use crate::scoring::{tally, ScoreByCount, Scorer};
use crate::source::{SearchResult, Source};

/// Files indexed and skipped by a directory build
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub indexed: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

pub struct Index {
    engine: Arc<dyn StorageEngine>,
    normalizer: Normalizer,
    pipeline: Pipeline,
    scorer: Box<dyn Scorer>,
    config: IndexConfig,
}

impl Index {
    /// Start an index over `engine`. The engine stays owned by the caller,
    /// who closes it once the index is closed.
    pub fn new(engine: Arc<dyn StorageEngine>, config: IndexConfig) -> Result<Self> {
        let pipeline = Pipeline::spawn(Arc::clone(&engine), config.queue_capacity)?;
        Ok(Self {
            engine,
            normalizer: Normalizer::new(),
            pipeline,
            scorer: Box::new(ScoreByCount),
            config,
        })
    }

    /// Replace the default `ScoreByCount` ranking
    pub fn with_scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Scan a document and queue its tokens. Safe to call from many threads.
    ///
    /// On a read error, tokens scanned before the error stay queued.
    pub fn add_source<R: BufRead>(&self, name: &str, reader: R) -> Result<()> {
        let source = Arc::new(Source::new(name));
        let mut submitted = 0usize;
        for token in self.normalizer.tokens(reader) {
            let token = token?;
            self.pipeline.submit(&source, token.text, token.position)?;
            submitted += 1;
        }
        debug!(document = name, tokens = submitted, "document scanned");
        Ok(())
    }

    /// Index one file, named by its path.
    ///
    /// The file is read and tokenized in full before anything is queued, so a
    /// file that fails leaves nothing in the index.
    pub fn add_file(&self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let tokens = self
            .normalizer
            .tokens(bytes.as_slice())
            .collect::<std::io::Result<Vec<Token>>>()?;

        let name = path.to_string_lossy();
        let source = Arc::new(Source::new(name.as_ref()));
        let count = tokens.len();
        for token in tokens {
            self.pipeline.submit(&source, token.text, token.position)?;
        }
        debug!(document = %name, tokens = count, "document scanned");
        Ok(())
    }

    /// Index every regular file in `dir`, several at a time.
    ///
    /// A file that cannot be read is logged and skipped.
    pub fn add_directory(&self, dir: &Path) -> Result<BuildReport> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let report = self.index_files(files);
        info!(
            dir = %dir.display(),
            indexed = report.indexed.len(),
            skipped = report.skipped.len(),
            "directory scanned"
        );
        Ok(report)
    }

    /// Index `files` on a pool of at most `max_producers` threads
    fn index_files(&self, files: Vec<PathBuf>) -> BuildReport {
        let workers = self.config.max_producers.clamp(1, files.len().max(1));
        let (jobs_tx, jobs_rx) = channel::unbounded::<PathBuf>();
        for path in files {
            // Receiver is alive, send cannot fail
            let _ = jobs_tx.send(path);
        }
        drop(jobs_tx);

        let report = Mutex::new(BuildReport::default());
        thread::scope(|scope| {
            for _ in 0..workers {
                let jobs = jobs_rx.clone();
                let report = &report;
                scope.spawn(move || {
                    for path in jobs.iter() {
                        match self.add_file(&path) {
                            Ok(()) => report.lock().indexed.push(path),
                            Err(err) => {
                                warn!(path = %path.display(), error = %err, "cannot index file");
                                report.lock().skipped.push(path);
                            }
                        }
                    }
                });
            }
        });

        let mut report = report.into_inner();
        report.indexed.sort();
        report.skipped.sort();
        report
    }

    /// Ranked documents for `query`. Queries that normalize to nothing match nothing.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let tokens = self.normalizer.query_tokens(query);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let postings = self.engine.get(&tokens)?;
        self.scorer.score(&tally(postings), &tokens)
    }

    /// Stop accepting documents and wait until everything queued is written
    pub fn close(self) -> Result<PipelineStats> {
        self.pipeline.close()
    }
}
