use anyhow::{bail, Context};
use lexindex_index::{
    BuildReport, Index, IndexConfig, MemoryEngine, PipelineStats, SqliteConfig, SqliteEngine,
    StorageEngine,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::EngineTarget;

pub fn run(target: &EngineTarget, sources: &Path, workers: Option<usize>) -> anyhow::Result<()> {
    if !sources.is_dir() {
        bail!("{} is not a directory", sources.display());
    }
    let mut config = IndexConfig::new();
    if let Some(workers) = workers {
        config = config.with_max_producers(workers);
    }

    let (report, stats) = match target {
        EngineTarget::Snapshot { path, format } => {
            let engine = Arc::new(MemoryEngine::new());
            let built = build(engine.clone(), sources, config)?;
            engine
                .save(path, *format)
                .with_context(|| format!("failed to write snapshot {}", path.display()))?;
            built
        }
        EngineTarget::Sqlite(path) => {
            let engine = Arc::new(
                SqliteEngine::open(path, SqliteConfig::new())
                    .with_context(|| format!("failed to open database {}", path.display()))?,
            );
            let built = build(engine.clone(), sources, config)?;
            // Closing flushes the buffered tail
            engine.close().context("failed to flush database")?;
            built
        }
    };
    info!(%target, written = stats.written, failed = stats.failed, "index built");

    let output = serde_json::json!({
        "target": target.path(),
        "indexed": report.indexed.len(),
        "skipped": report.skipped,
        "occurrences": stats.written,
        "failed": stats.failed,
    });
    println!("{output}");
    Ok(())
}

fn build(
    engine: Arc<dyn StorageEngine>,
    sources: &Path,
    config: IndexConfig,
) -> anyhow::Result<(BuildReport, PipelineStats)> {
    let index = Index::new(engine, config)?;
    let report = index
        .add_directory(sources)
        .with_context(|| format!("failed to scan {}", sources.display()))?;
    let stats = index.close()?;
    Ok((report, stats))
}
