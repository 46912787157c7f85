use lexindex_index::StorageEngine;

use crate::config::EngineTarget;

pub fn run(target: &EngineTarget) -> anyhow::Result<()> {
    let engine = target.open()?;
    let stats = engine.stats()?;
    let created_at = engine.as_memory().and_then(|m| m.snapshot_created_at());

    let mut output = serde_json::json!({
        "engine": engine.kind(),
        "target": target.path(),
        "documents": stats.documents,
        "tokens": stats.tokens,
        "occurrences": stats.occurrences,
        "pending": stats.pending,
    });
    if let Some(created_at) = created_at {
        output["created_at"] = serde_json::json!(created_at);
    }

    println!("{output}");
    engine.close()?;
    Ok(())
}
