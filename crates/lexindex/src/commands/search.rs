use anyhow::Context;
use lexindex_index::{Index, IndexConfig, SearchResult, StorageEngine};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::config::EngineTarget;

pub fn run(target: &EngineTarget, query: &[String], json: bool) -> anyhow::Result<()> {
    let engine = Arc::new(target.open()?);
    let index = Index::new(engine.clone(), IndexConfig::new())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if query.is_empty() {
        repl(&index, io::stdin().lock(), &mut out, json)?;
    } else {
        let results = index.search(&query.join(" "))?;
        print_results(&mut out, &results, json)?;
    }

    index.close()?;
    engine.close()?;
    Ok(())
}

/// One query per line until end of input. Blank lines are ignored.
fn repl<R: BufRead, W: Write>(index: &Index, input: R, out: &mut W, json: bool) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line.context("failed to read query")?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        let results = index.search(query)?;
        print_results(out, &results, json)?;
        out.flush()?;
    }
    Ok(())
}

fn print_results<W: Write>(out: &mut W, results: &[SearchResult], json: bool) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, results)?;
        writeln!(out)?;
        return Ok(());
    }

    if results.is_empty() {
        writeln!(out, "No matching documents")?;
    }
    for (rank, result) in results.iter().enumerate() {
        writeln!(out, "{}. {} ({})", rank + 1, result.document.name, result.score)?;
    }
    Ok(())
}
