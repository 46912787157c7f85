//! In-process engine: one reader/writer lock over postings and the source registry

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use super::snapshot::{self, SnapshotFormat};
use super::{EngineStats, StorageEngine};
use crate::error::Result;
use crate::source::{Occurrences, Postings, Source};

/// Everything a snapshot captures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct MemoryState {
    /// token -> document name -> positions in arrival order
    pub(crate) index: HashMap<String, HashMap<String, Vec<u32>>>,
    /// document name -> source
    pub(crate) sources: HashMap<String, Source>,
}

impl MemoryState {
    fn source(&self, name: &str) -> Source {
        self.sources
            .get(name)
            .cloned()
            .unwrap_or_else(|| Source::new(name))
    }

    /// Register any document referenced by postings but missing from the registry
    fn rehydrate_sources(&mut self) {
        for documents in self.index.values() {
            for name in documents.keys() {
                if !self.sources.contains_key(name) {
                    self.sources.insert(name.clone(), Source::new(name.as_str()));
                }
            }
        }
    }
}

pub struct MemoryEngine {
    state: RwLock<MemoryState>,
    snapshot_created_at: Option<DateTime<Utc>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            snapshot_created_at: None,
        }
    }

    /// Encode postings and sources as one consistent snapshot.
    ///
    /// The read lock is held for the whole encode, so a concurrent writer
    /// cannot produce a torn snapshot.
    pub fn encode<W: Write>(&self, writer: W, format: SnapshotFormat) -> Result<()> {
        let state = self.state.read();
        snapshot::write_snapshot(writer, format, &state)
    }

    /// Rebuild a fresh engine from an encoded snapshot
    pub fn decode<R: Read>(reader: R, format: SnapshotFormat) -> Result<Self> {
        let (mut state, created_at) = snapshot::read_snapshot(reader, format)?;
        state.rehydrate_sources();
        Ok(Self {
            state: RwLock::new(state),
            snapshot_created_at: Some(created_at),
        })
    }

    /// Write a snapshot to `path` via temp file + rename
    pub fn save(&self, path: &Path, format: SnapshotFormat) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp = temp_path(path);
        let mut writer = BufWriter::new(File::create(&temp)?);
        self.encode(&mut writer, format)?;
        writer.flush()?;
        drop(writer);
        std::fs::rename(&temp, path)?;
        Ok(())
    }

    pub fn load(path: &Path, format: SnapshotFormat) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Self::decode(reader, format)
    }

    /// When the snapshot this engine was decoded from was written
    pub fn snapshot_created_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot_created_at
    }

    pub fn stats(&self) -> EngineStats {
        let state = self.state.read();
        EngineStats {
            documents: state.sources.len(),
            tokens: state.index.len(),
            occurrences: state
                .index
                .values()
                .flat_map(|documents| documents.values())
                .map(Vec::len)
                .sum(),
            pending: 0,
        }
    }

    pub fn sources(&self) -> Vec<Source> {
        let mut sources: Vec<Source> = self.state.read().sources.values().cloned().collect();
        sources.sort();
        sources
    }
}

/// `index.json` -> `index.json.tmp`, so sibling snapshots never share a temp file
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for MemoryEngine {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        *self.state.read() == *other.state.read()
    }
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("stats", &self.stats())
            .field("snapshot_created_at", &self.snapshot_created_at)
            .finish()
    }
}

impl StorageEngine for MemoryEngine {
    fn add(&self, token: &str, position: u32, source: &Source) -> Result<()> {
        let mut state = self.state.write();
        if !state.sources.contains_key(&source.name) {
            state.sources.insert(source.name.clone(), source.clone());
        }
        state
            .index
            .entry(token.to_owned())
            .or_default()
            .entry(source.name.clone())
            .or_default()
            .push(position);
        Ok(())
    }

    fn get(&self, tokens: &[String]) -> Result<Postings> {
        let state = self.state.read();
        let mut postings = Postings::new();
        for token in tokens {
            let Some(documents) = state.index.get(token) else {
                continue;
            };
            let occurrences: Occurrences = documents
                .iter()
                .map(|(name, positions)| (state.source(name), positions.clone()))
                .collect();
            postings.insert(token.clone(), occurrences);
        }
        Ok(postings)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
