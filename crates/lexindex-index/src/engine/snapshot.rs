//! Snapshot envelope and encodings for the memory engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use super::memory::MemoryState;
use crate::error::{IndexError, Result};

/// Current snapshot layout version
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk encoding of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    #[default]
    Binary,
    Json,
}

impl SnapshotFormat {
    /// `.json` files are JSON, anything else binary
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SnapshotFormat::Json,
            _ => SnapshotFormat::Binary,
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bin" | "bincode" => Ok(SnapshotFormat::Binary),
            "json" => Ok(SnapshotFormat::Json),
            other => Err(IndexError::Config(format!(
                "unknown snapshot format '{}', expected binary or json",
                other
            ))),
        }
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    created_at: DateTime<Utc>,
    state: &'a MemoryState,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    created_at: DateTime<Utc>,
    state: MemoryState,
}

pub(super) fn write_snapshot<W: Write>(
    writer: W,
    format: SnapshotFormat,
    state: &MemoryState,
) -> Result<()> {
    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        created_at: Utc::now(),
        state,
    };
    match format {
        SnapshotFormat::Binary => bincode::serialize_into(writer, &snapshot)?,
        SnapshotFormat::Json => serde_json::to_writer(writer, &snapshot)?,
    }
    Ok(())
}

pub(super) fn read_snapshot<R: Read>(
    reader: R,
    format: SnapshotFormat,
) -> Result<(MemoryState, DateTime<Utc>)> {
    let snapshot: Snapshot = match format {
        SnapshotFormat::Binary => bincode::deserialize_from(reader)?,
        SnapshotFormat::Json => serde_json::from_reader(reader)?,
    };
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(IndexError::IncompatibleSnapshot {
            expected: SNAPSHOT_VERSION,
            actual: snapshot.version,
        });
    }
    Ok((snapshot.state, snapshot.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SnapshotFormat::from_path(&PathBuf::from("index.json")),
            SnapshotFormat::Json
        );
        assert_eq!(
            SnapshotFormat::from_path(&PathBuf::from("index.JSON")),
            SnapshotFormat::Json
        );
        assert_eq!(
            SnapshotFormat::from_path(&PathBuf::from("index.bin")),
            SnapshotFormat::Binary
        );
        assert_eq!(
            SnapshotFormat::from_path(&PathBuf::from("index")),
            SnapshotFormat::Binary
        );
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Json);
        assert_eq!("Binary".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Binary);
        assert!("gob".parse::<SnapshotFormat>().is_err());
    }

    #[test]
    fn test_newer_snapshot_rejected() {
        let json = serde_json::json!({
            "version": SNAPSHOT_VERSION + 1,
            "created_at": "2026-01-01T00:00:00Z",
            "state": { "index": {}, "sources": {} }
        });
        let bytes = serde_json::to_vec(&json).unwrap();

        let err = read_snapshot(bytes.as_slice(), SnapshotFormat::Json).unwrap_err();
        assert!(matches!(
            err,
            IndexError::IncompatibleSnapshot { actual, .. } if actual == SNAPSHOT_VERSION + 1
        ));
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(read_snapshot(&b"not a snapshot"[..], SnapshotFormat::Json).is_err());
        assert!(read_snapshot(&b"\x01"[..], SnapshotFormat::Binary).is_err());
    }
}
