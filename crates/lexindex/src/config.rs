//! Engine target resolution and opening

use anyhow::{anyhow, bail, Context};
use lexindex_index::{Engine, MemoryEngine, SnapshotFormat, SqliteConfig, SqliteEngine};
use std::path::{Path, PathBuf};

use crate::cli::TargetArgs;

/// The single engine this process works against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineTarget {
    Sqlite(PathBuf),
    Snapshot { path: PathBuf, format: SnapshotFormat },
}

impl EngineTarget {
    pub fn resolve(args: &TargetArgs) -> anyhow::Result<Self> {
        Self::resolve_with(args, dirs::data_dir())
    }

    fn resolve_with(args: &TargetArgs, data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(db) = &args.db {
            if db.is_dir() {
                bail!("database path {} is a directory", db.display());
            }
            return Ok(EngineTarget::Sqlite(db.clone()));
        }

        let path = match &args.index {
            Some(path) => path.clone(),
            None => data_dir
                .ok_or_else(|| anyhow!("cannot determine data directory; pass --index or --db"))?
                .join("lexindex")
                .join("index.bin"),
        };
        if path.is_dir() {
            bail!("snapshot path {} is a directory", path.display());
        }
        let format = args.format.unwrap_or_else(|| SnapshotFormat::from_path(&path));
        Ok(EngineTarget::Snapshot { path, format })
    }

    pub fn path(&self) -> &Path {
        match self {
            EngineTarget::Sqlite(path) => path,
            EngineTarget::Snapshot { path, .. } => path,
        }
    }

    /// Open an existing index for reading
    pub fn open(&self) -> anyhow::Result<Engine> {
        match self {
            EngineTarget::Sqlite(path) => {
                let engine = SqliteEngine::open(path, SqliteConfig::new())
                    .with_context(|| format!("failed to open database {}", path.display()))?;
                Ok(engine.into())
            }
            EngineTarget::Snapshot { path, format } => {
                let engine = MemoryEngine::load(path, *format)
                    .with_context(|| format!("failed to load snapshot {}", path.display()))?;
                Ok(engine.into())
            }
        }
    }
}

impl std::fmt::Display for EngineTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineTarget::Sqlite(path) => write!(f, "sqlite:{}", path.display()),
            EngineTarget::Snapshot { path, format } => {
                write!(f, "snapshot:{} ({:?})", path.display(), format)
            }
        }
    }
}
