use clap::{Args, Parser, Subcommand};
use lexindex_index::SnapshotFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lexindex")]
#[command(version)]
#[command(about = "Build and query a stemmed inverted word index")]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the index lives. `--db` wins over `--index`.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// SQLite database holding the index
    #[arg(long, global = true, env = "LEXINDEX_DB")]
    pub db: Option<PathBuf>,

    /// Snapshot file holding the index [default: <data dir>/lexindex/index.bin]
    #[arg(long, global = true, env = "LEXINDEX_INDEX")]
    pub index: Option<PathBuf>,

    /// Snapshot encoding: binary or json (inferred from the file extension)
    #[arg(long, global = true)]
    pub format: Option<SnapshotFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index every file in a directory
    Build {
        /// Directory of plain-text documents
        #[arg(short, long)]
        sources: PathBuf,

        /// Files scanned at once (default 16)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Query the index; reads queries from stdin when none is given
    Search {
        query: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create or upgrade the SQLite schema
    Migrate {
        /// Report the schema version without changing anything
        #[arg(long)]
        status: bool,
    },

    /// Print index statistics as JSON
    Stats,
}
