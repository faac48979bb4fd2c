//! Indexing configuration: store batching and the repo/root identity a
//! directory walk is translated under. `Default` gives an in-process
//! embedding caller a sane starting point; `clap::Args` lets the binary
//! fill the same struct from flags.

use std::path::PathBuf;

use clap::Args;
use cpg_store::StoreConfig;

#[derive(Args, Clone, Debug)]
pub struct Config {
    /// Repository name this walk's files are recorded under. Becomes the
    /// `FileScope.repo` metadata and the file-version store's table name.
    #[arg(long)]
    pub repo: String,

    /// Directory to walk. Every regular file with a recognized extension is
    /// translated; everything else is skipped.
    #[arg(long, value_name = "PATH")]
    pub root: PathBuf,

    /// Code property graph store. Omit for an ephemeral in-memory store
    /// (useful for a dry run or embedding caller that only wants stats).
    #[arg(long, value_name = "PATH")]
    pub graph_db: Option<PathBuf>,

    /// File-version bookkeeping store. Omit for an ephemeral in-memory
    /// store — every run is then treated as a first-time index.
    #[arg(long, value_name = "PATH")]
    pub fileversion_db: Option<PathBuf>,

    /// Commit this walk's files belong to. Omitted for an ephemeral
    /// (uncommitted/working-tree) version.
    #[arg(long, value_name = "SHA")]
    pub commit: Option<String>,

    /// Disable per-file write buffering in the graph store, writing every
    /// node/edge straight through to the driver.
    #[arg(long)]
    pub no_batching: bool,

    /// Override the default per-file flush batch size.
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,
}

impl Config {
    pub fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::default();
        config.batched = !self.no_batching;
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        config
    }

    pub fn ephemeral(&self) -> bool {
        self.commit.is_none()
    }
}
