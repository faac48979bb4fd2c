// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Thin outer driver (spec §6): walk a directory, resolve each file's
//! version, translate it, and flush the result into a persisted code
//! property graph. File-watching and incremental re-indexing policy are out
//! of scope; every invocation is a full pass over `--root`.

mod config;
mod walk;

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use cpg_core::{GraphSink, NeverCancel};
use cpg_fileversion::FileVersionStore;
use cpg_store::{GraphStore, MemoryBackend, SqliteBackend};
use sha1::{Digest, Sha1};

use config::Config;

#[derive(Parser)]
#[command(about, version)]
struct Cli {
    #[command(flatten)]
    config: Config,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli.config)
}

fn run(config: &Config) -> Result<()> {
    let mut fileversions = match &config.fileversion_db {
        Some(path) => FileVersionStore::open(path).context("open file-version store")?,
        None => FileVersionStore::open_in_memory().context("open in-memory file-version store")?,
    };

    let mut sink: Box<dyn GraphSink> = match &config.graph_db {
        Some(path) => Box::new(GraphStore::new(
            SqliteBackend::open(path).context("open graph store")?,
            config.store_config(),
        )),
        None => Box::new(GraphStore::new(MemoryBackend::new(), config.store_config())),
    };

    let files = walk::discover_files(&config.root);
    log::info!("discovered {} translatable files under {:?}", files.len(), config.root);

    let cancel = NeverCancel;
    let mut translated = 0u32;
    for path in &files {
        let relative_path = path.strip_prefix(&config.root).unwrap_or(path).to_string_lossy().replace('\\', "/");
        if let Err(err) = index_one(
            &mut fileversions,
            sink.as_mut(),
            config,
            path,
            &relative_path,
            &cancel,
        ) {
            return Err(err).with_context(|| format!("indexing {relative_path:?}"));
        }
        translated += 1;
    }

    let stats = fileversions.stats(&config.repo).context("read file-version stats")?;
    log::info!(
        "indexed {translated} files for repo {:?}: {} active, {} deleted, {} ephemeral, {} total tracked",
        config.repo,
        stats.active,
        stats.deleted,
        stats.ephemeral,
        stats.total
    );
    Ok(())
}

fn index_one(
    fileversions: &mut FileVersionStore,
    sink: &mut dyn GraphSink,
    config: &Config,
    path: &Path,
    relative_path: &str,
    cancel: &NeverCancel,
) -> Result<()> {
    let content = std::fs::read(path).with_context(|| format!("read {path:?}"))?;
    let sha = content_sha1(&content);
    let mtime_unix = mtime_unix(path).unwrap_or(0);
    let now_unix = now_unix();

    let file_id = fileversions
        .get_or_create_file_id(
            &config.repo,
            relative_path,
            &sha,
            config.ephemeral(),
            config.commit.as_deref(),
            now_unix,
        )
        .context("resolve file version")?;

    cpg_translate::translate_file(sink, &config.repo, relative_path, file_id, 1, &content, mtime_unix, cancel)
        .context("translate file")?;
    Ok(())
}

fn content_sha1(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content);
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

fn mtime_unix(path: &Path) -> Option<i64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(secs as i64)
}

fn now_unix() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}
