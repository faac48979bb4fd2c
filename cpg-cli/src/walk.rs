//! Directory discovery: every regular file under `root` whose extension
//! the translator dispatch table recognizes, in deterministic order.

use std::path::{Path, PathBuf};

use cpg_translate::driver::Language;
use walkdir::WalkDir;

pub fn discover_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| Language::from_extension(path).is_some())
        .collect()
}
