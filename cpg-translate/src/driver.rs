//! The file-to-graph driver (spec §6): dispatches on file extension, parses
//! with the matching tree-sitter grammar, and runs the matching language
//! visitor over a fresh [`Translator`]. One call translates exactly one
//! file; the caller (`cpg-cli`, or a test) owns repo/file-version
//! bookkeeping.

use std::path::Path;

use cpg_core::{CancellationFlag, CpgError, GraphSink, Result};
use cpg_tree_adapter::CstNode;
use log::{debug, warn};

use crate::translator::Translator;
use crate::visitors::{go, java, javascript, python, typescript};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Go,
    Python,
    JavaScript,
    TypeScript,
    Java,
}

impl Language {
    /// Extension-based dispatch (spec §6): `.go` / `.py,.pyw` /
    /// `.js,.jsx,.mjs` / `.ts,.tsx` / `.java`. Any other extension is
    /// skipped, not an error.
    pub fn from_extension(path: &Path) -> Option<Language> {
        match path.extension().and_then(|e| e.to_str())? {
            "go" => Some(Language::Go),
            "py" | "pyw" => Some(Language::Python),
            "js" | "jsx" | "mjs" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "java" => Some(Language::Java),
            _ => None,
        }
    }

    fn ts_language(self) -> tree_sitter::Language {
        match self {
            Language::Go => go::language(),
            Language::Python => python::language(),
            Language::JavaScript => javascript::language(),
            Language::TypeScript => typescript::language(),
            Language::Java => java::language(),
        }
    }
}

/// Translate one file's content into its graph fragment and flush it. The
/// `repo`/`path` pair becomes the `FileScope`'s metadata; `file_id` is the
/// caller-assigned id this file's nodes will be composed under (spec §4.2).
#[allow(clippy::too_many_arguments)]
pub fn translate_file<S: GraphSink + ?Sized>(
    sink: &mut S,
    repo: &str,
    relative_path: &str,
    file_id: u32,
    content_version: u64,
    content_bytes: &[u8],
    mtime_unix: i64,
    cancel: &dyn CancellationFlag,
) -> Result<()> {
    cancel.check("translate_file:start")?;
    let path = Path::new(relative_path);
    let Some(language) = Language::from_extension(path) else {
        debug!("skipping unsupported-language file {relative_path:?}");
        return Ok(());
    };

    let tree = cpg_tree_adapter::parse(language.ts_language(), content_bytes).ok_or_else(|| {
        CpgError::ParseDegenerate {
            path: relative_path.to_string(),
            detail: "tree-sitter returned no tree".to_string(),
        }
    })?;
    let root = CstNode::root(&tree);
    if root.has_error() {
        warn!(
            "degenerate parse in {relative_path:?}: {:?}",
            &content_bytes[..content_bytes.len().min(80)]
        );
    }

    let mut tr = Translator::new(sink, file_id, content_version);
    let file_scope = tr.create_file_scope(repo, relative_path, language_name(language), mtime_unix, root.position())?;
    let module_name = path.file_stem().and_then(|s| s.to_str()).unwrap_or(relative_path);
    let module_scope = tr.create_module_scope(file_scope, module_name, root.position())?;

    cancel.check("translate_file:before_visit")?;
    tr.begin_module();
    match language {
        Language::Go => go::translate_module(&mut tr, root, content_bytes, module_scope)?,
        Language::Python => python::translate_module(&mut tr, root, content_bytes, module_scope)?,
        Language::JavaScript => javascript::translate_module(&mut tr, root, content_bytes, module_scope)?,
        Language::TypeScript => typescript::translate_module(&mut tr, root, content_bytes, module_scope)?,
        Language::Java => java::translate_module(&mut tr, root, content_bytes, module_scope)?,
    }
    tr.end_module(module_scope)?;

    tr.finish()
}

fn language_name(language: Language) -> &'static str {
    match language {
        Language::Go => "go",
        Language::Python => "python",
        Language::JavaScript => "javascript",
        Language::TypeScript => "typescript",
        Language::Java => "java",
    }
}

