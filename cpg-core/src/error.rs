//! Shared error taxonomy (spec §7). Individual crates add their own
//! `#[from]` conversions (driver errors, parse failures) but report through
//! this enum so callers across the workspace see one error shape.

use thiserror::Error;

use crate::cancel::CancellationError;
use crate::id::NodeId;

#[derive(Debug, Error)]
pub enum CpgError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid node type: expected {expected:?} for node {id:?}")]
    InvalidNodeType {
        expected: crate::node::NodeType,
        id: NodeId,
    },

    #[error("ambiguous match: {0}")]
    AmbiguousMatch(String),

    #[error("unsupported language for extension {0:?}")]
    UnsupportedLanguage(String),

    #[error("graph store driver error: {context}: {source}")]
    Driver {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("degenerate parse in {path}: {detail}")]
    ParseDegenerate { path: String, detail: String },

    #[error("write conflict merging id {0:?}")]
    WriteConflict(NodeId),

    #[error(transparent)]
    Cancelled(#[from] CancellationError),
}

pub type Result<T> = std::result::Result<T, CpgError>;
