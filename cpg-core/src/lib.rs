// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Data model and schema contracts for the code property graph.
//!
//! This crate has no knowledge of concrete syntax trees or a graph store; it
//! only defines the vocabulary ([`Node`], [`Edge`], [`NodeId`], [`Range`])
//! that the translator produces and the store persists. Keeping the model in
//! its own crate means the translator (`cpg-translate`) and the store
//! (`cpg-store`) can each depend on it without depending on each other.

pub mod cancel;
pub mod edge;
pub mod error;
pub mod id;
pub mod node;
pub mod range;
pub mod sink;

pub use cancel::{AtomicCancellationFlag, CancellationError, CancellationFlag, NeverCancel};
pub use edge::{Edge, EdgeLabel};
pub use error::{CpgError, Result};
pub use id::{NodeId, SeqAllocator, INVALID};
pub use node::{is_first_class, storage_column, MetaValue, Metadata, Node, NodeType, FIRST_CLASS_KEYS};
pub use range::{Point, Range};
pub use sink::GraphSink;
