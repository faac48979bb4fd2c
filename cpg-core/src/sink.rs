//! The dependency boundary between the translator and the graph store.
//!
//! The translator never talks to a concrete database. It only knows
//! [`GraphSink`], which `cpg-store` implements on top of the real (or, in
//! tests, in-memory) driver. This mirrors spec §4.5's three-level layering:
//! callers of a sink get per-file batching and node-before-edge flush
//! ordering for free, without knowing anything about SQL or Cypher.

use crate::edge::Edge;
use crate::error::Result;
use crate::id::NodeId;
use crate::node::{Metadata, Node};

pub trait GraphSink {
    /// Begin buffering writes for `file_id`. Idempotent if already open.
    fn begin_file(&mut self, file_id: u32);

    /// Typed node creation: implementations validate `node.node_type`
    /// against the caller's expectation before accepting the write (spec
    /// §4.5 "Typed CRUD"). The translator's constructor wrappers are
    /// expected to have already stamped the correct type, so this is a
    /// last-line assertion, not user input validation.
    fn create_node(&mut self, node: Node) -> Result<()>;

    fn create_edge(&mut self, edge: Edge) -> Result<()>;

    /// Patch a node's metadata. In batched mode, a buffered node with the
    /// same id is patched in place; only on a buffer miss does this reach
    /// the driver (spec §4.5).
    fn update_node_metadata(&mut self, id: NodeId, patch: Metadata) -> Result<()>;

    fn read_node(&self, id: NodeId) -> Option<Node>;

    /// Remove a node and every edge touching it. The only sanctioned use is
    /// fake-class resolution (spec §4.3): once a fake `Class` is superseded
    /// by a same-named real one, the fake must stop existing rather than
    /// linger as a same-named sibling.
    fn delete_node(&mut self, id: NodeId) -> Result<()>;

    /// Flush `file_id`'s buffers (nodes before edges, grouped by label) and
    /// remove its buffer entry. No-op if the file was never begun.
    fn end_file(&mut self, file_id: u32) -> Result<()>;
}
