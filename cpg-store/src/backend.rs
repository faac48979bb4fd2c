//! The storage backend a [`crate::store::GraphStore`] flushes into. Kept
//! separate from [`crate::driver::GraphDriver`] (the generic templated-query
//! dependency from spec §4.5) because the Reader/Analyzer need typed,
//! repeated read shapes far more than ad hoc query text — see
//! `cpg-store::read_model` for why.

use cpg_core::{Edge, Metadata, Node, NodeId, NodeType, Result};

pub trait Backend {
    /// Bulk MERGE, grouped by label internally if that helps the concrete
    /// engine (the SQLite backend issues one prepared statement per label).
    fn write_nodes(&mut self, nodes: &[Node]) -> Result<()>;

    fn write_edges(&mut self, edges: &[Edge]) -> Result<()>;

    fn get_node(&self, id: NodeId) -> Option<Node>;

    fn patch_node_metadata(&mut self, id: NodeId, patch: &Metadata) -> Result<()>;

    /// Cascading delete: the node and every edge with it as an endpoint.
    fn delete_node(&mut self, id: NodeId) -> Result<()>;
}

pub trait ReadBackend: Backend {
    fn nodes_in_file(&self, file_id: u32) -> Vec<Node>;

    fn nodes_of_type(&self, node_type: NodeType) -> Vec<Node>;

    fn outgoing(&self, from: NodeId, label_name: &str) -> Vec<Edge>;

    fn incoming(&self, to: NodeId, label_name: &str) -> Vec<Edge>;
}
