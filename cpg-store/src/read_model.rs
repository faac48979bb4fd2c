//! Structured reads consumed by `cpg-query`'s Reader and Analyzer.
//!
//! The [`GraphDriver`](crate::driver::GraphDriver) trait models the generic
//! "templated query string" dependency from spec §4.5. In practice, the
//! Reader and Analyzer need typed, repeated shapes of read (by-id, by-type,
//! by-edge-label) far more than raw query text, so the store exposes them
//! directly here — the same way the typed CRUD wrappers sit above the raw
//! driver for writes.

use cpg_core::{Edge, EdgeLabel, Node, NodeId, NodeType};

pub trait GraphReadModel {
    fn node(&self, id: NodeId) -> Option<Node>;

    fn nodes_in_file(&self, file_id: u32) -> Vec<Node>;

    fn nodes_of_type(&self, node_type: NodeType) -> Vec<Node>;

    /// Direct (non-transitive) outgoing edges from `from` carrying `label`.
    /// Matching ignores `position`/`condition` payload, matching only the
    /// edge's label name (spec's merge-key semantics).
    fn outgoing(&self, from: NodeId, label_name: &str) -> Vec<Edge>;

    fn incoming(&self, to: NodeId, label_name: &str) -> Vec<Edge>;

    /// Transitive CONTAINS descendants of `root`, not including `root`
    /// itself. Used by field-accessor and call-graph queries that walk
    /// `(x)-[:CONTAINS*]->(y)`.
    fn contains_descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        let mut seen = std::collections::HashSet::new();
        seen.insert(root);
        while let Some(cur) = stack.pop() {
            for edge in self.outgoing(cur, EdgeLabel::Contains.name()) {
                if seen.insert(edge.to) {
                    out.push(edge.to);
                    stack.push(edge.to);
                }
            }
        }
        out
    }
}
