// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! The Graph Store Facade (spec §4.5): typed CRUD over a pluggable backend,
//! with per-file write buffering that guarantees nodes are flushed before
//! the edges that reference them.

pub mod backend;
pub mod buffer;
pub mod config;
pub mod driver;
pub mod memory;
pub mod read_model;
pub mod sqlite;
pub mod store;
pub mod typed;

#[cfg(feature = "visualization")]
pub mod export_json;

pub use backend::{Backend, ReadBackend};
pub use config::StoreConfig;
pub use driver::{GraphDriver, Row, Scalar};
pub use memory::MemoryBackend;
pub use read_model::GraphReadModel;
pub use sqlite::SqliteBackend;
pub use store::GraphStore;

pub type MemoryGraphStore = GraphStore<MemoryBackend>;
pub type SqliteGraphStore = GraphStore<SqliteBackend>;

impl MemoryGraphStore {
    pub fn new_in_memory() -> Self {
        GraphStore::new(MemoryBackend::new(), StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpg_core::{Edge, EdgeLabel, GraphSink, Node, NodeId, NodeType, Range};

    fn var(file: u32, seq: u32, name: &str) -> Node {
        Node::new(
            NodeId::new(file, seq),
            NodeType::Variable,
            file,
            name,
            Range::default(),
            1,
            NodeId::new(file, 1),
        )
    }

    #[test]
    fn flush_writes_nodes_before_edges() {
        let mut store = MemoryGraphStore::new_in_memory();
        store.begin_file(1);
        let a = var(1, 2, "a");
        let b = var(1, 3, "b");
        store.create_edge(Edge::new(EdgeLabel::Contains, a.id, b.id, 1)).unwrap();
        store.create_node(a.clone()).unwrap();
        store.create_node(b.clone()).unwrap();
        store.end_file(1).unwrap();

        assert!(store.read_node(a.id).is_some());
        assert!(store.read_node(b.id).is_some());
        assert_eq!(store.outgoing(a.id, "CONTAINS").len(), 1);
    }

    #[test]
    fn batch_size_triggers_mid_file_flush() {
        let mut store = GraphStore::new(MemoryBackend::new(), StoreConfig { batched: true, batch_size: 2 });
        store.begin_file(1);
        store.create_node(var(1, 2, "a")).unwrap();
        store.create_node(var(1, 3, "b")).unwrap();
        // Buffer crossed batch_size=2 on the second node, so both should
        // already be visible via the backend before end_file.
        assert!(store.backend().get_node(NodeId::new(1, 2)).is_some());
        store.end_file(1).unwrap();
    }
}
