use cpg_core::{Edge, GraphSink, Metadata, Node, NodeId, NodeType, Range};
use cpg_store::MemoryGraphStore;

pub fn node(file: u32, seq: u32, node_type: NodeType, name: &str, scope: NodeId, metadata: Metadata) -> Node {
    let mut n = Node::new(NodeId::new(file, seq), node_type, file, name, Range::default(), 1, scope);
    n.metadata = metadata;
    n
}

pub fn store_with(nodes: Vec<Node>, edges: Vec<Edge>) -> MemoryGraphStore {
    let mut store = MemoryGraphStore::new_in_memory();
    store.begin_file(1);
    for n in nodes {
        store.create_node(n).unwrap();
    }
    for e in edges {
        store.create_edge(e).unwrap();
    }
    store.end_file(1).unwrap();
    store
}
