use cpg_core::{Edge, NeverCancel, Node, NodeId, NodeType};
use cpg_store::{GraphReadModel, MemoryGraphStore};
use cpg_translate::translate_file;

pub fn translate(path: &str, source: &[u8]) -> MemoryGraphStore {
    let mut store = MemoryGraphStore::new_in_memory();
    translate_file(&mut store, "repo", path, 1, 1, source, 0, &NeverCancel).unwrap();
    store
}

pub fn nodes_of_type(store: &MemoryGraphStore, node_type: NodeType) -> Vec<Node> {
    store.nodes_of_type(node_type)
}

pub fn only_named(store: &MemoryGraphStore, node_type: NodeType, name: &str) -> Node {
    let matches: Vec<Node> = nodes_of_type(store, node_type).into_iter().filter(|n| n.name == name).collect();
    assert_eq!(matches.len(), 1, "expected exactly one {node_type:?} named {name:?}, found {}", matches.len());
    matches[0].clone()
}

pub fn outgoing(store: &MemoryGraphStore, from: NodeId, label: &str) -> Vec<Edge> {
    store.outgoing(from, label)
}

pub fn incoming(store: &MemoryGraphStore, to: NodeId, label: &str) -> Vec<Edge> {
    store.incoming(to, label)
}
