//! A plain in-memory [`Backend`], used by `cpg-translate` and `cpg-query`
//! tests and by embedders that don't need persistence across process runs.

use std::collections::HashMap;

use cpg_core::{Edge, Metadata, Node, NodeId, NodeType, Result};

use crate::backend::{Backend, ReadBackend};

#[derive(Default)]
pub struct MemoryBackend {
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
}

impl Backend for MemoryBackend {
    fn write_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            // MERGE semantics on id: last write wins, same as a real MERGE
            // that overwrites properties.
            self.nodes.insert(node.id, node.clone());
        }
        Ok(())
    }

    fn write_edges(&mut self, edges: &[Edge]) -> Result<()> {
        for edge in edges {
            if !self
                .edges
                .iter()
                .any(|existing| existing.merge_key() == edge.merge_key())
            {
                self.edges.push(*edge);
            }
        }
        Ok(())
    }

    fn get_node(&self, id: NodeId) -> Option<Node> {
        self.nodes.get(&id).cloned()
    }

    fn patch_node_metadata(&mut self, id: NodeId, patch: &Metadata) -> Result<()> {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.metadata.merge(patch.clone());
        }
        Ok(())
    }

    fn delete_node(&mut self, id: NodeId) -> Result<()> {
        self.nodes.remove(&id);
        self.edges.retain(|e| e.from != id && e.to != id);
        Ok(())
    }
}

impl ReadBackend for MemoryBackend {
    fn nodes_in_file(&self, file_id: u32) -> Vec<Node> {
        self.nodes
            .values()
            .filter(|n| n.file_id == file_id)
            .cloned()
            .collect()
    }

    fn nodes_of_type(&self, node_type: NodeType) -> Vec<Node> {
        self.nodes
            .values()
            .filter(|n| n.node_type == node_type)
            .cloned()
            .collect()
    }

    fn outgoing(&self, from: NodeId, label_name: &str) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| e.from == from && e.label.name() == label_name)
            .copied()
            .collect()
    }

    fn incoming(&self, to: NodeId, label_name: &str) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| e.to == to && e.label.name() == label_name)
            .copied()
            .collect()
    }
}
