//! [`GraphStore`] layers per-file write buffering (spec §4.5) on top of any
//! [`Backend`]. Flushing always writes nodes before edges — the invariant
//! that makes an edge's endpoints visible before the edge itself.

use cpg_core::{CpgError, Edge, GraphSink, Metadata, Node, NodeId, Result};

use crate::backend::{Backend, ReadBackend};
use crate::buffer::{BufferTable, FileBuffers};
use crate::config::StoreConfig;
use crate::read_model::GraphReadModel;

pub struct GraphStore<B: Backend> {
    backend: B,
    buffers: BufferTable,
    config: StoreConfig,
}

impl<B: Backend> GraphStore<B> {
    pub fn new(backend: B, config: StoreConfig) -> Self {
        GraphStore {
            backend,
            buffers: BufferTable::new(),
            config,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn write(&mut self, buffers: FileBuffers) -> Result<()> {
        self.backend.write_nodes(&buffers.nodes)?;
        self.backend.write_edges(&buffers.edges)?;
        Ok(())
    }

    fn flush_file_if_open(&mut self, file_id: u32) -> Result<()> {
        if let Some(buf) = self.buffers.get(file_id) {
            let taken = {
                let mut guard = buf.lock().expect("file buffer poisoned");
                guard.take()
            };
            if !taken.nodes.is_empty() || !taken.edges.is_empty() {
                self.write(taken)?;
            }
        }
        Ok(())
    }
}

impl<B: Backend> GraphSink for GraphStore<B> {
    fn begin_file(&mut self, file_id: u32) {
        if self.config.batched {
            self.buffers.begin(file_id);
        }
    }

    fn create_node(&mut self, node: Node) -> Result<()> {
        if !self.config.batched {
            return self.backend.write_nodes(std::slice::from_ref(&node));
        }
        let file_id = node.file_id;
        let buf = self
            .buffers
            .get(file_id)
            .ok_or_else(|| CpgError::WriteConflict(node.id))?;
        let over = {
            let mut guard = buf.lock().expect("file buffer poisoned");
            guard.nodes.push(node);
            guard.is_over(self.config.batch_size)
        };
        if over {
            self.flush_file_if_open(file_id)?;
        }
        Ok(())
    }

    fn create_edge(&mut self, edge: Edge) -> Result<()> {
        if !self.config.batched {
            return self.backend.write_edges(std::slice::from_ref(&edge));
        }
        let file_id = edge.file_id;
        let buf = self
            .buffers
            .get(file_id)
            .ok_or_else(|| CpgError::WriteConflict(edge.from))?;
        let over = {
            let mut guard = buf.lock().expect("file buffer poisoned");
            guard.edges.push(edge);
            guard.is_over(self.config.batch_size)
        };
        if over {
            self.flush_file_if_open(file_id)?;
        }
        Ok(())
    }

    fn update_node_metadata(&mut self, id: NodeId, patch: Metadata) -> Result<()> {
        if self.config.batched {
            if let Some(buf) = self.buffers.get(id.file_id()) {
                let mut guard = buf.lock().expect("file buffer poisoned");
                if let Some(node) = guard.nodes.iter_mut().find(|n| n.id == id) {
                    node.metadata.merge(patch);
                    return Ok(());
                }
            }
        }
        self.backend.patch_node_metadata(id, &patch)
    }

    fn delete_node(&mut self, id: NodeId) -> Result<()> {
        if self.config.batched {
            if let Some(buf) = self.buffers.get(id.file_id()) {
                let mut guard = buf.lock().expect("file buffer poisoned");
                guard.nodes.retain(|n| n.id != id);
                guard.edges.retain(|e| e.from != id && e.to != id);
            }
        }
        self.backend.delete_node(id)
    }

    fn read_node(&self, id: NodeId) -> Option<Node> {
        if self.config.batched {
            if let Some(buf) = self.buffers.get(id.file_id()) {
                let guard = buf.lock().expect("file buffer poisoned");
                if let Some(node) = guard.nodes.iter().find(|n| n.id == id) {
                    return Some(node.clone());
                }
            }
        }
        self.backend.get_node(id)
    }

    fn end_file(&mut self, file_id: u32) -> Result<()> {
        if !self.config.batched {
            return Ok(());
        }
        self.flush_file_if_open(file_id)?;
        self.buffers.remove(file_id);
        Ok(())
    }
}

impl<B: ReadBackend> GraphReadModel for GraphStore<B> {
    fn node(&self, id: NodeId) -> Option<Node> {
        GraphSink::read_node(self, id)
    }

    fn nodes_in_file(&self, file_id: u32) -> Vec<Node> {
        self.backend.nodes_in_file(file_id)
    }

    fn nodes_of_type(&self, node_type: cpg_core::NodeType) -> Vec<Node> {
        self.backend.nodes_of_type(node_type)
    }

    fn outgoing(&self, from: NodeId, label_name: &str) -> Vec<Edge> {
        self.backend.outgoing(from, label_name)
    }

    fn incoming(&self, to: NodeId, label_name: &str) -> Vec<Edge> {
        self.backend.incoming(to, label_name)
    }
}
