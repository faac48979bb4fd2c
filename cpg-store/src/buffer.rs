//! Per-file write buffers (spec §4.5, §5).
//!
//! The top-level `file_id -> buffers` map is guarded by a single mutex held
//! only long enough to look up or install a buffer pointer. Once a worker
//! has its file's [`FileBuffers`], it owns that buffer exclusively for the
//! life of the file (spec §5) — appends and batch-size checks never touch
//! the map lock again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cpg_core::{Edge, Node};

#[derive(Default)]
pub struct FileBuffers {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl FileBuffers {
    pub fn is_over(&self, batch_size: usize) -> bool {
        self.nodes.len() >= batch_size || self.edges.len() >= batch_size
    }

    pub fn take(&mut self) -> FileBuffers {
        FileBuffers {
            nodes: std::mem::take(&mut self.nodes),
            edges: std::mem::take(&mut self.edges),
        }
    }
}

/// The coarse map-level lock described in spec §4.5/§5. `Arc<Mutex<_>>` per
/// file lets a worker drop the map lock immediately after lookup and then
/// mutate its own buffer without contending with other files' workers.
#[derive(Default)]
pub struct BufferTable {
    files: Mutex<HashMap<u32, Arc<Mutex<FileBuffers>>>>,
}

impl BufferTable {
    pub fn new() -> Self {
        BufferTable::default()
    }

    pub fn begin(&self, file_id: u32) {
        let mut files = self.files.lock().expect("buffer table poisoned");
        files.entry(file_id).or_insert_with(|| Arc::new(Mutex::new(FileBuffers::default())));
    }

    pub fn get(&self, file_id: u32) -> Option<Arc<Mutex<FileBuffers>>> {
        let files = self.files.lock().expect("buffer table poisoned");
        files.get(&file_id).cloned()
    }

    pub fn remove(&self, file_id: u32) -> Option<Arc<Mutex<FileBuffers>>> {
        let mut files = self.files.lock().expect("buffer table poisoned");
        files.remove(&file_id)
    }
}
