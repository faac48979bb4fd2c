//! Store configuration (spec §4.5 "Batched-write mode is configurable").

/// Controls per-file write buffering.
#[derive(Clone, Copy, Debug)]
pub struct StoreConfig {
    /// When `false`, every `create_node`/`create_edge` call writes straight
    /// through to the driver; node-before-edge ordering is then the caller's
    /// responsibility within a file.
    pub batched: bool,
    /// A file's buffer is flushed in full once either the node buffer or
    /// the edge buffer reaches this length.
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            batched: true,
            batch_size: 512,
        }
    }
}
