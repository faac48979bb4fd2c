//! Node identifier composition (spec §4.2, §6 wire format).
//!
//! A [`NodeId`] packs a 32-bit file id into the upper half and a per-file
//! monotonic sequence number into the lower half of a 64-bit integer. This
//! guarantees uniqueness across files without any cross-worker coordination:
//! each file owns its own sequence counter (see `cpg-translate::Translator`).

use std::fmt;

/// The invalid/zero id. Never assigned to a persisted node.
pub const INVALID: NodeId = NodeId(0);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(i64);

impl NodeId {
    /// Compose an id from a file id and an in-file sequence number.
    pub fn new(file_id: u32, seq: u32) -> NodeId {
        NodeId((u64::from(file_id) << 32 | u64::from(seq)) as i64)
    }

    pub fn file_id(self) -> u32 {
        ((self.0 as u64) >> 32) as u32
    }

    pub fn seq(self) -> u32 {
        (self.0 as u64) as u32
    }

    pub fn is_invalid(self) -> bool {
        self.0 == 0
    }

    pub fn is_valid(self) -> bool {
        !self.is_invalid()
    }

    /// The signed 64-bit wire representation (§6 Node ID wire format).
    pub fn as_i64(self) -> i64 {
        self.0
    }

    pub fn from_i64(raw: i64) -> NodeId {
        NodeId(raw)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        INVALID
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "NodeId(invalid)")
        } else {
            write!(f, "NodeId({}:{})", self.file_id(), self.seq())
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates sequence numbers for a single file, starting at 1 so that
/// `NodeId::new(file_id, 0)` never collides with a real node (seq 0 is only
/// ever produced for `file_id == 0`, which is itself invalid).
pub struct SeqAllocator {
    file_id: u32,
    next: u32,
}

impl SeqAllocator {
    pub fn new(file_id: u32) -> Self {
        SeqAllocator { file_id, next: 1 }
    }

    pub fn alloc(&mut self) -> NodeId {
        let id = NodeId::new(self.file_id, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_and_decomposes() {
        let id = NodeId::new(7, 42);
        assert_eq!(id.file_id(), 7);
        assert_eq!(id.seq(), 42);
        assert!(id.is_valid());
    }

    #[test]
    fn zero_is_invalid() {
        assert!(INVALID.is_invalid());
        assert!(!INVALID.is_valid());
    }

    #[test]
    fn allocator_is_monotonic_and_never_zero() {
        let mut alloc = SeqAllocator::new(3);
        let a = alloc.alloc();
        let b = alloc.alloc();
        assert_ne!(a, b);
        assert!(a.is_valid());
        assert!(b.is_valid());
        assert_eq!(a.file_id(), 3);
        assert_eq!(b.file_id(), 3);
    }

    #[test]
    fn wire_roundtrip_preserves_sign_agnostic_interpretation() {
        let id = NodeId::new(0xFFFF_FFFF, 1);
        let raw = id.as_i64();
        let back = NodeId::from_i64(raw);
        assert_eq!(id, back);
        assert_eq!(back.file_id(), 0xFFFF_FFFF);
    }
}
