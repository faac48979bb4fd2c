//! Cancellation handles (spec §5): every public operation threads one of
//! these through so long-running flushes and traversals can be aborted.

use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("cancelled at {0}")]
pub struct CancellationError(pub &'static str);

pub trait CancellationFlag {
    fn check(&self, at: &'static str) -> Result<(), CancellationError>;
}

/// A flag that never fires. Used in tests and single-shot CLI invocations
/// where there is nothing to cancel against.
pub struct NeverCancel;

impl CancellationFlag for NeverCancel {
    fn check(&self, _at: &'static str) -> Result<(), CancellationError> {
        Ok(())
    }
}

/// An atomic-bool-backed flag a caller can flip from another thread.
pub struct AtomicCancellationFlag(std::sync::atomic::AtomicBool);

impl AtomicCancellationFlag {
    pub fn new() -> Self {
        AtomicCancellationFlag(std::sync::atomic::AtomicBool::new(false))
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Default for AtomicCancellationFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationFlag for AtomicCancellationFlag {
    fn check(&self, at: &'static str) -> Result<(), CancellationError> {
        if self.0.load(std::sync::atomic::Ordering::SeqCst) {
            Err(CancellationError(at))
        } else {
            Ok(())
        }
    }
}
