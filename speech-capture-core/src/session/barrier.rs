use std::sync::atomic::{AtomicUsize, Ordering};

use crate::models::error::CaptureError;

/// Counting completion barrier.
///
/// Initialized with the number of parties; each party calls [`arrive`]
/// exactly once. The call that brings the count to zero — and only that
/// call — observes `true`, so the release action downstream runs exactly
/// once regardless of arrival order or thread.
///
/// An arrival past zero is rejected with [`CaptureError::DuplicateCompletion`]
/// instead of corrupting the count.
///
/// [`arrive`]: CompletionBarrier::arrive
#[derive(Debug)]
pub struct CompletionBarrier {
    pending: AtomicUsize,
}

impl CompletionBarrier {
    pub fn new(parties: usize) -> Self {
        Self {
            pending: AtomicUsize::new(parties),
        }
    }

    /// Number of parties still outstanding.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Record one arrival. Returns `Ok(true)` iff this was the final one.
    pub fn arrive(&self) -> Result<bool, CaptureError> {
        let previous = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| CaptureError::DuplicateCompletion)?;
        Ok(previous == 1)
    }
}
