//! Work distribution cursor.
//!
//! A single shared monotonic counter handing out unique indices into the
//! candidate list. This is the harness's sole concurrency-control primitive:
//! everything else the workers read is immutable. The lock is held only for
//! the combined read-then-increment, so contention is negligible next to the
//! external-process latency that dominates each claim.

use parking_lot::Mutex;

/// Hands out each index in `[0, limit)` to exactly one caller.
#[derive(Debug)]
pub struct WorkCursor {
    next: Mutex<usize>,
    limit: usize,
}

impl WorkCursor {
    /// Cursor over the index range `[0, limit)`.
    pub fn new(limit: usize) -> Self {
        WorkCursor {
            next: Mutex::new(0),
            limit,
        }
    }

    /// Claim the next unclaimed index, or `None` once the range is exhausted.
    ///
    /// Atomic with respect to all claimants: no index is ever handed out
    /// twice, and no index in range is skipped.
    pub fn claim_next(&self) -> Option<usize> {
        let mut next = self.next.lock();
        if *next >= self.limit {
            return None;
        }
        let claimed = *next;
        *next += 1;
        Some(claimed)
    }
}
