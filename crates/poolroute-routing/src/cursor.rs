//! Shared round-robin cursor
//!
//! A single atomic counter hands out positions to every concurrent dispatch.
//!
//! ## Thread Safety
//!
//! - **Lock-free**: one `fetch_update` per draw, no two draws see the same value
//! - **Overflow safe**: the counter wraps at `usize::MAX`
//! - **Non-exclusive**: a draw does not reserve the endpoint; two callers may
//!   land on the same endpoint after the counter wraps

use std::sync::atomic::{AtomicUsize, Ordering};

/// Infinite, restartable index over a pool of fixed size
#[derive(Debug, Default)]
pub struct RoundRobinCursor {
    counter: AtomicUsize,
}

impl RoundRobinCursor {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }

    /// Start the cursor at an arbitrary position
    pub fn starting_at(position: usize) -> Self {
        Self {
            counter: AtomicUsize::new(position),
        }
    }

    /// Draw the next index in `0..pool_len` and advance by one
    ///
    /// `pool_len` must be non-zero.
    pub fn next_index(&self, pool_len: usize) -> usize {
        debug_assert!(pool_len > 0, "pool length must be non-zero");

        // Use wrapping_add with AcqRel ordering for thread safety
        let position = match self
            .counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |x| {
                Some(x.wrapping_add(1))
            }) {
            Ok(previous) | Err(previous) => previous,
        };
        position % pool_len
    }

    /// Current raw counter value
    pub fn position(&self) -> usize {
        self.counter.load(Ordering::Acquire)
    }
}
