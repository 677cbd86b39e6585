//! Shared atomics for handing out counters to solver workers and signalling stop.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Atomically distributed counters for parallel solving.
///
/// Every counter from `start` through `u64::MAX` is handed out exactly once.
#[derive(Debug)]
pub struct NonceSource {
    next: AtomicU64,
    last_taken: AtomicBool,
}

impl NonceSource {
    pub const fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
            last_taken: AtomicBool::new(false),
        }
    }

    /// Reserve the next counter, or `None` once the counter space is exhausted.
    #[inline]
    pub fn fetch(&self) -> Option<u64> {
        match self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
        {
            Ok(n) => Some(n),
            // `next` is parked at u64::MAX; one caller gets it.
            Err(_) if !self.last_taken.swap(true, Ordering::AcqRel) => Some(u64::MAX),
            Err(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct StopFlag {
    stop: AtomicBool,
}

impl StopFlag {
    pub const fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn force_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}
