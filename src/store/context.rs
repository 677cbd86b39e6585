use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::StoreError;
use crate::stream::StopFlag;

/// Cancellation and deadline carried into every store operation.
///
/// Clones share the same cancellation flag, so cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: Arc<StopFlag>,
    deadline: Option<Instant>,
}

impl OpContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancel: Arc::new(StopFlag::new()),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.cancel.force_stop();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `Ok` while the operation may proceed.
    pub fn err(&self) -> Result<(), StoreError> {
        if self.cancel.should_stop() {
            return Err(StoreError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(StoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
