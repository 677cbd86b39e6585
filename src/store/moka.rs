use std::time::Duration;

use moka::ops::compute::{CompResult, Op};
use moka::sync::Cache;
use tracing::debug;

use super::{ChallengeStore, OpContext, TakeOutcome};
use crate::error::StoreError;

/// Bounded in-memory store backed by `moka::sync::Cache`.
///
/// Entries are evicted once capacity is reached or after `time_to_live`, which
/// bounds memory held by clients that request puzzles and never come back.
#[derive(Debug, Clone)]
pub struct MokaChallengeStore {
    inner: Cache<String, String>,
}

impl MokaChallengeStore {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    pub fn with_ttl(max_capacity: u64, time_to_live: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(time_to_live)
                .build(),
        }
    }

    /// Puzzle currently stored under `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    /// Number of outstanding puzzles, after applying pending evictions.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChallengeStore for MokaChallengeStore {
    fn add(&self, ctx: &OpContext, key: &str, value: &str) -> Result<(), StoreError> {
        debug!(key, value, "adding challenge to the store");
        ctx.err()?;
        self.inner.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn get(&self, ctx: &OpContext, key: &str) -> Result<bool, StoreError> {
        debug!(key, "getting challenge from the store");
        ctx.err()?;
        Ok(self.inner.contains_key(key))
    }

    fn delete(&self, ctx: &OpContext, key: &str) -> Result<(), StoreError> {
        debug!(key, "deleting challenge from the store");
        ctx.err()?;
        self.inner.invalidate(key);
        Ok(())
    }

    fn take(&self, ctx: &OpContext, key: &str) -> Result<bool, StoreError> {
        debug!(key, "taking challenge from the store");
        Ok(self.take_if(ctx, key, &|_| true)? == TakeOutcome::Taken)
    }

    fn take_if(
        &self,
        ctx: &OpContext,
        key: &str,
        matches: &dyn Fn(&str) -> bool,
    ) -> Result<TakeOutcome, StoreError> {
        debug!(key, "taking matching challenge from the store");
        ctx.err()?;
        // Compute calls on one key run serially; `take` goes through here too.
        let result = self.inner.entry_by_ref(key).and_compute_with(|entry| match entry {
            Some(e) if matches(e.value().as_str()) => Op::Remove,
            _ => Op::Nop,
        });
        Ok(match result {
            CompResult::Removed(_) => TakeOutcome::Taken,
            CompResult::Unchanged(_) => TakeOutcome::Mismatch,
            _ => TakeOutcome::Missing,
        })
    }
}
