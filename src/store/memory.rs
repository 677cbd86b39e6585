use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{ChallengeStore, OpContext, TakeOutcome};
use crate::error::StoreError;

/// A `HashMap` behind one mutex. No capacity bound and no expiry: entries stay
/// until redeemed or overwritten. Prefer [`super::MokaChallengeStore`] for servers.
#[derive(Debug, Default)]
pub struct InMemoryChallengeStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding puzzles.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Puzzle currently stored under `key`.
    pub fn value(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl ChallengeStore for InMemoryChallengeStore {
    fn add(&self, ctx: &OpContext, key: &str, value: &str) -> Result<(), StoreError> {
        debug!(key, value, "adding challenge to the store");
        ctx.err()?;
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn get(&self, ctx: &OpContext, key: &str) -> Result<bool, StoreError> {
        debug!(key, "getting challenge from the store");
        ctx.err()?;
        Ok(self.lock()?.contains_key(key))
    }

    fn delete(&self, ctx: &OpContext, key: &str) -> Result<(), StoreError> {
        debug!(key, "deleting challenge from the store");
        ctx.err()?;
        self.lock()?.remove(key);
        Ok(())
    }

    fn take(&self, ctx: &OpContext, key: &str) -> Result<bool, StoreError> {
        debug!(key, "taking challenge from the store");
        ctx.err()?;
        Ok(self.lock()?.remove(key).is_some())
    }

    fn take_if(
        &self,
        ctx: &OpContext,
        key: &str,
        matches: &dyn Fn(&str) -> bool,
    ) -> Result<TakeOutcome, StoreError> {
        debug!(key, "taking matching challenge from the store");
        ctx.err()?;
        let mut entries = self.lock()?;
        let outcome = match entries.get(key) {
            None => TakeOutcome::Missing,
            Some(stored) if matches(stored.as_str()) => TakeOutcome::Taken,
            Some(_) => TakeOutcome::Mismatch,
        };
        if outcome == TakeOutcome::Taken {
            entries.remove(key);
        }
        Ok(outcome)
    }
}
