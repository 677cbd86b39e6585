//! Storage of outstanding puzzles, one per challenge key.
//!
//! The gate only depends on [`ChallengeStore`]; backends are interchangeable.
//! [`MokaChallengeStore`] is the default. [`InMemoryChallengeStore`] is a plain
//! locked map, handy in tests and as a reference for new backends.
//! Every operation first checks its [`OpContext`] so that a cancelled or
//! timed-out request fails instead of silently mutating the store.

mod context;
mod memory;
mod moka;

pub use self::moka::MokaChallengeStore;
pub use context::OpContext;
pub use memory::InMemoryChallengeStore;

use crate::error::StoreError;

/// Result of [`ChallengeStore::take_if`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeOutcome {
    /// The entry matched and was removed.
    Taken,
    /// Nothing is stored under the key.
    Missing,
    /// An entry exists but did not match; it was left in place.
    Mismatch,
}

/// Store of currently outstanding puzzles, keyed by the canonical challenge key string.
pub trait ChallengeStore: Send + Sync {
    /// Insert or overwrite the puzzle outstanding for `key`.
    fn add(&self, ctx: &OpContext, key: &str, value: &str) -> Result<(), StoreError>;

    /// Whether a puzzle is outstanding for `key`.
    fn get(&self, ctx: &OpContext, key: &str) -> Result<bool, StoreError>;

    /// Remove the puzzle for `key`, if any.
    fn delete(&self, ctx: &OpContext, key: &str) -> Result<(), StoreError>;

    /// Remove the puzzle for `key` and report whether one was present, atomically.
    ///
    /// Of several concurrent callers for the same key at most one observes `true`.
    fn take(&self, ctx: &OpContext, key: &str) -> Result<bool, StoreError>;

    /// Remove the puzzle for `key` only if `matches` accepts the stored value.
    ///
    /// The lookup, the predicate and the removal happen as one step, so a
    /// concurrent `add` or `take` for the same key cannot interleave.
    fn take_if(
        &self,
        ctx: &OpContext,
        key: &str,
        matches: &dyn Fn(&str) -> bool,
    ) -> Result<TakeOutcome, StoreError>;
}

impl<S: ChallengeStore + ?Sized> ChallengeStore for std::sync::Arc<S> {
    fn add(&self, ctx: &OpContext, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).add(ctx, key, value)
    }

    fn get(&self, ctx: &OpContext, key: &str) -> Result<bool, StoreError> {
        (**self).get(ctx, key)
    }

    fn delete(&self, ctx: &OpContext, key: &str) -> Result<(), StoreError> {
        (**self).delete(ctx, key)
    }

    fn take(&self, ctx: &OpContext, key: &str) -> Result<bool, StoreError> {
        (**self).take(ctx, key)
    }

    fn take_if(
        &self,
        ctx: &OpContext,
        key: &str,
        matches: &dyn Fn(&str) -> bool,
    ) -> Result<TakeOutcome, StoreError> {
        (**self).take_if(ctx, key, matches)
    }
}
