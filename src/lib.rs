//! Hashcash proof-of-work gate.
//!
//! A server issues a [`Hashcash`] puzzle bound to the requesting client,
//! remembers it in a [`ChallengeStore`] under a [`ChallengeKey`], and admits a
//! retried request only once a fresh, solved stamp is presented. Each puzzle can
//! be redeemed at most once.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hashgate::{client, Admission, Gate, GateConfig, GateRequest, MokaChallengeStore, OpContext};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gate = Gate::with_system_clock(GateConfig::default(), Arc::new(MokaChallengeStore::new(10_000)))?;
//! let ctx = OpContext::background();
//!
//! let first = gate.handle(&ctx, &GateRequest::new("203.0.113.7", "GET:/quote", None))?;
//! if let Admission::Challenge { puzzle, .. } = first {
//!     let solution = client::solve_challenge(&puzzle)?;
//!     let retry = GateRequest::new("203.0.113.7", "GET:/quote", Some(&solution));
//!     assert_eq!(gate.handle(&ctx, &retry)?, Admission::Admit);
//! }
//! # Ok(())
//! # }
//! ```

pub mod challenge_key;
pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod hashcash;
pub mod logging;
pub mod store;
pub mod stream;
pub mod time;

pub use challenge_key::ChallengeKey;
pub use config::{Config, GateConfig, GateConfigBuilder, LoggingConfig};
pub use error::{GateError, HashcashError, StoreError};
pub use gate::{Admission, Gate, GateRequest, GateResponse, GateState, HASHCASH_HEADER};
pub use hashcash::{check_solution, DateFormat, Hashcash};
pub use logging::{init_from_config, init_logging, LogFormat};
pub use store::{
    ChallengeStore, InMemoryChallengeStore, MokaChallengeStore, OpContext, TakeOutcome,
};
pub use time::{FixedTimeProvider, SystemTimeProvider, TimeProvider};
