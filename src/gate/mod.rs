//! Request admission: issue a puzzle, reject a solution with a fresh puzzle,
//! or admit the request and consume the outstanding puzzle.

mod response;

use std::sync::Arc;

use tracing::{debug, error};

pub use response::{
    GateResponse, HASHCASH_HEADER, STATUS_INTERNAL_SERVER_ERROR, STATUS_OK,
    STATUS_PRECONDITION_REQUIRED,
};

use crate::challenge_key::ChallengeKey;
use crate::config::GateConfig;
use crate::error::GateError;
use crate::hashcash::{self, Hashcash};
use crate::store::{ChallengeStore, OpContext, TakeOutcome};
use crate::time::{SystemTimeProvider, TimeProvider};

/// What the transport layer knows about an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateRequest<'a> {
    pub client_id: &'a str,
    pub resource_id: &'a str,
    /// Value of [`HASHCASH_HEADER`], if the client sent one.
    pub solution: Option<&'a str>,
}

impl<'a> GateRequest<'a> {
    pub fn new(client_id: &'a str, resource_id: &'a str, solution: Option<&'a str>) -> Self {
        Self {
            client_id,
            resource_id,
            solution,
        }
    }

    pub fn key(&self) -> ChallengeKey {
        ChallengeKey::new(self.client_id, self.resource_id)
    }

    /// An empty header counts as no solution.
    pub fn state(&self) -> GateState<'a> {
        match self.solution {
            Some(s) if !s.is_empty() => GateState::SolutionPresented(s),
            _ => GateState::NoSolutionPresented,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState<'a> {
    NoSolutionPresented,
    SolutionPresented(&'a str),
}

/// Result of a request that did not fail internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Continue to the protected operation.
    Admit,
    /// Stop here and hand the client a puzzle. `rejection` explains, for logs only,
    /// why a presented solution was not accepted.
    Challenge {
        puzzle: String,
        rejection: Option<GateError>,
    },
}

pub struct Gate<S: ChallengeStore + ?Sized, T: TimeProvider = SystemTimeProvider> {
    config: GateConfig,
    store: Arc<S>,
    clock: Arc<T>,
}

impl<S: ChallengeStore + ?Sized> Gate<S, SystemTimeProvider> {
    pub fn with_system_clock(config: GateConfig, store: Arc<S>) -> Result<Self, GateError> {
        Self::new(config, store, Arc::new(SystemTimeProvider))
    }
}

impl<S, T> Gate<S, T>
where
    S: ChallengeStore + ?Sized,
    T: TimeProvider,
{
    pub fn new(config: GateConfig, store: Arc<S>, clock: Arc<T>) -> Result<Self, GateError> {
        config.validate()?;
        debug!(?config, "creating proof-of-work gate");
        Ok(Self {
            config,
            store,
            clock,
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create a puzzle bound to the requester, store it under `key` (replacing any
    /// outstanding one) and return its canonical string.
    pub fn issue(&self, ctx: &OpContext, key: &ChallengeKey) -> Result<String, GateError> {
        ensure_valid(key)?;
        let puzzle = Hashcash::new_at(
            self.config.difficulty,
            self.config.salt_length,
            self.config.date_format,
            key.puzzle_resource(),
            self.clock.now(),
        )?
        .encode();
        self.store.add(ctx, &key.to_string(), &puzzle)?;
        Ok(puzzle)
    }

    /// Check `solution` for the puzzle outstanding under `key` and consume it on success.
    ///
    /// The submitted string is decoded and checked on its own. With binding
    /// enforced it must also answer the stored puzzle exactly, and the match and
    /// the removal happen in one store call, so a solution redeems at most one
    /// issued puzzle. Without binding, any fresh solved stamp consumes the entry.
    pub fn redeem(
        &self,
        ctx: &OpContext,
        key: &ChallengeKey,
        solution: &str,
    ) -> Result<(), GateError> {
        ensure_valid(key)?;
        let store_key = key.to_string();
        if !self.store.get(ctx, &store_key)? {
            return Err(GateError::ChallengeNotFound);
        }

        let stamp = hashcash::check_solution(solution, self.clock.now())?;
        let outcome = if self.config.enforce_binding {
            self.check_binding(key, &stamp)?;
            let answers = |stored: &str| {
                stored
                    .parse::<Hashcash>()
                    .is_ok_and(|puzzle| stamp.answers(&puzzle))
            };
            self.store.take_if(ctx, &store_key, &answers)?
        } else if self.store.take(ctx, &store_key)? {
            TakeOutcome::Taken
        } else {
            TakeOutcome::Missing
        };

        match outcome {
            TakeOutcome::Taken => Ok(()),
            // A concurrent redemption consumed the puzzle since `get`.
            TakeOutcome::Missing => Err(GateError::ChallengeNotFound),
            TakeOutcome::Mismatch => Err(GateError::ChallengeMismatch),
        }
    }

    /// Drive one request through the admission state machine.
    ///
    /// `Err` is always an internal error; every client-side failure becomes
    /// [`Admission::Challenge`] with a freshly issued puzzle.
    pub fn handle(&self, ctx: &OpContext, req: &GateRequest<'_>) -> Result<Admission, GateError> {
        let key = req.key();
        ensure_valid(&key)?;

        match req.state() {
            GateState::NoSolutionPresented => {
                let puzzle = self.issue(ctx, &key)?;
                debug!(%key, %puzzle, "issued challenge");
                Ok(Admission::Challenge {
                    puzzle,
                    rejection: None,
                })
            }
            GateState::SolutionPresented(solution) => match self.redeem(ctx, &key, solution) {
                Ok(()) => {
                    debug!(%key, "solution accepted");
                    Ok(Admission::Admit)
                }
                Err(err) if err.is_internal() => Err(err),
                Err(rejection) => {
                    let puzzle = self.issue(ctx, &key)?;
                    debug!(%key, %puzzle, reason = %rejection, "solution rejected, reissued challenge");
                    Ok(Admission::Challenge {
                        puzzle,
                        rejection: Some(rejection),
                    })
                }
            },
        }
    }

    /// [`Gate::handle`] mapped onto a transport response.
    pub fn respond(&self, ctx: &OpContext, req: &GateRequest<'_>) -> GateResponse {
        match self.handle(ctx, req) {
            Ok(Admission::Admit) => GateResponse::admit(),
            Ok(Admission::Challenge { puzzle, rejection }) => {
                GateResponse::challenge(puzzle, rejection.is_some())
            }
            Err(err) => {
                let message = match req.state() {
                    GateState::NoSolutionPresented => response::MSG_ISSUE_FAILED,
                    GateState::SolutionPresented(_) => response::MSG_CHECK_FAILED,
                };
                error!(error = %err, client_id = req.client_id, resource_id = req.resource_id, "{message}");
                GateResponse::internal(message)
            }
        }
    }

    fn check_binding(&self, key: &ChallengeKey, stamp: &Hashcash) -> Result<(), GateError> {
        if stamp.difficulty() < self.config.difficulty {
            return Err(GateError::InsufficientDifficulty {
                required: self.config.difficulty,
                got: stamp.difficulty(),
            });
        }
        if stamp.resource() != key.puzzle_resource() {
            return Err(GateError::ResourceMismatch);
        }
        Ok(())
    }
}

fn ensure_valid(key: &ChallengeKey) -> Result<(), GateError> {
    if !key.is_valid() {
        return Err(GateError::ChallengeKeyEmpty);
    }
    Ok(())
}
