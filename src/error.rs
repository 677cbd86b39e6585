use std::num::ParseIntError;

/// Errors produced while building, decoding, solving or checking a hashcash stamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashcashError {
    #[error("incorrect number of parts: expected {expected}, got {got}")]
    IncorrectPartCount { expected: usize, got: usize },
    #[error("hashcash version is invalid: expected {expected}, got {got}")]
    InvalidVersion { expected: u32, got: u32 },
    #[error("invalid date format")]
    InvalidDateFormat,
    #[error("invalid hashcash date: {0}")]
    InvalidDate(String),
    #[error("invalid {field}: {source}")]
    InvalidNumber {
        field: &'static str,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid difficulty")]
    InvalidDifficulty,
    #[error("invalid salt length")]
    InvalidSaltLength,
    #[error("resource must not contain ':'")]
    InvalidResource,
    #[error("hashcash is empty")]
    EmptyHashcash,
    #[error("hashcash is expired")]
    ExpiredHashcash,
    #[error("incorrect solution")]
    IncorrectSolution,
    #[error("attempt to use future hashcash")]
    AttemptToUseFutureHashcash,
    #[error("counter overflow")]
    CounterOverflow,
    #[error("reading random bytes: {0}")]
    Random(String),
    #[error("solver failed: {0}")]
    SolverFailed(String),
}

impl HashcashError {
    /// Whether the error comes from the freshness model rather than the wire format or the digest.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            HashcashError::ExpiredHashcash | HashcashError::AttemptToUseFutureHashcash
        )
    }
}

/// Failures of a challenge store operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("operation cancelled")]
    Cancelled,
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
    #[error("store lock poisoned")]
    Poisoned,
    #[error("store backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Either half of the challenge key was empty. Never sent to the client as a puzzle.
    #[error("challenge key is empty")]
    ChallengeKeyEmpty,
    #[error("challenge not found")]
    ChallengeNotFound,
    #[error("solution difficulty {got} is below required {required}")]
    InsufficientDifficulty { required: u32, got: u32 },
    #[error("solution resource does not match the requester")]
    ResourceMismatch,
    #[error("solution does not answer the outstanding challenge")]
    ChallengeMismatch,
    #[error("checking solution: {0}")]
    Hashcash(#[from] HashcashError),
    #[error("challenge store: {0}")]
    Store(#[from] StoreError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl GateError {
    /// Internal errors end the request with a server error; all others lead to a fresh puzzle.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            GateError::ChallengeKeyEmpty | GateError::Store(_) | GateError::InvalidConfig(_)
        )
    }
}
