use serde_json::json;

/// Header carrying a puzzle to the client and a solution back to the server.
pub const HASHCASH_HEADER: &str = "X-Hashcash";

pub const STATUS_OK: u16 = 200;
pub const STATUS_PRECONDITION_REQUIRED: u16 = 428;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

pub(crate) const MSG_REQUIRED: &str = "proof-of-work requirements not met";
pub(crate) const MSG_INVALID: &str = "proof-of-work requirements not met: solution is invalid";
pub(crate) const MSG_ISSUE_FAILED: &str = "failed to get new challenge";
pub(crate) const MSG_CHECK_FAILED: &str = "failed to check solution";

/// What the transport layer should do with a request after the gate has seen it.
///
/// The reason a solution was rejected is logged, never sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateResponse {
    pub status: u16,
    /// Puzzle to attach under [`HASHCASH_HEADER`].
    pub puzzle: Option<String>,
    pub message: Option<&'static str>,
}

impl GateResponse {
    pub fn admit() -> Self {
        Self {
            status: STATUS_OK,
            puzzle: None,
            message: None,
        }
    }

    pub fn challenge(puzzle: String, after_rejection: bool) -> Self {
        Self {
            status: STATUS_PRECONDITION_REQUIRED,
            puzzle: Some(puzzle),
            message: Some(if after_rejection {
                MSG_INVALID
            } else {
                MSG_REQUIRED
            }),
        }
    }

    pub fn internal(message: &'static str) -> Self {
        Self {
            status: STATUS_INTERNAL_SERVER_ERROR,
            puzzle: None,
            message: Some(message),
        }
    }

    /// Whether the request may continue to the protected operation.
    pub fn is_admitted(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn header(&self) -> Option<(&'static str, &str)> {
        self.puzzle.as_deref().map(|p| (HASHCASH_HEADER, p))
    }

    /// JSON error body for aborted requests.
    pub fn body(&self) -> Option<String> {
        self.message.map(|m| json!({ "error": m }).to_string())
    }
}
