//! Error taxonomy for the SAM agent graph.
//!
//! Two disjoint families live here:
//!
//! - [`ErrorType`] is the closed set of model/boundary failures. These are
//!   recovered by the error router and surface in a normal response with
//!   `status = "error"`.
//! - [`AgentError`] is the set of contract violations. These are fatal: the
//!   invocation aborts and `Orchestrator::invoke` returns `Err`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed taxonomy of recoverable invocation failures.
///
/// Every response with `status = "error"` carries exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The backend did not answer within its own timeout.
    Timeout,
    /// The backend could not be reached or refused the request.
    BackendUnavailable,
    /// The backend answered, but the output was unusable (e.g. empty).
    InvalidOutput,
}

impl ErrorType {
    /// The wire name of this error type (`"timeout"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Timeout => "timeout",
            ErrorType::BackendUnavailable => "backend_unavailable",
            ErrorType::InvalidOutput => "invalid_output",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal contract violations.
///
/// None of these are produced by a misbehaving model or memory store; they
/// mean the caller or the orchestrator itself broke an invariant.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The state failed schema validation at initialization.
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    /// A node broke a state invariant during execution (wrote a field it
    /// does not own, or the graph failed to make progress).
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    /// A configuration document is missing or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the SAM crates.
pub type AgentResult<T> = Result<T, AgentError>;
