//! Model boundary request and response types.
//!
//! The core talks to a generative model only through these two values. The
//! response carries a closed status enum so failure is data, not a panic or
//! an `Err`.

use serde::{Deserialize, Serialize};

use crate::error::ErrorType;

/// Free-form, deterministic-order metadata attached to model responses.
///
/// `serde_json::Map` is ordered by key, so serialization is stable across runs.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Outcome class reported by a model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Success,
    RecoverableError,
    FatalError,
}

/// Everything a backend receives for one generation.
///
/// Built by the model-call node from state fields and configuration only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    /// What the model is asked to do (e.g. "respond").
    pub task: String,
    /// The preprocessed user input.
    pub prompt: String,
    /// Advisory context rendered from memory, if any was retrieved.
    pub context: Option<String>,
    /// Backend-specific generation constraints.
    pub constraints: Option<Metadata>,
    /// Timeout hint. Enforcement belongs to the backend.
    pub timeout_s: Option<u64>,
    /// Trace identity, threaded explicitly.
    pub trace_id: Option<String>,
}

/// The raw backend answer, stored verbatim in `AgentState::model_response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub status: ModelStatus,
    pub output: Option<String>,
    pub error_type: Option<ErrorType>,
    pub metadata: Option<Metadata>,
}

impl ModelResponse {
    /// A successful response carrying `output`.
    pub fn success(output: impl Into<String>, metadata: Option<Metadata>) -> Self {
        Self {
            status: ModelStatus::Success,
            output: Some(output.into()),
            error_type: None,
            metadata,
        }
    }

    /// A failed response of the given status and type.
    pub fn failure(status: ModelStatus, error_type: Option<ErrorType>, metadata: Option<Metadata>) -> Self {
        Self {
            status,
            output: None,
            error_type,
            metadata,
        }
    }

    /// True when the backend reported success.
    pub fn is_success(&self) -> bool {
        self.status == ModelStatus::Success
    }
}
