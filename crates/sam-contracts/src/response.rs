//! The externally visible invocation result.

use serde::{Deserialize, Serialize};

use crate::{error::ErrorType, model::Metadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// What `Orchestrator::invoke` returns. Exactly one per call.
///
/// `status` is `Error` if and only if `error_type` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub conversation_id: String,
    pub trace_id: String,
    pub status: ResponseStatus,
    pub output: Option<String>,
    pub error_type: Option<ErrorType>,
    pub metadata: Metadata,
}

impl AgentResponse {
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}
