//! Orchestrator settings.
//!
//! Deserialized from the `[orchestrator]` table of a policy document (see
//! `sam-policy`); every field has a default so an empty table is valid.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// `task` field of every model request.
    pub model_task: String,
    /// Timeout hint passed to the backend. `None` leaves it to the backend.
    pub timeout_s: Option<u64>,
    /// Short-term memory key read and written by the memory nodes.
    pub memory_key: String,
    /// Maximum number of long-term facts retrieved per invocation.
    pub fact_limit: usize,
    /// Upper bound on the rendered memory context, in characters.
    pub context_char_limit: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model_task: "respond".to_string(),
            timeout_s: Some(30),
            memory_key: "conversation_context".to_string(),
            fact_limit: 10,
            context_char_limit: 2048,
        }
    }
}
