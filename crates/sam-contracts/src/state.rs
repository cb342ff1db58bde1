//! The per-invocation state record.
//!
//! `AgentState` is the single unit of truth for one call to
//! `Orchestrator::invoke`. Each field has exactly one writer; the
//! orchestrator checks ownership after every node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{AgentError, AgentResult, ErrorType},
    memory::{MemoryFact, MemoryReadStatus, MemoryWriteStatus},
    model::{Metadata, ModelResponse},
};

/// Input modality, set once by the router node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Audio,
    Image,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Audio => "audio",
            InputType::Image => "image",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sole control-flow signal. Only the decision authority writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Preprocess,
    CallModel,
    Format,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Command::Preprocess => "preprocess",
            Command::CallModel => "call_model",
            Command::Format => "format",
        })
    }
}

/// Everything the graph knows about one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    // Identity. Caller may pre-supply the ids; state-init fills the rest.
    pub conversation_id: Option<String>,
    pub trace_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,

    // Input / routing
    pub input_type: Option<InputType>,
    pub raw_input: String,

    // Processing
    pub preprocessing_result: Option<String>,

    // Model
    pub model_response: Option<ModelResponse>,
    pub model_metadata: Option<Metadata>,

    // Output
    pub final_output: Option<String>,
    pub error_type: Option<ErrorType>,

    // Control
    pub command: Option<Command>,
    pub memory_read_authorized: bool,
    pub memory_write_authorized: bool,

    // Memory (advisory only; never read by routing)
    pub memory_read_status: Option<MemoryReadStatus>,
    pub memory_read_result: Option<Value>,
    pub memory_write_status: Option<MemoryWriteStatus>,
    pub long_term_read_status: Option<MemoryReadStatus>,
    pub long_term_facts: Option<Vec<MemoryFact>>,
    pub long_term_write_status: Option<MemoryWriteStatus>,
}

impl AgentState {
    /// A fresh, unclassified state for `raw_input`.
    pub fn new(
        raw_input: impl Into<String>,
        conversation_id: Option<String>,
        trace_id: Option<String>,
    ) -> Self {
        Self {
            conversation_id,
            trace_id,
            created_at: None,
            input_type: None,
            raw_input: raw_input.into(),
            preprocessing_result: None,
            model_response: None,
            model_metadata: None,
            final_output: None,
            error_type: None,
            command: None,
            memory_read_authorized: false,
            memory_write_authorized: false,
            memory_read_status: None,
            memory_read_result: None,
            memory_write_status: None,
            long_term_read_status: None,
            long_term_facts: None,
            long_term_write_status: None,
        }
    }

    /// The conversation id, or `""` before state-init has run.
    pub fn conversation_id(&self) -> &str {
        self.conversation_id.as_deref().unwrap_or_default()
    }

    /// The trace id, or `""` before state-init has run.
    pub fn trace_id(&self) -> &str {
        self.trace_id.as_deref().unwrap_or_default()
    }

    /// Validate the post-initialization schema.
    ///
    /// # Errors
    ///
    /// `AgentError::InvalidState` when any identity field is missing or
    /// blank, or `input_type` has not been classified.
    pub fn validate(&self) -> AgentResult<()> {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map_or(true, |s| s.trim().is_empty())
        }

        if blank(&self.conversation_id) {
            return Err(AgentError::InvalidState {
                reason: "conversation_id must not be empty".to_string(),
            });
        }
        if blank(&self.trace_id) {
            return Err(AgentError::InvalidState {
                reason: "trace_id must not be empty".to_string(),
            });
        }
        if self.created_at.is_none() {
            return Err(AgentError::InvalidState {
                reason: "created_at must be set".to_string(),
            });
        }
        if self.input_type.is_none() {
            return Err(AgentError::InvalidState {
                reason: "input_type must be one of text, audio, image".to_string(),
            });
        }
        Ok(())
    }
}
