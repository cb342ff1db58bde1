//! # sam-contracts
//!
//! Shared types for the SAM agent graph: the per-invocation `AgentState`,
//! the model and memory boundary contracts, the response object and the
//! error taxonomy.
//!
//! No orchestration logic lives in this crate: only data definitions,
//! schema validation and error types.

pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod policy;
pub mod response;
pub mod state;

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use config::OrchestratorConfig;
    use error::{AgentError, ErrorType};
    use memory::{MemoryFact, MemoryReadStatus};
    use model::{ModelResponse, ModelStatus};
    use response::{AgentResponse, ResponseStatus};
    use state::{AgentState, Command, InputType};

    fn initialized_state() -> AgentState {
        let mut state = AgentState::new("hi", Some("conv-1".to_string()), Some("trace-1".to_string()));
        state.created_at = Some(Utc::now());
        state.input_type = Some(InputType::Text);
        state
    }

    // ── AgentState::validate ─────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_initialized_state() {
        assert!(initialized_state().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_conversation_id() {
        let mut state = initialized_state();
        state.conversation_id = Some("   ".to_string());

        match state.validate() {
            Err(AgentError::InvalidState { reason }) => assert!(reason.contains("conversation_id")),
            other => panic!("expected InvalidState, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_missing_trace_id() {
        let mut state = initialized_state();
        state.trace_id = None;

        match state.validate() {
            Err(AgentError::InvalidState { reason }) => assert!(reason.contains("trace_id")),
            other => panic!("expected InvalidState, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_unclassified_input() {
        let mut state = initialized_state();
        state.input_type = None;

        match state.validate() {
            Err(AgentError::InvalidState { reason }) => assert!(reason.contains("input_type")),
            other => panic!("expected InvalidState, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_raw_input_is_not_a_schema_violation() {
        let mut state = initialized_state();
        state.raw_input = String::new();
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_new_state_starts_unauthorized_and_without_command() {
        let state = AgentState::new("x", None, None);
        assert_eq!(state.command, None);
        assert!(!state.memory_read_authorized);
        assert!(!state.memory_write_authorized);
        assert_eq!(state.conversation_id(), "");
    }

    // ── Wire names ───────────────────────────────────────────────────────────

    #[test]
    fn test_enums_serialize_snake_case() {
        assert_eq!(serde_json::to_value(ErrorType::BackendUnavailable).unwrap(), json!("backend_unavailable"));
        assert_eq!(serde_json::to_value(ModelStatus::RecoverableError).unwrap(), json!("recoverable_error"));
        assert_eq!(serde_json::to_value(Command::CallModel).unwrap(), json!("call_model"));
        assert_eq!(serde_json::to_value(MemoryReadStatus::NotFound).unwrap(), json!("not_found"));
        assert_eq!(serde_json::to_value(InputType::Image).unwrap(), json!("image"));
    }

    #[test]
    fn test_error_type_display_matches_wire_name() {
        for e in [ErrorType::Timeout, ErrorType::BackendUnavailable, ErrorType::InvalidOutput] {
            assert_eq!(serde_json::to_value(e).unwrap(), json!(e.to_string()));
        }
    }

    #[test]
    fn test_response_serializes_null_error_type_on_success() {
        let response = AgentResponse {
            conversation_id: "c".to_string(),
            trace_id: "t".to_string(),
            status: ResponseStatus::Success,
            output: Some("ok".to_string()),
            error_type: None,
            metadata: Default::default(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], json!("success"));
        assert!(value["error_type"].is_null());
    }

    #[test]
    fn test_model_response_constructors() {
        let ok = ModelResponse::success("text", None);
        assert!(ok.is_success());
        assert_eq!(ok.output.as_deref(), Some("text"));

        let failed = ModelResponse::failure(ModelStatus::FatalError, Some(ErrorType::Timeout), None);
        assert!(!failed.is_success());
        assert_eq!(failed.output, None);
    }

    #[test]
    fn test_memory_fact_new_defaults() {
        let fact = MemoryFact::new("preference", json!({ "tone": "brief" }), "user-1");
        assert_eq!(fact.confidence, 1.0);
        assert_eq!(fact.source, "conversation");
        assert!(fact.fact_id.is_none());
        assert!(fact.created_at.is_none());
    }

    // ── OrchestratorConfig ───────────────────────────────────────────────────

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let cfg: OrchestratorConfig = serde_json::from_value(json!({ "fact_limit": 3 })).unwrap();
        assert_eq!(cfg.fact_limit, 3);
        assert_eq!(cfg.model_task, "respond");
        assert_eq!(cfg.memory_key, "conversation_context");
    }

    // ── AgentError display messages ──────────────────────────────────────────

    #[test]
    fn test_error_display_messages() {
        let err = AgentError::InvalidState { reason: "trace_id must not be empty".to_string() };
        assert!(err.to_string().contains("invalid state"));

        let err = AgentError::InvariantViolation { reason: "command written by router".to_string() };
        assert!(err.to_string().contains("invariant violation"));
        assert!(err.to_string().contains("router"));

        let err = AgentError::ConfigError { reason: "bad toml".to_string() };
        assert!(err.to_string().contains("configuration error"));
    }
}
