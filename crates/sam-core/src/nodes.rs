//! The task nodes.
//!
//! Each node takes the state by value and hands it back with only the
//! fields it owns changed. None of them choose the next node, and only the
//! model-call node touches an external system.

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use sam_contracts::{
    config::OrchestratorConfig,
    error::{AgentResult, ErrorType},
    model::{ModelRequest, ModelStatus},
    response::{AgentResponse, ResponseStatus},
    state::{AgentState, InputType},
};

use crate::traits::ModelBackend;

/// Fallback shown when the backend timed out.
pub const FALLBACK_TIMEOUT: &str =
    "The response took too long. Please try again; the model may be warming up.";

/// Fallback shown when the backend could not be reached.
pub const FALLBACK_BACKEND_UNAVAILABLE: &str =
    "Couldn't connect to the AI model. Please try again shortly.";

/// Fallback shown when the backend answered with unusable output.
pub const FALLBACK_INVALID_OUTPUT: &str = "Sorry, something went wrong. Please try again.";

/// Marker produced for audio input until a speech-to-text collaborator exists.
pub const AUDIO_NOT_IMPLEMENTED: &str = "[audio preprocessing not implemented]";

/// Marker produced for image input until a vision collaborator exists.
pub const IMAGE_NOT_IMPLEMENTED: &str = "[image preprocessing not implemented]";

const AUDIO_EXTENSIONS: &[&str] = &[".ogg", ".oga", ".mp3", ".wav", ".m4a", ".opus", ".flac"];
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp"];

// ── Router ───────────────────────────────────────────────────────────────────

/// Classify the input modality. Pure; sets `input_type` only.
pub fn router(mut state: AgentState) -> AgentState {
    state.input_type = Some(classify_input(&state.raw_input));
    state
}

/// Inspect the payload shape.
///
/// `data:audio/…` / `data:image/…` URIs and single-token media references
/// (a path or URL ending in a known extension) are audio or image. Anything
/// else, including the empty string, is text.
pub fn classify_input(raw: &str) -> InputType {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("data:audio/") {
        return InputType::Audio;
    }
    if lower.starts_with("data:image/") {
        return InputType::Image;
    }

    let single_token = !trimmed.is_empty() && !trimmed.contains(char::is_whitespace);
    if single_token {
        // Ignore any query string on URLs.
        let path = lower.split(['?', '#']).next().unwrap_or_default();
        if AUDIO_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return InputType::Audio;
        }
        if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return InputType::Image;
        }
    }

    InputType::Text
}

// ── State initializer ────────────────────────────────────────────────────────

/// Fill in identity fields and validate the schema.
///
/// Caller-supplied ids are echoed unchanged, even if they are invalid; the
/// validation step then rejects them.
///
/// # Errors
///
/// `AgentError::InvalidState` if an identity field is blank or the input is
/// unclassified.
pub fn state_init(mut state: AgentState) -> AgentResult<AgentState> {
    if state.conversation_id.is_none() {
        state.conversation_id = Some(Uuid::new_v4().to_string());
    }
    if state.trace_id.is_none() {
        state.trace_id = Some(Uuid::new_v4().to_string());
    }
    if state.created_at.is_none() {
        state.created_at = Some(Utc::now());
    }

    state.validate()?;
    Ok(state)
}

// ── Preprocessor ─────────────────────────────────────────────────────────────

/// Modality-specific preprocessing. Branches on `input_type` only.
pub fn preprocess(mut state: AgentState) -> AgentState {
    let result = match state.input_type {
        Some(InputType::Audio) => AUDIO_NOT_IMPLEMENTED.to_string(),
        Some(InputType::Image) => IMAGE_NOT_IMPLEMENTED.to_string(),
        Some(InputType::Text) | None => normalize_text(&state.raw_input),
    };
    state.preprocessing_result = Some(result);
    state
}

/// Trim, and collapse every whitespace run to one space.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Model caller ─────────────────────────────────────────────────────────────

/// Build the model request from state and configuration.
///
/// Memory reaches the model only as the advisory `context` string.
pub fn build_request(state: &AgentState, config: &OrchestratorConfig) -> ModelRequest {
    ModelRequest {
        task: config.model_task.clone(),
        prompt: state.preprocessing_result.clone().unwrap_or_default(),
        context: render_context(state, config.context_char_limit),
        constraints: None,
        timeout_s: config.timeout_s,
        trace_id: state.trace_id.clone(),
    }
}

/// Call the backend exactly once and store its raw response.
pub fn model_call(
    mut state: AgentState,
    backend: &dyn ModelBackend,
    config: &OrchestratorConfig,
) -> AgentState {
    let request = build_request(&state, config);
    let response = backend.generate(&request);

    if response.is_success() {
        debug!(trace_id = %state.trace_id(), "model call succeeded");
    } else {
        warn!(
            trace_id = %state.trace_id(),
            status = ?response.status,
            error_type = ?response.error_type,
            "model call failed"
        );
    }

    state.model_response = Some(response);
    state
}

/// Render retrieved memory as a bounded, deterministic context block.
///
/// Returns `None` when nothing was retrieved or the limit leaves nothing.
pub fn render_context(state: &AgentState, char_limit: usize) -> Option<String> {
    let mut lines = Vec::new();

    if let Some(scratch) = &state.memory_read_result {
        lines.push(format!("session: {}", scratch));
    }
    if let Some(facts) = state.long_term_facts.as_ref().filter(|f| !f.is_empty()) {
        lines.push("facts:".to_string());
        for fact in facts {
            lines.push(format!("- {} ({:.2}): {}", fact.fact_type, fact.confidence, fact.content));
        }
    }

    let context: String = lines.join("\n").chars().take(char_limit).collect();
    (!context.is_empty()).then_some(context)
}

// ── Result handler ───────────────────────────────────────────────────────────

/// Accept a non-blank successful output.
///
/// A blank output is left for the error router by not setting
/// `final_output`; the transition table routes on that.
pub fn result_handling(mut state: AgentState) -> AgentState {
    let Some(response) = state.model_response.as_ref().filter(|r| r.is_success()) else {
        return state;
    };

    match response.output.as_deref().filter(|o| !o.trim().is_empty()) {
        Some(output) => {
            state.final_output = Some(output.to_string());
            state.model_metadata = response.metadata.clone();
        }
        None => warn!(trace_id = %state.trace_id(), "model output rejected as empty"),
    }
    state
}

// ── Error router ─────────────────────────────────────────────────────────────

/// Classify the failure and set the fixed fallback.
pub fn error_router(mut state: AgentState) -> AgentState {
    let error_type = classify_failure(&state);
    state.error_type = Some(error_type);
    state.final_output = Some(fallback_for(error_type).to_string());

    warn!(
        conversation_id = %state.conversation_id(),
        trace_id = %state.trace_id(),
        error_type = %error_type,
        "invocation degraded to fallback"
    );
    state
}

/// Map the stored response onto the closed taxonomy.
pub fn classify_failure(state: &AgentState) -> ErrorType {
    match &state.model_response {
        // A success that reached the error path was rejected by the result handler.
        Some(r) if r.status == ModelStatus::Success => ErrorType::InvalidOutput,
        Some(r) => r.error_type.unwrap_or(ErrorType::BackendUnavailable),
        None => ErrorType::BackendUnavailable,
    }
}

pub fn fallback_for(error_type: ErrorType) -> &'static str {
    match error_type {
        ErrorType::Timeout => FALLBACK_TIMEOUT,
        ErrorType::BackendUnavailable => FALLBACK_BACKEND_UNAVAILABLE,
        ErrorType::InvalidOutput => FALLBACK_INVALID_OUTPUT,
    }
}

// ── Response formatter ───────────────────────────────────────────────────────

/// Convert the terminal state into the public response. No decisions.
pub fn format_response(state: &AgentState) -> AgentResponse {
    let status = if state.error_type.is_some() {
        ResponseStatus::Error
    } else {
        ResponseStatus::Success
    };

    AgentResponse {
        conversation_id: state.conversation_id().to_string(),
        trace_id: state.trace_id().to_string(),
        status,
        output: state.final_output.clone(),
        error_type: state.error_type,
        metadata: state.model_metadata.clone().unwrap_or_default(),
    }
}
