//! Scripted model backends for exercising the failure paths.

use std::sync::Arc;

use sam_contracts::{
    error::ErrorType,
    model::{Metadata, ModelRequest, ModelResponse, ModelStatus},
};
use sam_core::{stub::StubModelBackend, traits::ModelBackend};

/// A backend whose every call produces the same kind of outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedBackend {
    /// Recoverable failure reported as `timeout`.
    Timeout,
    /// Recoverable failure reported as `backend_unavailable`.
    Unavailable,
    /// Fatal failure with no `error_type`.
    Untyped,
    /// Success with an empty output.
    Empty,
}

impl ModelBackend for ScriptedBackend {
    fn generate(&self, _request: &ModelRequest) -> ModelResponse {
        let mut metadata = Metadata::new();
        metadata.insert("backend".to_string(), serde_json::json!("scripted"));

        match self {
            ScriptedBackend::Timeout => ModelResponse::failure(
                ModelStatus::RecoverableError,
                Some(ErrorType::Timeout),
                Some(metadata),
            ),
            ScriptedBackend::Unavailable => ModelResponse::failure(
                ModelStatus::RecoverableError,
                Some(ErrorType::BackendUnavailable),
                Some(metadata),
            ),
            ScriptedBackend::Untyped => {
                ModelResponse::failure(ModelStatus::FatalError, None, Some(metadata))
            }
            ScriptedBackend::Empty => ModelResponse::success("", Some(metadata)),
        }
    }
}

/// Names accepted by `backend_by_name`.
pub const BACKEND_NAMES: &[&str] = &["stub", "timeout", "unavailable", "untyped", "empty"];

/// Resolve a backend by its CLI name.
pub fn backend_by_name(name: &str) -> Option<Arc<dyn ModelBackend>> {
    let backend: Arc<dyn ModelBackend> = match name {
        "stub" => Arc::new(StubModelBackend),
        "timeout" => Arc::new(ScriptedBackend::Timeout),
        "unavailable" => Arc::new(ScriptedBackend::Unavailable),
        "untyped" => Arc::new(ScriptedBackend::Untyped),
        "empty" => Arc::new(ScriptedBackend::Empty),
        _ => return None,
    };
    Some(backend)
}
