//! A fully wired orchestrator with inspectable collaborators.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use sam_contracts::error::AgentResult;
use sam_core::{
    traits::{MemoryPolicy, ModelBackend},
    Orchestrator,
};
use sam_memory::{InMemoryFactStore, InMemoryShortTermStore};
use sam_policy::TomlMemoryPolicy;
use sam_trace::RecordingTracer;

pub const DEFAULT_POLICY: &str = include_str!("../policies/default.toml");
pub const NO_MEMORY_POLICY: &str = include_str!("../policies/no-memory.toml");

/// The orchestrator plus handles to its stores and tracer.
///
/// The stores are shared with the orchestrator, so anything it writes is
/// visible here after `invoke` returns.
pub struct ReferenceRuntime {
    pub orchestrator: Orchestrator,
    pub short_term: Arc<InMemoryShortTermStore>,
    pub facts: Arc<InMemoryFactStore>,
    pub tracer: Arc<RecordingTracer>,
}

impl ReferenceRuntime {
    /// Wire `backend` with in-memory stores under `policy`.
    ///
    /// The orchestrator settings come from the policy document.
    pub fn new(backend: Arc<dyn ModelBackend>, policy: TomlMemoryPolicy) -> Self {
        let short_term = Arc::new(InMemoryShortTermStore::new().deny_raw_content(true));
        let facts = Arc::new(InMemoryFactStore::new());
        let tracer = Arc::new(RecordingTracer::new());
        let config = policy.orchestrator_config().clone();
        info!(rules = policy.rules().len(), task = %config.model_task, "reference runtime wired");
        let policy: Arc<dyn MemoryPolicy> = Arc::new(policy);

        let orchestrator = Orchestrator::builder()
            .backend(backend)
            .short_term_memory(short_term.clone())
            .long_term_memory(facts.clone())
            .policy(policy)
            .tracer(tracer.clone())
            .config(config)
            .build();

        Self { orchestrator, short_term, facts, tracer }
    }

    /// Wire `backend` under the bundled default policy.
    pub fn with_default_policy(backend: Arc<dyn ModelBackend>) -> AgentResult<Self> {
        Ok(Self::new(backend, TomlMemoryPolicy::from_toml_str(DEFAULT_POLICY)?))
    }

    /// Wire `backend` under the policy file at `path`.
    pub fn from_policy_file(backend: Arc<dyn ModelBackend>, path: &Path) -> AgentResult<Self> {
        Ok(Self::new(backend, TomlMemoryPolicy::from_file(path)?))
    }
}
