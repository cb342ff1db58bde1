//! The SAM orchestrator: drives one invocation through the fixed graph.
//!
//!   START → router → state_init → DA ─preprocess→ preprocess → DA
//!                                    ─call_model→ memory_read → long_term_memory_read
//!                                                 → model_call ─ok→ result_handling → DA
//!                                                              ─err→ error_router
//!                                    ─format→ memory_write → long_term_memory_write
//!                                             → format_response → END
//!
//! After every node the orchestrator checks that the node wrote only the
//! fields it owns. A violation aborts the invocation with
//! `AgentError::InvariantViolation`; it is never downgraded to a fallback.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, info, warn};

use sam_contracts::{
    config::OrchestratorConfig,
    error::{AgentError, AgentResult},
    response::AgentResponse,
    state::AgentState,
};

use crate::{
    decision,
    graph::{self, Next, Node},
    memory_gate, nodes,
    stub::{DenyAllMemory, DisabledLongTermMemory, DisabledShortTermMemory, NoOpTracer, StubModelBackend},
    traits::{LongTermMemory, MemoryPolicy, ModelBackend, ShortTermMemory, SpanStatus, TraceContext, Tracer},
};

/// Hard bound on node executions per invocation.
///
/// The success path runs twelve nodes; anything near this limit means the
/// topology is broken.
pub const MAX_STEPS: usize = 64;

/// Runs invocations against a fixed set of collaborators.
///
/// Holds no per-invocation data, so one orchestrator can serve concurrent
/// `invoke` calls from many threads.
pub struct Orchestrator {
    backend: Arc<dyn ModelBackend>,
    short_term: Arc<dyn ShortTermMemory>,
    long_term: Arc<dyn LongTermMemory>,
    policy: Arc<dyn MemoryPolicy>,
    tracer: Arc<dyn Tracer>,
    config: OrchestratorConfig,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Process one request end to end.
    ///
    /// Model and memory failures never produce `Err`: they come back as a
    /// normal response with `status = error` or are absorbed silently.
    ///
    /// # Errors
    ///
    /// - `AgentError::InvalidState` if a caller-supplied id is blank
    /// - `AgentError::InvariantViolation` if a node breaks field ownership,
    ///   the decision authority emits no command, or the step limit is hit
    pub fn invoke(
        &self,
        raw_input: impl Into<String>,
        conversation_id: Option<String>,
        trace_id: Option<String>,
    ) -> AgentResult<AgentResponse> {
        let mut state = AgentState::new(raw_input, conversation_id, trace_id);
        let mut node = Node::ENTRY;

        for step in 0..MAX_STEPS {
            let ctx = TraceContext {
                trace_id: state.trace_id().to_string(),
                conversation_id: state.conversation_id().to_string(),
            };

            // ── Step 1: Run the node inside a span ───────────────────────────
            let span = self.tracer.start_span(node.as_str(), &ctx);
            let started = Instant::now();
            let before = state.clone();

            let outcome = self.run_node(node, state, &ctx);
            let duration_ms = elapsed_ms(started);

            let (after, response) = match outcome {
                Ok(pair) => pair,
                Err(e) => {
                    self.tracer.end_span(span, SpanStatus::Error, duration_ms);
                    warn!(node = %node, step, error = %e, "invocation aborted");
                    return Err(e);
                }
            };

            let status = if node == Node::ModelCall
                && !after.model_response.as_ref().is_some_and(|r| r.is_success())
            {
                SpanStatus::Error
            } else {
                SpanStatus::Success
            };
            self.tracer.end_span(span, status, duration_ms);

            // ── Step 2: Ownership guard ──────────────────────────────────────
            check_ownership(node, &before, &after)?;
            state = after;

            debug!(
                trace_id = %state.trace_id(),
                node = %node,
                step,
                duration_ms,
                "node completed"
            );

            // ── Step 3: Terminal node yields the response ────────────────────
            if let Some(response) = response {
                info!(
                    conversation_id = %response.conversation_id,
                    trace_id = %response.trace_id,
                    status = ?response.status,
                    error_type = ?response.error_type,
                    steps = step + 1,
                    "invocation complete"
                );
                return Ok(response);
            }

            // ── Step 4: Transition ───────────────────────────────────────────
            node = match graph::next(node, &state)? {
                Next::Node(n) => n,
                Next::End => {
                    return Err(AgentError::InvariantViolation {
                        reason: format!("'{}' reached END without a response", node),
                    })
                }
            };
        }

        Err(AgentError::InvariantViolation {
            reason: format!("step limit of {} exceeded", MAX_STEPS),
        })
    }

    fn run_node(
        &self,
        node: Node,
        state: AgentState,
        ctx: &TraceContext,
    ) -> AgentResult<(AgentState, Option<AgentResponse>)> {
        let state = match node {
            Node::Router => nodes::router(state),
            Node::StateInit => nodes::state_init(state)?,
            Node::DecisionAuthority => decision::decide(state, self.policy.as_ref()),
            Node::Preprocess => nodes::preprocess(state),

            Node::MemoryRead => {
                let authorized = state.memory_read_authorized;
                let state = memory_gate::memory_read(state, self.short_term.as_ref(), &self.config);
                if authorized {
                    self.event("memory_read_attempted", json!({ "status": state.memory_read_status }), ctx);
                }
                state
            }
            Node::LongTermMemoryRead => {
                let authorized = state.memory_read_authorized;
                let state =
                    memory_gate::long_term_memory_read(state, self.long_term.as_ref(), &self.config);
                if authorized {
                    self.event(
                        "long_term_memory_read_attempted",
                        json!({
                            "status": state.long_term_read_status,
                            "facts": state.long_term_facts.as_ref().map_or(0, Vec::len),
                        }),
                        ctx,
                    );
                }
                state
            }

            Node::ModelCall => {
                self.event("model_call_attempted", json!({ "task": self.config.model_task }), ctx);
                let started = Instant::now();
                let state = nodes::model_call(state, self.backend.as_ref(), &self.config);
                let response = state.model_response.as_ref();
                self.event(
                    "model_call_completed",
                    json!({
                        "status": response.map(|r| r.status),
                        "error_type": response.and_then(|r| r.error_type),
                        "duration_ms": elapsed_ms(started),
                    }),
                    ctx,
                );
                state
            }
            Node::ResultHandling => nodes::result_handling(state),
            Node::ErrorRouter => nodes::error_router(state),

            Node::MemoryWrite => {
                let authorized = state.memory_write_authorized;
                let state = memory_gate::memory_write(state, self.short_term.as_ref(), &self.config);
                if authorized {
                    self.event("memory_write_attempted", json!({ "status": state.memory_write_status }), ctx);
                }
                state
            }
            Node::LongTermMemoryWrite => {
                let authorized = state.memory_write_authorized;
                let state = memory_gate::long_term_memory_write(state, self.long_term.as_ref());
                if authorized {
                    self.event(
                        "long_term_memory_write_attempted",
                        json!({ "status": state.long_term_write_status }),
                        ctx,
                    );
                }
                state
            }

            Node::FormatResponse => {
                let response = nodes::format_response(&state);
                return Ok((state, Some(response)));
            }
        };
        Ok((state, None))
    }

    fn event(&self, name: &str, attributes: serde_json::Value, ctx: &TraceContext) {
        if self.tracer.is_enabled() {
            self.tracer.record_event(name, &attributes, ctx);
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ── Ownership guard ──────────────────────────────────────────────────────────

/// Fail if `node` changed any field it does not own.
///
/// `raw_input` has no owner and may never change.
pub fn check_ownership(node: Node, before: &AgentState, after: &AgentState) -> AgentResult<()> {
    use Node::*;

    let fields: [(&str, bool, &[Node]); 18] = [
        ("raw_input", before.raw_input != after.raw_input, &[]),
        ("conversation_id", before.conversation_id != after.conversation_id, &[StateInit]),
        ("trace_id", before.trace_id != after.trace_id, &[StateInit]),
        ("created_at", before.created_at != after.created_at, &[StateInit]),
        ("input_type", before.input_type != after.input_type, &[Router]),
        ("command", before.command != after.command, &[DecisionAuthority]),
        (
            "memory_read_authorized",
            before.memory_read_authorized != after.memory_read_authorized,
            &[DecisionAuthority],
        ),
        (
            "memory_write_authorized",
            before.memory_write_authorized != after.memory_write_authorized,
            &[DecisionAuthority],
        ),
        ("preprocessing_result", before.preprocessing_result != after.preprocessing_result, &[Preprocess]),
        ("model_response", before.model_response != after.model_response, &[ModelCall]),
        ("model_metadata", before.model_metadata != after.model_metadata, &[ResultHandling]),
        ("final_output", before.final_output != after.final_output, &[ResultHandling, ErrorRouter]),
        ("error_type", before.error_type != after.error_type, &[ErrorRouter]),
        ("memory_read_status", before.memory_read_status != after.memory_read_status, &[MemoryRead]),
        ("memory_read_result", before.memory_read_result != after.memory_read_result, &[MemoryRead]),
        ("memory_write_status", before.memory_write_status != after.memory_write_status, &[MemoryWrite]),
        (
            "long_term_read_status",
            before.long_term_read_status != after.long_term_read_status || before.long_term_facts != after.long_term_facts,
            &[LongTermMemoryRead],
        ),
        (
            "long_term_write_status",
            before.long_term_write_status != after.long_term_write_status,
            &[LongTermMemoryWrite],
        ),
    ];

    for (field, changed, owners) in fields {
        if changed && !owners.contains(&node) {
            warn!(node = %node, field, "field written by non-owner");
            return Err(AgentError::InvariantViolation {
                reason: format!("'{}' written by '{}'", field, node),
            });
        }
    }
    Ok(())
}

// ── Builder ──────────────────────────────────────────────────────────────────

/// Assembles an `Orchestrator`.
///
/// Unset collaborators default to the stub backend, disabled memory, a
/// deny-all policy and a no-op tracer.
#[derive(Default)]
pub struct OrchestratorBuilder {
    backend: Option<Arc<dyn ModelBackend>>,
    short_term: Option<Arc<dyn ShortTermMemory>>,
    long_term: Option<Arc<dyn LongTermMemory>>,
    policy: Option<Arc<dyn MemoryPolicy>>,
    tracer: Option<Arc<dyn Tracer>>,
    config: Option<OrchestratorConfig>,
}

impl OrchestratorBuilder {
    /// Model backend called once per successful preprocess.
    pub fn backend(mut self, backend: Arc<dyn ModelBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Session scratch store.
    pub fn short_term_memory(mut self, store: Arc<dyn ShortTermMemory>) -> Self {
        self.short_term = Some(store);
        self
    }

    /// Append-only fact store.
    pub fn long_term_memory(mut self, store: Arc<dyn LongTermMemory>) -> Self {
        self.long_term = Some(store);
        self
    }

    /// Policy the decision authority consults before setting memory flags.
    pub fn policy(mut self, policy: Arc<dyn MemoryPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Observer for node spans and boundary events.
    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Replace the default `OrchestratorConfig`.
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            backend: self.backend.unwrap_or_else(|| Arc::new(StubModelBackend)),
            short_term: self.short_term.unwrap_or_else(|| Arc::new(DisabledShortTermMemory)),
            long_term: self.long_term.unwrap_or_else(|| Arc::new(DisabledLongTermMemory)),
            policy: self.policy.unwrap_or_else(|| Arc::new(DenyAllMemory)),
            tracer: self.tracer.unwrap_or_else(|| Arc::new(NoOpTracer)),
            config: self.config.unwrap_or_default(),
        }
    }
}
