//! Boundary traits for the SAM agent graph.
//!
//! Every collaborator the orchestrator consumes is behind one of these:
//!
//! - `ModelBackend`   : the single generative-model capability
//! - `ShortTermMemory`: session scratch, read/write
//! - `LongTermMemory` : append-only facts, write/retrieve
//! - `MemoryPolicy`   : consulted by the decision authority only
//! - `Tracer`         : passive observation of node execution
//!
//! None of the boundary methods return `Result`. Failure is a status value
//! in the response, so no collaborator can abort an invocation.

use sam_contracts::{
    memory::{
        FactQuery, FactQueryResponse, FactWriteRequest, FactWriteResponse, MemoryReadRequest,
        MemoryReadResponse, MemoryWriteRequest, MemoryWriteResponse,
    },
    model::{ModelRequest, ModelResponse},
    policy::{MemoryAccessContext, MemoryVerdict},
};

/// A generative model, polymorphic over provider.
///
/// Called exactly once per invocation by the model-call node. The core never
/// retries or wraps it; timeouts are the backend's responsibility.
pub trait ModelBackend: Send + Sync {
    fn generate(&self, request: &ModelRequest) -> ModelResponse;
}

/// Session-scoped scratch memory.
///
/// Implementations must return `Unauthorized` for `authorized = false`
/// requests and leave stored data untouched.
pub trait ShortTermMemory: Send + Sync {
    fn read(&self, request: &MemoryReadRequest) -> MemoryReadResponse;

    fn write(&self, request: &MemoryWriteRequest) -> MemoryWriteResponse;
}

/// Append-only long-term fact storage.
///
/// No update or delete operation exists.
pub trait LongTermMemory: Send + Sync {
    /// Append `request.fact`, assigning `fact_id` and `created_at`.
    fn write_fact(&self, request: FactWriteRequest) -> FactWriteResponse;

    /// Matching facts, oldest first, at most `query.limit`.
    fn retrieve_facts(&self, query: &FactQuery) -> FactQueryResponse;
}

/// Decides whether a memory node-pair may run for the current input.
///
/// Must be deterministic: the decision authority is a pure function of state
/// and this policy.
pub trait MemoryPolicy: Send + Sync {
    fn evaluate(&self, ctx: &MemoryAccessContext) -> MemoryVerdict;
}

/// Identity attached to every span and event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub conversation_id: String,
}

/// Opaque handle returned by `Tracer::start_span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatus {
    Success,
    Error,
}

/// Passive observer of graph execution.
///
/// Receives metadata only (node names, statuses, durations, ids), never
/// prompts or outputs. It cannot influence control flow: every method
/// returns nothing the orchestrator reads back except the span handle.
pub trait Tracer: Send + Sync {
    fn start_span(&self, name: &str, ctx: &TraceContext) -> Option<SpanId>;

    fn end_span(&self, span: Option<SpanId>, status: SpanStatus, duration_ms: u64);

    fn record_event(&self, name: &str, attributes: &serde_json::Value, ctx: &TraceContext);

    fn is_enabled(&self) -> bool;
}
