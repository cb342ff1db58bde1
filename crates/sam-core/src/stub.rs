//! Default collaborators.
//!
//! The orchestrator is built with these unless the host supplies its own:
//! a deterministic echo model, memory that is switched off, a deny-all
//! memory policy and a tracer that drops everything. Disabled memory answers
//! through the same traits as a working store, so the rest of the graph
//! cannot tell the difference.

use serde_json::json;

use sam_contracts::{
    memory::{
        FactQuery, FactQueryResponse, FactWriteRequest, FactWriteResponse, MemoryReadRequest,
        MemoryReadResponse, MemoryReadStatus, MemoryWriteRequest, MemoryWriteResponse,
        MemoryWriteStatus,
    },
    model::{Metadata, ModelRequest, ModelResponse},
    policy::{MemoryAccessContext, MemoryVerdict},
};

use crate::traits::{
    LongTermMemory, MemoryPolicy, ModelBackend, ShortTermMemory, SpanId, SpanStatus, TraceContext,
    Tracer,
};

/// Deterministic echo backend for tests and CI.
///
/// Non-blank prompts come back as `"stub:<prompt>"`. A blank prompt yields a
/// successful but empty output, which the result handler rejects.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubModelBackend;

impl ModelBackend for StubModelBackend {
    fn generate(&self, request: &ModelRequest) -> ModelResponse {
        let mut metadata = Metadata::new();
        metadata.insert("backend".to_string(), json!("stub"));
        metadata.insert("task".to_string(), json!(request.task));

        let output = if request.prompt.trim().is_empty() {
            String::new()
        } else {
            format!("stub:{}", request.prompt)
        };
        ModelResponse::success(output, Some(metadata))
    }
}

/// Short-term memory that is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledShortTermMemory;

impl ShortTermMemory for DisabledShortTermMemory {
    fn read(&self, _request: &MemoryReadRequest) -> MemoryReadResponse {
        MemoryReadResponse::status(MemoryReadStatus::Unavailable, "short-term memory is disabled")
    }

    fn write(&self, _request: &MemoryWriteRequest) -> MemoryWriteResponse {
        MemoryWriteResponse::status(MemoryWriteStatus::Failed, "short-term memory is disabled")
    }
}

/// Long-term memory that is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLongTermMemory;

impl LongTermMemory for DisabledLongTermMemory {
    fn write_fact(&self, _request: FactWriteRequest) -> FactWriteResponse {
        FactWriteResponse::status(MemoryWriteStatus::Failed, "long-term memory is disabled")
    }

    fn retrieve_facts(&self, _query: &FactQuery) -> FactQueryResponse {
        FactQueryResponse::status(MemoryReadStatus::Unavailable, "long-term memory is disabled")
    }
}

/// Never authorizes memory access.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAllMemory;

impl MemoryPolicy for DenyAllMemory {
    fn evaluate(&self, ctx: &MemoryAccessContext) -> MemoryVerdict {
        MemoryVerdict::Deny {
            reason: format!("memory {} disabled", ctx.operation.as_str()),
        }
    }
}

/// Authorizes every memory read and write.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllMemory;

impl MemoryPolicy for AllowAllMemory {
    fn evaluate(&self, _ctx: &MemoryAccessContext) -> MemoryVerdict {
        MemoryVerdict::Allow
    }
}

/// Tracer that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpTracer;

impl Tracer for NoOpTracer {
    fn start_span(&self, _name: &str, _ctx: &TraceContext) -> Option<SpanId> {
        None
    }

    fn end_span(&self, _span: Option<SpanId>, _status: SpanStatus, _duration_ms: u64) {}

    fn record_event(&self, _name: &str, _attributes: &serde_json::Value, _ctx: &TraceContext) {}

    fn is_enabled(&self) -> bool {
        false
    }
}
