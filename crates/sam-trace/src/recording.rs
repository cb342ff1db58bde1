//! A tracer that keeps every span and event in memory.
//!
//! Used by tests and the demo to observe node order and event metadata.
//! Nothing it records is ever read back by the orchestrator.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use sam_core::traits::{SpanId, SpanStatus, TraceContext, Tracer};

/// One node execution.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanRecord {
    /// Position in the recording, starting at 0.
    pub id: SpanId,
    /// Node name, e.g. "model_call".
    pub name: String,
    pub trace_id: String,
    pub conversation_id: String,
    pub started_at: DateTime<Utc>,
    /// `None` until the span is ended.
    pub status: Option<SpanStatus>,
    /// Wall-clock time between start and end; `None` while open.
    pub duration_ms: Option<u64>,
}

/// One boundary event, e.g. "model_call_completed".
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub name: String,
    /// Metadata only; never prompts or outputs.
    pub attributes: Value,
    pub trace_id: String,
    pub conversation_id: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Default)]
struct Recorded {
    spans: Vec<SpanRecord>,
    events: Vec<EventRecord>,
}

#[derive(Default)]
pub struct RecordingTracer {
    inner: Mutex<Recorded>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> Vec<SpanRecord> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).spans.clone()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).events.clone()
    }

    /// Span names for one trace, in start order.
    pub fn node_sequence(&self, trace_id: &str) -> Vec<String> {
        self.spans()
            .into_iter()
            .filter(|s| s.trace_id == trace_id)
            .map(|s| s.name)
            .collect()
    }

    pub fn events_named(&self, name: &str) -> Vec<EventRecord> {
        self.events().into_iter().filter(|e| e.name == name).collect()
    }

    /// Spans and events as one JSON document.
    pub fn export_json(&self) -> Value {
        let recorded = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let spans: Vec<Value> = recorded
            .spans
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "trace_id": s.trace_id,
                    "conversation_id": s.conversation_id,
                    "started_at": s.started_at.to_rfc3339(),
                    "status": s.status.map(|st| match st {
                        SpanStatus::Success => "success",
                        SpanStatus::Error => "error",
                    }),
                    "duration_ms": s.duration_ms,
                })
            })
            .collect();
        let events: Vec<Value> = recorded
            .events
            .iter()
            .map(|e| json!({ "name": e.name, "trace_id": e.trace_id, "attributes": e.attributes }))
            .collect();
        json!({ "spans": spans, "events": events })
    }
}

impl Tracer for RecordingTracer {
    fn start_span(&self, name: &str, ctx: &TraceContext) -> Option<SpanId> {
        let mut recorded = self.inner.lock().ok()?;
        let id = SpanId(recorded.spans.len() as u64);
        recorded.spans.push(SpanRecord {
            id,
            name: name.to_string(),
            trace_id: ctx.trace_id.clone(),
            conversation_id: ctx.conversation_id.clone(),
            started_at: Utc::now(),
            status: None,
            duration_ms: None,
        });
        Some(id)
    }

    fn end_span(&self, span: Option<SpanId>, status: SpanStatus, duration_ms: u64) {
        let (Some(SpanId(idx)), Ok(mut recorded)) = (span, self.inner.lock()) else {
            return;
        };
        if let Some(record) = recorded.spans.get_mut(idx as usize) {
            record.status = Some(status);
            record.duration_ms = Some(duration_ms);
        }
    }

    fn record_event(&self, name: &str, attributes: &Value, ctx: &TraceContext) {
        if let Ok(mut recorded) = self.inner.lock() {
            recorded.events.push(EventRecord {
                name: name.to_string(),
                attributes: attributes.clone(),
                trace_id: ctx.trace_id.clone(),
                conversation_id: ctx.conversation_id.clone(),
                recorded_at: Utc::now(),
            });
        }
    }

    fn is_enabled(&self) -> bool {
        true
    }
}
