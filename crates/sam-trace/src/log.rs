//! Forwards spans and events to `tracing`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::{debug, info};

use sam_core::traits::{SpanId, SpanStatus, TraceContext, Tracer};

/// Emits one log line per span end and per event, at `debug` and `info`.
#[derive(Default)]
pub struct LogTracer {
    next_id: AtomicU64,
}

impl LogTracer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tracer for LogTracer {
    fn start_span(&self, name: &str, ctx: &TraceContext) -> Option<SpanId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(span_id = id, node = name, trace_id = %ctx.trace_id, "span started");
        Some(SpanId(id))
    }

    fn end_span(&self, span: Option<SpanId>, status: SpanStatus, duration_ms: u64) {
        if let Some(SpanId(id)) = span {
            debug!(span_id = id, ?status, duration_ms, "span ended");
        }
    }

    fn record_event(&self, name: &str, attributes: &Value, ctx: &TraceContext) {
        info!(
            event = name,
            trace_id = %ctx.trace_id,
            conversation_id = %ctx.conversation_id,
            attributes = %attributes,
            "trace event"
        );
    }

    fn is_enabled(&self) -> bool {
        true
    }
}
