//! # sam-trace
//!
//! Tracer implementations for the SAM orchestrator.
//!
//! - [`RecordingTracer`] keeps spans and events in memory for inspection
//! - [`LogTracer`] forwards them to `tracing`
//!
//! Tracers observe; they cannot change routing. The orchestrator reads back
//! nothing but the span handle.

pub mod log;
pub mod recording;

pub use log::LogTracer;
pub use recording::{EventRecord, RecordingTracer, SpanRecord};

// ── Tests ─────────────────────────────────────────────────────────────────────
