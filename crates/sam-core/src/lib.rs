//! # sam-core
//!
//! The deterministic orchestrator for the SAM agent graph.
//!
//! This crate provides:
//! - The boundary traits (`ModelBackend`, `ShortTermMemory`, `LongTermMemory`,
//!   `MemoryPolicy`, `Tracer`)
//! - The task nodes and the decision authority that routes between them
//! - The fixed transition table
//! - The `Orchestrator` that runs one invocation and guards field ownership
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sam_core::Orchestrator;
//!
//! let response = Orchestrator::default().invoke("Hello, world!", None, None)?;
//! assert_eq!(response.output.as_deref(), Some("stub:Hello, world!"));
//! ```

pub mod decision;
pub mod graph;
pub mod memory_gate;
pub mod nodes;
pub mod orchestrator;
pub mod stub;
pub mod traits;

pub use orchestrator::{Orchestrator, OrchestratorBuilder};
