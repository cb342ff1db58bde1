//! # sam-policy
//!
//! A TOML-driven, deny-by-default memory policy for the SAM orchestrator.
//!
//! [`TomlMemoryPolicy`] implements
//! [`MemoryPolicy`](sam_core::traits::MemoryPolicy). The decision authority
//! consults it once per memory node-pair; rules are evaluated in order and
//! the first match wins. The same document carries the `[orchestrator]`
//! settings, so one file configures a deployment.
//!
//! ## Rule matching
//!
//! Each rule names an `operation` (`read`, `write`) and an `input_type`
//! (`text`, `audio`, `image`). Both accept the wildcard `"*"`.

pub mod engine;
pub mod rule;

pub use engine::TomlMemoryPolicy;
pub use rule::{MemoryRule, PolicyConfig, RuleVerdict};

// ── Tests ─────────────────────────────────────────────────────────────────────
