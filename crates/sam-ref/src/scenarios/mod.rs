//! Reference scenarios.
//!
//! Each scenario wires real SAM components (TOML policy, in-memory stores,
//! recording tracer, orchestrator) with scripted backends and prints what
//! the graph did.

pub mod backend_failures;
pub mod media_input;
pub mod memory_continuity;
pub mod memory_toggle;

use sam_contracts::error::AgentResult;

/// Run every scenario in order.
pub fn run_all() -> AgentResult<()> {
    memory_continuity::run_scenario()?;
    backend_failures::run_scenario()?;
    media_input::run_scenario()?;
    memory_toggle::run_scenario()?;
    Ok(())
}
