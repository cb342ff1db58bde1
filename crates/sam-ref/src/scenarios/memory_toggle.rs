//! Scenario 4: the same request with memory on and off.
//!
//! Output and error fields must match exactly; only ids and the memory
//! status fields may differ.

use std::sync::Arc;

use sam_contracts::error::AgentResult;
use sam_core::stub::StubModelBackend;
use sam_policy::TomlMemoryPolicy;

use crate::runtime::{ReferenceRuntime, DEFAULT_POLICY, NO_MEMORY_POLICY};

pub fn run_scenario() -> AgentResult<()> {
    println!("=== Scenario 4: Memory Toggle ===");
    println!();

    let on = ReferenceRuntime::new(
        Arc::new(StubModelBackend),
        TomlMemoryPolicy::from_toml_str(DEFAULT_POLICY)?,
    );
    let off = ReferenceRuntime::new(
        Arc::new(StubModelBackend),
        TomlMemoryPolicy::from_toml_str(NO_MEMORY_POLICY)?,
    );

    // Prime the memory-on runtime so the second call has context.
    let id = Some("conv-toggle".to_string());
    on.orchestrator.invoke("warm up", id.clone(), None)?;

    let with_memory = on.orchestrator.invoke("What is 2 + 2?", id.clone(), None)?;
    let without_memory = off.orchestrator.invoke("What is 2 + 2?", id, None)?;

    let same = with_memory.output == without_memory.output
        && with_memory.status == without_memory.status
        && with_memory.error_type == without_memory.error_type;

    println!("  Memory ON output:       {}", with_memory.output.as_deref().unwrap_or_default());
    println!("  Memory OFF output:      {}", without_memory.output.as_deref().unwrap_or_default());
    println!("  Outputs identical:      {}", if same { "YES" } else { "NO" });
    println!();
    Ok(())
}
