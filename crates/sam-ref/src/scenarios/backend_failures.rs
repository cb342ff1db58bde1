//! Scenario 2: every model failure ends in a typed fallback.
//!
//! No failure reaches the caller as `Err`, and none is written to memory.

use sam_contracts::error::AgentResult;

use crate::{backends::backend_by_name, runtime::ReferenceRuntime};

pub fn run_scenario() -> AgentResult<()> {
    println!("=== Scenario 2: Backend Failures ===");
    println!();

    for name in ["timeout", "unavailable", "untyped", "empty"] {
        let Some(backend) = backend_by_name(name) else {
            continue;
        };
        let runtime = ReferenceRuntime::with_default_policy(backend)?;
        let response = runtime.orchestrator.invoke("Are you there?", None, None)?;

        println!("  Backend:                {}", name);
        println!(
            "  Error type:             {}",
            response.error_type.map(|e| e.to_string()).unwrap_or_else(|| "none".to_string())
        );
        println!("  Fallback:               {}", response.output.as_deref().unwrap_or_default());
        println!("  Facts written:          {}", runtime.facts.len());
        println!();
    }
    Ok(())
}
