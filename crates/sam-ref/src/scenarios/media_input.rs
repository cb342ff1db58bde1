//! Scenario 3: audio and image payloads.
//!
//! Media is classified by shape, replaced with a fixed marker and sent to
//! the model like text. The default policy forbids writing media turns to
//! memory, so neither store changes.

use std::sync::Arc;

use sam_contracts::error::AgentResult;
use sam_core::stub::StubModelBackend;

use crate::runtime::ReferenceRuntime;

pub fn run_scenario() -> AgentResult<()> {
    println!("=== Scenario 3: Media Input ===");
    println!();

    let runtime = ReferenceRuntime::with_default_policy(Arc::new(StubModelBackend))?;

    for payload in ["data:audio/ogg;base64,T2dnUw==", "https://cdn.example.com/scan.png"] {
        let response = runtime.orchestrator.invoke(payload, None, None)?;
        let wrote = !runtime.tracer.events_named("memory_write_attempted").is_empty();

        println!("  Payload:                {}", payload);
        println!("  Output:                 {}", response.output.as_deref().unwrap_or_default());
        println!("  Memory written:         {}", if wrote { "YES" } else { "NO" });
        println!();
    }
    Ok(())
}
