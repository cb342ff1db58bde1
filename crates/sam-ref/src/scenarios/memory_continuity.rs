//! Scenario 1: two text turns in one conversation.
//!
//! The first turn finds no session scratch and no facts. The second turn
//! reads the counter written by the first and the fact it appended. Both
//! turns get identical `stub:` output because memory is advisory.

use std::sync::Arc;

use sam_contracts::error::AgentResult;
use sam_core::stub::StubModelBackend;

use crate::runtime::ReferenceRuntime;

pub fn run_scenario() -> AgentResult<()> {
    println!("=== Scenario 1: Memory Continuity ===");
    println!();

    let runtime = ReferenceRuntime::with_default_policy(Arc::new(StubModelBackend))?;
    let conversation = "conv-continuity".to_string();

    for (turn, text) in ["Hello there", "Remind me what we said"].iter().enumerate() {
        let trace_id = format!("trace-continuity-{}", turn + 1);
        let response = runtime
            .orchestrator
            .invoke(*text, Some(conversation.clone()), Some(trace_id.clone()))?;

        let reads = runtime.tracer.events_named("long_term_memory_read_attempted");
        let facts_seen = reads
            .last()
            .and_then(|e| e.attributes["facts"].as_u64())
            .unwrap_or(0);

        println!("  Turn {}: {:?}", turn + 1, text);
        println!("  Output:                 {}", response.output.as_deref().unwrap_or_default());
        println!("  Facts in context:       {}", facts_seen);
        println!("  Nodes visited:          {}", runtime.tracer.node_sequence(&trace_id).len());
    }

    let scratch = runtime
        .short_term
        .peek(&conversation, &runtime.orchestrator.config().memory_key)
        .and_then(|v| v["turn_count"].as_u64())
        .unwrap_or(0);
    println!("  Session turn_count:     {}", scratch);
    println!(
        "  Fact chain integrity:   {} ({} fact(s))",
        if runtime.facts.verify_integrity() { "VERIFIED" } else { "FAILED" },
        runtime.facts.len()
    );
    println!();
    Ok(())
}
