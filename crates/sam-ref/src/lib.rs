//! # sam-ref
//!
//! Reference runtime for the SAM agent graph.
//!
//! Wires the orchestrator with the TOML memory policy, the in-memory stores
//! and the recording tracer, and ships four scenarios:
//!
//! 1. **Memory Continuity**: two turns, the second sees what the first wrote
//! 2. **Backend Failures**: each failure kind ends in its typed fallback
//! 3. **Media Input**: audio and image payloads take the marker path
//! 4. **Memory Toggle**: memory on and off produce the same output
//!
//! No external services are contacted.

pub mod backends;
pub mod runtime;
pub mod scenarios;

pub use backends::{backend_by_name, ScriptedBackend, BACKEND_NAMES};
pub use runtime::ReferenceRuntime;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use sam_contracts::{
        error::ErrorType,
        memory::{FactQuery, MemoryWriteStatus},
        model::{ModelRequest, ModelResponse},
        response::{AgentResponse, ResponseStatus},
    };
    use sam_core::{
        stub::{AllowAllMemory, DisabledLongTermMemory, DisabledShortTermMemory, StubModelBackend},
        traits::{LongTermMemory, ModelBackend},
        Orchestrator,
    };
    use sam_memory::{InMemoryFactStore, InMemoryShortTermStore};
    use sam_policy::TomlMemoryPolicy;
    use sam_trace::RecordingTracer;

    use crate::{
        backends::{backend_by_name, ScriptedBackend},
        runtime::{ReferenceRuntime, DEFAULT_POLICY, NO_MEMORY_POLICY},
        scenarios,
    };

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Stub output plus a record of every context string it was given.
    #[derive(Default)]
    struct ContextSpy {
        contexts: Mutex<Vec<Option<String>>>,
    }

    impl ModelBackend for ContextSpy {
        fn generate(&self, request: &ModelRequest) -> ModelResponse {
            self.contexts.lock().unwrap().push(request.context.clone());
            StubModelBackend.generate(request)
        }
    }

    fn memory_on() -> ReferenceRuntime {
        ReferenceRuntime::with_default_policy(Arc::new(StubModelBackend)).unwrap()
    }

    fn memory_off() -> ReferenceRuntime {
        ReferenceRuntime::new(
            Arc::new(StubModelBackend),
            TomlMemoryPolicy::from_toml_str(NO_MEMORY_POLICY).unwrap(),
        )
    }

    /// The fields that must not depend on memory or tracing.
    fn visible(r: &AgentResponse) -> (ResponseStatus, Option<String>, Option<ErrorType>) {
        (r.status, r.output.clone(), r.error_type)
    }

    fn ids(n: usize) -> (Option<String>, Option<String>) {
        (Some(format!("conv-{n}")), Some(format!("trace-{n}")))
    }

    // ── 1. determinism ────────────────────────────────────────────────────────

    #[test]
    fn test_same_input_same_response() {
        let orchestrator = Orchestrator::default();
        let (c, t) = ids(1);
        let first = orchestrator.invoke("What is 2 + 2?", c.clone(), t.clone()).unwrap();
        let second = orchestrator.invoke("What is 2 + 2?", c, t).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_same_input_same_node_sequence() {
        let runtime = memory_on();
        let (c, _) = ids(2);
        runtime.orchestrator.invoke("hi", c.clone(), Some("a".to_string())).unwrap();
        runtime.orchestrator.invoke("hi", c, Some("b".to_string())).unwrap();
        assert_eq!(runtime.tracer.node_sequence("a"), runtime.tracer.node_sequence("b"));
    }

    // ── 2. memory ON/OFF invariance ───────────────────────────────────────────

    #[test]
    fn test_memory_does_not_change_visible_output() {
        let on = memory_on();
        let off = memory_off();

        for input in ["Hello, world!", "", "data:audio/ogg;base64,AAAA", "photo.jpg"] {
            let (c, t) = ids(3);
            // Two turns so the second one has memory to read.
            on.orchestrator.invoke(input, c.clone(), t.clone()).unwrap();
            let with = on.orchestrator.invoke(input, c.clone(), t.clone()).unwrap();
            let without = off.orchestrator.invoke(input, c, t).unwrap();
            assert_eq!(visible(&with), visible(&without), "input {input:?}");
        }
    }

    #[test]
    fn test_memory_does_not_change_routing() {
        let on = memory_on();
        let off = memory_off();
        on.orchestrator.invoke("warm", Some("c".to_string()), None).unwrap();

        on.orchestrator.invoke("hi", Some("c".to_string()), Some("on".to_string())).unwrap();
        off.orchestrator.invoke("hi", Some("c".to_string()), Some("off".to_string())).unwrap();
        assert_eq!(on.tracer.node_sequence("on"), off.tracer.node_sequence("off"));
    }

    #[test]
    fn test_disabled_stores_match_working_stores() {
        let working_tracer = Arc::new(RecordingTracer::new());
        let working = Orchestrator::builder()
            .short_term_memory(Arc::new(InMemoryShortTermStore::new()))
            .long_term_memory(Arc::new(InMemoryFactStore::new()))
            .policy(Arc::new(AllowAllMemory))
            .tracer(working_tracer.clone())
            .build();

        let disabled_tracer = Arc::new(RecordingTracer::new());
        let disabled = Orchestrator::builder()
            .short_term_memory(Arc::new(DisabledShortTermMemory))
            .long_term_memory(Arc::new(DisabledLongTermMemory))
            .policy(Arc::new(AllowAllMemory))
            .tracer(disabled_tracer.clone())
            .build();

        for (n, input) in ["Hello, world!", "", "  spaced   out  ", "data:image/png;base64,AAAA", "clip.wav"]
            .into_iter()
            .enumerate()
        {
            let (c, t) = ids(200 + n);
            // Warm the working stores so the compared turn reads real memory.
            working.invoke(input, c.clone(), None).unwrap();
            let with = working.invoke(input, c.clone(), t.clone()).unwrap();
            let without = disabled.invoke(input, c, t.clone()).unwrap();

            let t = t.unwrap();
            assert_eq!(visible(&with), visible(&without), "input {input:?}");
            assert_eq!(
                working_tracer.node_sequence(&t),
                disabled_tracer.node_sequence(&t),
                "input {input:?}"
            );
        }
    }

    // ── 3. tracing ON/OFF invariance ──────────────────────────────────────────

    #[test]
    fn test_tracer_does_not_change_response() {
        let traced = Orchestrator::builder().tracer(Arc::new(RecordingTracer::new())).build();
        let untraced = Orchestrator::default();

        for input in ["hello", ""] {
            let (c, t) = ids(4);
            assert_eq!(
                traced.invoke(input, c.clone(), t.clone()).unwrap(),
                untraced.invoke(input, c, t).unwrap()
            );
        }
    }

    #[test]
    fn test_tracer_sees_metadata_not_text() {
        let runtime = memory_on();
        runtime.orchestrator.invoke("my secret prompt", None, None).unwrap();

        let export = runtime.tracer.export_json().to_string();
        assert!(!export.contains("my secret prompt"));
        assert!(export.contains("model_call_completed"));
    }

    // ── 4. memory is advisory context ────────────────────────────────────────

    #[test]
    fn test_second_turn_receives_memory_as_context() {
        let spy = Arc::new(ContextSpy::default());
        let runtime = ReferenceRuntime::new(
            spy.clone(),
            TomlMemoryPolicy::from_toml_str(DEFAULT_POLICY).unwrap(),
        );
        let c = Some("conv-ctx".to_string());

        runtime.orchestrator.invoke("first", c.clone(), None).unwrap();
        runtime.orchestrator.invoke("second", c, None).unwrap();

        let contexts = spy.contexts.lock().unwrap();
        assert_eq!(contexts[0], None, "first turn has nothing stored");
        let second = contexts[1].as_deref().unwrap();
        assert!(second.contains("\"turn_count\":1"));
        assert!(second.contains("interaction_summary"));
        assert!(!second.contains("stub:first"), "raw output never reaches memory");
    }

    #[test]
    fn test_session_counter_advances() {
        let runtime = memory_on();
        let c = Some("conv-count".to_string());
        for _ in 0..3 {
            runtime.orchestrator.invoke("hi", c.clone(), None).unwrap();
        }
        let scratch = runtime.short_term.peek("conv-count", "conversation_context").unwrap();
        assert_eq!(scratch["turn_count"], json!(3));
        assert_eq!(scratch["input_type"], json!("text"));
    }

    #[test]
    fn test_memory_failure_is_invisible() {
        // Disabled stores report unavailable/failed, yet the policy allows access.
        let orchestrator = Orchestrator::builder()
            .policy(Arc::new(TomlMemoryPolicy::from_toml_str(DEFAULT_POLICY).unwrap()))
            .build();
        let response = orchestrator.invoke("hi", None, None).unwrap();
        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.output.as_deref(), Some("stub:hi"));
    }

    // ── 5. authorization gating ───────────────────────────────────────────────

    #[test]
    fn test_media_turns_are_not_written() {
        let runtime = memory_on();
        runtime.orchestrator.invoke("voice.ogg", Some("media".to_string()), None).unwrap();

        assert!(runtime.facts.is_empty());
        assert_eq!(runtime.short_term.peek("media", "conversation_context"), None);
        assert!(runtime.tracer.events_named("memory_write_attempted").is_empty());
        assert_eq!(runtime.tracer.events_named("memory_read_attempted").len(), 1);
    }

    #[test]
    fn test_no_memory_policy_never_touches_stores() {
        let runtime = memory_off();
        runtime.orchestrator.invoke("hi", Some("c".to_string()), None).unwrap();

        assert!(runtime.facts.is_empty());
        assert_eq!(runtime.short_term.peek("c", "conversation_context"), None);
        assert!(runtime.tracer.events().iter().all(|e| e.name.starts_with("model_call")));
    }

    // ── 6. append-only long-term memory ───────────────────────────────────────

    #[test]
    fn test_facts_accumulate_and_chain_verifies() {
        let runtime = memory_on();
        let c = Some("conv-facts".to_string());
        for text in ["one", "two", "three"] {
            runtime.orchestrator.invoke(text, c.clone(), None).unwrap();
        }

        let facts = runtime
            .facts
            .retrieve_facts(&FactQuery {
                user_id: "conv-facts".to_string(),
                fact_types: None,
                limit: 100,
                authorized: true,
            })
            .facts;
        assert_eq!(facts.len(), 3);
        assert!(facts.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert_eq!(facts[0].content["output_chars"], json!("stub:one".len()));
        assert!(runtime.facts.verify_integrity());
    }

    #[test]
    fn test_failed_turns_write_nothing() {
        let runtime = ReferenceRuntime::with_default_policy(Arc::new(ScriptedBackend::Timeout)).unwrap();
        runtime.orchestrator.invoke("hi", Some("c".to_string()), None).unwrap();

        assert!(runtime.facts.is_empty());
        assert!(runtime.tracer.events_named("long_term_memory_write_attempted").is_empty());
    }

    // ── 7. typed failure completeness ─────────────────────────────────────────

    #[test]
    fn test_every_failure_is_typed() {
        for (name, expected) in [
            ("timeout", ErrorType::Timeout),
            ("unavailable", ErrorType::BackendUnavailable),
            ("untyped", ErrorType::BackendUnavailable),
            ("empty", ErrorType::InvalidOutput),
        ] {
            let runtime = ReferenceRuntime::with_default_policy(backend_by_name(name).unwrap()).unwrap();
            let response = runtime.orchestrator.invoke("hi", None, None).unwrap();

            assert_eq!(response.status, ResponseStatus::Error, "backend {name}");
            assert_eq!(response.error_type, Some(expected), "backend {name}");
            assert!(response.output.is_some_and(|o| !o.is_empty()));
        }
    }

    #[test]
    fn test_unknown_backend_name() {
        assert!(backend_by_name("gpt-7").is_none());
    }

    // ── 8. concurrency ────────────────────────────────────────────────────────

    #[test]
    fn test_concurrent_invocations_are_isolated() {
        let runtime = memory_on();
        let expected = {
            let reference = memory_on();
            reference.orchestrator.invoke("x", None, Some("ref".to_string())).unwrap();
            reference.tracer.node_sequence("ref")
        };

        let responses: Vec<AgentResponse> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|n| {
                    let orchestrator = &runtime.orchestrator;
                    scope.spawn(move || {
                        let (c, t) = ids(100 + n);
                        orchestrator.invoke(format!("message {n}"), c, t).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (n, response) in responses.iter().enumerate() {
            assert_eq!(response.output.as_deref(), Some(format!("stub:message {n}").as_str()));
            assert_eq!(runtime.tracer.node_sequence(&format!("trace-{}", 100 + n)), expected);
        }
        assert_eq!(runtime.facts.len(), 8);
        assert!(runtime.facts.verify_integrity());
    }

    // ── 9. scenarios ──────────────────────────────────────────────────────────

    #[test]
    fn test_scenarios_run() {
        scenarios::run_all().unwrap();
    }

    #[test]
    fn test_short_term_refuses_raw_text() {
        use sam_contracts::memory::MemoryWriteRequest;
        use sam_core::traits::ShortTermMemory;

        let runtime = memory_on();
        let response = runtime.short_term.write(&MemoryWriteRequest {
            conversation_id: "c".to_string(),
            key: "k".to_string(),
            data: json!({ "output": "stub:hi" }),
            authorized: true,
        });
        assert_eq!(response.status, MemoryWriteStatus::Failed);
    }
}
