//! Memory node-pairs.
//!
//! Each node is gated by a flag the decision authority set. With the flag
//! down the node returns the state untouched and never calls its store.
//! Store failures land in the advisory status fields and are logged; they
//! never surface as an invocation error.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, warn};

use sam_contracts::{
    config::OrchestratorConfig,
    memory::{
        FactQuery, FactWriteRequest, MemoryFact, MemoryReadRequest, MemoryReadStatus,
        MemoryWriteRequest, MemoryWriteStatus,
    },
    state::AgentState,
};

use crate::traits::{LongTermMemory, ShortTermMemory};

/// Fact type written after each successful interaction.
pub const INTERACTION_FACT_TYPE: &str = "interaction_summary";
/// `source` of the interaction fact.
pub const INTERACTION_FACT_SOURCE: &str = "agent_interaction";
/// `confidence` of the interaction fact.
pub const INTERACTION_FACT_CONFIDENCE: f64 = 0.8;

// ── Short-term ───────────────────────────────────────────────────────────────

/// Load this conversation's scratch record into `memory_read_result`.
///
/// `NotFound` is the normal first-turn outcome and is not logged.
pub fn memory_read(
    mut state: AgentState,
    store: &dyn ShortTermMemory,
    config: &OrchestratorConfig,
) -> AgentState {
    if !state.memory_read_authorized {
        return state;
    }

    let response = store.read(&MemoryReadRequest {
        conversation_id: state.conversation_id().to_string(),
        key: config.memory_key.clone(),
        authorized: true,
    });

    match response.status {
        MemoryReadStatus::Success => {
            debug!(conversation_id = %state.conversation_id(), "short-term memory read");
            state.memory_read_result = response.data;
        }
        // A first turn has nothing stored yet.
        MemoryReadStatus::NotFound => {}
        status => warn!(
            conversation_id = %state.conversation_id(),
            ?status,
            error = response.error.as_deref().unwrap_or_default(),
            "short-term memory read failed; continuing without it"
        ),
    }
    state.memory_read_status = Some(response.status);
    state
}

/// Store the turn's [`scratch_record`] under `config.memory_key`.
pub fn memory_write(
    mut state: AgentState,
    store: &dyn ShortTermMemory,
    config: &OrchestratorConfig,
) -> AgentState {
    if !state.memory_write_authorized {
        return state;
    }

    let response = store.write(&MemoryWriteRequest {
        conversation_id: state.conversation_id().to_string(),
        key: config.memory_key.clone(),
        data: scratch_record(&state),
        authorized: true,
    });

    if response.status != MemoryWriteStatus::Success {
        warn!(
            conversation_id = %state.conversation_id(),
            status = ?response.status,
            error = response.error.as_deref().unwrap_or_default(),
            "short-term memory write failed"
        );
    }
    state.memory_write_status = Some(response.status);
    state
}

/// Session scratch for this turn. Counters and metadata only, never text.
pub fn scratch_record(state: &AgentState) -> Value {
    let previous = state
        .memory_read_result
        .as_ref()
        .and_then(|v| v.get("turn_count"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    json!({
        "turn_count": previous + 1,
        "last_interaction_at": Utc::now().to_rfc3339(),
        "input_type": state.input_type.map(|t| t.as_str()),
        "output_chars": state.final_output.as_deref().map_or(0, |o| o.chars().count()),
    })
}

// ── Long-term ────────────────────────────────────────────────────────────────

/// Retrieve up to `config.fact_limit` facts into `long_term_facts`.
///
/// Facts are keyed by conversation id and come back oldest first.
pub fn long_term_memory_read(
    mut state: AgentState,
    store: &dyn LongTermMemory,
    config: &OrchestratorConfig,
) -> AgentState {
    if !state.memory_read_authorized {
        return state;
    }

    let response = store.retrieve_facts(&FactQuery {
        user_id: state.conversation_id().to_string(),
        fact_types: None,
        limit: config.fact_limit,
        authorized: true,
    });

    if response.status == MemoryReadStatus::Success {
        debug!(
            conversation_id = %state.conversation_id(),
            facts = response.facts.len(),
            "long-term facts retrieved"
        );
        state.long_term_facts = Some(response.facts);
    } else {
        warn!(
            conversation_id = %state.conversation_id(),
            status = ?response.status,
            error = response.error.as_deref().unwrap_or_default(),
            "long-term memory read failed; continuing without it"
        );
    }
    state.long_term_read_status = Some(response.status);
    state
}

/// Append the [`interaction_fact`] for this turn.
///
/// Does nothing without a `final_output`. A store refusal, such as a full
/// per-user allowance, is recorded in `long_term_write_status` only.
pub fn long_term_memory_write(
    mut state: AgentState,
    store: &dyn LongTermMemory,
) -> AgentState {
    if !state.memory_write_authorized {
        return state;
    }
    let Some(fact) = interaction_fact(&state) else {
        return state;
    };

    let response = store.write_fact(FactWriteRequest {
        user_id: state.conversation_id().to_string(),
        fact,
        authorized: true,
        reason: "record completed interaction".to_string(),
    });

    match response.status {
        MemoryWriteStatus::Success => debug!(
            conversation_id = %state.conversation_id(),
            fact_id = response.fact_id.as_deref().unwrap_or_default(),
            "interaction fact appended"
        ),
        status => warn!(
            conversation_id = %state.conversation_id(),
            ?status,
            error = response.error.as_deref().unwrap_or_default(),
            "long-term memory write failed"
        ),
    }
    state.long_term_write_status = Some(response.status);
    state
}

/// Structural summary of the turn, or `None` when there is no output.
pub fn interaction_fact(state: &AgentState) -> Option<MemoryFact> {
    let output = state.final_output.as_deref()?;

    let mut content = json!({
        "input_type": state.input_type.map(|t| t.as_str()),
        "output_chars": output.chars().count(),
    });
    if let Some(backend) = state.model_metadata.as_ref().and_then(|m| m.get("backend")) {
        content["backend"] = backend.clone();
    }

    let mut fact = MemoryFact::new(INTERACTION_FACT_TYPE, content, state.conversation_id());
    fact.confidence = INTERACTION_FACT_CONFIDENCE;
    fact.source = INTERACTION_FACT_SOURCE.to_string();
    Some(fact)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use sam_contracts::{
        config::OrchestratorConfig,
        memory::{
            FactQuery, FactQueryResponse, FactWriteRequest, FactWriteResponse, MemoryFact,
            MemoryReadRequest, MemoryReadResponse, MemoryReadStatus, MemoryWriteRequest,
            MemoryWriteResponse, MemoryWriteStatus,
        },
        state::{AgentState, InputType},
    };

    use crate::traits::{LongTermMemory, ShortTermMemory};

    use super::*;

    // ── Mocks ────────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct SpyScratch {
        stored: Option<serde_json::Value>,
        writes: Arc<Mutex<Vec<MemoryWriteRequest>>>,
        reads: Arc<Mutex<usize>>,
    }

    impl ShortTermMemory for SpyScratch {
        fn read(&self, _request: &MemoryReadRequest) -> MemoryReadResponse {
            *self.reads.lock().unwrap() += 1;
            match &self.stored {
                Some(v) => MemoryReadResponse::success(v.clone()),
                None => MemoryReadResponse::status(MemoryReadStatus::NotFound, "no entry"),
            }
        }

        fn write(&self, request: &MemoryWriteRequest) -> MemoryWriteResponse {
            self.writes.lock().unwrap().push(request.clone());
            MemoryWriteResponse::success()
        }
    }

    #[derive(Default)]
    struct SpyFacts {
        written: Arc<Mutex<Vec<FactWriteRequest>>>,
        fail_reads: bool,
    }

    impl LongTermMemory for SpyFacts {
        fn write_fact(&self, request: FactWriteRequest) -> FactWriteResponse {
            self.written.lock().unwrap().push(request);
            FactWriteResponse::success("fact-1")
        }

        fn retrieve_facts(&self, _query: &FactQuery) -> FactQueryResponse {
            if self.fail_reads {
                return FactQueryResponse::status(MemoryReadStatus::Unavailable, "db down");
            }
            FactQueryResponse::success(vec![MemoryFact::new("preference", json!("brief"), "conv")])
        }
    }

    fn state() -> AgentState {
        let mut state = AgentState::new("hi", Some("conv".to_string()), Some("trace".to_string()));
        state.input_type = Some(InputType::Text);
        state.preprocessing_result = Some("hi".to_string());
        state
    }

    // ── Gating ───────────────────────────────────────────────────────────────

    #[test]
    fn test_unauthorized_nodes_are_no_ops() {
        let scratch = SpyScratch { stored: Some(json!({ "turn_count": 1 })), ..Default::default() };
        let facts = SpyFacts::default();
        let config = OrchestratorConfig::default();
        let mut before = state();
        before.final_output = Some("ok".to_string());

        let after = memory_read(before.clone(), &scratch, &config);
        let after = long_term_memory_read(after, &facts, &config);
        let after = memory_write(after, &scratch, &config);
        let after = long_term_memory_write(after, &facts);

        assert_eq!(after, before);
        assert_eq!(*scratch.reads.lock().unwrap(), 0);
        assert!(scratch.writes.lock().unwrap().is_empty());
        assert!(facts.written.lock().unwrap().is_empty());
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    #[test]
    fn test_authorized_read_populates_advisory_fields_only() {
        let scratch = SpyScratch { stored: Some(json!({ "turn_count": 3 })), ..Default::default() };
        let mut before = state();
        before.memory_read_authorized = true;

        let after = memory_read(before.clone(), &scratch, &OrchestratorConfig::default());
        assert_eq!(after.memory_read_status, Some(MemoryReadStatus::Success));
        assert_eq!(after.memory_read_result, Some(json!({ "turn_count": 3 })));
        assert_eq!(after.command, before.command);
    }

    #[test]
    fn test_first_turn_read_is_not_found() {
        let mut s = state();
        s.memory_read_authorized = true;

        let after = memory_read(s, &SpyScratch::default(), &OrchestratorConfig::default());
        assert_eq!(after.memory_read_status, Some(MemoryReadStatus::NotFound));
        assert_eq!(after.memory_read_result, None);
    }

    #[test]
    fn test_long_term_read_failure_degrades_silently() {
        let facts = SpyFacts { fail_reads: true, ..Default::default() };
        let mut s = state();
        s.memory_read_authorized = true;

        let after = long_term_memory_read(s, &facts, &OrchestratorConfig::default());
        assert_eq!(after.long_term_read_status, Some(MemoryReadStatus::Unavailable));
        assert_eq!(after.long_term_facts, None);
        assert_eq!(after.error_type, None);
    }

    // ── Writes ───────────────────────────────────────────────────────────────

    #[test]
    fn test_scratch_write_counts_turns_without_text() {
        let scratch = SpyScratch::default();
        let mut s = state();
        s.memory_read_result = Some(json!({ "turn_count": 4 }));
        s.final_output = Some("stub:hi".to_string());
        s.memory_write_authorized = true;

        let after = memory_write(s, &scratch, &OrchestratorConfig::default());
        assert_eq!(after.memory_write_status, Some(MemoryWriteStatus::Success));

        let writes = scratch.writes.lock().unwrap();
        let data = &writes[0].data;
        assert_eq!(data["turn_count"], json!(5));
        assert_eq!(data["output_chars"], json!(7));
        assert_eq!(data["input_type"], json!("text"));
        assert!(!data.to_string().contains("stub:hi"));
    }

    #[test]
    fn test_interaction_fact_is_structural() {
        let facts = SpyFacts::default();
        let mut s = state();
        s.final_output = Some("stub:hi".to_string());
        let mut metadata = sam_contracts::model::Metadata::new();
        metadata.insert("backend".to_string(), json!("stub"));
        s.model_metadata = Some(metadata);
        s.memory_write_authorized = true;

        let after = long_term_memory_write(s, &facts);
        assert_eq!(after.long_term_write_status, Some(MemoryWriteStatus::Success));

        let written = facts.written.lock().unwrap();
        let fact = &written[0].fact;
        assert_eq!(fact.fact_type, INTERACTION_FACT_TYPE);
        assert_eq!(fact.confidence, INTERACTION_FACT_CONFIDENCE);
        assert_eq!(fact.source, INTERACTION_FACT_SOURCE);
        assert_eq!(fact.user_id, "conv");
        assert_eq!(fact.content, json!({ "input_type": "text", "output_chars": 7, "backend": "stub" }));
    }

    #[test]
    fn test_refused_fact_is_advisory() {
        struct FullFacts;
        impl LongTermMemory for FullFacts {
            fn write_fact(&self, _request: FactWriteRequest) -> FactWriteResponse {
                FactWriteResponse::status(MemoryWriteStatus::Failed, "user 'conv' already holds 2 facts")
            }
            fn retrieve_facts(&self, _query: &FactQuery) -> FactQueryResponse {
                FactQueryResponse::success(Vec::new())
            }
        }

        let mut s = state();
        s.final_output = Some("stub:hi".to_string());
        s.memory_write_authorized = true;

        let after = long_term_memory_write(s.clone(), &FullFacts);
        assert_eq!(after.long_term_write_status, Some(MemoryWriteStatus::Failed));
        assert_eq!(after.final_output, s.final_output);
        assert_eq!(after.error_type, None);
    }

    #[test]
    fn test_no_fact_without_output() {
        assert!(interaction_fact(&state()).is_none());
    }
}
