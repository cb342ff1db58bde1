//! The decision authority: the only place a routing choice is made.
//!
//! `decide` is visited three times on the success path and is a total, pure
//! function of the state and the (construction-time) memory policy:
//!
//!   no preprocessing_result → Preprocess
//!   no model_response       → CallModel
//!   otherwise               → Format
//!
//! It writes `command` and the two memory authorization flags and nothing
//! else. Memory results, model output and tracing never feed into it.

use tracing::debug;

use sam_contracts::{
    policy::{MemoryAccessContext, MemoryOperation, MemoryVerdict},
    state::{AgentState, Command},
};

use crate::traits::MemoryPolicy;

/// Compute the next command and authorization flags for `state`.
pub fn decide(mut state: AgentState, policy: &dyn MemoryPolicy) -> AgentState {
    let command = next_command(&state);

    // Each flag is raised only for the node-pair that runs right after this
    // decision, and lowered on every other visit.
    let (read, write) = match command {
        Command::Preprocess => (false, false),
        Command::CallModel => (authorize(&state, MemoryOperation::Read, policy), false),
        Command::Format => (false, authorize(&state, MemoryOperation::Write, policy)),
    };

    debug!(
        conversation_id = %state.conversation_id(),
        trace_id = %state.trace_id(),
        command = %command,
        memory_read_authorized = read,
        memory_write_authorized = write,
        "decision authority routed"
    );

    state.command = Some(command);
    state.memory_read_authorized = read;
    state.memory_write_authorized = write;
    state
}

/// The routing rule itself, separated so it can be checked in isolation.
pub fn next_command(state: &AgentState) -> Command {
    if state.preprocessing_result.is_none() {
        Command::Preprocess
    } else if state.model_response.is_none() {
        Command::CallModel
    } else {
        Command::Format
    }
}

fn authorize(state: &AgentState, operation: MemoryOperation, policy: &dyn MemoryPolicy) -> bool {
    // An unclassified input never gets memory access.
    let Some(input_type) = state.input_type else {
        return false;
    };

    // Writes only follow an accepted model output.
    if operation == MemoryOperation::Write && state.final_output.is_none() {
        return false;
    }

    match policy.evaluate(&MemoryAccessContext { operation, input_type }) {
        MemoryVerdict::Allow => true,
        MemoryVerdict::Deny { reason } => {
            debug!(
                conversation_id = %state.conversation_id(),
                operation = operation.as_str(),
                %reason,
                "memory access denied by policy"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use sam_contracts::{
        memory::MemoryReadStatus,
        model::ModelResponse,
        state::{AgentState, Command, InputType},
    };

    use crate::stub::{AllowAllMemory, DenyAllMemory};

    use super::{decide, next_command};

    fn classified() -> AgentState {
        let mut state = AgentState::new("hi", Some("c".to_string()), Some("t".to_string()));
        state.input_type = Some(InputType::Text);
        state
    }

    fn after_model() -> AgentState {
        let mut state = classified();
        state.preprocessing_result = Some("hi".to_string());
        state.model_response = Some(ModelResponse::success("stub:hi", None));
        state.final_output = Some("stub:hi".to_string());
        state
    }

    #[test]
    fn test_routes_through_three_commands_in_order() {
        let mut state = classified();
        assert_eq!(next_command(&state), Command::Preprocess);

        state.preprocessing_result = Some("hi".to_string());
        assert_eq!(next_command(&state), Command::CallModel);

        state.model_response = Some(ModelResponse::success("ok", None));
        assert_eq!(next_command(&state), Command::Format);
    }

    #[test]
    fn test_preprocess_never_authorizes_memory() {
        let state = decide(classified(), &AllowAllMemory);
        assert_eq!(state.command, Some(Command::Preprocess));
        assert!(!state.memory_read_authorized);
        assert!(!state.memory_write_authorized);
    }

    #[test]
    fn test_call_model_raises_only_the_read_flag() {
        let mut state = classified();
        state.preprocessing_result = Some("hi".to_string());

        let state = decide(state, &AllowAllMemory);
        assert_eq!(state.command, Some(Command::CallModel));
        assert!(state.memory_read_authorized);
        assert!(!state.memory_write_authorized);
    }

    #[test]
    fn test_format_lowers_read_and_raises_write() {
        let mut state = after_model();
        state.memory_read_authorized = true;

        let state = decide(state, &AllowAllMemory);
        assert_eq!(state.command, Some(Command::Format));
        assert!(!state.memory_read_authorized);
        assert!(state.memory_write_authorized);
    }

    #[test]
    fn test_write_requires_accepted_output() {
        let mut state = after_model();
        state.final_output = None;

        let state = decide(state, &AllowAllMemory);
        assert!(!state.memory_write_authorized);
    }

    #[test]
    fn test_deny_policy_keeps_flags_down() {
        let mut state = classified();
        state.preprocessing_result = Some("hi".to_string());
        assert!(!decide(state, &DenyAllMemory).memory_read_authorized);
        assert!(!decide(after_model(), &DenyAllMemory).memory_write_authorized);
    }

    #[test]
    fn test_memory_results_do_not_change_the_command() {
        let mut with_memory = classified();
        with_memory.preprocessing_result = Some("hi".to_string());
        with_memory.memory_read_status = Some(MemoryReadStatus::Success);
        with_memory.memory_read_result = Some(json!({ "turn_count": 9 }));

        let mut without_memory = classified();
        without_memory.preprocessing_result = Some("hi".to_string());
        without_memory.memory_read_status = Some(MemoryReadStatus::Unavailable);

        assert_eq!(
            decide(with_memory, &AllowAllMemory).command,
            decide(without_memory, &AllowAllMemory).command
        );
    }

    #[test]
    fn test_decide_touches_only_routing_fields() {
        let before = after_model();
        let mut after = decide(before.clone(), &AllowAllMemory);

        after.command = before.command;
        after.memory_read_authorized = before.memory_read_authorized;
        after.memory_write_authorized = before.memory_write_authorized;
        assert_eq!(after, before);
    }
}
