//! The fixed graph topology.
//!
//! Transitions are a static table keyed by the node that just ran, the
//! decision authority's command and the model outcome. Only two nodes
//! branch: the decision authority (on `command`) and the model caller (on
//! `model_response.status`). The result handler has a guard edge for
//! rejected output. Every path ends at `FormatResponse`.

use std::fmt;

use sam_contracts::{
    error::{AgentError, AgentResult},
    model::ModelStatus,
    state::{AgentState, Command},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Router,
    StateInit,
    DecisionAuthority,
    Preprocess,
    MemoryRead,
    LongTermMemoryRead,
    ModelCall,
    ResultHandling,
    ErrorRouter,
    MemoryWrite,
    LongTermMemoryWrite,
    FormatResponse,
}

impl Node {
    /// The first node after START.
    pub const ENTRY: Node = Node::Router;

    pub fn as_str(&self) -> &'static str {
        match self {
            Node::Router => "router",
            Node::StateInit => "state_init",
            Node::DecisionAuthority => "decision_authority",
            Node::Preprocess => "preprocess",
            Node::MemoryRead => "memory_read",
            Node::LongTermMemoryRead => "long_term_memory_read",
            Node::ModelCall => "model_call",
            Node::ResultHandling => "result_handling",
            Node::ErrorRouter => "error_router",
            Node::MemoryWrite => "memory_write",
            Node::LongTermMemoryWrite => "long_term_memory_write",
            Node::FormatResponse => "format_response",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the machine goes after a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Node(Node),
    End,
}

/// One edge of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Unconditional.
    Always,
    /// Taken when the decision authority emitted this command.
    OnCommand(Command),
    /// Taken when the model call returned `status = success`.
    ModelSucceeded,
    /// Taken when the model call returned anything else.
    ModelFailed,
    /// Taken when the result handler accepted the output.
    OutputAccepted,
    /// Taken when the result handler rejected the output.
    OutputRejected,
}

/// `(from, condition, to)`, evaluated in order; first match wins.
pub const TRANSITIONS: &[(Node, Edge, Next)] = &[
    (Node::Router, Edge::Always, Next::Node(Node::StateInit)),
    (Node::StateInit, Edge::Always, Next::Node(Node::DecisionAuthority)),
    (Node::DecisionAuthority, Edge::OnCommand(Command::Preprocess), Next::Node(Node::Preprocess)),
    (Node::DecisionAuthority, Edge::OnCommand(Command::CallModel), Next::Node(Node::MemoryRead)),
    (Node::DecisionAuthority, Edge::OnCommand(Command::Format), Next::Node(Node::MemoryWrite)),
    (Node::Preprocess, Edge::Always, Next::Node(Node::DecisionAuthority)),
    (Node::MemoryRead, Edge::Always, Next::Node(Node::LongTermMemoryRead)),
    (Node::LongTermMemoryRead, Edge::Always, Next::Node(Node::ModelCall)),
    (Node::ModelCall, Edge::ModelSucceeded, Next::Node(Node::ResultHandling)),
    (Node::ModelCall, Edge::ModelFailed, Next::Node(Node::ErrorRouter)),
    (Node::ResultHandling, Edge::OutputAccepted, Next::Node(Node::DecisionAuthority)),
    (Node::ResultHandling, Edge::OutputRejected, Next::Node(Node::ErrorRouter)),
    (Node::ErrorRouter, Edge::Always, Next::Node(Node::FormatResponse)),
    (Node::MemoryWrite, Edge::Always, Next::Node(Node::LongTermMemoryWrite)),
    (Node::LongTermMemoryWrite, Edge::Always, Next::Node(Node::FormatResponse)),
    (Node::FormatResponse, Edge::Always, Next::End),
];

impl Edge {
    fn matches(&self, state: &AgentState) -> bool {
        let model_ok = state
            .model_response
            .as_ref()
            .is_some_and(|r| r.status == ModelStatus::Success);

        match self {
            Edge::Always => true,
            Edge::OnCommand(c) => state.command == Some(*c),
            Edge::ModelSucceeded => model_ok,
            Edge::ModelFailed => !model_ok,
            Edge::OutputAccepted => state.final_output.is_some(),
            Edge::OutputRejected => state.final_output.is_none(),
        }
    }
}

/// Look up the successor of `from` for the current state.
///
/// # Errors
///
/// `AgentError::InvariantViolation` if no edge matches, which can only
/// happen when the decision authority left `command` unset.
pub fn next(from: Node, state: &AgentState) -> AgentResult<Next> {
    TRANSITIONS
        .iter()
        .find(|(node, edge, _)| *node == from && edge.matches(state))
        .map(|(_, _, to)| *to)
        .ok_or_else(|| AgentError::InvariantViolation {
            reason: format!("no transition from '{}' (command = {:?})", from, state.command),
        })
}
