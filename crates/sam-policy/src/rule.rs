//! Memory rule types and the policy document schema.
//!
//! A `PolicyConfig` is deserialized from TOML. It carries the orchestrator
//! settings and an ordered list of `MemoryRule`s. Rules are evaluated in
//! declaration order and the first matching rule wins. If no rule matches,
//! memory access is denied.

use serde::{Deserialize, Serialize};

use sam_contracts::{
    config::OrchestratorConfig,
    error::{AgentError, AgentResult},
    policy::MemoryOperation,
    state::InputType,
};

/// The decision a rule produces when it matches.
///
/// ```toml
/// verdict = "allow"
/// verdict = "deny"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleVerdict {
    Allow,
    Deny,
}

/// A single memory rule loaded from TOML.
///
/// `operation` is `"read"`, `"write"` or `"*"`. `input_type` is `"text"`,
/// `"audio"`, `"image"` or `"*"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRule {
    /// Stable identifier used in log lines and deny reasons.
    pub id: String,

    #[serde(default)]
    pub description: String,

    pub operation: String,

    #[serde(default = "wildcard")]
    pub input_type: String,

    pub verdict: RuleVerdict,

    /// Logged when `verdict = "deny"`.
    pub deny_reason: Option<String>,
}

fn wildcard() -> String {
    "*".to_string()
}

impl MemoryRule {
    /// Return true if this rule covers `operation` on `input_type`.
    ///
    /// `"*"` matches anything; otherwise the names must match exactly.
    pub fn matches(&self, operation: MemoryOperation, input_type: InputType) -> bool {
        let operation_matches = self.operation == "*" || self.operation == operation.as_str();
        let input_matches = self.input_type == "*" || self.input_type == input_type.as_str();
        operation_matches && input_matches
    }

    /// Reject patterns that could never match.
    pub(crate) fn validate(&self) -> AgentResult<()> {
        if !matches!(self.operation.as_str(), "*" | "read" | "write") {
            return Err(AgentError::ConfigError {
                reason: format!("rule '{}': unknown operation '{}'", self.id, self.operation),
            });
        }
        if !matches!(self.input_type.as_str(), "*" | "text" | "audio" | "image") {
            return Err(AgentError::ConfigError {
                reason: format!("rule '{}': unknown input_type '{}'", self.id, self.input_type),
            });
        }
        Ok(())
    }
}

/// The top-level structure of a policy file.
///
/// ```toml
/// [orchestrator]
/// model_task = "respond"
/// fact_limit = 5
///
/// [[rules]]
/// id = "allow-text-memory"
/// operation = "*"
/// input_type = "text"
/// verdict = "allow"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Ordered list of rules. First match wins.
    #[serde(default)]
    pub rules: Vec<MemoryRule>,
}
