//! TOML-driven memory policy.
//!
//! `TomlMemoryPolicy` loads a `PolicyConfig` from a TOML string or file and
//! implements `MemoryPolicy` from sam-core.
//!
//! Evaluation walks the rules in declaration order and applies the first
//! rule whose `operation` and `input_type` patterns match. No match means
//! `Deny`.

use std::path::Path;

use tracing::debug;

use sam_contracts::{
    config::OrchestratorConfig,
    error::{AgentError, AgentResult},
    policy::{MemoryAccessContext, MemoryVerdict},
};
use sam_core::traits::MemoryPolicy;

use crate::rule::{MemoryRule, PolicyConfig, RuleVerdict};

/// A `MemoryPolicy` read from a TOML document.
///
/// ```rust,ignore
/// use sam_policy::TomlMemoryPolicy;
///
/// let policy = TomlMemoryPolicy::from_file(Path::new("policies/default.toml"))?;
/// let orchestrator = Orchestrator::builder()
///     .config(policy.orchestrator_config().clone())
///     .policy(Arc::new(policy))
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TomlMemoryPolicy {
    config: PolicyConfig,
}

impl TomlMemoryPolicy {
    /// Parse `s` as a policy document.
    ///
    /// Returns `AgentError::ConfigError` if the TOML is malformed, does not
    /// match `PolicyConfig`, or a rule names an unknown operation or input
    /// type.
    pub fn from_toml_str(s: &str) -> AgentResult<Self> {
        let config: PolicyConfig = toml::from_str(s).map_err(|e| AgentError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        for rule in &config.rules {
            rule.validate()?;
        }
        Ok(Self { config })
    }

    /// Read the file at `path` and parse it as a policy document.
    pub fn from_file(path: &Path) -> AgentResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AgentError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The `[orchestrator]` table, defaulted when absent.
    pub fn orchestrator_config(&self) -> &OrchestratorConfig {
        &self.config.orchestrator
    }

    pub fn rules(&self) -> &[MemoryRule] {
        &self.config.rules
    }
}

impl MemoryPolicy for TomlMemoryPolicy {
    fn evaluate(&self, ctx: &MemoryAccessContext) -> MemoryVerdict {
        let operation = ctx.operation.as_str();
        let input_type = ctx.input_type.as_str();

        let Some(rule) = self
            .config
            .rules
            .iter()
            .find(|r| r.matches(ctx.operation, ctx.input_type))
        else {
            debug!(operation, input_type, "no memory rule matched; denying by default");
            return MemoryVerdict::Deny {
                reason: format!(
                    "denied by default: no memory rule matched {} on {} input",
                    operation, input_type
                ),
            };
        };

        debug!(rule_id = %rule.id, operation, input_type, verdict = ?rule.verdict, "memory rule matched");

        match rule.verdict {
            RuleVerdict::Allow => MemoryVerdict::Allow,
            RuleVerdict::Deny => MemoryVerdict::Deny {
                reason: rule
                    .deny_reason
                    .clone()
                    .unwrap_or_else(|| format!("denied by rule '{}'", rule.id)),
            },
        }
    }
}
