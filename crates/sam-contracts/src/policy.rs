//! Memory access policy types.
//!
//! The decision authority builds a `MemoryAccessContext` from state and asks
//! the configured policy for a `MemoryVerdict`. Only `Allow` ever raises an
//! authorization flag; memory is deny-by-default.

use serde::{Deserialize, Serialize};

use crate::state::InputType;

/// Which side of a memory node-pair is being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryOperation {
    Read,
    Write,
}

impl MemoryOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryOperation::Read => "read",
            MemoryOperation::Write => "write",
        }
    }
}

/// Everything a memory policy may look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryAccessContext {
    pub operation: MemoryOperation,
    pub input_type: InputType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryVerdict {
    Allow,
    Deny {
        /// Human-readable explanation, logged at debug level.
        reason: String,
    },
}

impl MemoryVerdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, MemoryVerdict::Allow)
    }
}
