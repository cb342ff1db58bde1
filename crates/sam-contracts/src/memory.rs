//! Memory boundary contracts: short-term scratch and long-term facts.
//!
//! Both tiers share one rule: authorization travels in the request as a
//! plain flag chosen by the decision authority. Stores never infer it, and
//! an `authorized = false` request must come back `Unauthorized` without
//! touching stored data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a memory read (either tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryReadStatus {
    Success,
    NotFound,
    Unavailable,
    Unauthorized,
}

/// Status of a memory write (either tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryWriteStatus {
    Success,
    Failed,
    Unauthorized,
}

// ── Short-term ───────────────────────────────────────────────────────────────

/// Read one key of session-scoped scratch data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryReadRequest {
    pub conversation_id: String,
    pub key: String,
    pub authorized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryReadResponse {
    pub status: MemoryReadStatus,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl MemoryReadResponse {
    /// A successful read carrying `data`.
    pub fn success(data: Value) -> Self {
        Self { status: MemoryReadStatus::Success, data: Some(data), error: None }
    }

    /// A read with no data and the given status and error text.
    pub fn status(status: MemoryReadStatus, error: impl Into<String>) -> Self {
        Self { status, data: None, error: Some(error.into()) }
    }
}

/// Write one key of session-scoped scratch data.
///
/// `data` is restricted to scratch content (turn counters, timestamps,
/// message metadata). It must never carry raw prompts or outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryWriteRequest {
    pub conversation_id: String,
    pub key: String,
    pub data: Value,
    pub authorized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryWriteResponse {
    pub status: MemoryWriteStatus,
    pub error: Option<String>,
}

impl MemoryWriteResponse {
    /// A successful write.
    pub fn success() -> Self {
        Self { status: MemoryWriteStatus::Success, error: None }
    }

    /// A write that did not happen, with the given status and error text.
    pub fn status(status: MemoryWriteStatus, error: impl Into<String>) -> Self {
        Self { status, error: Some(error.into()) }
    }
}

// ── Long-term ────────────────────────────────────────────────────────────────

/// A stable, append-only fact.
///
/// `fact_id` and `created_at` are assigned by the store on write; values
/// supplied by the caller are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFact {
    /// Category, e.g. "preference", "interaction_summary".
    pub fact_type: String,
    /// Opaque structured payload.
    pub content: Value,
    /// Whose fact this is.
    pub user_id: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Where the fact came from.
    pub source: String,
    pub fact_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl MemoryFact {
    /// A new, unstored fact with confidence 1.0 and source "conversation".
    pub fn new(fact_type: impl Into<String>, content: Value, user_id: impl Into<String>) -> Self {
        Self {
            fact_type: fact_type.into(),
            content,
            user_id: user_id.into(),
            confidence: 1.0,
            source: "conversation".to_string(),
            fact_id: None,
            created_at: None,
        }
    }
}

/// Append one fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactWriteRequest {
    pub user_id: String,
    pub fact: MemoryFact,
    pub authorized: bool,
    /// Why the fact is being written. Kept for store-side auditing.
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactWriteResponse {
    pub status: MemoryWriteStatus,
    pub fact_id: Option<String>,
    pub error: Option<String>,
}

impl FactWriteResponse {
    /// An appended fact and the id the store assigned it.
    pub fn success(fact_id: impl Into<String>) -> Self {
        Self { status: MemoryWriteStatus::Success, fact_id: Some(fact_id.into()), error: None }
    }

    /// A fact that was not appended, with the given status and error text.
    pub fn status(status: MemoryWriteStatus, error: impl Into<String>) -> Self {
        Self { status, fact_id: None, error: Some(error.into()) }
    }
}

/// Retrieve facts for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactQuery {
    pub user_id: String,
    /// Restrict to these types; `None` means all types.
    pub fact_types: Option<Vec<String>>,
    pub limit: usize,
    pub authorized: bool,
}

/// Retrieved facts, ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactQueryResponse {
    pub status: MemoryReadStatus,
    pub facts: Vec<MemoryFact>,
    pub error: Option<String>,
}

impl FactQueryResponse {
    pub fn success(facts: Vec<MemoryFact>) -> Self {
        Self { status: MemoryReadStatus::Success, facts, error: None }
    }

    pub fn status(status: MemoryReadStatus, error: impl Into<String>) -> Self {
        Self { status, facts: Vec::new(), error: Some(error.into()) }
    }
}
