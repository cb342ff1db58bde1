//! In-memory, append-only `LongTermMemory`.
//!
//! Facts are kept in a SHA-256 hash chain behind a `Mutex`. There is no
//! update or delete path. `verify_integrity()` re-checks the chain and
//! `export()` hands out a sealed copy.
//!
//! Each user may hold at most `max_facts_per_user` facts. Writes past the cap
//! fail; nothing already stored is evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use sam_contracts::memory::{
    FactQuery, FactQueryResponse, FactWriteRequest, FactWriteResponse, MemoryReadStatus,
    MemoryWriteStatus,
};
use sam_core::traits::LongTermMemory;

use crate::chain::{hash_record, verify_chain, FactRecord, GENESIS_HASH};

/// Per-user fact cap applied by [`InMemoryFactStore::new`].
pub const DEFAULT_MAX_FACTS_PER_USER: usize = 5000;

pub(crate) struct FactLog {
    pub(crate) records: Vec<FactRecord>,
    last_hash: String,
    last_created_at: Option<DateTime<Utc>>,
    per_user: HashMap<String, usize>,
}

/// Sealed copy of the fact log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactLogExport {
    pub records: Vec<FactRecord>,
    pub exported_at: DateTime<Utc>,
    /// `this_hash` of the last record; empty when the log is empty.
    pub terminal_hash: String,
}

/// Reference long-term store.
///
/// Clones share the same log.
#[derive(Clone)]
pub struct InMemoryFactStore {
    pub(crate) log: Arc<Mutex<FactLog>>,
    max_facts_per_user: usize,
}

impl Default for InMemoryFactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFactStore {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(FactLog {
                records: Vec::new(),
                last_hash: GENESIS_HASH.to_string(),
                last_created_at: None,
                per_user: HashMap::new(),
            })),
            max_facts_per_user: DEFAULT_MAX_FACTS_PER_USER,
        }
    }

    /// Replace the per-user fact cap.
    pub fn with_max_facts_per_user(mut self, max: usize) -> Self {
        self.max_facts_per_user = max;
        self
    }

    /// Total number of stored facts across all users.
    pub fn len(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-check the whole hash chain.
    pub fn verify_integrity(&self) -> bool {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        verify_chain(&log.records)
    }

    /// Copy the log along with its terminal hash.
    pub fn export(&self) -> FactLogExport {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        FactLogExport {
            records: log.records.clone(),
            exported_at: Utc::now(),
            terminal_hash: log.records.last().map(|r| r.this_hash.clone()).unwrap_or_default(),
        }
    }
}

fn reject(request: &FactWriteRequest) -> Option<String> {
    let fact = &request.fact;
    if request.user_id.trim().is_empty() {
        return Some("user_id must not be empty".to_string());
    }
    if fact.user_id != request.user_id {
        return Some(format!(
            "fact belongs to '{}' but request is for '{}'",
            fact.user_id, request.user_id
        ));
    }
    if fact.fact_type.trim().is_empty() {
        return Some("fact_type must not be empty".to_string());
    }
    if !(0.0..=1.0).contains(&fact.confidence) {
        return Some(format!("confidence {} outside [0, 1]", fact.confidence));
    }
    None
}

impl LongTermMemory for InMemoryFactStore {
    fn write_fact(&self, request: FactWriteRequest) -> FactWriteResponse {
        if !request.authorized {
            return FactWriteResponse::status(
                MemoryWriteStatus::Unauthorized,
                "long-term write not authorized",
            );
        }
        if let Some(reason) = reject(&request) {
            warn!(user_id = %request.user_id, %reason, "fact rejected");
            return FactWriteResponse::status(MemoryWriteStatus::Failed, reason);
        }

        let mut log = match self.log.lock() {
            Ok(log) => log,
            Err(e) => {
                return FactWriteResponse::status(
                    MemoryWriteStatus::Failed,
                    format!("fact log lock poisoned: {}", e),
                )
            }
        };

        let held = log.per_user.get(&request.user_id).copied().unwrap_or(0);
        if held >= self.max_facts_per_user {
            warn!(
                user_id = %request.user_id,
                held,
                max = self.max_facts_per_user,
                "fact rejected: per-user cap reached"
            );
            return FactWriteResponse::status(
                MemoryWriteStatus::Failed,
                format!("user '{}' already holds {} facts", request.user_id, held),
            );
        }

        // Store-assigned fields; caller values are discarded.
        let mut fact = request.fact;
        let fact_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let created_at = log.last_created_at.map_or(now, |last| last.max(now));
        fact.fact_id = Some(fact_id.clone());
        fact.created_at = Some(created_at);

        let sequence = log.records.len() as u64;
        let prev_hash = log.last_hash.clone();
        let this_hash = hash_record(sequence, &fact, &prev_hash);

        log.records.push(FactRecord { sequence, fact, prev_hash, this_hash: this_hash.clone() });
        log.last_hash = this_hash;
        log.last_created_at = Some(created_at);
        *log.per_user.entry(request.user_id.clone()).or_insert(0) += 1;

        debug!(user_id = %request.user_id, %fact_id, sequence, reason = %request.reason, "fact appended");
        FactWriteResponse::success(fact_id)
    }

    fn retrieve_facts(&self, query: &FactQuery) -> FactQueryResponse {
        if !query.authorized {
            return FactQueryResponse::status(
                MemoryReadStatus::Unauthorized,
                "long-term read not authorized",
            );
        }

        let log = match self.log.lock() {
            Ok(log) => log,
            Err(e) => {
                return FactQueryResponse::status(
                    MemoryReadStatus::Unavailable,
                    format!("fact log lock poisoned: {}", e),
                )
            }
        };

        // Records are already in append order, which is oldest first.
        let facts = log
            .records
            .iter()
            .map(|r| &r.fact)
            .filter(|f| f.user_id == query.user_id)
            .filter(|f| query.fact_types.as_ref().map_or(true, |types| types.contains(&f.fact_type)))
            .take(query.limit)
            .cloned()
            .collect();

        FactQueryResponse::success(facts)
    }
}
