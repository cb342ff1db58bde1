//! Hash-chain primitives for the fact log.
//!
//! Hash input layout (bytes, in order):
//!   1. sequence as 8-byte little-endian
//!   2. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   3. canonical JSON of the stored fact

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use sam_contracts::memory::MemoryFact;

/// The `prev_hash` of the first record. 64 hex zeros.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// One appended fact and its position in the chain.
///
/// `fact` is stored with its assigned `fact_id` and `created_at`, so both
/// are covered by `this_hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    pub sequence: u64,
    pub fact: MemoryFact,
    pub prev_hash: String,
    pub this_hash: String,
}

/// Lowercase hex SHA-256 over `(sequence, prev_hash, fact)`.
///
/// # Panics
///
/// Panics if `fact` cannot be serialized to JSON. A `MemoryFact` holds only
/// strings, numbers, timestamps and JSON values, so this cannot happen.
pub fn hash_record(sequence: u64, fact: &MemoryFact, prev_hash: &str) -> String {
    let fact_json = serde_json::to_vec(fact).expect("MemoryFact must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&fact_json);

    hex::encode(hasher.finalize())
}

/// True when every record links to its predecessor and its hash recomputes.
///
/// An empty chain is valid.
pub fn verify_chain(records: &[FactRecord]) -> bool {
    let mut expected_prev = GENESIS_HASH.to_string();

    for (idx, record) in records.iter().enumerate() {
        if record.sequence != idx as u64 || record.prev_hash != expected_prev {
            return false;
        }
        if record.this_hash != hash_record(record.sequence, &record.fact, &record.prev_hash) {
            return false;
        }
        expected_prev = record.this_hash.clone();
    }

    true
}
