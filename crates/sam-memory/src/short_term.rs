//! In-memory `ShortTermMemory`.
//!
//! One JSON value per `(conversation_id, key)`. Writes replace the value for
//! that key; scratch data is session state, not a log.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::warn;

use sam_contracts::memory::{
    MemoryReadRequest, MemoryReadResponse, MemoryReadStatus, MemoryWriteRequest,
    MemoryWriteResponse, MemoryWriteStatus,
};
use sam_core::traits::ShortTermMemory;

/// Top-level keys that mark a payload as raw conversation text.
pub const RAW_CONTENT_KEYS: &[&str] = &["prompt", "output", "final_output", "raw_input"];

/// Reference short-term store.
///
/// With `deny_raw_content` set, writes carrying any of `RAW_CONTENT_KEYS`
/// fail instead of being stored. Clones share the same map.
#[derive(Clone, Default)]
pub struct InMemoryShortTermStore {
    entries: Arc<Mutex<HashMap<(String, String), Value>>>,
    deny_raw_content: bool,
}

impl InMemoryShortTermStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_raw_content(mut self, deny: bool) -> Self {
        self.deny_raw_content = deny;
        self
    }

    /// Direct lookup, bypassing authorization. For inspection only.
    pub fn peek(&self, conversation_id: &str, key: &str) -> Option<Value> {
        let entries = self.entries.lock().ok()?;
        entries.get(&(conversation_id.to_string(), key.to_string())).cloned()
    }
}

fn carries_raw_content(data: &Value) -> bool {
    data.as_object()
        .is_some_and(|map| RAW_CONTENT_KEYS.iter().any(|k| map.contains_key(*k)))
}

impl ShortTermMemory for InMemoryShortTermStore {
    fn read(&self, request: &MemoryReadRequest) -> MemoryReadResponse {
        if !request.authorized {
            return MemoryReadResponse::status(
                MemoryReadStatus::Unauthorized,
                "short-term read not authorized",
            );
        }

        let Ok(entries) = self.entries.lock() else {
            return MemoryReadResponse::status(MemoryReadStatus::Unavailable, "store lock poisoned");
        };
        match entries.get(&(request.conversation_id.clone(), request.key.clone())) {
            Some(data) => MemoryReadResponse::success(data.clone()),
            None => MemoryReadResponse::status(
                MemoryReadStatus::NotFound,
                format!("no '{}' for conversation {}", request.key, request.conversation_id),
            ),
        }
    }

    fn write(&self, request: &MemoryWriteRequest) -> MemoryWriteResponse {
        if !request.authorized {
            return MemoryWriteResponse::status(
                MemoryWriteStatus::Unauthorized,
                "short-term write not authorized",
            );
        }
        if self.deny_raw_content && carries_raw_content(&request.data) {
            warn!(conversation_id = %request.conversation_id, key = %request.key, "raw content refused");
            return MemoryWriteResponse::status(
                MemoryWriteStatus::Failed,
                "raw prompts and outputs may not be stored",
            );
        }

        let Ok(mut entries) = self.entries.lock() else {
            return MemoryWriteResponse::status(MemoryWriteStatus::Failed, "store lock poisoned");
        };
        entries.insert(
            (request.conversation_id.clone(), request.key.clone()),
            request.data.clone(),
        );
        MemoryWriteResponse::success()
    }
}
