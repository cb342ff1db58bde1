//! # sam-memory
//!
//! Reference memory stores for the SAM orchestrator.
//!
//! - [`InMemoryShortTermStore`]: session scratch keyed by conversation and key
//! - [`InMemoryFactStore`]: append-only long-term facts in a SHA-256 hash
//!   chain; tampering with any stored fact is detected by `verify_chain`
//!
//! Both enforce the authorization flag themselves: an `authorized = false`
//! request comes back `Unauthorized` and leaves stored data untouched.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sam_memory::{InMemoryFactStore, InMemoryShortTermStore};
//!
//! let facts = Arc::new(InMemoryFactStore::new());
//! let orchestrator = Orchestrator::builder()
//!     .short_term_memory(Arc::new(InMemoryShortTermStore::new()))
//!     .long_term_memory(facts.clone())
//!     .build();
//!
//! assert!(facts.verify_integrity());
//! ```

pub mod chain;
pub mod facts;
pub mod short_term;

pub use chain::{hash_record, verify_chain, FactRecord, GENESIS_HASH};
pub use facts::{FactLogExport, InMemoryFactStore, DEFAULT_MAX_FACTS_PER_USER};
pub use short_term::InMemoryShortTermStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
