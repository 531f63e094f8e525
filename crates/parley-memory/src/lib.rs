//! Conversational memory for Parley.
//!
//! This crate keeps a size-bounded, insertion-ordered log of conversation
//! turns and answers "what did we talk about that relates to this?" queries
//! against it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MemoryStore                                                            │
//! │  - FIFO log of ConversationTurn (bounded by capacity)                   │
//! │  - Topic index + keyword index (pruned on eviction)                     │
//! │  - UserProfile aggregate counters                                       │
//! │  - Relevance-ranked recall over the most recent window                  │
//! │  - JSON snapshots through a SnapshotBackend                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use parley_memory::{ConversationTurn, JsonFileBackend, MemoryStore, RecallQuery, StoreConfig};
//!
//! let config = StoreConfig::new().with_capacity(200);
//! let store = MemoryStore::open(config, JsonFileBackend::new("memory.json"));
//!
//! let turn = ConversationTurn::new("how do I sort a list?", "Use a sort routine.", "programming")
//!     .with_keywords(["sort", "question"])
//!     .with_confidence(0.9)
//!     .with_importance(0.7);
//! store.add(turn)?;
//!
//! let query = RecallQuery::new("sorting algorithms", "programming")
//!     .with_keywords(["sort", "algorithm"]);
//! for turn in store.query(&query) {
//!     println!("{}: {}", turn.id, turn.user_text);
//! }
//! # Ok::<(), parley_memory::MemoryError>(())
//! ```

pub mod config;
pub mod error;
mod index;
pub mod persistence;
pub mod scoring;
pub mod store;
pub mod types;
pub mod validation;

pub use config::StoreConfig;
pub use error::{MemoryError, Result};
pub use persistence::{JsonFileBackend, NoPersistence, Snapshot, SnapshotBackend};
pub use scoring::{RelevanceWeights, jaccard, time_decay};
pub use store::{
    ExportDocument, ExportInfo, ExportStatistics, HealthReport, HistoryEntry, HistoryPage, MAX_HISTORY_LIMIT, MemoryStore,
    RecallMatch, RecallQuery, RecentActivity, StoreStats,
};
pub use types::{ConversationTurn, TurnId, UserProfile};
pub use validation::{ValidationError, validate_score, validate_turn};
