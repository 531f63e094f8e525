//! The conversational memory store.
//!
//! The turn log, both indices and the profile live behind one
//! [`parking_lot::RwLock`], so no reader ever observes a half-evicted or
//! half-indexed state. Snapshot writes copy the state under the read lock
//! and perform file I/O after releasing it. Restoring is the exception: it
//! holds the write lock across the backend read so no concurrent add can be
//! overwritten by the restored image.

pub mod query;
mod recall;
mod report;

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::index::{Slot, TurnIndex};
use crate::persistence::{NoPersistence, Snapshot, SnapshotBackend};
use crate::types::{ConversationTurn, TurnId, UserProfile};
use crate::validation::validate_turn;

pub use query::{RecallMatch, RecallQuery};
pub use report::{
    ExportDocument, ExportInfo, ExportStatistics, HealthReport, HistoryEntry, HistoryPage,
    MAX_HISTORY_LIMIT, RecentActivity, StoreStats,
};

// ─────────────────────────────────────────────────────────────────────────────
// Store State
// ─────────────────────────────────────────────────────────────────────────────

/// Everything guarded by the store lock.
#[derive(Debug)]
struct StoreState {
    /// Retained turns, oldest first.
    turns: VecDeque<ConversationTurn>,
    /// Slot of `turns[0]`. Slot of `turns[i]` is `front_slot + i`.
    front_slot: Slot,
    index: TurnIndex,
    profile: UserProfile,
    /// Successful adds since the last periodic snapshot.
    adds_since_snapshot: usize,
    /// Bumped by every clear. A periodic snapshot scheduled under an older
    /// generation is dropped.
    generation: u64,
}

impl StoreState {
    fn new(config: &StoreConfig) -> Self {
        Self {
            turns: VecDeque::with_capacity(config.capacity.min(1024)),
            front_slot: 0,
            index: TurnIndex::new(config.topic_index_cap, config.topic_index_retain),
            profile: UserProfile::default(),
            adds_since_snapshot: 0,
            generation: 0,
        }
    }

    fn next_slot(&self) -> Slot {
        self.front_slot + self.turns.len() as Slot
    }

    fn by_slot(&self, slot: Slot) -> Option<&ConversationTurn> {
        let offset = slot.checked_sub(self.front_slot)?;
        self.turns.get(usize::try_from(offset).ok()?)
    }

    /// Append a turn, evicting the oldest first when full.
    fn append(&mut self, turn: ConversationTurn, capacity: usize) -> Option<ConversationTurn> {
        let evicted = if self.turns.len() >= capacity {
            self.evict_oldest()
        } else {
            None
        };

        let slot = self.next_slot();
        self.index.insert(slot, &turn);
        self.turns.push_back(turn);
        evicted
    }

    fn evict_oldest(&mut self) -> Option<ConversationTurn> {
        let turn = self.turns.pop_front()?;
        self.index.remove(self.front_slot, &turn);
        self.front_slot += 1;
        Some(turn)
    }

    fn reset(&mut self) {
        self.front_slot = 0;
        self.turns.clear();
        self.index.clear();
        self.profile = UserProfile::default();
        self.adds_since_snapshot = 0;
        self.generation += 1;
    }

    fn resolve(&self, slots: Vec<Slot>) -> Vec<ConversationTurn> {
        slots
            .into_iter()
            .filter_map(|slot| self.by_slot(slot).cloned())
            .collect()
    }

    fn snapshot(&self, retain: usize) -> Snapshot {
        let skip = self.turns.len().saturating_sub(retain);
        Snapshot {
            conversations: self.turns.iter().skip(skip).cloned().collect(),
            user_profile: self.profile.clone(),
            saved_at: Utc::now(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded conversational memory with relevance-ranked recall.
///
/// This store provides:
/// - FIFO eviction once `capacity` turns are retained
/// - Topic and keyword indices that never name an evicted turn
/// - Aggregate profile counters that survive eviction
/// - Periodic and explicit JSON snapshots through a [`SnapshotBackend`]
///
/// Cloning is cheap and yields a handle to the same store.
pub struct MemoryStore {
    inner: Arc<RwLock<StoreState>>,
    backend: Arc<dyn SnapshotBackend>,
    /// Serializes snapshot writers so an older image never overwrites a newer one.
    snapshot_lock: Arc<Mutex<()>>,
    config: StoreConfig,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("len", &self.len())
            .field("capacity", &self.config.capacity)
            .field("snapshot", &self.backend.location())
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Create an empty store that persists nothing.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_backend(config, NoPersistence)
    }

    /// Create an empty store over a snapshot backend without loading it.
    pub fn with_backend(config: StoreConfig, backend: impl SnapshotBackend + 'static) -> Self {
        let state = StoreState::new(&config);
        Self {
            inner: Arc::new(RwLock::new(state)),
            backend: Arc::new(backend),
            snapshot_lock: Arc::new(Mutex::new(())),
            config,
        }
    }

    /// Create a store and restore it from the backend.
    ///
    /// A missing or unreadable snapshot is logged and the store starts empty.
    pub fn open(config: StoreConfig, backend: impl SnapshotBackend + 'static) -> Self {
        let store = Self::with_backend(config, backend);
        match store.load() {
            Ok(restored) => {
                info!(turns = restored, "Memory store ready");
            }
            Err(e) => {
                warn!(error = %e, "Failed to restore memory snapshot, starting empty");
            }
        }
        store
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Maximum number of retained turns.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Number of retained turns.
    pub fn len(&self) -> usize {
        self.inner.read().turns.len()
    }

    /// Whether no turn is retained.
    pub fn is_empty(&self) -> bool {
        self.inner.read().turns.is_empty()
    }

    /// Record a conversation turn.
    ///
    /// The turn is validated before anything changes; a rejected turn leaves
    /// the store untouched. When the store is full the oldest turn is evicted
    /// and dropped from both indices. Every `snapshot_every` successful adds
    /// a snapshot is written; a failed write is logged and retried at the
    /// next cadence point.
    pub fn add(&self, turn: ConversationTurn) -> Result<()> {
        validate_turn(&turn)?;

        let due_generation = {
            let mut state = self.inner.write();
            state.profile.record(&turn);

            let id = turn.id;
            if let Some(evicted) = state.append(turn, self.config.capacity) {
                trace!(turn_id = %evicted.id, "Evicted oldest turn");
            }
            debug!(turn_id = %id, len = state.turns.len(), "Added turn to memory");

            state.adds_since_snapshot += 1;
            if self.config.snapshot_every > 0
                && state.adds_since_snapshot >= self.config.snapshot_every
            {
                state.adds_since_snapshot = 0;
                Some(state.generation)
            } else {
                None
            }
        };

        if let Some(generation) = due_generation
            && let Err(e) = self.save_generation(Some(generation))
        {
            warn!(error = %e, "Periodic memory snapshot failed");
        }

        Ok(())
    }

    /// Look up a retained turn by ID. With duplicate IDs the newest wins.
    pub fn get(&self, id: TurnId) -> Option<ConversationTurn> {
        let state = self.inner.read();
        state.turns.iter().rev().find(|t| t.id == id).cloned()
    }

    /// The newest `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ConversationTurn> {
        let state = self.inner.read();
        let skip = state.turns.len().saturating_sub(n);
        state.turns.iter().skip(skip).cloned().collect()
    }

    /// Every retained turn, oldest first.
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.inner.read().turns.iter().cloned().collect()
    }

    /// Turns indexed under a topic, oldest first.
    ///
    /// The topic index keeps a bounded recency window per topic, so this may
    /// return fewer turns than the log holds for that topic.
    pub fn turns_for_topic(&self, topic: &str) -> Vec<ConversationTurn> {
        let state = self.inner.read();
        let slots = state.index.topic_slots(topic);
        state.resolve(slots)
    }

    /// Turns carrying a keyword, oldest first.
    pub fn turns_for_keyword(&self, keyword: &str) -> Vec<ConversationTurn> {
        let state = self.inner.read();
        let slots = state.index.keyword_slots(keyword);
        state.resolve(slots)
    }

    /// Copy of the aggregate profile.
    pub fn profile(&self) -> UserProfile {
        self.inner.read().profile.clone()
    }

    /// Build a snapshot of the newest `snapshot_retain` turns and the profile.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.read().snapshot(self.config.snapshot_retain)
    }

    /// Write a snapshot through the backend, replacing the previous one.
    pub fn save(&self) -> Result<()> {
        self.save_generation(None).map(|_| ())
    }

    /// Write a snapshot unless the store was cleared after `expected` was
    /// observed. Returns whether anything was written.
    fn save_generation(&self, expected: Option<u64>) -> Result<bool> {
        let _writer = self.snapshot_lock.lock();
        let snapshot = {
            let state = self.inner.read();
            if let Some(generation) = expected
                && generation != state.generation
            {
                debug!("Store cleared since snapshot was scheduled, skipping");
                return Ok(false);
            }
            state.snapshot(self.config.snapshot_retain)
        };
        let count = snapshot.conversations.len();
        self.backend.save(&snapshot)?;
        info!(turns = count, "Memory snapshot saved");
        Ok(true)
    }

    /// Rebuild the store from the backend's snapshot.
    ///
    /// Turns are restored in their original order (only the newest
    /// `capacity` if the snapshot holds more) and re-indexed; the persisted
    /// profile is merged over a fresh one. Returns the number of restored
    /// turns. If there is no snapshot the store is left as is and `0` is
    /// returned; on any error the store is left as is and the error returned.
    ///
    /// The restored image replaces the live state wholesale. Adds issued
    /// while the snapshot is being read wait and land on top of it.
    pub fn load(&self) -> Result<usize> {
        let _writer = self.snapshot_lock.lock();
        let mut state = self.inner.write();

        let Some(snapshot) = self.backend.load()? else {
            debug!("No memory snapshot to restore");
            return Ok(0);
        };

        let mut restored = StoreState::new(&self.config);
        restored.generation = state.generation;
        let skip = snapshot
            .conversations
            .len()
            .saturating_sub(self.config.capacity);
        for turn in snapshot.conversations.into_iter().skip(skip) {
            validate_turn(&turn)?;
            restored.append(turn, self.config.capacity);
        }
        restored.profile.merge(snapshot.user_profile);

        let count = restored.turns.len();
        *state = restored;
        drop(state);

        info!(turns = count, saved_at = %snapshot.saved_at, "Restored memory snapshot");
        Ok(count)
    }

    /// Drop every turn, both indices and the profile, and delete the snapshot.
    ///
    /// The in-memory reset always happens; the returned error only reports a
    /// failure to delete the snapshot.
    pub fn clear(&self) -> Result<()> {
        let _writer = self.snapshot_lock.lock();
        {
            let mut state = self.inner.write();
            state.reset();
        }
        self.backend.remove()?;
        info!("Memory cleared");
        Ok(())
    }

    /// Final save before the process exits. Failures are logged.
    pub fn shutdown(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "Final memory snapshot failed");
        }
    }

    #[cfg(test)]
    fn indexed_turn_ids(&self) -> Vec<TurnId> {
        let state = self.inner.read();
        state
            .index
            .all_slots()
            .into_iter()
            .filter_map(|slot| state.by_slot(slot).map(|t| t.id))
            .collect()
    }

    #[cfg(test)]
    fn indexed_slot_count(&self) -> usize {
        self.inner.read().index.all_slots().len()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            backend: Arc::clone(&self.backend),
            snapshot_lock: Arc::clone(&self.snapshot_lock),
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests;
