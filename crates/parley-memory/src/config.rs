//! Configuration for the memory store.

use crate::scoring::RelevanceWeights;

/// Default maximum number of retained turns.
pub const DEFAULT_CAPACITY: usize = 200;

/// Default number of most recent turns considered by recall.
pub const DEFAULT_RECALL_WINDOW: usize = 20;

/// Default maximum number of turns returned by recall.
pub const DEFAULT_RECALL_LIMIT: usize = 3;

/// Default relevance threshold. Candidates must score strictly above it.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.3;

/// Default snapshot cadence (every N successful adds).
pub const DEFAULT_SNAPSHOT_EVERY: usize = 10;

/// Default number of most recent turns written to a snapshot.
pub const DEFAULT_SNAPSHOT_RETAIN: usize = 50;

/// Per-topic index length that triggers compaction.
pub const DEFAULT_TOPIC_INDEX_CAP: usize = 50;

/// Per-topic index length kept after compaction.
pub const DEFAULT_TOPIC_INDEX_RETAIN: usize = 30;

/// Configuration for the memory store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Maximum number of turns retained before FIFO eviction.
    pub capacity: usize,

    /// How many of the most recent turns recall scores.
    pub recall_window: usize,

    /// Result cap used when a query does not set its own.
    pub recall_limit: usize,

    /// Candidates scoring at or below this value are discarded.
    pub relevance_threshold: f32,

    /// Component weights for relevance scoring.
    pub weights: RelevanceWeights,

    /// Write a snapshot after every N successful adds. Zero disables it.
    pub snapshot_every: usize,

    /// Maximum number of turns written to a snapshot.
    pub snapshot_retain: usize,

    /// Per-topic index length that triggers compaction.
    pub topic_index_cap: usize,

    /// Per-topic index length kept after compaction.
    pub topic_index_retain: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            recall_window: DEFAULT_RECALL_WINDOW,
            recall_limit: DEFAULT_RECALL_LIMIT,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            weights: RelevanceWeights::default(),
            snapshot_every: DEFAULT_SNAPSHOT_EVERY,
            snapshot_retain: DEFAULT_SNAPSHOT_RETAIN,
            topic_index_cap: DEFAULT_TOPIC_INDEX_CAP,
            topic_index_retain: DEFAULT_TOPIC_INDEX_RETAIN,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of retained turns. Clamped to at least one.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the recall candidate window.
    pub fn with_recall_window(mut self, window: usize) -> Self {
        self.recall_window = window;
        self
    }

    /// Set the default recall result cap.
    pub fn with_recall_limit(mut self, limit: usize) -> Self {
        self.recall_limit = limit;
        self
    }

    /// Set the relevance threshold.
    pub fn with_relevance_threshold(mut self, threshold: f32) -> Self {
        self.relevance_threshold = threshold;
        self
    }

    /// Set the relevance weights.
    pub fn with_weights(mut self, weights: RelevanceWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the snapshot cadence. Zero disables periodic snapshots.
    pub fn with_snapshot_every(mut self, every: usize) -> Self {
        self.snapshot_every = every;
        self
    }

    /// Set how many turns a snapshot keeps.
    pub fn with_snapshot_retain(mut self, retain: usize) -> Self {
        self.snapshot_retain = retain;
        self
    }

    /// Set the per-topic index bounds. `retain` is clamped to `cap`.
    pub fn with_topic_index_bounds(mut self, cap: usize, retain: usize) -> Self {
        self.topic_index_cap = cap.max(1);
        self.topic_index_retain = retain.min(self.topic_index_cap);
        self
    }
}
