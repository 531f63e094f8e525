//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [memory]                 # store capacity and snapshots
//! [recall]                 # relevance-ranked recall
//! [logging]                # log file location
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Application name for platform directory resolution.
pub(crate) const APP_NAME: &str = "parley";

/// Snapshot file name inside the data directory.
const SNAPSHOT_FILE: &str = "memory.json";

/// Log directory name inside the config directory.
const LOG_DIR: &str = "logs";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    /// Memory store configuration.
    pub memory: Option<MemorySection>,

    /// Recall configuration.
    pub recall: Option<RecallSection>,

    /// Logging configuration.
    pub logging: Option<LoggingSection>,
}

impl ParleyConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole.
    pub fn merge(&mut self, other: ParleyConfig) {
        if other.memory.is_some() {
            self.memory = other.memory;
        }

        if other.recall.is_some() {
            self.recall = other.recall;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// A copy with every section filled in, for display.
    pub fn resolved(&self) -> Self {
        Self {
            memory: Some(self.memory.clone().unwrap_or_default()),
            recall: Some(self.recall.clone().unwrap_or_default()),
            logging: Some(self.logging.clone().unwrap_or_default()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Memory store configuration.
///
/// ```toml
/// [memory]
/// capacity = 200
/// snapshot_path = "~/.local/share/parley/memory.json"
/// snapshot_every = 10
/// snapshot_retain = 50
/// topic_index_cap = 50
/// topic_index_retain = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySection {
    /// Maximum retained turns.
    pub capacity: usize,
    /// Snapshot file. Defaults to `<data dir>/parley/memory.json`.
    pub snapshot_path: Option<PathBuf>,
    /// Write a snapshot every N adds (0 disables periodic snapshots).
    pub snapshot_every: usize,
    /// Newest turns written to a snapshot.
    pub snapshot_retain: usize,
    /// Per-topic index length that triggers compaction.
    pub topic_index_cap: usize,
    /// Per-topic index length after compaction.
    pub topic_index_retain: usize,
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            capacity: 200,
            snapshot_path: None,
            snapshot_every: 10,
            snapshot_retain: 50,
            topic_index_cap: 50,
            topic_index_retain: 30,
        }
    }
}

impl MemorySection {
    /// Configured snapshot path, or the platform default.
    pub fn effective_snapshot_path(&self) -> PathBuf {
        self.snapshot_path.clone().unwrap_or_else(default_snapshot_path)
    }
}

/// `<data dir>/parley/memory.json`, or `./parley-memory.json` without a data dir.
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_NAME).join(SNAPSHOT_FILE))
        .unwrap_or_else(|| PathBuf::from(format!("{APP_NAME}-{SNAPSHOT_FILE}")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Recall Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// ```toml
/// [recall]
/// window = 20
/// limit = 3
/// threshold = 0.3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallSection {
    /// Most recent turns considered as candidates.
    pub window: usize,
    /// Default number of recalled turns.
    pub limit: usize,
    /// Scores must exceed this to be recalled (0.0–1.0).
    pub threshold: f32,
}

impl Default for RecallSection {
    fn default() -> Self {
        Self {
            window: 20,
            limit: 3,
            threshold: 0.3,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Directory for rolling JSON log files. Defaults to `<config dir>/logs`.
    pub directory: Option<PathBuf>,
}

impl LoggingSection {
    /// Configured log directory, or `logs/` under `config_dir`.
    pub fn effective_directory(&self, config_dir: Option<&Path>) -> Option<PathBuf> {
        self.directory
            .clone()
            .or_else(|| config_dir.map(|d| d.join(LOG_DIR)))
    }
}
