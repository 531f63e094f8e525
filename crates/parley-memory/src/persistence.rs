//! Snapshot persistence for the memory store.
//!
//! The store is decoupled from storage through [`SnapshotBackend`]. A
//! snapshot is one JSON document:
//!
//! ```json
//! {
//!   "conversations": [ { "id": "...", "created_at": "2026-01-01T12:00:00Z", ... } ],
//!   "user_profile": { "total_turns": 12, "preferred_topics": { ... }, "context_usage_rate": 0.3 },
//!   "saved_at": "2026-01-01T12:00:05Z"
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MemoryError, Result};
use crate::types::{ConversationTurn, UserProfile};

/// Durable image of the store: recent turns plus the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Retained turns, oldest first.
    pub conversations: Vec<ConversationTurn>,
    /// Aggregate counters.
    pub user_profile: UserProfile,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
}

/// Storage for store snapshots.
///
/// Implementations must be `Send + Sync`; the store calls them from
/// whichever thread performs the add that triggers a snapshot.
pub trait SnapshotBackend: Send + Sync {
    /// Read the snapshot. `Ok(None)` means there is nothing to restore.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Write the snapshot, replacing any previous one.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Delete the snapshot if present.
    fn remove(&self) -> Result<()>;

    /// Whether a snapshot currently exists.
    fn exists(&self) -> bool;

    /// Where snapshots live, for diagnostics.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Backend that persists nothing. Useful for tests and ephemeral stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl SnapshotBackend for NoPersistence {
    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(None)
    }

    fn save(&self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        Ok(())
    }

    fn exists(&self) -> bool {
        false
    }
}

/// Backend writing pretty-printed JSON to a single file.
///
/// Writes go to a sibling temporary file that is renamed over the target,
/// so a crash mid-write never leaves a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend for the given snapshot path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "memory.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| MemoryError::io(&self.path, e))?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        debug!(
            path = %self.path.display(),
            turns = snapshot.conversations.len(),
            "Read snapshot"
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| MemoryError::io(parent, e))?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let temp = self.temp_path();
        std::fs::write(&temp, bytes).map_err(|e| MemoryError::io(&temp, e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| MemoryError::io(&self.path, e))?;

        debug!(
            path = %self.path.display(),
            turns = snapshot.conversations.len(),
            "Wrote snapshot"
        );
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MemoryError::io(&self.path, e)),
        }
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
