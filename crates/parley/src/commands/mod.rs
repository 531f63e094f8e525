//! CLI command handlers.

use std::path::PathBuf;

use anyhow::Result;
use parley_config::LoadedConfig;
use parley_memory::{JsonFileBackend, MemoryStore, StoreConfig};
use serde::Serialize;
use tracing::debug;

pub mod ask;
pub mod benchmark;
pub mod chat;
pub mod clear;
pub mod config;
pub mod export;
pub mod health;
pub mod history;
pub mod repl;
pub mod sort;
pub mod stats;
pub mod understand;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Merged configuration and where it came from.
    pub loaded: LoadedConfig,
}

impl Context {
    /// Store settings from the `[memory]` and `[recall]` sections.
    pub fn store_config(&self) -> StoreConfig {
        let memory = self.loaded.config.memory.clone().unwrap_or_default();
        let recall = self.loaded.config.recall.clone().unwrap_or_default();

        StoreConfig::new()
            .with_capacity(memory.capacity)
            .with_snapshot_every(memory.snapshot_every)
            .with_snapshot_retain(memory.snapshot_retain)
            .with_topic_index_bounds(memory.topic_index_cap, memory.topic_index_retain)
            .with_recall_window(recall.window)
            .with_recall_limit(recall.limit)
            .with_relevance_threshold(recall.threshold)
    }

    /// Where the memory snapshot lives.
    pub fn snapshot_path(&self) -> PathBuf {
        self.loaded
            .config
            .memory
            .clone()
            .unwrap_or_default()
            .effective_snapshot_path()
    }

    /// Open the memory store, restoring the snapshot if there is one.
    pub fn open_store(&self) -> MemoryStore {
        let path = self.snapshot_path();
        debug!(path = %path.display(), "Opening memory store");
        MemoryStore::open(self.store_config(), JsonFileBackend::new(path))
    }

    /// Print a value as pretty JSON on stdout.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Shorten to `max_chars` characters on one line.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_chars {
        s
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
