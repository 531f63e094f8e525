use std::sync::mpsc;
use std::time::Duration;

use chrono::TimeDelta;
use tempfile::TempDir;

use super::*;
use crate::error::MemoryError;
use crate::persistence::JsonFileBackend;
use crate::validation::ValidationError;

fn turn(text: &str, topic: &str, keywords: &[&str]) -> ConversationTurn {
    ConversationTurn::new(text, format!("answer to {text}"), topic)
        .with_keywords(keywords.iter().copied())
        .with_confidence(0.8)
        .with_importance(0.5)
}

fn quiet_config(capacity: usize) -> StoreConfig {
    StoreConfig::new()
        .with_capacity(capacity)
        .with_snapshot_every(0)
}

fn texts(turns: &[ConversationTurn]) -> Vec<&str> {
    turns.iter().map(|t| t.user_text.as_str()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Eviction and indices
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fifo_eviction_keeps_newest() {
    let store = MemoryStore::new(quiet_config(3));
    let t1 = turn("t1", "programming", &["python"]);
    let t1_id = t1.id;

    store.add(t1).unwrap();
    store.add(turn("t2", "science", &["atom"])).unwrap();
    store.add(turn("t3", "programming", &["code"])).unwrap();
    store.add(turn("t4", "business", &["market"])).unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(texts(&store.turns()), vec!["t2", "t3", "t4"]);
    assert!(store.get(t1_id).is_none());
    assert!(store.turns_for_keyword("python").is_empty());
    assert_eq!(texts(&store.turns_for_topic("programming")), vec!["t3"]);
    assert!(!store.indexed_turn_ids().contains(&t1_id));
}

#[test]
fn test_len_never_exceeds_capacity() {
    let store = MemoryStore::new(quiet_config(5));
    for i in 0..23 {
        store
            .add(turn(&format!("t{i}"), "general", &["question"]))
            .unwrap();
        assert!(store.len() <= 5);
    }
    assert_eq!(
        texts(&store.turns()),
        vec!["t18", "t19", "t20", "t21", "t22"]
    );
}

#[test]
fn test_indices_only_reference_retained_turns() {
    let store = MemoryStore::new(quiet_config(4));
    let topics = ["programming", "science", "business"];
    let keywords = ["sort", "atom", "market", "question"];

    for i in 0..40 {
        let t = turn(
            &format!("t{i}"),
            topics[i % topics.len()],
            &[keywords[i % keywords.len()], keywords[(i + 1) % keywords.len()]],
        );
        store.add(t).unwrap();

        let retained: Vec<TurnId> = store.turns().iter().map(|t| t.id).collect();
        // Every indexed slot resolves to a retained turn.
        assert_eq!(store.indexed_turn_ids().len(), store.indexed_slot_count());
        for id in store.indexed_turn_ids() {
            assert!(retained.contains(&id));
        }
        for keyword in keywords {
            for t in store.turns_for_keyword(keyword) {
                assert!(retained.contains(&t.id));
            }
        }
    }
}

#[test]
fn test_duplicate_ids_are_not_deduplicated() {
    let store = MemoryStore::new(quiet_config(10));
    let id = TurnId::new();
    store
        .add(turn("first", "general", &["x"]).with_id(id))
        .unwrap();
    store
        .add(turn("second", "general", &["x"]).with_id(id))
        .unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.turns_for_keyword("x").len(), 2);
    assert_eq!(store.get(id).unwrap().user_text, "second");
}

#[test]
fn test_invalid_turn_leaves_store_untouched() {
    let store = MemoryStore::new(quiet_config(10));
    store.add(turn("ok", "general", &["x"])).unwrap();
    let before = store.profile();

    let err = store
        .add(turn("bad", "general", &["y"]).with_confidence(1.5))
        .unwrap_err();
    assert!(matches!(
        err,
        MemoryError::Validation(ValidationError::ScoreOutOfRange { .. })
    ));

    assert_eq!(store.len(), 1);
    assert!(store.turns_for_keyword("y").is_empty());
    assert_eq!(store.profile(), before);
}

#[test]
fn test_profile_survives_eviction() {
    let store = MemoryStore::new(quiet_config(2));
    for i in 0..5 {
        store
            .add(turn(&format!("t{i}"), "science", &[]).with_context(i % 2))
            .unwrap();
    }
    let profile = store.profile();
    assert_eq!(profile.total_turns, 5);
    assert_eq!(profile.preferred_topics["science"], 5);
    assert!(profile.context_usage_rate > 0.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Recall
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_query_worked_example() {
    let store = MemoryStore::new(quiet_config(10));
    let now = Utc::now();
    store
        .add(turn("how do I sort data?", "programming", &["sort", "data"]).with_created_at(now))
        .unwrap();

    let query = RecallQuery::new("sorting algorithm", "programming")
        .with_keywords(["sort", "algorithm"]);
    let matches = store.recall_at(&query, now);

    assert_eq!(matches.len(), 1);
    assert!((matches[0].score - 0.6717).abs() < 1e-3);
    assert_eq!(store.query_at(&query, now)[0].user_text, "how do I sort data?");
}

#[test]
fn test_query_respects_limit_and_threshold() {
    let store = MemoryStore::new(quiet_config(50));
    let now = Utc::now();
    for i in 0..10 {
        store
            .add(turn(&format!("p{i}"), "programming", &["code"]).with_created_at(now))
            .unwrap();
    }
    // Old, off-topic, unimportant: 0.25 * 0.3 + 0.1 * 0.2 = 0.095, below threshold.
    store
        .add(
            turn("stale", "business", &[])
                .with_importance(0.0)
                .with_confidence(0.2)
                .with_created_at(now - TimeDelta::days(3)),
        )
        .unwrap();

    let query = RecallQuery::new("code?", "programming").with_keywords(["code"]);
    let results = store.recall_at(&query, now);
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|m| m.score > 0.3));

    let query = RecallQuery::new("anything", "creative").with_limit(50);
    let results = store.recall_at(&query, now);
    assert!(results.iter().all(|m| m.turn.user_text != "stale"));
    assert!(results.len() <= 50);

    let none = RecallQuery::new("code?", "programming").with_limit(0);
    assert!(store.recall_at(&none, now).is_empty());
}

#[test]
fn test_query_only_scans_recent_window() {
    let store = MemoryStore::new(quiet_config(100).with_recall_window(5));
    let now = Utc::now();
    store
        .add(turn("needle", "science", &["quantum"]).with_created_at(now))
        .unwrap();
    for i in 0..5 {
        store
            .add(
                turn(&format!("filler{i}"), "business", &[])
                    .with_importance(0.0)
                    .with_confidence(0.0)
                    .with_created_at(now - TimeDelta::days(2)),
            )
            .unwrap();
    }

    let query = RecallQuery::new("quantum?", "science").with_keywords(["quantum"]);
    assert!(store.query_at(&query, now).is_empty());
}

#[test]
fn test_ties_prefer_recent_turns() {
    let store = MemoryStore::new(quiet_config(10));
    let now = Utc::now();
    for name in ["older", "newer"] {
        store
            .add(turn(name, "science", &["atom"]).with_created_at(now))
            .unwrap();
    }
    let query = RecallQuery::new("atoms", "science")
        .with_keywords(["atom"])
        .with_limit(1);
    assert_eq!(texts(&store.query_at(&query, now)), vec!["newer"]);
}

#[test]
fn test_query_orders_by_score() {
    let store = MemoryStore::new(quiet_config(10));
    let now = Utc::now();
    store
        .add(turn("exact", "science", &["atom", "physics"]).with_created_at(now))
        .unwrap();
    store
        .add(turn("partial", "science", &["atom", "cell"]).with_created_at(now))
        .unwrap();

    let query = RecallQuery::new("atom physics", "science").with_keywords(["atom", "physics"]);
    let matches = store.recall_at(&query, now);
    assert_eq!(matches[0].turn.user_text, "exact");
    assert!(matches[0].score >= matches[1].score);
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_save_and_reopen_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");

    let store = MemoryStore::open(quiet_config(200), JsonFileBackend::new(&path));
    for i in 0..60 {
        store
            .add(turn(&format!("t{i}"), "mathematics", &["math"]).with_context(i % 3))
            .unwrap();
    }
    store.save().unwrap();
    let expected_turns = store.recent(50);
    let expected_profile = store.profile();

    let reopened = MemoryStore::open(quiet_config(200), JsonFileBackend::new(&path));
    assert_eq!(reopened.len(), 50);
    assert_eq!(reopened.turns(), expected_turns);
    assert_eq!(reopened.profile(), expected_profile);
    assert_eq!(reopened.turns_for_keyword("math").len(), 50);
}

#[test]
fn test_load_truncates_to_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");

    let big = MemoryStore::with_backend(quiet_config(20), JsonFileBackend::new(&path));
    for i in 0..20 {
        big.add(turn(&format!("t{i}"), "general", &[])).unwrap();
    }
    big.save().unwrap();

    let small = MemoryStore::open(quiet_config(3), JsonFileBackend::new(&path));
    assert_eq!(texts(&small.turns()), vec!["t17", "t18", "t19"]);
    assert_eq!(small.profile().total_turns, 20);
}

#[test]
fn test_periodic_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");
    let config = StoreConfig::new().with_snapshot_every(3);
    let store = MemoryStore::with_backend(config, JsonFileBackend::new(&path));

    store.add(turn("a", "general", &[])).unwrap();
    store.add(turn("b", "general", &[])).unwrap();
    assert!(!path.exists());

    store.add(turn("c", "general", &[])).unwrap();
    assert!(path.exists());

    let restored = MemoryStore::open(StoreConfig::new(), JsonFileBackend::new(&path));
    assert_eq!(restored.len(), 3);
}

#[test]
fn test_malformed_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");
    std::fs::write(&path, r#"{"conversations": [{"id": 7}]}"#).unwrap();

    let store = MemoryStore::open(quiet_config(10), JsonFileBackend::new(&path));
    assert!(store.is_empty());
    assert_eq!(store.profile(), UserProfile::default());
}

#[test]
fn test_failed_load_keeps_prior_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");
    let store = MemoryStore::with_backend(quiet_config(10), JsonFileBackend::new(&path));
    store.add(turn("kept", "general", &[])).unwrap();

    std::fs::write(&path, "garbage").unwrap();
    assert!(store.load().is_err());
    assert_eq!(texts(&store.turns()), vec!["kept"]);
}

#[test]
fn test_save_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    // A directory where the snapshot file should be makes the rename fail.
    let path = dir.path().join("memory.json");
    std::fs::create_dir(&path).unwrap();

    let store = MemoryStore::with_backend(
        StoreConfig::new().with_snapshot_every(1),
        JsonFileBackend::new(&path),
    );
    // Periodic save fails but add still succeeds.
    store.add(turn("a", "general", &[])).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.save().is_err());
}

#[test]
fn test_snapshot_scheduled_before_clear_is_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");
    let store = MemoryStore::with_backend(quiet_config(10), JsonFileBackend::new(&path));
    store.add(turn("before", "general", &[])).unwrap();

    let scheduled = store.inner.read().generation;
    store.clear().unwrap();
    assert!(!store.save_generation(Some(scheduled)).unwrap());
    assert!(!path.exists());

    store.add(turn("after", "general", &[])).unwrap();
    let current = store.inner.read().generation;
    assert!(store.save_generation(Some(current)).unwrap());
    let reopened = MemoryStore::open(quiet_config(10), JsonFileBackend::new(&path));
    assert_eq!(texts(&reopened.turns()), vec!["after"]);
}

/// Serves a fixed snapshot slowly and reports when a read has started.
struct SlowBackend {
    snapshot: Snapshot,
    started: Mutex<Option<mpsc::Sender<()>>>,
}

impl SnapshotBackend for SlowBackend {
    fn load(&self) -> Result<Option<Snapshot>> {
        if let Some(started) = self.started.lock().take() {
            started.send(()).unwrap();
        }
        std::thread::sleep(Duration::from_millis(200));
        Ok(Some(self.snapshot.clone()))
    }

    fn save(&self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        Ok(())
    }

    fn exists(&self) -> bool {
        true
    }
}

#[test]
fn test_add_during_load_is_kept() {
    let source = MemoryStore::new(quiet_config(10));
    source.add(turn("saved", "general", &[])).unwrap();

    let (started, reading) = mpsc::channel();
    let store = MemoryStore::with_backend(
        quiet_config(10),
        SlowBackend {
            snapshot: source.snapshot(),
            started: Mutex::new(Some(started)),
        },
    );

    let loader = {
        let store = store.clone();
        std::thread::spawn(move || store.load().unwrap())
    };
    reading.recv().unwrap();
    store.add(turn("concurrent", "general", &[])).unwrap();

    assert_eq!(loader.join().unwrap(), 1);
    assert_eq!(texts(&store.turns()), vec!["saved", "concurrent"]);
    assert_eq!(store.profile().total_turns, 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Clear
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_clear_resets_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");
    let store = MemoryStore::with_backend(quiet_config(10), JsonFileBackend::new(&path));
    let now = Utc::now();

    for i in 0..4 {
        store
            .add(turn(&format!("t{i}"), "science", &["atom"]).with_created_at(now))
            .unwrap();
    }
    store.save().unwrap();
    store.clear().unwrap();

    assert!(store.is_empty());
    assert!(!path.exists());
    assert_eq!(store.profile(), UserProfile::default());
    assert!(store.turns_for_topic("science").is_empty());

    let query = RecallQuery::new("atom", "science").with_keywords(["atom"]);
    assert!(store.query_at(&query, now).is_empty());

    store
        .add(turn("fresh", "science", &["atom"]).with_created_at(now))
        .unwrap();
    assert_eq!(store.profile().total_turns, 1);
    assert_eq!(texts(&store.turns_for_keyword("atom")), vec!["fresh"]);
    assert_eq!(texts(&store.query_at(&query, now)), vec!["fresh"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Reports and concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_history_and_stats() {
    let store = MemoryStore::new(quiet_config(10));
    let now = Utc::now();
    store
        .add(turn("a", "science", &["atom"]).with_created_at(now))
        .unwrap();
    store
        .add(
            turn("b", "business", &["market", "atom"])
                .with_context(1)
                .with_created_at(now - TimeDelta::days(3)),
        )
        .unwrap();
    store
        .add(turn("c", "science", &["cell"]).with_created_at(now - TimeDelta::days(10)))
        .unwrap();

    let page = store.history(Some("science"), 1);
    assert_eq!(page.total_count, 2);
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].user_text, "c");
    assert_eq!(store.history(None, 500).entries.len(), 3);

    let stats = store.stats_at(now);
    assert_eq!(stats.total_turns, 3);
    assert_eq!(stats.unique_topics, 2);
    assert_eq!(stats.topic_distribution["science"], 2);
    assert_eq!(stats.top_keywords[0], ("atom".to_string(), 2));
    assert_eq!(stats.recent_activity.last_24h, 1);
    assert_eq!(stats.recent_activity.last_week, 2);
    assert!((stats.context_usage_ratio - 1.0 / 3.0).abs() < 1e-6);
    assert!((stats.avg_confidence - 0.8).abs() < 1e-6);

    let export = store.export();
    assert_eq!(export.conversations.len(), 3);
    assert_eq!(export.statistics.total_conversations, 3);

    let health = store.health();
    assert_eq!(health.turns, 3);
    assert_eq!(health.capacity, 10);
    assert!(!health.snapshot_exists);
    assert_eq!(health.indexed_topics, 2);
}

#[test]
fn test_concurrent_add_and_query() {
    let store = MemoryStore::new(quiet_config(16));
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    store
                        .add(turn(&format!("w{worker}-{i}"), "general", &["shared"]))
                        .unwrap();
                    let query = RecallQuery::new("shared", "general").with_keywords(["shared"]);
                    assert!(store.query(&query).len() <= 3);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 16);
    assert_eq!(store.profile().total_turns, 200);
    assert_eq!(store.turns_for_keyword("shared").len(), 16);
}

#[test]
fn test_stats_with_extreme_processing_times() {
    let store = MemoryStore::new(quiet_config(10));
    store
        .add(turn("slow", "general", &[]).with_processing_time_ms(u64::MAX))
        .unwrap();
    store
        .add(turn("fast", "general", &[]).with_processing_time_ms(1))
        .unwrap();

    let stats = store.stats();
    let expected = (u64::MAX as f64 + 1.0) / 2.0;
    assert!((stats.avg_processing_time_ms / expected - 1.0).abs() < 1e-9);
}
