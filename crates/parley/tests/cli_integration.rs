//! CLI integration tests for the Parley command-line interface.
//!
//! These tests verify:
//! - Help text and argument parsing
//! - Conversations persist across invocations through the snapshot file
//! - History, stats, export, clear and health read that snapshot back
//! - The sort and understand utilities
//!
//! Every test runs in its own temporary config directory and working
//! directory, with the snapshot path pointed inside it.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// An isolated config directory with a snapshot path inside it.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self::with_memory_section("")
    }

    fn with_memory_section(extra: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("memory.json");
        let config = format!(
            "[memory]\nsnapshot_path = {:?}\n{extra}\n",
            snapshot.display().to_string()
        );
        std::fs::write(dir.path().join("config.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn snapshot(&self) -> PathBuf {
        self.path().join("memory.json")
    }

    fn parley(&self) -> Command {
        let mut cmd = Command::cargo_bin("parley").unwrap();
        cmd.current_dir(self.path())
            .env("PARLEY_CONFIG_DIR", self.path())
            .env_remove("RUST_LOG");
        cmd
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.parley().arg("--json").args(args).output().unwrap();
        assert!(output.status.success(), "{:?}", output);
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    Command::cargo_bin("parley")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Parley"))
        .stdout(predicate::str::contains("bounded memory"));
}

#[test]
fn test_version_displays() {
    Command::cargo_bin("parley")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("parley"));
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("parley")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("clear"))
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("sort"))
        .stdout(predicate::str::contains("understand"));
}

#[test]
fn test_ask_requires_message() {
    Sandbox::new()
        .parley()
        .arg("ask")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_unknown_subcommand_fails() {
    Sandbox::new()
        .parley()
        .arg("frobnicate")
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversation Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ask_replies_and_persists() {
    let sandbox = Sandbox::new();

    sandbox
        .parley()
        .args(["ask", "calculate 6 * 7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 * 7 = 42"));

    assert!(sandbox.snapshot().is_file());
    let health = sandbox.json(&["health"]);
    assert_eq!(health["turns"], 1);
    assert_eq!(health["snapshot_exists"], true);
}

#[test]
fn test_second_ask_recalls_first() {
    let sandbox = Sandbox::new();
    sandbox.json(&["ask", "How do I debug a python function?"]);

    let exchange = sandbox.json(&["ask", "Why does my python function crash?"]);
    assert_eq!(exchange["topic"], "programming");
    assert_eq!(exchange["context_count"], 1);
    assert!(
        exchange["response"]
            .as_str()
            .unwrap()
            .starts_with("Following up")
    );
}

#[test]
fn test_empty_message_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .parley()
        .args(["ask", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_capacity_from_config() {
    let sandbox = Sandbox::with_memory_section("capacity = 2");
    for message in ["learn rust", "learn physics", "learn music"] {
        sandbox.json(&["ask", message]);
    }

    let history = sandbox.json(&["history"]);
    let entries = history["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["user_text"], "learn physics");
    assert_eq!(entries[1]["user_text"], "learn music");
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Inspection Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_history_topic_filter() {
    let sandbox = Sandbox::new();
    sandbox.json(&["ask", "calculate 1 + 1"]);
    sandbox.json(&["ask", "write a poem about rain"]);

    let history = sandbox.json(&["history", "--topic", "creative"]);
    assert_eq!(history["total_count"], 1);
    assert_eq!(history["entries"][0]["topic"], "creative");
}

#[test]
fn test_history_empty_store() {
    Sandbox::new()
        .parley()
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No conversations found"));
}

#[test]
fn test_stats_counts_turns() {
    let sandbox = Sandbox::new();
    sandbox.json(&["ask", "calculate 2 + 2"]);
    sandbox.json(&["ask", "calculate 3 + 3"]);

    let stats = sandbox.json(&["stats"]);
    assert_eq!(stats["total_turns"], 2);
    assert_eq!(stats["topic_distribution"]["mathematics"], 2);
    assert_eq!(stats["profile"]["total_turns"], 2);
}

#[test]
fn test_export_to_file() {
    let sandbox = Sandbox::new();
    sandbox.json(&["ask", "tell me about quantum physics"]);
    let out = sandbox.path().join("export.json");

    sandbox
        .parley()
        .args(["export", "--output"])
        .arg(&out)
        .assert()
        .success();

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(document["export_info"]["total_conversations"], 1);
    assert_eq!(document["conversations"][0]["topic"], "science");
}

#[test]
fn test_clear_requires_confirmation() {
    let sandbox = Sandbox::new();
    sandbox.json(&["ask", "calculate 2 + 2"]);

    sandbox.parley().arg("clear").assert().failure();
    assert!(sandbox.snapshot().is_file());
}

#[test]
fn test_clear_removes_snapshot() {
    let sandbox = Sandbox::new();
    sandbox.json(&["ask", "calculate 2 + 2"]);

    sandbox
        .parley()
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Forgot 1"));

    assert!(!sandbox.snapshot().exists());
    assert_eq!(sandbox.json(&["health"])["turns"], 0);
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.snapshot(), "{ not json").unwrap();

    assert_eq!(sandbox.json(&["health"])["turns"], 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Utility Command Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sort_numbers() {
    Sandbox::new()
        .parley()
        .args(["sort", "3", "-1", "2.5", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-1 2.5 3 10"));
}

#[test]
fn test_sort_descending_json() {
    let report = Sandbox::new().json(&["sort", "--desc", "--algorithm", "quicksort", "1", "3", "2"]);
    assert_eq!(report["sorted"], serde_json::json!([3.0, 2.0, 1.0]));
    assert_eq!(report["algorithm"], "quicksort");
}

#[test]
fn test_sort_rejects_unknown_algorithm() {
    Sandbox::new()
        .parley()
        .args(["sort", "--algorithm", "bogo", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogo"));
}

#[test]
fn test_sort_rejects_nan() {
    Sandbox::new()
        .parley()
        .args(["sort", "1", "NaN", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not comparable"));
}

#[test]
fn test_benchmark_json() {
    let report = Sandbox::new().json(&["benchmark", "--sizes", "10,20", "--trials", "1"]);
    assert_eq!(report["sizes"].as_array().unwrap().len(), 2);
}

#[test]
fn test_understand_does_not_record() {
    let sandbox = Sandbox::new();
    let report = sandbox.json(&["understand", "Could you explain the difference between TCP and UDP?"]);
    assert_eq!(report["understanding"]["detected_intent"], "comparison_request");
    assert!(report["analysis"]["keywords"].is_array());

    assert_eq!(sandbox.json(&["health"])["turns"], 0);
}

#[test]
fn test_config_which_lists_sources() {
    let sandbox = Sandbox::new();
    let which = sandbox.json(&["config", "which"]);
    assert_eq!(which["sources"][0]["layer"], "user");
    assert_eq!(which["sources"][0]["loaded"], true);
    assert_eq!(which["sources"][1]["loaded"], false);
}
