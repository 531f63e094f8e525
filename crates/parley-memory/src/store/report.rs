//! Read-only reports over the store: history, statistics, export, health.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ConversationTurn, TurnId, UserProfile};

use super::MemoryStore;

/// Upper bound on history page size.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Responses longer than this are truncated in history entries.
const PREVIEW_CHARS: usize = 200;

/// Number of keywords listed in [`StoreStats::top_keywords`].
const TOP_KEYWORDS: usize = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Report Types
// ─────────────────────────────────────────────────────────────────────────────

/// One turn as listed in history, with the response shortened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: TurnId,
    pub user_text: String,
    pub response_preview: String,
    pub created_at: DateTime<Utc>,
    pub topic: String,
    pub keywords: BTreeSet<String>,
    pub confidence: f32,
    pub context_used: bool,
}

impl From<&ConversationTurn> for HistoryEntry {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            id: turn.id,
            user_text: turn.user_text.clone(),
            response_preview: preview(&turn.response_text),
            created_at: turn.created_at,
            topic: turn.topic.clone(),
            keywords: turn.keywords.clone(),
            confidence: turn.confidence,
            context_used: turn.context_used,
        }
    }
}

/// A page of history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    /// The newest matching turns, oldest first.
    pub entries: Vec<HistoryEntry>,
    /// How many retained turns matched the filter.
    pub total_count: usize,
    /// The topic filter, if any.
    pub topic: Option<String>,
}

/// Turn counts within recent windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub last_24h: usize,
    pub last_week: usize,
}

/// Statistics over the retained turns plus the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Retained turns.
    pub total_turns: usize,
    pub capacity: usize,
    pub unique_topics: usize,
    pub avg_confidence: f32,
    /// Share of retained turns that used context.
    pub context_usage_ratio: f32,
    pub avg_processing_time_ms: f64,
    pub topic_distribution: BTreeMap<String, usize>,
    /// Most frequent keywords, most frequent first.
    pub top_keywords: Vec<(String, usize)>,
    pub recent_activity: RecentActivity,
    pub profile: UserProfile,
}

/// Header of an export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub timestamp: DateTime<Utc>,
    pub total_conversations: usize,
    pub version: String,
}

/// Profile statistics carried in an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportStatistics {
    pub topic_distribution: BTreeMap<String, u64>,
    pub total_conversations: u64,
    pub context_usage_rate: f32,
}

/// Every retained turn plus profile statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub export_info: ExportInfo,
    pub conversations: Vec<ConversationTurn>,
    pub statistics: ExportStatistics,
}

/// Liveness summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub turns: usize,
    pub capacity: usize,
    pub indexed_topics: usize,
    pub indexed_keywords: usize,
    pub snapshot_exists: bool,
    pub snapshot_path: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────────────────────────

impl MemoryStore {
    /// The newest `limit` turns, optionally restricted to one topic.
    ///
    /// `limit` is clamped to [`MAX_HISTORY_LIMIT`].
    pub fn history(&self, topic: Option<&str>, limit: usize) -> HistoryPage {
        let limit = limit.min(MAX_HISTORY_LIMIT);
        let state = self.inner.read();
        let matching: Vec<&ConversationTurn> = state
            .turns
            .iter()
            .filter(|t| topic.is_none_or(|wanted| t.topic == wanted))
            .collect();

        let skip = matching.len().saturating_sub(limit);
        HistoryPage {
            entries: matching[skip..].iter().map(|t| HistoryEntry::from(*t)).collect(),
            total_count: matching.len(),
            topic: topic.map(str::to_string),
        }
    }

    /// Statistics at the current time.
    pub fn stats(&self) -> StoreStats {
        self.stats_at(Utc::now())
    }

    /// Statistics with recent activity measured from `now`.
    pub fn stats_at(&self, now: DateTime<Utc>) -> StoreStats {
        let state = self.inner.read();
        let turns = &state.turns;
        let count = turns.len();

        let mut topic_distribution: BTreeMap<String, usize> = BTreeMap::new();
        let mut keyword_counts: HashMap<&str, usize> = HashMap::new();
        let mut confidence_sum = 0.0f32;
        let mut processing_sum = 0u128;
        let mut with_context = 0usize;
        let mut last_24h = 0usize;
        let mut last_week = 0usize;

        for turn in turns {
            *topic_distribution.entry(turn.topic.clone()).or_insert(0) += 1;
            for keyword in &turn.keywords {
                *keyword_counts.entry(keyword.as_str()).or_insert(0) += 1;
            }
            confidence_sum += turn.confidence;
            processing_sum += u128::from(turn.processing_time_ms);
            if turn.context_used {
                with_context += 1;
            }

            let age = now - turn.created_at;
            if age < TimeDelta::days(1) {
                last_24h += 1;
            }
            if age < TimeDelta::weeks(1) {
                last_week += 1;
            }
        }

        let mut top_keywords: Vec<(String, usize)> = keyword_counts
            .into_iter()
            .map(|(k, n)| (k.to_string(), n))
            .collect();
        top_keywords.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_keywords.truncate(TOP_KEYWORDS);

        let mean = |sum: f64| if count == 0 { 0.0 } else { sum / count as f64 };

        StoreStats {
            total_turns: count,
            capacity: self.config.capacity,
            unique_topics: topic_distribution.len(),
            avg_confidence: mean(confidence_sum as f64) as f32,
            context_usage_ratio: mean(with_context as f64) as f32,
            avg_processing_time_ms: mean(processing_sum as f64),
            topic_distribution,
            top_keywords,
            recent_activity: RecentActivity {
                last_24h,
                last_week,
            },
            profile: state.profile.clone(),
        }
    }

    /// Every retained turn with profile statistics.
    pub fn export(&self) -> ExportDocument {
        let state = self.inner.read();
        ExportDocument {
            export_info: ExportInfo {
                timestamp: Utc::now(),
                total_conversations: state.turns.len(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            conversations: state.turns.iter().cloned().collect(),
            statistics: ExportStatistics {
                topic_distribution: state.profile.preferred_topics.clone(),
                total_conversations: state.profile.total_turns,
                context_usage_rate: state.profile.context_usage_rate,
            },
        }
    }

    /// Size, index and snapshot summary.
    pub fn health(&self) -> HealthReport {
        let (turns, indexed_topics, indexed_keywords) = {
            let state = self.inner.read();
            (
                state.turns.len(),
                state.index.topic_count(),
                state.index.keyword_count(),
            )
        };
        HealthReport {
            turns,
            capacity: self.config.capacity,
            indexed_topics,
            indexed_keywords,
            snapshot_exists: self.backend.exists(),
            snapshot_path: self.backend.location().map(|p| p.display().to_string()),
        }
    }
}

/// Shorten a response to [`PREVIEW_CHARS`] characters plus an ellipsis.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
