//! Core data types: conversation turns and the aggregate user profile.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Turn ID
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque, stable identifier of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub Uuid);

impl TurnId {
    /// Generate a fresh random ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TurnId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversation Turn
// ─────────────────────────────────────────────────────────────────────────────

/// One recorded user-input/response exchange with its classification metadata.
///
/// A turn is never mutated once handed to the store. Every field is required
/// when deserializing; snapshots with missing fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Unique identifier, fixed at creation.
    pub id: TurnId,
    /// What the user said.
    pub user_text: String,
    /// What was answered.
    pub response_text: String,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
    /// Coarse category label (e.g. "programming").
    pub topic: String,
    /// Normalized tokens extracted from `user_text`.
    pub keywords: BTreeSet<String>,
    /// Classification certainty in [0, 1].
    pub confidence: f32,
    /// Salience estimate in [0, 1].
    pub importance: f32,
    /// Whether retrieved prior turns were used to produce the response.
    pub context_used: bool,
    /// How many prior turns were used.
    pub context_count: usize,
    /// Time spent producing the response, in milliseconds.
    pub processing_time_ms: u64,
}

impl ConversationTurn {
    /// Create a turn stamped with a fresh ID and the current time.
    ///
    /// Scores default to zero and no context; use the `with_*` builders to
    /// fill in the classification.
    pub fn new(
        user_text: impl Into<String>,
        response_text: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            id: TurnId::new(),
            user_text: user_text.into(),
            response_text: response_text.into(),
            created_at: Utc::now(),
            topic: topic.into(),
            keywords: BTreeSet::new(),
            confidence: 0.0,
            importance: 0.0,
            context_used: false,
            context_count: 0,
            processing_time_ms: 0,
        }
    }

    /// Replace the ID.
    pub fn with_id(mut self, id: TurnId) -> Self {
        self.id = id;
        self
    }

    /// Set the keyword set.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the classification confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the importance estimate.
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = importance;
        self
    }

    /// Record that `count` prior turns were used. Zero means no context.
    pub fn with_context(mut self, count: usize) -> Self {
        self.context_used = count > 0;
        self.context_count = count;
        self
    }

    /// Override the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the processing time.
    pub fn with_processing_time_ms(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User Profile
// ─────────────────────────────────────────────────────────────────────────────

/// Weight kept from the previous context-usage rate on each add.
const RATE_DECAY: f32 = 0.9;

/// Added to the decayed rate when the new turn used context.
const RATE_GAIN: f32 = 0.1;

/// Aggregate counters over every turn ever added.
///
/// Eviction never decrements these; only [`crate::MemoryStore::clear`] resets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Total turns ever added.
    pub total_turns: u64,
    /// Turns added per topic.
    pub preferred_topics: BTreeMap<String, u64>,
    /// Exponentially decayed share of turns that used context.
    pub context_usage_rate: f32,
}

impl UserProfile {
    /// Fold one newly added turn into the counters.
    pub fn record(&mut self, turn: &ConversationTurn) {
        self.total_turns += 1;
        *self.preferred_topics.entry(turn.topic.clone()).or_insert(0) += 1;

        let hit = if turn.context_used { RATE_GAIN } else { 0.0 };
        self.context_usage_rate = self.context_usage_rate * RATE_DECAY + hit;
    }

    /// Merge a persisted profile on top of this one. Persisted values win.
    pub fn merge(&mut self, persisted: UserProfile) {
        self.total_turns = persisted.total_turns;
        self.context_usage_rate = persisted.context_usage_rate;
        self.preferred_topics.extend(persisted.preferred_topics);
    }

    /// The most frequent topic, if any turn was recorded.
    pub fn favorite_topic(&self) -> Option<&str> {
        self.preferred_topics
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(topic, _)| topic.as_str())
    }
}
