//! Relevance scoring between a query and a stored turn.
//!
//! ```text
//! relevance = w_kw   * jaccard(query.keywords, turn.keywords)
//!           + w_top  * (1.0 if topics match else topic_mismatch)
//!           + w_rec  * time_decay(now - turn.created_at)
//!           + w_imp  * turn.importance
//!           + w_conf * turn.confidence
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::ConversationTurn;

/// Component weights for relevance scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceWeights {
    /// Weight of keyword overlap (Jaccard).
    pub keywords: f32,
    /// Weight of the topic match component.
    pub topic: f32,
    /// Weight of recency.
    pub recency: f32,
    /// Weight of the turn's importance.
    pub importance: f32,
    /// Weight of the turn's confidence.
    pub confidence: f32,
    /// Topic component value when topics differ.
    pub topic_mismatch: f32,
    /// Age at which the recency component reaches zero.
    pub decay_horizon: TimeDelta,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            keywords: 0.35,
            topic: 0.25,
            recency: 0.15,
            importance: 0.15,
            confidence: 0.10,
            topic_mismatch: 0.3,
            decay_horizon: TimeDelta::hours(24),
        }
    }
}

impl RelevanceWeights {
    /// Score `turn` against a pre-classified query at time `now`, in [0, 1].
    pub fn score(
        &self,
        query_topic: &str,
        query_keywords: &BTreeSet<String>,
        turn: &ConversationTurn,
        now: DateTime<Utc>,
    ) -> f32 {
        let keyword_score = jaccard(query_keywords, &turn.keywords);
        let topic_score = if query_topic == turn.topic {
            1.0
        } else {
            self.topic_mismatch
        };
        let time_score = time_decay(now - turn.created_at, self.decay_horizon);

        let relevance = keyword_score * self.keywords
            + topic_score * self.topic
            + time_score * self.recency
            + turn.importance * self.importance
            + turn.confidence * self.confidence;

        relevance.clamp(0.0, 1.0)
    }
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`. Zero when either set is empty.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    shared as f32 / union as f32
}

/// Linear recency decay: 1.0 at age zero, 0.0 at `horizon` and beyond.
///
/// Negative ages (clock skew, future timestamps) count as fresh.
pub fn time_decay(age: TimeDelta, horizon: TimeDelta) -> f32 {
    let horizon_ms = horizon.num_milliseconds();
    if horizon_ms <= 0 {
        return 0.0;
    }
    let age_ms = age.num_milliseconds().max(0);
    (1.0 - age_ms as f64 / horizon_ms as f64).max(0.0) as f32
}
