//! Relevance-ranked recall over the most recent turns.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::types::ConversationTurn;

use super::{MemoryStore, RecallMatch, RecallQuery};

impl MemoryStore {
    /// Return the turns most relevant to a pre-classified query.
    ///
    /// Only the newest `recall_window` turns are candidates. Each is scored
    /// with [`crate::RelevanceWeights::score`]; candidates scoring at or below
    /// the relevance threshold are dropped, the rest are ordered by score
    /// (ties go to the more recent turn) and cut to the query's limit.
    /// No match is an empty vector, never an error.
    pub fn query(&self, query: &RecallQuery) -> Vec<ConversationTurn> {
        self.query_at(query, Utc::now())
    }

    /// [`Self::query`] evaluated at an explicit point in time.
    pub fn query_at(&self, query: &RecallQuery, now: DateTime<Utc>) -> Vec<ConversationTurn> {
        self.recall_at(query, now)
            .into_iter()
            .map(|m| m.turn)
            .collect()
    }

    /// Like [`Self::query`], keeping each turn's relevance score.
    pub fn recall(&self, query: &RecallQuery) -> Vec<RecallMatch> {
        self.recall_at(query, Utc::now())
    }

    /// [`Self::recall`] evaluated at an explicit point in time.
    pub fn recall_at(&self, query: &RecallQuery, now: DateTime<Utc>) -> Vec<RecallMatch> {
        let limit = query.limit.unwrap_or(self.config.recall_limit);
        if limit == 0 {
            return Vec::new();
        }

        let weights = &self.config.weights;
        let threshold = self.config.relevance_threshold;

        // Newest first, so the stable sort below breaks ties toward recency.
        let mut matches: Vec<RecallMatch> = {
            let state = self.inner.read();
            state
                .turns
                .iter()
                .rev()
                .take(self.config.recall_window)
                .filter_map(|turn| {
                    let score = weights.score(&query.topic, &query.keywords, turn, now);
                    (score > threshold).then(|| RecallMatch {
                        turn: turn.clone(),
                        score,
                    })
                })
                .collect()
        };

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(limit);

        debug!(
            query = %query.text,
            topic = %query.topic,
            matches = matches.len(),
            "Recalled context"
        );

        matches
    }
}
