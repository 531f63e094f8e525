//! Query and result types for recall.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::ConversationTurn;

/// A pre-classified recall query.
///
/// Topic and keywords come from the caller's classifier; the store never
/// inspects `text` beyond logging it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecallQuery {
    /// Raw query text.
    pub text: String,
    /// Topic label of the query.
    pub topic: String,
    /// Keyword set of the query.
    pub keywords: BTreeSet<String>,
    /// Maximum results; `None` uses the store's configured default.
    pub limit: Option<usize>,
}

impl RecallQuery {
    /// Create a query with no keywords and the default limit.
    pub fn new(text: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            topic: topic.into(),
            keywords: BTreeSet::new(),
            limit: None,
        }
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

    /// Set the maximum number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A recalled turn with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallMatch {
    /// The recalled turn.
    pub turn: ConversationTurn,
    /// Relevance in (threshold, 1.0].
    pub score: f32,
}
