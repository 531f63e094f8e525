//! Validation of turns before they enter the store.
//!
//! `add` validates first and mutates second, so a rejected turn never
//! leaves a trace in the log, the indices, or the profile.

use crate::types::ConversationTurn;

// ─────────────────────────────────────────────────────────────────────────────
// Validation Error
// ─────────────────────────────────────────────────────────────────────────────

/// Specific validation failures for a turn.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The user text is empty.
    #[error("user text is empty")]
    EmptyUserText,

    /// The topic label is empty.
    #[error("topic is empty")]
    EmptyTopic,

    /// A keyword in the set is empty or whitespace.
    #[error("keyword set contains an empty keyword")]
    EmptyKeyword,

    /// A score is NaN, infinite, or outside [0.0, 1.0].
    #[error("{field} {value} is out of range [0.0, 1.0]")]
    ScoreOutOfRange {
        /// Which score was rejected.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Validate a score is finite and within [0.0, 1.0].
pub fn validate_score(field: &'static str, value: f32) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::ScoreOutOfRange { field, value });
    }
    Ok(())
}

/// Validate a complete turn.
///
/// Checks:
/// 1. User text and topic are not empty
/// 2. No keyword is blank
/// 3. Confidence and importance are in range
pub fn validate_turn(turn: &ConversationTurn) -> Result<(), ValidationError> {
    if turn.user_text.trim().is_empty() {
        return Err(ValidationError::EmptyUserText);
    }
    if turn.topic.trim().is_empty() {
        return Err(ValidationError::EmptyTopic);
    }
    if turn.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ValidationError::EmptyKeyword);
    }
    validate_score("confidence", turn.confidence)?;
    validate_score("importance", turn.importance)?;
    Ok(())
}
