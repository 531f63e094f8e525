//! Error types for the classifier.

use thiserror::Error;

/// Result type alias using the NLU error type.
pub type Result<T> = std::result::Result<T, NluError>;

/// Error type for classifier construction.
#[derive(Debug, Error)]
pub enum NluError {
    /// A built-in or caller-supplied pattern failed to compile.
    #[error("Invalid pattern for {rule}: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

impl NluError {
    pub(crate) fn pattern(rule: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            rule: rule.into(),
            source,
        }
    }
}
