//! Error types for sorting.

use thiserror::Error;

/// Result type alias using the sort error type.
pub type Result<T> = std::result::Result<T, SortError>;

/// Error type for sorting operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// A key does not compare equal to itself (for example NaN).
    #[error("Key at index {index} is not comparable")]
    Incomparable { index: usize },

    /// An algorithm name could not be parsed.
    #[error("Unknown sort algorithm: {0} (expected auto, builtin, insertion or quicksort)")]
    UnknownAlgorithm(String),
}
