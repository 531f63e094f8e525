//! Lightweight message classification for Parley.
//!
//! Two layers:
//!
//! - [`KeywordClassifier`] assigns a [`Topic`], keywords, an [`Intent`] and
//!   importance/confidence scores using word-boundary regexes and a small
//!   vocabulary. The memory store consumes its output.
//! - [`Understanding`] looks for implicit signals (references to earlier
//!   turns, request phrasing, emotion) in messages the keyword layer finds
//!   little in.
//!
//! ```
//! use parley_nlu::{Classifier, KeywordClassifier, Topic};
//!
//! let classifier = KeywordClassifier::new()?;
//! let analysis = classifier.classify("How do I debug this function?");
//! assert_eq!(analysis.topic, Topic::Programming);
//! assert!(analysis.keywords.contains("question"));
//! # Ok::<(), parley_nlu::NluError>(())
//! ```

mod classify;
mod error;
mod text;
mod understanding;

pub use classify::{
    Analysis, Classifier, Complexity, Intent, KeywordClassifier, NUMBERS_KEYWORD, QUESTION_KEYWORD,
    Topic, complexity,
};
pub use error::{NluError, Result};
pub use understanding::{
    ContextLinks, Emotion, HIGH_CONFIDENCE, MEDIUM_CONFIDENCE, RequestKind, SentenceStructure,
    Sentiment, Understanding,
};
