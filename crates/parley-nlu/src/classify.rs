//! Topic, keyword and intent classification.

use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{NluError, Result};
use crate::text::tokens;

// ─────────────────────────────────────────────────────────────────────────────
// Labels
// ─────────────────────────────────────────────────────────────────────────────

/// Coarse subject area of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Programming,
    Mathematics,
    Science,
    Education,
    Business,
    Creative,
    General,
}

impl Topic {
    pub const ALL: [Topic; 7] = [
        Topic::Programming,
        Topic::Mathematics,
        Topic::Science,
        Topic::Education,
        Topic::Business,
        Topic::Creative,
        Topic::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Programming => "programming",
            Self::Mathematics => "mathematics",
            Self::Science => "science",
            Self::Education => "education",
            Self::Business => "business",
            Self::Creative => "creative",
            Self::General => "general",
        }
    }

    /// How much the classifier trusts its own label for this topic.
    pub fn confidence(&self) -> f32 {
        match self {
            Self::Mathematics => 0.95,
            Self::Programming => 0.90,
            Self::Education => 0.88,
            Self::Science => 0.85,
            Self::Business => 0.82,
            Self::General => 0.75,
            Self::Creative => DEFAULT_CONFIDENCE,
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user wants done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Calculation,
    Explanation,
    Generation,
    Analysis,
    Guidance,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calculation => "calculation",
            Self::Explanation => "explanation",
            Self::Generation => "generation",
            Self::Analysis => "analysis",
            Self::Guidance => "guidance",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the classifier derives from one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub topic: Topic,
    /// Vocabulary hits plus the synthetic `numbers` and `question` tokens.
    pub keywords: BTreeSet<String>,
    pub intent: Intent,
    pub complexity: Complexity,
    /// In [0, 1].
    pub importance: f32,
    /// In [0, 1].
    pub confidence: f32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Classifier
// ─────────────────────────────────────────────────────────────────────────────

/// Turns free text into an [`Analysis`].
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Analysis;
}

const DEFAULT_CONFIDENCE: f32 = 0.8;
const BASE_IMPORTANCE: f32 = 0.5;
const KEYWORD_IMPORTANCE: f32 = 0.1;
const MAX_KEYWORD_IMPORTANCE: f32 = 0.3;
const INQUIRY_IMPORTANCE: f32 = 0.2;

/// Synthetic keyword for messages containing digits.
pub const NUMBERS_KEYWORD: &str = "numbers";
/// Synthetic keyword for messages containing a question word.
pub const QUESTION_KEYWORD: &str = "question";

const QUESTION_WORDS: &[&str] = &["what", "how", "why", "when", "where", "which", "who"];

/// Ordered topic rules; the first match wins.
const TOPIC_RULES: &[(Topic, &str)] = &[
    (
        Topic::Programming,
        r"\b(code|coding|program|function|algorithm|compiler|rust|python|javascript|debug|bug|api)\b",
    ),
    (
        Topic::Mathematics,
        r"\b(math|maths|equation|calculate|solve|number|formula|integral|derivative|\d+\s*[-+*/^]\s*\d+)\b",
    ),
    (
        Topic::Science,
        r"\b(science|physics|chemistry|biology|atom|molecule|quantum|experiment|theory|energy)\b",
    ),
    (
        Topic::Education,
        r"\b(learn|learning|study|teach|tutorial|course|lesson|explain|understand)\b",
    ),
    (
        Topic::Business,
        r"\b(business|market|strategy|finance|revenue|profit|investment|startup|company)\b",
    ),
    (
        Topic::Creative,
        r"\b(write|story|poem|poetry|novel|music|song|art|design|creative)\b",
    ),
];

/// Ordered intent rules; the first match wins.
const INTENT_RULES: &[(Intent, &str)] = &[
    (
        Intent::Calculation,
        r"\b(calculate|compute|solve|evaluate|\d+\s*[-+*/^]\s*\d+)\b",
    ),
    (
        Intent::Explanation,
        r"\b(explain|what is|what are|how does|why|tell me about|describe)\b",
    ),
    (
        Intent::Generation,
        r"\b(write|create|generate|make|build|draft|compose)\b",
    ),
    (
        Intent::Analysis,
        r"\b(analy[sz]e|compare|assess|review|evaluate)\b",
    ),
    (
        Intent::Guidance,
        r"\b(help|guide|advice|advise|suggest|recommend|teach)\b",
    ),
];

/// Words picked up as keywords, grouped by the topic they hint at.
const VOCABULARY: &[&[&str]] = &[
    &[
        "code", "function", "algorithm", "compiler", "rust", "python", "javascript", "debug",
        "variable", "sort", "api", "database",
    ],
    &[
        "math", "equation", "calculate", "number", "formula", "integral", "derivative",
        "probability", "statistics", "matrix",
    ],
    &[
        "physics", "chemistry", "biology", "atom", "molecule", "quantum", "experiment", "theory",
        "cell", "energy",
    ],
    &[
        "learn", "study", "teach", "tutorial", "course", "lesson", "explain", "understand",
        "skill", "exam",
    ],
    &[
        "business", "market", "strategy", "finance", "revenue", "profit", "investment", "startup",
        "company", "customer",
    ],
    &["story", "poem", "novel", "music", "song", "design", "art"],
];

/// Regex and word-list classifier.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    topic_rules: Vec<(Topic, Regex)>,
    intent_rules: Vec<(Intent, Regex)>,
    inquiry: Regex,
    vocabulary: BTreeSet<&'static str>,
}

impl KeywordClassifier {
    /// Build the classifier with the built-in rule tables.
    pub fn new() -> Result<Self> {
        let topic_rules = TOPIC_RULES
            .iter()
            .map(|(topic, pattern)| compile(topic.as_str(), pattern).map(|re| (*topic, re)))
            .collect::<Result<Vec<_>>>()?;
        let intent_rules = INTENT_RULES
            .iter()
            .map(|(intent, pattern)| compile(intent.as_str(), pattern).map(|re| (*intent, re)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            topic_rules,
            intent_rules,
            inquiry: compile("inquiry", r"\b(how|why|explain\w*)\b")?,
            vocabulary: VOCABULARY.iter().flat_map(|words| words.iter().copied()).collect(),
        })
    }

    /// First topic whose rule matches, else [`Topic::General`].
    pub fn topic(&self, text: &str) -> Topic {
        let lower = text.to_lowercase();
        self.topic_rules
            .iter()
            .find(|(_, re)| re.is_match(&lower))
            .map_or(Topic::General, |(topic, _)| *topic)
    }

    /// First intent whose rule matches, else [`Intent::General`].
    pub fn intent(&self, text: &str) -> Intent {
        let lower = text.to_lowercase();
        self.intent_rules
            .iter()
            .find(|(_, re)| re.is_match(&lower))
            .map_or(Intent::General, |(intent, _)| *intent)
    }

    /// Vocabulary hits plus synthetic keywords.
    ///
    /// A trailing plural `s` is ignored when the bare word is in the
    /// vocabulary, so "algorithms" yields `algorithm`.
    pub fn keywords(&self, text: &str) -> BTreeSet<String> {
        let words = tokens(text);
        let mut keywords = BTreeSet::new();

        for word in &words {
            if let Some(hit) = self.lookup(word) {
                keywords.insert(hit.to_string());
            }
        }
        if text.chars().any(|c| c.is_ascii_digit()) {
            keywords.insert(NUMBERS_KEYWORD.to_string());
        }
        if words.iter().any(|w| QUESTION_WORDS.contains(&w.as_str())) {
            keywords.insert(QUESTION_KEYWORD.to_string());
        }
        keywords
    }

    fn lookup(&self, word: &str) -> Option<&'static str> {
        self.vocabulary.get(word).copied().or_else(|| {
            word.strip_suffix('s')
                .and_then(|stem| self.vocabulary.get(stem).copied())
        })
    }

    fn importance(&self, text: &str, keyword_count: usize) -> f32 {
        let from_keywords = (keyword_count as f32 * KEYWORD_IMPORTANCE).min(MAX_KEYWORD_IMPORTANCE);
        let from_inquiry = if self.inquiry.is_match(&text.to_lowercase()) {
            INQUIRY_IMPORTANCE
        } else {
            0.0
        };
        (BASE_IMPORTANCE + from_keywords + from_inquiry).min(1.0)
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Analysis {
        let keywords = self.keywords(text);
        let topic = self.topic(text);
        let intent = self.intent(text);
        let complexity = complexity(text.split_whitespace().count(), keywords.len());
        let importance = self.importance(text, keywords.len());

        trace!(%topic, %intent, keywords = keywords.len(), "Classified message");

        Analysis {
            topic,
            keywords,
            intent,
            complexity,
            importance,
            confidence: topic.confidence(),
        }
    }
}

/// Bucket a message by length and keyword density.
pub fn complexity(word_count: usize, keyword_count: usize) -> Complexity {
    if word_count > 30 || keyword_count > 5 {
        Complexity::High
    } else if word_count > 15 || keyword_count > 2 {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

fn compile(rule: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| NluError::pattern(rule, e))
}
