//! Heuristic reading of messages that carry few explicit keywords.
//!
//! [`Understanding::analyze`] layers several cheap signals (sentence shape,
//! implied topics, references back to recent turns, request phrasing and
//! emotional cues) and sums their increments into a confidence in [0, 1].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::classify::Intent;
use crate::text::{has_any_phrase, has_any_token, normalize, tokens};

const SEMANTIC_GAIN: f32 = 0.3;
const PRONOUN_GAIN: f32 = 0.4;
const CONTINUATION_GAIN: f32 = 0.3;
const REQUEST_GAIN: f32 = 0.2;
const EMOTION_GAIN: f32 = 0.1;

/// Confidence at or above which an interpretation is stated outright.
pub const HIGH_CONFIDENCE: f32 = 0.7;
/// Confidence at or above which context is consulted for an interpretation.
pub const MEDIUM_CONFIDENCE: f32 = 0.4;

/// How many recent topics a pronoun may refer back to.
const REFERENCE_DEPTH: usize = 5;

const QUESTION_WORDS: &[&str] = &["what", "how", "why", "when", "where"];
const REQUEST_WORDS: &[&str] = &["please", "help"];
const REQUEST_PHRASES: &[&str] = &["can you", "could you"];
const ACTION_VERBS: &[&str] = &[
    "do", "make", "build", "write", "create", "explain", "help", "solve", "fix",
];
const PRONOUNS: &[&str] = &["this", "that", "it", "they", "them", "those"];
const CONTINUATIONS: &[&str] = &[
    "also", "continue", "furthermore", "additionally", "moreover", "next",
];

/// Topic hints that do not need a dedicated keyword.
const IMPLICIT_TOPICS: &[(&str, &[&str])] = &[
    ("programming", &["code", "program", "function", "script", "algorithm", "compile"]),
    ("mathematics", &["calculate", "compute", "number", "math", "solve", "sum"]),
    ("education", &["learn", "teach", "study", "understand", "explain", "practice"]),
    ("sorting", &["sort", "order", "arrange", "rank", "organize"]),
    ("business", &["business", "market", "strategy", "customer", "sales"]),
];

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "awesome", "love", "like", "enjoy", "thanks",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "dislike", "frustrated", "annoyed", "broken",
];

// ─────────────────────────────────────────────────────────────────────────────
// Labels
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of request recognized from phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Help,
    Explanation,
    Opinion,
    Guidance,
    Comparison,
}

impl RequestKind {
    /// Checked in this order; when several match, the last one checked wins.
    const PATTERNS: [(RequestKind, &'static [&'static str]); 5] = [
        (
            RequestKind::Help,
            &["help me", "can you", "could you", "would you", "please"],
        ),
        (
            RequestKind::Explanation,
            &["what is", "what does", "explain", "how does", "why does"],
        ),
        (
            RequestKind::Opinion,
            &["what do you think", "your opinion", "do you believe", "would you say"],
        ),
        (
            RequestKind::Guidance,
            &["how to", "how do i", "what should", "best way"],
        ),
        (
            RequestKind::Comparison,
            &["which is better", "difference between", "compare", "versus", "vs"],
        ),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Help => "help_request",
            Self::Explanation => "explanation_request",
            Self::Opinion => "opinion_request",
            Self::Guidance => "guidance_request",
            Self::Comparison => "comparison_request",
        }
    }

    /// The classifier intent this request corresponds to.
    pub fn intent(&self) -> Intent {
        match self {
            Self::Help | Self::Guidance => Intent::Guidance,
            Self::Explanation => Intent::Explanation,
            Self::Opinion | Self::Comparison => Intent::Analysis,
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Frustration,
    Confusion,
    Excitement,
    Curiosity,
}

impl Emotion {
    const PATTERNS: [(Emotion, &'static [&'static str]); 4] = [
        (
            Emotion::Frustration,
            &["frustrated", "frustrating", "annoying", "irritated", "fed up"],
        ),
        (
            Emotion::Confusion,
            &["confused", "don't understand", "unclear", "puzzled", "lost"],
        ),
        (
            Emotion::Excitement,
            &["awesome", "amazing", "fantastic", "incredible"],
        ),
        (
            Emotion::Curiosity,
            &["curious", "wonder", "wondering", "interested", "intrigued"],
        ),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

// ─────────────────────────────────────────────────────────────────────────────
// Analysis
// ─────────────────────────────────────────────────────────────────────────────

/// Shape of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceStructure {
    pub is_question: bool,
    pub is_request: bool,
    pub is_statement: bool,
    pub word_count: usize,
    pub sentence_count: usize,
}

/// Links from the message back to recent turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextLinks {
    /// Recent topics the message may refer to.
    pub connections: Vec<String>,
    pub has_pronouns: bool,
    pub has_continuation: bool,
}

/// Result of [`Understanding::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Understanding {
    pub structure: SentenceStructure,
    /// Action verbs found in the message.
    pub actions: Vec<String>,
    pub implicit_topics: Vec<String>,
    pub context: ContextLinks,
    pub requests: Vec<RequestKind>,
    pub detected_intent: Option<RequestKind>,
    pub emotions: Vec<Emotion>,
    pub sentiment: Sentiment,
    pub sentiment_score: i32,
    pub interpretation: String,
    /// Sum of all increments, capped at 1.0.
    pub confidence: f32,
}

impl Understanding {
    /// Analyze `text` given the topics of recent turns, oldest first.
    ///
    /// Context links are only looked for when `recent_topics` is non-empty.
    pub fn analyze<S: AsRef<str>>(text: &str, recent_topics: &[S]) -> Self {
        let words = tokens(text);
        let normalized = normalize(text);
        let mut confidence = 0.0f32;

        let structure = structure(text, &words, &normalized);
        let actions: Vec<String> = ACTION_VERBS
            .iter()
            .filter(|verb| words.iter().any(|w| w.as_str() == **verb))
            .map(|verb| verb.to_string())
            .collect();
        let implicit_topics: Vec<String> = IMPLICIT_TOPICS
            .iter()
            .filter(|(_, hints)| has_any_token(&words, hints))
            .map(|(topic, _)| topic.to_string())
            .collect();
        if !implicit_topics.is_empty() || !actions.is_empty() {
            confidence += SEMANTIC_GAIN;
        }

        let mut context = ContextLinks::default();
        if !recent_topics.is_empty() {
            context.has_pronouns = has_any_token(&words, PRONOUNS);
            if context.has_pronouns {
                let skip = recent_topics.len().saturating_sub(REFERENCE_DEPTH);
                context
                    .connections
                    .extend(recent_topics[skip..].iter().map(|t| t.as_ref().to_string()));
                confidence += PRONOUN_GAIN;
            }

            context.has_continuation = has_any_token(&words, CONTINUATIONS);
            if context.has_continuation
                && let Some(last) = recent_topics.last()
            {
                context.connections.push(last.as_ref().to_string());
                confidence += CONTINUATION_GAIN;
            }
        }

        let mut requests = Vec::new();
        for (kind, phrases) in RequestKind::PATTERNS {
            if has_any_phrase(&normalized, phrases) {
                requests.push(kind);
                confidence += REQUEST_GAIN;
            }
        }
        let detected_intent = requests.last().copied();

        let mut emotions = Vec::new();
        for (emotion, phrases) in Emotion::PATTERNS {
            if has_any_phrase(&normalized, phrases) {
                emotions.push(emotion);
                confidence += EMOTION_GAIN;
            }
        }

        let sentiment_score = sentiment_score(&words);
        let sentiment = match sentiment_score {
            s if s > 0 => Sentiment::Positive,
            s if s < 0 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        };

        let confidence = confidence.min(1.0);
        let interpretation = interpret(confidence, detected_intent, &implicit_topics, &context);

        trace!(
            confidence,
            intent = detected_intent.map(|k| k.as_str()),
            "Analyzed implicit intent"
        );

        Self {
            structure,
            actions,
            implicit_topics,
            context,
            requests,
            detected_intent,
            emotions,
            sentiment,
            sentiment_score,
            interpretation,
            confidence,
        }
    }
}

fn structure(text: &str, words: &[String], normalized: &str) -> SentenceStructure {
    let has_question_mark = text.contains('?');
    SentenceStructure {
        is_question: has_question_mark || has_any_token(words, QUESTION_WORDS),
        is_request: has_any_token(words, REQUEST_WORDS) || has_any_phrase(normalized, REQUEST_PHRASES),
        is_statement: !has_question_mark,
        word_count: text.split_whitespace().count(),
        sentence_count: text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count(),
    }
}

fn sentiment_score(words: &[String]) -> i32 {
    words.iter().fold(0, |score, word| {
        if POSITIVE_WORDS.contains(&word.as_str()) {
            score + 1
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            score - 1
        } else {
            score
        }
    })
}

fn interpret(
    confidence: f32,
    intent: Option<RequestKind>,
    topics: &[String],
    context: &ContextLinks,
) -> String {
    if confidence >= HIGH_CONFIDENCE {
        match intent {
            Some(RequestKind::Help | RequestKind::Guidance) if topics.is_empty() => {
                "Looking for help or guidance".to_string()
            }
            Some(RequestKind::Help | RequestKind::Guidance) => {
                format!("Looking for help or guidance with {}", topics.join(", "))
            }
            Some(RequestKind::Explanation) => "Wants something explained".to_string(),
            Some(RequestKind::Opinion) => "Asking for an opinion or recommendation".to_string(),
            Some(RequestKind::Comparison) => "Wants options compared".to_string(),
            None => "Clear message without an explicit request".to_string(),
        }
    } else if confidence >= MEDIUM_CONFIDENCE {
        if context.connections.is_empty() {
            "Unclear without more context".to_string()
        } else {
            format!("Probably follows up on {}", context.connections.join(", "))
        }
    } else {
        "Ambiguous; ask for more detail".to_string()
    }
}
