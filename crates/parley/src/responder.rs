//! Message handling: classify, recall, reply, remember.

use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::{Result, bail};
use parley_memory::{ConversationTurn, MemoryStore, RecallQuery, TurnId};
use parley_nlu::{Analysis, Classifier, Intent, KeywordClassifier, Topic, Understanding};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Recent turns whose topics feed the understanding layer.
const RECENT_TOPICS: usize = 5;

/// Understanding results at or below this confidence are ignored.
const UNDERSTANDING_THRESHOLD: f32 = 0.5;

/// Keywords listed in the general reply.
const LISTED_KEYWORDS: usize = 5;

/// One handled message.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub turn_id: TurnId,
    pub response: String,
    pub topic: Topic,
    pub intent: Intent,
    pub keywords: BTreeSet<String>,
    pub confidence: f32,
    pub importance: f32,
    pub context_count: usize,
    /// Topics of the recalled turns, in recall order.
    pub context_topics: Vec<String>,
    /// Whether the understanding layer adjusted the analysis.
    pub enhanced: bool,
    pub processing_time_ms: u64,
}

/// Produces replies and records each exchange in the store.
pub struct Responder {
    store: MemoryStore,
    classifier: KeywordClassifier,
    arithmetic: Regex,
}

impl Responder {
    pub fn new(store: MemoryStore) -> Result<Self> {
        Ok(Self {
            store,
            classifier: KeywordClassifier::new()?,
            arithmetic: Regex::new(r"(-?\d+(?:\.\d+)?)\s*([-+*/^])\s*(-?\d+(?:\.\d+)?)")?,
        })
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Handle one user message.
    pub fn respond(&self, text: &str) -> Result<Exchange> {
        let started = Instant::now();
        let text = text.trim();
        if text.is_empty() {
            bail!("Message is empty");
        }

        let (analysis, enhanced) = self.analyze(text);

        let query = RecallQuery::new(text, analysis.topic.as_str())
            .with_keywords(analysis.keywords.iter().cloned());
        let context = self.store.query(&query);
        let response = self.render(text, &analysis, &context);

        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let turn = ConversationTurn::new(text, response.as_str(), analysis.topic.as_str())
            .with_keywords(analysis.keywords.iter().cloned())
            .with_confidence(analysis.confidence)
            .with_importance(analysis.importance)
            .with_context(context.len())
            .with_processing_time_ms(processing_time_ms);
        let turn_id = turn.id;
        self.store.add(turn)?;

        debug!(
            %turn_id,
            topic = %analysis.topic,
            intent = %analysis.intent,
            context = context.len(),
            enhanced,
            "Handled message"
        );

        Ok(Exchange {
            turn_id,
            response,
            topic: analysis.topic,
            intent: analysis.intent,
            keywords: analysis.keywords,
            confidence: analysis.confidence,
            importance: analysis.importance,
            context_count: context.len(),
            context_topics: context.into_iter().map(|t| t.topic).collect(),
            enhanced,
            processing_time_ms,
        })
    }

    /// Classify, then let a confident understanding pass refine the result.
    fn analyze(&self, text: &str) -> (Analysis, bool) {
        let mut analysis = self.classifier.classify(text);

        let recent: Vec<String> = self
            .store
            .recent(RECENT_TOPICS)
            .into_iter()
            .map(|t| t.topic)
            .collect();
        let understanding = Understanding::analyze(text, &recent);
        if understanding.confidence <= UNDERSTANDING_THRESHOLD {
            return (analysis, false);
        }

        analysis.confidence = analysis.confidence.max(understanding.confidence);
        if let Some(kind) = understanding.detected_intent {
            analysis.intent = kind.intent();
        }
        (analysis, true)
    }

    fn render(&self, text: &str, analysis: &Analysis, context: &[ConversationTurn]) -> String {
        let body = match (analysis.topic, analysis.intent) {
            (Topic::Mathematics, Intent::Calculation) => self.calculate(text).unwrap_or_else(|| {
                "Give me an expression such as `12 * 7` and I will work it out.".to_string()
            }),
            (Topic::Mathematics, _) => {
                "That sounds like a maths question. Share the equation or numbers involved and we can go through it step by step.".to_string()
            }
            (Topic::Programming, _) => {
                "Happy to help with code. Tell me the language, what you expect to happen and what actually happens.".to_string()
            }
            (Topic::Science, _) => {
                "Good science question. Let's start from the underlying principle and build up to your case.".to_string()
            }
            (Topic::Education, _) => {
                "Let's learn this together. Which part feels least clear so far?".to_string()
            }
            (Topic::Business, _) => {
                "From a business angle, it helps to know the goal, the market and the constraints. What are yours?".to_string()
            }
            (Topic::Creative, _) => {
                "Let's make something. What tone, length and audience do you have in mind?".to_string()
            }
            (Topic::General, intent) => {
                let keywords: Vec<&str> = analysis
                    .keywords
                    .iter()
                    .take(LISTED_KEYWORDS)
                    .map(String::as_str)
                    .collect();
                if keywords.is_empty() {
                    format!("I read this as a {intent} request. Could you tell me a bit more?")
                } else {
                    format!(
                        "I read this as a {intent} request about {}. Could you tell me a bit more?",
                        keywords.join(", ")
                    )
                }
            }
        };

        format!("{}{body}", context_preface(context))
    }

    /// Evaluate the first `a op b` expression in the text.
    fn calculate(&self, text: &str) -> Option<String> {
        let caps = self.arithmetic.captures(text)?;
        let a: f64 = caps[1].parse().ok()?;
        let b: f64 = caps[3].parse().ok()?;
        let op = &caps[2];

        let result = match op {
            "+" => a + b,
            "-" => a - b,
            "*" => a * b,
            "/" if b == 0.0 => return Some(format!("{a} / {b} is undefined: division by zero.")),
            "/" => a / b,
            "^" => a.powf(b),
            _ => return None,
        };

        Some(format!("{a} {op} {b} = {}", format_number(result)))
    }
}

/// A short lead-in naming the topics of recalled turns.
fn context_preface(context: &[ConversationTurn]) -> String {
    match context {
        [] => String::new(),
        [only] => format!("Following up on our earlier {} conversation.\n\n", only.topic),
        many => {
            let mut topics: Vec<&str> = many.iter().map(|t| t.topic.as_str()).collect();
            topics.sort_unstable();
            topics.dedup();
            format!(
                "Building on what we discussed about {}.\n\n",
                topics.join(", ")
            )
        }
    }
}

/// Whole numbers print without a fractional part.
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use parley_memory::StoreConfig;

    use super::*;

    fn responder() -> Responder {
        let config = StoreConfig::new().with_snapshot_every(0);
        Responder::new(MemoryStore::new(config)).unwrap()
    }

    #[test]
    fn test_calculation_reply() {
        let r = responder();
        let exchange = r.respond("calculate 12 * 7").unwrap();
        assert_eq!(exchange.topic, Topic::Mathematics);
        assert_eq!(exchange.intent, Intent::Calculation);
        assert!(exchange.response.contains("12 * 7 = 84"), "{}", exchange.response);
    }

    #[test]
    fn test_division_by_zero() {
        let r = responder();
        let exchange = r.respond("compute 5 / 0").unwrap();
        assert!(exchange.response.contains("division by zero"));
    }

    #[test]
    fn test_exchange_is_remembered() {
        let r = responder();
        let first = r.respond("How do I debug a python function?").unwrap();
        assert_eq!(first.context_count, 0);
        assert_eq!(r.store().len(), 1);

        let stored = r.store().get(first.turn_id).unwrap();
        assert_eq!(stored.topic, "programming");
        assert!(!stored.context_used);
        assert!(stored.keywords.contains("python"));
    }

    #[test]
    fn test_related_turn_is_recalled() {
        let r = responder();
        r.respond("How do I debug a python function?").unwrap();
        let second = r.respond("Why does my python function crash?").unwrap();

        assert_eq!(second.context_count, 1);
        assert_eq!(second.context_topics, vec!["programming"]);
        assert!(second.response.starts_with("Following up on our earlier programming"));

        let stored = r.store().get(second.turn_id).unwrap();
        assert!(stored.context_used);
        assert_eq!(stored.context_count, 1);
    }

    #[test]
    fn test_understanding_overrides_intent() {
        let r = responder();
        // help_request (0.2) + semantic (0.3 for "help") + emotion (0.1) = 0.6
        let exchange = r.respond("I'm confused, please help").unwrap();
        assert!(exchange.enhanced);
        assert_eq!(exchange.intent, Intent::Guidance);
    }

    #[test]
    fn test_empty_message_rejected() {
        let r = responder();
        assert!(r.respond("   ").is_err());
        assert!(r.store().is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(84.0), "84");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }

    #[test]
    fn test_context_preface_dedups_topics() {
        let turns = vec![
            ConversationTurn::new("a", "b", "science"),
            ConversationTurn::new("c", "d", "business"),
            ConversationTurn::new("e", "f", "science"),
        ];
        assert_eq!(
            context_preface(&turns),
            "Building on what we discussed about business, science.\n\n"
        );
        assert!(context_preface(&[]).is_empty());
    }
}
