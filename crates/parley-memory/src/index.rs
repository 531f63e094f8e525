//! Secondary indices over the turn log.
//!
//! Indices address turns by *slot*: a sequence number assigned by the store
//! on insertion. Slots are unique among retained turns even when callers
//! reuse a [`crate::TurnId`], and eviction removes the evicted slot from both
//! indices, so every slot held here names a turn that is still in the log.

use std::collections::{BTreeSet, HashMap, VecDeque};

use tracing::trace;

use crate::types::ConversationTurn;

/// Position of a turn in the store's insertion sequence.
pub(crate) type Slot = u64;

/// Topic and keyword indices.
#[derive(Debug)]
pub(crate) struct TurnIndex {
    /// Topic label -> slots, oldest first, bounded per topic.
    by_topic: HashMap<String, VecDeque<Slot>>,
    /// Keyword -> slots.
    by_keyword: HashMap<String, BTreeSet<Slot>>,
    topic_cap: usize,
    topic_retain: usize,
}

impl TurnIndex {
    pub(crate) fn new(topic_cap: usize, topic_retain: usize) -> Self {
        Self {
            by_topic: HashMap::new(),
            by_keyword: HashMap::new(),
            topic_cap,
            topic_retain: topic_retain.min(topic_cap),
        }
    }

    /// Index a newly appended turn.
    pub(crate) fn insert(&mut self, slot: Slot, turn: &ConversationTurn) {
        let slots = self.by_topic.entry(turn.topic.clone()).or_default();
        slots.push_back(slot);
        if slots.len() > self.topic_cap {
            let drop = slots.len() - self.topic_retain;
            slots.drain(..drop);
            trace!(topic = %turn.topic, dropped = drop, "Compacted topic index");
        }

        for keyword in &turn.keywords {
            self.by_keyword
                .entry(keyword.clone())
                .or_default()
                .insert(slot);
        }
    }

    /// Remove an evicted turn from both indices.
    pub(crate) fn remove(&mut self, slot: Slot, turn: &ConversationTurn) {
        if let Some(slots) = self.by_topic.get_mut(&turn.topic) {
            // Evictions are FIFO, so the slot is normally at the front.
            if slots.front() == Some(&slot) {
                slots.pop_front();
            } else {
                slots.retain(|s| *s != slot);
            }
            if slots.is_empty() {
                self.by_topic.remove(&turn.topic);
            }
        }

        for keyword in &turn.keywords {
            if let Some(slots) = self.by_keyword.get_mut(keyword) {
                slots.remove(&slot);
                if slots.is_empty() {
                    self.by_keyword.remove(keyword);
                }
            }
        }
    }

    /// Slots recorded for a topic, oldest first.
    pub(crate) fn topic_slots(&self, topic: &str) -> Vec<Slot> {
        self.by_topic
            .get(topic)
            .map(|slots| slots.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Slots whose turns carry a keyword, oldest first.
    pub(crate) fn keyword_slots(&self, keyword: &str) -> Vec<Slot> {
        self.by_keyword
            .get(keyword)
            .map(|slots| slots.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every slot referenced by either index.
    pub(crate) fn all_slots(&self) -> BTreeSet<Slot> {
        self.by_topic
            .values()
            .flatten()
            .chain(self.by_keyword.values().flatten())
            .copied()
            .collect()
    }

    pub(crate) fn topic_count(&self) -> usize {
        self.by_topic.len()
    }

    pub(crate) fn keyword_count(&self) -> usize {
        self.by_keyword.len()
    }

    pub(crate) fn clear(&mut self) {
        self.by_topic.clear();
        self.by_keyword.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(topic: &str, keywords: &[&str]) -> ConversationTurn {
        ConversationTurn::new("q", "a", topic).with_keywords(keywords.iter().copied())
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut index = TurnIndex::new(50, 30);
        index.insert(0, &turn("science", &["atom", "physics"]));
        index.insert(1, &turn("science", &["atom"]));
        index.insert(2, &turn("business", &["market"]));

        assert_eq!(index.topic_slots("science"), vec![0, 1]);
        assert_eq!(index.keyword_slots("atom"), vec![0, 1]);
        assert_eq!(index.keyword_slots("market"), vec![2]);
        assert!(index.topic_slots("creative").is_empty());
        assert_eq!(index.topic_count(), 2);
        assert_eq!(index.keyword_count(), 3);
    }

    #[test]
    fn test_remove_prunes_empty_entries() {
        let mut index = TurnIndex::new(50, 30);
        let first = turn("science", &["atom"]);
        index.insert(0, &first);
        index.insert(1, &turn("business", &["market"]));

        index.remove(0, &first);
        assert!(index.topic_slots("science").is_empty());
        assert!(index.keyword_slots("atom").is_empty());
        assert_eq!(index.topic_count(), 1);
        assert_eq!(index.keyword_count(), 1);
        assert_eq!(index.all_slots().into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_topic_compaction() {
        let mut index = TurnIndex::new(5, 3);
        for slot in 0..6 {
            index.insert(slot, &turn("general", &[]));
        }
        // Sixth insert exceeds the cap of 5; keep the newest 3.
        assert_eq!(index.topic_slots("general"), vec![3, 4, 5]);

        index.insert(6, &turn("general", &[]));
        assert_eq!(index.topic_slots("general"), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_remove_already_compacted_slot_is_noop() {
        let mut index = TurnIndex::new(2, 1);
        let t = turn("general", &["x"]);
        index.insert(0, &t);
        index.insert(1, &t);
        index.insert(2, &t);
        assert_eq!(index.topic_slots("general"), vec![2]);

        index.remove(0, &t);
        assert_eq!(index.topic_slots("general"), vec![2]);
        assert_eq!(index.keyword_slots("x"), vec![1, 2]);
    }
}
