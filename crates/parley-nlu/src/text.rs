//! Small text helpers shared by the classifier and the understanding layer.

/// Lowercased word tokens. Apostrophes stay inside words ("don't").
pub(crate) fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Whether `haystack` contains any of `needles` as a whole token.
pub(crate) fn has_any_token(haystack: &[String], needles: &[&str]) -> bool {
    haystack.iter().any(|t| needles.contains(&t.as_str()))
}

/// Lowercase and collapse runs of whitespace, for phrase matching.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the normalized text contains any phrase on word boundaries.
pub(crate) fn has_any_phrase(normalized: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| contains_phrase(normalized, phrase))
}

fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    normalized.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before = normalized[..start].chars().next_back();
        let after = normalized[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        assert_eq!(
            tokens("Why DOESN'T this-work? 42 times"),
            vec!["why", "doesn't", "this", "work", "42", "times"]
        );
        assert!(tokens("  ?! ").is_empty());
    }

    #[test]
    fn test_phrase_respects_word_boundaries() {
        let text = normalize("Could   you   HELP me");
        assert!(has_any_phrase(&text, &["help me"]));
        assert!(!has_any_phrase(&text, &["elp me"]));
        assert!(!has_any_phrase("compared", &["compare"]));
        assert!(has_any_phrase("compare these", &["compare"]));
    }
}
