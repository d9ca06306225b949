//! Stop-word/frequency keyword extraction.

use std::collections::HashMap;

use notescape_core::{defaults, is_stop_word};

/// Extracts the most frequent non-stop-word tokens from text.
#[derive(Debug, Clone, Copy)]
pub struct KeywordExtractor {
    min_token_len: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            min_token_len: defaults::KEYWORD_MIN_TOKEN_LEN,
        }
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top `top_n` keywords, most frequent first. Ties keep first-seen order.
    pub fn extract(&self, text: &str, top_n: usize) -> Vec<String> {
        if top_n == 0 {
            return Vec::new();
        }

        let lowered = text.to_lowercase().replace('\u{2019}', "'");

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for raw in lowered.split_whitespace() {
            let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if trimmed.is_empty() || is_stop_word(trimmed) {
                continue;
            }

            // "isn't" is caught above; "mother-in-law" becomes "motherinlaw"
            let token: String = trimmed.chars().filter(|c| c.is_alphanumeric()).collect();
            if token.chars().count() < self.min_token_len || is_stop_word(&token) {
                continue;
            }

            match counts.get_mut(&token) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(token.clone(), 1);
                    order.push(token);
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts
        let mut ranked: Vec<(String, usize)> = order
            .into_iter()
            .map(|t| {
                let count = counts.get(&t).copied().unwrap_or(0);
                (t, count)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked.into_iter().take(top_n).map(|(t, _)| t).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str, top_n: usize) -> Vec<String> {
        KeywordExtractor::new().extract(text, top_n)
    }

    #[test]
    fn test_frequency_then_first_seen() {
        assert_eq!(
            extract("the cat sat on the mat and the cat ran", 5),
            vec!["cat", "sat", "mat", "ran"]
        );
    }

    #[test]
    fn test_top_n_truncates() {
        assert_eq!(extract("the cat sat on the mat and the cat ran", 2), vec!["cat", "sat"]);
        assert!(extract("the cat sat", 0).is_empty());
    }

    #[test]
    fn test_punctuation_and_case() {
        assert_eq!(
            extract("Rust! rust? RUST, borrow-checker.", 5),
            vec!["rust", "borrowchecker"]
        );
    }

    #[test]
    fn test_contractions_are_stop_words() {
        assert_eq!(extract("Isn't it great? Don't panic, I'm fine", 5), vec!["great", "panic", "fine"]);
        assert_eq!(extract("isn\u{2019}t working", 5), vec!["working"]);
    }

    #[test]
    fn test_short_tokens_dropped() {
        assert_eq!(extract("ox ax go zoo", 5), vec!["zoo"]);
    }

    #[test]
    fn test_min_token_len_is_in_characters() {
        assert_eq!(extract("café über", 5), vec!["café", "über"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(extract("", 15).is_empty());
        assert!(extract("   \n\t ", 15).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "graph nodes graph edges nodes weights";
        assert_eq!(extract(text, 15), extract(text, 15));
        assert_eq!(extract(text, 15), vec!["graph", "nodes", "edges", "weights"]);
    }
}
