//! Rule-based entity extraction.
//!
//! Treats maximal runs of capitalized words as entity spans. Sentence starters
//! that are stop words ("The", "I") never start a span, and punctuation after
//! a word closes the current span. Tokens written entirely in capitals are
//! labelled `ORG`, everything else `MISC`.
//!
//! Offsets are character offsets, not byte offsets.

use async_trait::async_trait;
use tracing::instrument;

use notescape_core::{is_stop_word, Entity, EntityExtractor, Result};

/// Label for acronym-style spans such as "NASA".
pub const LABEL_ORG: &str = "ORG";

/// Label for every other capitalized span.
pub const LABEL_MISC: &str = "MISC";

/// Capitalized-span entity extractor. Needs no model or network.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedExtractor;

impl RuleBasedExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous extraction used by the trait impl.
    pub fn extract_spans(&self, text: &str) -> Vec<Entity> {
        let chars: Vec<char> = text.chars().collect();
        let tokens = tokenize(&chars);

        let mut entities = Vec::new();
        let mut run: Option<(usize, usize)> = None;

        for token in &tokens {
            if !token.is_candidate(&chars) {
                flush(&chars, &mut run, &mut entities);
                continue;
            }

            run = match run {
                Some((start, _)) if !token.breaks_before => Some((start, token.end)),
                Some(_) => {
                    flush(&chars, &mut run, &mut entities);
                    Some((token.start, token.end))
                }
                None => Some((token.start, token.end)),
            };

            if token.breaks_after {
                flush(&chars, &mut run, &mut entities);
            }
        }
        flush(&chars, &mut run, &mut entities);

        entities
    }
}

#[async_trait]
impl EntityExtractor for RuleBasedExtractor {
    #[instrument(skip(self, text), fields(subsystem = "inference", component = "rule_ner", op = "extract", text_len = text.len()))]
    async fn extract(&self, text: &str) -> Result<Vec<Entity>> {
        Ok(self.extract_spans(text))
    }

    fn model_name(&self) -> &str {
        "rules"
    }
}

/// A whitespace-delimited word with surrounding punctuation trimmed off.
struct Token {
    start: usize,
    end: usize,
    breaks_before: bool,
    breaks_after: bool,
}

impl Token {
    fn is_candidate(&self, chars: &[char]) -> bool {
        if self.start >= self.end {
            return false;
        }
        if !chars[self.start].is_uppercase() {
            return false;
        }
        let word: String = chars[self.start..self.end].iter().collect::<String>().to_lowercase();
        !is_stop_word(&word)
    }
}

fn tokenize(chars: &[char]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let raw_start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        let raw_end = i;

        let mut start = raw_start;
        while start < raw_end && !chars[start].is_alphanumeric() {
            start += 1;
        }
        let mut end = raw_end;
        while end > start && !chars[end - 1].is_alphanumeric() {
            end -= 1;
        }

        // Possessive suffix: "Alice's" -> "Alice"
        if end - start > 2
            && (chars[end - 1] == 's' || chars[end - 1] == 'S')
            && (chars[end - 2] == '\'' || chars[end - 2] == '\u{2019}')
        {
            end -= 2;
        }

        tokens.push(Token {
            start,
            end,
            breaks_before: start > raw_start,
            breaks_after: end < raw_end,
        });
    }

    tokens
}

fn flush(chars: &[char], run: &mut Option<(usize, usize)>, out: &mut Vec<Entity>) {
    if let Some((start, end)) = run.take() {
        let text: String = chars[start..end].iter().collect();
        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        let label = if letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase()) {
            LABEL_ORG
        } else {
            LABEL_MISC
        };
        out.push(Entity::new(text, label, start, end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        RuleBasedExtractor::new()
            .extract_spans(text)
            .into_iter()
            .map(|e| e.text)
            .collect()
    }

    #[test]
    fn test_single_place_name() {
        assert_eq!(texts("Paris is beautiful in spring"), vec!["Paris"]);
        assert_eq!(texts("I visited Paris last spring"), vec!["Paris"]);
    }

    #[test]
    fn test_offsets_are_character_offsets() {
        let entities = RuleBasedExtractor::new().extract_spans("I visited Paris last spring");
        assert_eq!(entities[0].start, 10);
        assert_eq!(entities[0].end, 15);

        let entities = RuleBasedExtractor::new().extract_spans("naïve Zürich");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Zürich");
        assert_eq!((entities[0].start, entities[0].end), (6, 12));
    }

    #[test]
    fn test_multi_word_spans() {
        assert_eq!(
            texts("Ada Lovelace worked with Charles Babbage."),
            vec!["Ada Lovelace", "Charles Babbage"]
        );
    }

    #[test]
    fn test_punctuation_breaks_span() {
        assert_eq!(texts("We toured Paris, London and Rome."), vec!["Paris", "London", "Rome"]);
    }

    #[test]
    fn test_stop_word_sentence_starters_skipped() {
        assert!(texts("The cat sat. It was happy.").is_empty());
    }

    #[test]
    fn test_possessive_stripped() {
        assert_eq!(texts("We met at Alice's house"), vec!["Alice"]);
        assert_eq!(texts("We met at Alice\u{2019}s house"), vec!["Alice"]);
    }

    #[test]
    fn test_acronym_label() {
        let entities = RuleBasedExtractor::new().extract_spans("Both NASA and Mars rovers");
        assert_eq!(entities[0].text, "NASA");
        assert_eq!(entities[0].label, LABEL_ORG);
        assert_eq!(entities[1].text, "Mars");
        assert_eq!(entities[1].label, LABEL_MISC);
    }

    #[test]
    fn test_empty_and_lowercase_text() {
        assert!(texts("").is_empty());
        assert!(texts("   ").is_empty());
        assert!(texts("nothing capitalized here").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "Grace Hopper joined the Navy in New York.";
        assert_eq!(texts(text), texts(text));
    }

    #[tokio::test]
    async fn test_trait_impl() {
        let extractor = RuleBasedExtractor::new();
        let entities = extractor.extract("Tokyo at night").await.unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(extractor.model_name(), "rules");
    }
}
