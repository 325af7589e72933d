//! Whitespace tokenizer implementation.

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A tokenizer that splits text on whitespace and normalizes each word.
///
/// Each whitespace-separated word is stripped of leading and trailing
/// punctuation and lower-cased. Words made only of punctuation produce no
/// token. `@` and `#` are kept, so mentions and hashtags stay searchable.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Result<TokenStream<'a>> {
        Ok(Box::new(Words {
            text,
            offset: 0,
            position: 0,
        }))
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

/// Whether `c` is stripped from the edges of a word.
fn is_strippable(c: char) -> bool {
    if c == '@' || c == '#' {
        return false;
    }
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{2026}' | '«' | '»' | '¡' | '¿'
        )
}

/// Lazy iterator over the normalized words of a text.
struct Words<'a> {
    text: &'a str,
    offset: usize,
    position: usize,
}

impl Iterator for Words<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let rest = &self.text[self.offset..];
            let start = self.offset + rest.find(|c: char| !c.is_whitespace())?;
            let word_len = self.text[start..]
                .find(char::is_whitespace)
                .unwrap_or(self.text.len() - start);
            let end = start + word_len;
            self.offset = end;

            let word = &self.text[start..end];
            let trimmed_start = word.trim_start_matches(is_strippable);
            let lead = word.len() - trimmed_start.len();
            let trimmed = trimmed_start.trim_end_matches(is_strippable);
            if trimmed.is_empty() {
                continue;
            }

            let token_start = start + lead;
            let token = Token::with_offsets(
                trimmed.to_lowercase(),
                self.position,
                token_start,
                token_start + trimmed.len(),
            );
            self.position += 1;
            return Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        WhitespaceTokenizer::new()
            .tokenize(input)
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_whitespace_tokenizer() {
        assert_eq!(texts("hello  world\ttest"), vec!["hello", "world", "test"]);
    }

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(
            texts("Hello, World! (really?) \"quoted\""),
            vec!["hello", "world", "really", "quoted"]
        );
    }

    #[test]
    fn test_keeps_mentions_and_hashtags() {
        assert_eq!(
            texts("@Alice: loving #RustLang..."),
            vec!["@alice", "loving", "#rustlang"]
        );
    }

    #[test]
    fn test_inner_punctuation_is_kept() {
        assert_eq!(texts("don't e-mail"), vec!["don't", "e-mail"]);
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(texts("").is_empty());
        assert!(texts("   \t\n ").is_empty());
        assert!(texts("... !!! --").is_empty());
    }

    #[test]
    fn test_positions_and_offsets() {
        let tokens: Vec<Token> = WhitespaceTokenizer::new()
            .tokenize("  ¡Hola! ... amigo")
            .unwrap()
            .collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "hola");
        assert_eq!(tokens[0].position, 0);
        assert_eq!(&"  ¡Hola! ... amigo"[tokens[0].start_offset..tokens[0].end_offset], "Hola");
        assert_eq!(tokens[1].text, "amigo");
        assert_eq!(tokens[1].position, 1);
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(WhitespaceTokenizer::new().name(), "whitespace");
    }
}
