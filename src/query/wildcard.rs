//! Wildcard query implementation.

use std::fmt;

use regex::Regex;

use crate::error::{Result, TweetdexError};
use crate::index::{PostingList, Segment};

/// A query that matches every term of a field against a glob pattern.
///
/// `*` matches any sequence of characters (including none) and `?` exactly
/// one character. A backslash makes the next character literal, so `\*`
/// and `\?` match the characters themselves. The pattern must match the
/// whole term.
#[derive(Debug, Clone)]
pub struct WildcardQuery {
    field: String,
    pattern: String,
    /// Literal text before the first wildcard.
    prefix: String,
    regex: Regex,
}

impl WildcardQuery {
    /// Create a new wildcard query.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, pattern: P) -> Result<Self> {
        let field = field.into();
        let pattern = pattern.into();
        let (regex, prefix) = Self::compile_pattern(&pattern)?;

        Ok(WildcardQuery {
            field,
            pattern,
            prefix,
            regex,
        })
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check whether a term text matches the pattern.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Compile a wildcard pattern into an anchored regex, also returning
    /// the literal prefix that every match starts with.
    fn compile_pattern(pattern: &str) -> Result<(Regex, String)> {
        let mut regex_pattern = String::from("(?s)^");
        let mut prefix = String::new();
        let mut in_prefix = true;

        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            let literal = match c {
                '*' => {
                    regex_pattern.push_str(".*");
                    in_prefix = false;
                    continue;
                }
                '?' => {
                    regex_pattern.push('.');
                    in_prefix = false;
                    continue;
                }
                // A trailing backslash stands for itself.
                '\\' => chars.next().unwrap_or('\\'),
                c => c,
            };

            let mut buf = [0u8; 4];
            regex_pattern.push_str(&regex::escape(literal.encode_utf8(&mut buf)));
            if in_prefix {
                prefix.push(literal);
            }
        }
        regex_pattern.push('$');

        let regex = Regex::new(&regex_pattern).map_err(|e| {
            TweetdexError::query(format!("Invalid wildcard pattern '{pattern}': {e}"))
        })?;
        Ok((regex, prefix))
    }

    pub(crate) fn postings(&self, segment: &Segment) -> PostingList {
        let matching: Vec<&PostingList> = segment
            .prefixed_terms(&self.field, &self.prefix)
            .filter(|(term, _)| self.matches(term.text()))
            .map(|(_, postings)| postings)
            .collect();

        match matching.as_slice() {
            [] => PostingList::new(),
            [single] => (*single).clone(),
            _ => PostingList::union_all(matching.iter().copied()),
        }
    }
}

impl PartialEq for WildcardQuery {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.pattern == other.pattern
    }
}

impl Eq for WildcardQuery {}

impl fmt::Display for WildcardQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_patterns() {
        let query = WildcardQuery::new("text", "hel*").unwrap();
        assert!(query.matches("hello"));
        assert!(query.matches("hel"));
        assert!(query.matches("help!x"));
        assert!(!query.matches("shell"));

        let query = WildcardQuery::new("text", "h?llo").unwrap();
        assert!(query.matches("hello"));
        assert!(query.matches("hällo"));
        assert!(!query.matches("hllo"));
    }

    #[test]
    fn test_sigil_patterns() {
        let mention = WildcardQuery::new("text", "*@*").unwrap();
        assert!(mention.matches("@alice"));
        assert!(mention.matches("me@example.com"));
        assert!(!mention.matches("alice"));

        let hashtag = WildcardQuery::new("text", "*#*").unwrap();
        assert!(hashtag.matches("#fun"));
        assert!(!hashtag.matches("fun"));
    }

    #[test]
    fn test_star_matches_everything() {
        let query = WildcardQuery::new("text", "*").unwrap();
        assert!(query.matches(""));
        assert!(query.matches("anything at all"));
    }

    #[test]
    fn test_regex_characters_are_literal() {
        let query = WildcardQuery::new("text", "a.b+(c)").unwrap();
        assert!(query.matches("a.b+(c)"));
        assert!(!query.matches("axbb(c)"));
    }

    #[test]
    fn test_escapes() {
        let query = WildcardQuery::new("text", r"what\?").unwrap();
        assert!(query.matches("what?"));
        assert!(!query.matches("whatx"));

        let query = WildcardQuery::new("text", r"\**").unwrap();
        assert!(query.matches("*star"));
        assert!(!query.matches("star"));

        let query = WildcardQuery::new("text", r"end\").unwrap();
        assert!(query.matches(r"end\"));
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(WildcardQuery::new("t", "hel*o").unwrap().prefix, "hel");
        assert_eq!(WildcardQuery::new("t", r"a\*b?").unwrap().prefix, "a*b");
        assert_eq!(WildcardQuery::new("t", "*@*").unwrap().prefix, "");
    }

    #[test]
    fn test_equality_ignores_compiled_regex() {
        assert_eq!(
            WildcardQuery::new("text", "*#*").unwrap(),
            WildcardQuery::new("text", "*#*").unwrap()
        );
        assert_eq!(
            WildcardQuery::new("text", "*#*").unwrap().to_string(),
            "text:*#*"
        );
    }
}
