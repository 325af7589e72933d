//! Query parser for converting query strings to [`Query`] values.
//!
//! Syntax: whitespace-separated clauses of the form `[+|-]field:value`.
//! The value may be double-quoted to include whitespace; inside and outside
//! quotes a backslash makes the next character literal. A value with an
//! unescaped `*` or `?` becomes a [`WildcardQuery`], anything else a
//! [`TermQuery`]. `+` marks a MUST clause, `-` a MUST_NOT clause and no
//! prefix a SHOULD clause.
//!
//! ```
//! use tweetdex::query::{Query, QueryParser};
//!
//! let query = QueryParser::new().parse("+text:*#* +polarity:4").unwrap();
//! assert!(matches!(query, Query::Boolean(_)));
//! ```

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Result, TweetdexError};
use crate::query::{BooleanClause, BooleanQuery, Occur, Query, TermQuery, WildcardQuery};

/// A parser for the clause-list query syntax.
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    /// Field used by clauses without a `field:` part.
    default_field: Option<String>,
}

impl QueryParser {
    /// Create a parser that requires a field on every clause.
    pub fn new() -> Self {
        QueryParser {
            default_field: None,
        }
    }

    /// Set the field used by clauses that do not name one.
    pub fn with_default_field<S: Into<String>>(mut self, field: S) -> Self {
        self.default_field = Some(field.into());
        self
    }

    /// Get the default field.
    pub fn default_field(&self) -> Option<&str> {
        self.default_field.as_deref()
    }

    /// Parse a query string.
    ///
    /// A single clause without a prefix is returned as that query;
    /// everything else becomes a [`BooleanQuery`].
    pub fn parse(&self, query_str: &str) -> Result<Query> {
        let mut parser = QueryStringParser {
            chars: query_str.chars().peekable(),
            default_field: self.default_field.as_deref(),
        };

        let mut clauses = Vec::new();
        while let Some(clause) = parser.parse_clause()? {
            clauses.push(clause);
        }

        match clauses.len() {
            0 => Err(TweetdexError::parse("empty query")),
            1 if clauses[0].occur == Occur::Should => {
                Ok(clauses.remove(0).query)
            }
            _ => {
                let mut query = BooleanQuery::new();
                for clause in clauses {
                    query.add_clause(clause);
                }
                Ok(Query::Boolean(query))
            }
        }
    }
}

/// Value text of a clause, as written and with escapes resolved.
struct Value {
    raw: String,
    unescaped: String,
    has_wildcard: bool,
}

struct QueryStringParser<'a> {
    chars: Peekable<Chars<'a>>,
    default_field: Option<&'a str>,
}

impl QueryStringParser<'_> {
    fn parse_clause(&mut self) -> Result<Option<BooleanClause>> {
        self.skip_whitespace();
        let occur = match self.chars.peek() {
            None => return Ok(None),
            Some('+') => Occur::Must,
            Some('-') => Occur::MustNot,
            Some(_) => Occur::Should,
        };
        if occur != Occur::Should {
            self.chars.next();
        }
        if self.at_clause_end() {
            return Err(TweetdexError::parse("operator without a clause"));
        }

        let field = self.parse_field()?;
        let value = self.parse_value()?;
        if value.raw.is_empty() {
            return Err(TweetdexError::parse(format!(
                "missing value for field '{field}'"
            )));
        }

        let query = if value.has_wildcard {
            Query::Wildcard(WildcardQuery::new(field, value.raw)?)
        } else {
            Query::Term(TermQuery::new(field, value.unescaped))
        };
        Ok(Some(BooleanClause::new(query, occur)))
    }

    /// Read `field:` and return the field name, falling back to the default
    /// field when the clause has no colon.
    fn parse_field(&mut self) -> Result<String> {
        let lookahead = self.chars.clone();
        let mut field = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == ':' {
                self.chars.next();
                if field.is_empty() {
                    return Err(TweetdexError::parse("empty field name"));
                }
                return Ok(field);
            }
            if c.is_whitespace() || c == '"' || c == '\\' {
                break;
            }
            field.push(c);
            self.chars.next();
        }

        match self.default_field {
            Some(default_field) => {
                self.chars = lookahead;
                Ok(default_field.to_string())
            }
            None => Err(TweetdexError::parse(format!(
                "expected 'field:value', found '{field}'"
            ))),
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        let mut value = Value {
            raw: String::new(),
            unescaped: String::new(),
            has_wildcard: false,
        };

        let quoted = self.chars.peek() == Some(&'"');
        if quoted {
            self.chars.next();
        }

        loop {
            let Some(c) = self.chars.next() else {
                if quoted {
                    return Err(TweetdexError::parse("unterminated quoted value"));
                }
                break;
            };
            match c {
                '"' if quoted => break,
                c if c.is_whitespace() && !quoted => break,
                '\\' => {
                    let escaped = self.chars.next().unwrap_or('\\');
                    value.raw.push('\\');
                    value.raw.push(escaped);
                    value.unescaped.push(escaped);
                }
                '*' | '?' => {
                    value.has_wildcard = true;
                    value.raw.push(c);
                    value.unescaped.push(c);
                }
                c => {
                    value.raw.push(c);
                    value.unescaped.push(c);
                }
            }
        }

        if quoted && !self.at_clause_end() {
            return Err(TweetdexError::parse(
                "unexpected text after closing quote",
            ));
        }
        Ok(value)
    }

    fn at_clause_end(&mut self) -> bool {
        self.chars.peek().is_none_or(|c| c.is_whitespace())
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Query> {
        QueryParser::new().parse(input)
    }

    #[test]
    fn test_parse_single_term() {
        assert_eq!(
            parse("user:scotthamilton").unwrap(),
            Query::Term(TermQuery::new("user", "scotthamilton"))
        );
    }

    #[test]
    fn test_parse_wildcard() {
        assert_eq!(
            parse("text:*@*").unwrap(),
            Query::Wildcard(WildcardQuery::new("text", "*@*").unwrap())
        );
    }

    #[test]
    fn test_parse_boolean() {
        let expected = BooleanQuery::new()
            .must(WildcardQuery::new("text", "*#*").unwrap())
            .must(TermQuery::new("polarity", "4"));
        assert_eq!(
            parse("  +text:*#*   +polarity:4 ").unwrap(),
            Query::Boolean(expected)
        );
    }

    #[test]
    fn test_parse_occurs() {
        let expected = BooleanQuery::new()
            .should(TermQuery::new("user", "bob"))
            .should(TermQuery::new("user", "amy"))
            .must_not(TermQuery::new("polarity", "0"));
        assert_eq!(
            parse("user:bob user:amy -polarity:0").unwrap(),
            Query::Boolean(expected)
        );

        // A lone prefixed clause stays a boolean query.
        let expected = BooleanQuery::new().must(TermQuery::new("user", "bob"));
        assert_eq!(parse("+user:bob").unwrap(), Query::Boolean(expected));
    }

    #[test]
    fn test_parse_quoted_values() {
        assert_eq!(
            parse(r#"date:"Mon Apr 06 22:19:45 PDT 2009""#).unwrap(),
            Query::Term(TermQuery::new("date", "Mon Apr 06 22:19:45 PDT 2009"))
        );
        assert_eq!(
            parse(r#"text:"say \"hi\"""#).unwrap(),
            Query::Term(TermQuery::new("text", r#"say "hi""#))
        );
    }

    #[test]
    fn test_parse_escaped_wildcards() {
        assert_eq!(
            parse(r"text:what\?").unwrap(),
            Query::Term(TermQuery::new("text", "what?"))
        );
        assert_eq!(
            parse(r"text:what\?*").unwrap(),
            Query::Wildcard(WildcardQuery::new("text", r"what\?*").unwrap())
        );
    }

    #[test]
    fn test_value_may_contain_colons() {
        assert_eq!(
            parse("text:http://t.co").unwrap(),
            Query::Term(TermQuery::new("text", "http://t.co"))
        );
    }

    #[test]
    fn test_default_field() {
        let parser = QueryParser::new().with_default_field("text");
        assert_eq!(parser.default_field(), Some("text"));
        assert_eq!(
            parser.parse("hello").unwrap(),
            Query::Term(TermQuery::new("text", "hello"))
        );
        assert_eq!(
            parser.parse("user:bob").unwrap(),
            Query::Term(TermQuery::new("user", "bob"))
        );
    }

    #[test]
    fn test_parse_errors() {
        for input in [
            "",
            "   ",
            "hello",
            ":bob",
            "user:",
            "+",
            "- user:bob",
            r#"text:"open"#,
            r#"text:"a"b"#,
        ] {
            let err = parse(input).unwrap_err();
            assert!(matches!(err, TweetdexError::Query(_)), "input {input:?}");
        }
    }
}
