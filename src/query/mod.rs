//! Query types and their evaluation against a segment.
//!
//! Queries form a closed set ([`Query`]) evaluated by a single dispatch
//! method, so adding a query kind means extending the enum and the match in
//! [`Query::postings`].

pub mod boolean;
pub mod parser;
pub mod term;
pub mod wildcard;

use std::fmt;

pub use boolean::{BooleanClause, BooleanQuery, Occur};
pub use parser::QueryParser;
pub use term::TermQuery;
pub use wildcard::WildcardQuery;

use crate::error::{Result, TweetdexError};
use crate::index::{PostingList, Segment};
use crate::schema::Schema;

/// A query over the inverted index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Exact term lookup.
    Term(TermQuery),
    /// Glob match over the terms of a field.
    Wildcard(WildcardQuery),
    /// Boolean combination of other queries.
    Boolean(BooleanQuery),
}

impl Query {
    /// Check that the query can be evaluated against `schema`.
    ///
    /// Every field must exist and be indexed, and every boolean query must
    /// have a MUST or SHOULD clause.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        match self {
            Query::Term(query) => check_field(schema, query.field()),
            Query::Wildcard(query) => check_field(schema, query.field()),
            Query::Boolean(query) => {
                query.check_positive_clause()?;
                query
                    .clauses()
                    .iter()
                    .try_for_each(|clause| clause.query.validate(schema))
            }
        }
    }

    /// Documents of `segment` matched by this query.
    pub fn postings(&self, segment: &Segment) -> PostingList {
        match self {
            Query::Term(query) => query.postings(segment),
            Query::Wildcard(query) => query.postings(segment),
            Query::Boolean(query) => query.postings(segment),
        }
    }
}

fn check_field(schema: &Schema, field: &str) -> Result<()> {
    match schema.field(field) {
        Some(entry) if entry.indexed => Ok(()),
        Some(_) => Err(TweetdexError::query(format!(
            "field '{field}' is not indexed"
        ))),
        None => Err(TweetdexError::query(format!("unknown field '{field}'"))),
    }
}

impl From<TermQuery> for Query {
    fn from(query: TermQuery) -> Self {
        Query::Term(query)
    }
}

impl From<WildcardQuery> for Query {
    fn from(query: WildcardQuery) -> Self {
        Query::Wildcard(query)
    }
}

impl From<BooleanQuery> for Query {
    fn from(query: BooleanQuery) -> Self {
        Query::Boolean(query)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Term(query) => write!(f, "{query}"),
            Query::Wildcard(query) => write!(f, "{query}"),
            Query::Boolean(query) => write!(f, "{query}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::index::{SegmentId, Term};
    use crate::schema::FieldEntry;

    fn segment() -> Segment {
        let docs = (0..4).map(|_| Document::new()).collect();
        let postings = vec![
            (Term::new("user", "bob"), vec![0, 2]),
            (Term::new("user", "amy"), vec![1, 3]),
            (Term::new("polarity", "4"), vec![0, 1]),
            (Term::new("polarity", "0"), vec![2, 3]),
            (Term::new("text", "#fun"), vec![0, 3]),
            (Term::new("text", "#rust"), vec![1]),
            (Term::new("text", "@alice"), vec![2]),
            (Term::new("text", "hello"), vec![0, 1, 2, 3]),
        ];
        Segment::build(SegmentId::new(0), 0, docs, postings).unwrap()
    }

    fn ids(query: impl Into<Query>) -> Vec<u64> {
        let query: Query = query.into();
        query.postings(&segment()).as_slice().to_vec()
    }

    #[test]
    fn test_term_query() {
        assert_eq!(ids(TermQuery::new("user", "bob")), vec![0, 2]);
        assert!(ids(TermQuery::new("user", "Bob")).is_empty());
        assert!(ids(TermQuery::new("date", "bob")).is_empty());
    }

    #[test]
    fn test_wildcard_query() {
        assert_eq!(ids(WildcardQuery::new("text", "*#*").unwrap()), vec![0, 1, 3]);
        assert_eq!(ids(WildcardQuery::new("text", "*@*").unwrap()), vec![2]);
        assert_eq!(ids(WildcardQuery::new("text", "*").unwrap()), vec![0, 1, 2, 3]);
        assert_eq!(ids(WildcardQuery::new("text", "#r?st").unwrap()), vec![1]);
        assert!(ids(WildcardQuery::new("text", "zz*").unwrap()).is_empty());
    }

    #[test]
    fn test_boolean_must() {
        let query = BooleanQuery::new()
            .must(WildcardQuery::new("text", "*#*").unwrap())
            .must(TermQuery::new("polarity", "4"));
        assert_eq!(ids(query), vec![0, 1]);
    }

    #[test]
    fn test_boolean_should_and_must_not() {
        let query = BooleanQuery::new()
            .should(TermQuery::new("user", "bob"))
            .should(TermQuery::new("text", "#rust"))
            .must_not(TermQuery::new("polarity", "0"));
        assert_eq!(ids(query), vec![0, 1]);
    }

    #[test]
    fn test_should_does_not_change_must_matches() {
        let query = BooleanQuery::new()
            .must(TermQuery::new("user", "amy"))
            .should(TermQuery::new("text", "#rust"));
        assert_eq!(ids(query), vec![1, 3]);
    }

    #[test]
    fn test_nested_boolean() {
        let inner = BooleanQuery::new()
            .should(TermQuery::new("user", "bob"))
            .should(TermQuery::new("user", "amy"));
        let query = BooleanQuery::new()
            .must(inner)
            .must_not(TermQuery::new("text", "#fun"));
        assert_eq!(ids(query), vec![1, 2]);
    }

    #[test]
    fn test_validate() {
        let schema = Schema::tweets();
        assert!(Query::from(TermQuery::new("user", "bob")).validate(&schema).is_ok());

        let err = Query::from(TermQuery::new("lang", "en")).validate(&schema).unwrap_err();
        assert!(matches!(err, TweetdexError::Query(_)));

        assert!(Query::from(BooleanQuery::new()).validate(&schema).is_err());
        let only_not = BooleanQuery::new().must_not(TermQuery::new("user", "bob"));
        assert!(Query::from(only_not).validate(&schema).is_err());

        let nested = BooleanQuery::new().must(BooleanQuery::new());
        assert!(Query::from(nested).validate(&schema).is_err());

        let schema = Schema::new(vec![FieldEntry::exact("note").indexed(false)]).unwrap();
        let err = Query::from(TermQuery::new("note", "x")).validate(&schema).unwrap_err();
        assert!(err.to_string().contains("not indexed"));
    }

    #[test]
    fn test_display() {
        let query: Query = BooleanQuery::new()
            .must(WildcardQuery::new("text", "*#*").unwrap())
            .must(TermQuery::new("polarity", "4"))
            .must_not(BooleanQuery::new().should(TermQuery::new("user", "bob")))
            .into();
        assert_eq!(query.to_string(), "+text:*#* +polarity:4 -(user:bob)");
    }
}
