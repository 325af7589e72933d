//! Term query implementation.

use std::fmt;

use crate::index::{PostingList, Segment, Term};

/// A query that matches documents containing one exact term.
///
/// The term text is looked up as given; it is not passed through the
/// field's tokenizer, so queries on tokenized fields must use lower case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    term: Term,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, term: T) -> Self {
        TermQuery {
            term: Term::new(field, term),
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        self.term.field()
    }

    /// Get the term text.
    pub fn text(&self) -> &str {
        self.term.text()
    }

    /// Get the term.
    pub fn term(&self) -> &Term {
        &self.term
    }

    pub(crate) fn postings(&self, segment: &Segment) -> PostingList {
        segment.postings(&self.term).cloned().unwrap_or_default()
    }
}

impl fmt::Display for TermQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)
    }
}
