//! Boolean query implementation.

use std::fmt;

use crate::error::{Result, TweetdexError};
use crate::index::{PostingList, Segment};
use crate::query::Query;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

impl Occur {
    fn prefix(self) -> &'static str {
        match self {
            Occur::Must => "+",
            Occur::Should => "",
            Occur::MustNot => "-",
        }
    }
}

/// A clause in a boolean query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanClause {
    /// The query for this clause.
    pub query: Query,
    /// The occurrence requirement.
    pub occur: Occur,
}

impl BooleanClause {
    /// Create a new boolean clause.
    pub fn new<Q: Into<Query>>(query: Q, occur: Occur) -> Self {
        BooleanClause {
            query: query.into(),
            occur,
        }
    }

    /// Create a MUST clause.
    pub fn must<Q: Into<Query>>(query: Q) -> Self {
        BooleanClause::new(query, Occur::Must)
    }

    /// Create a SHOULD clause.
    pub fn should<Q: Into<Query>>(query: Q) -> Self {
        BooleanClause::new(query, Occur::Should)
    }

    /// Create a MUST_NOT clause.
    pub fn must_not<Q: Into<Query>>(query: Q) -> Self {
        BooleanClause::new(query, Occur::MustNot)
    }
}

/// A query that combines other queries with boolean logic.
///
/// Matching documents are those that match every `Must` clause and no
/// `MustNot` clause. Without `Must` clauses, a document must match at least
/// one `Should` clause instead; when `Must` clauses exist, `Should` clauses
/// do not change the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
}

impl BooleanQuery {
    /// Create a new, empty boolean query.
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
        }
    }

    /// Add a clause.
    pub fn add_clause(&mut self, clause: BooleanClause) {
        self.clauses.push(clause);
    }

    /// Add a MUST clause.
    pub fn add_must<Q: Into<Query>>(&mut self, query: Q) {
        self.add_clause(BooleanClause::must(query));
    }

    /// Add a SHOULD clause.
    pub fn add_should<Q: Into<Query>>(&mut self, query: Q) {
        self.add_clause(BooleanClause::should(query));
    }

    /// Add a MUST_NOT clause.
    pub fn add_must_not<Q: Into<Query>>(&mut self, query: Q) {
        self.add_clause(BooleanClause::must_not(query));
    }

    /// Add a MUST clause, builder style.
    pub fn must<Q: Into<Query>>(mut self, query: Q) -> Self {
        self.add_must(query);
        self
    }

    /// Add a SHOULD clause, builder style.
    pub fn should<Q: Into<Query>>(mut self, query: Q) -> Self {
        self.add_should(query);
        self
    }

    /// Add a MUST_NOT clause, builder style.
    pub fn must_not<Q: Into<Query>>(mut self, query: Q) -> Self {
        self.add_must_not(query);
        self
    }

    /// Get all clauses.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    /// Check if the query has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    fn queries(&self, occur: Occur) -> impl Iterator<Item = &Query> {
        self.clauses
            .iter()
            .filter(move |clause| clause.occur == occur)
            .map(|clause| &clause.query)
    }

    /// A boolean query needs at least one clause that can produce matches.
    pub(crate) fn check_positive_clause(&self) -> Result<()> {
        if self.clauses.is_empty() {
            return Err(TweetdexError::query("boolean query has no clauses"));
        }
        if self.clauses.iter().all(|c| c.occur == Occur::MustNot) {
            return Err(TweetdexError::query(
                "boolean query needs at least one MUST or SHOULD clause",
            ));
        }
        Ok(())
    }

    pub(crate) fn postings(&self, segment: &Segment) -> PostingList {
        let mut musts: Vec<PostingList> = self
            .queries(Occur::Must)
            .map(|query| query.postings(segment))
            .collect();

        let mut result = if musts.is_empty() {
            let shoulds: Vec<PostingList> = self
                .queries(Occur::Should)
                .map(|query| query.postings(segment))
                .collect();
            PostingList::union_all(&shoulds)
        } else {
            // Smallest first keeps every intermediate result small.
            musts.sort_by_key(PostingList::len);
            let mut lists = musts.into_iter();
            let mut acc = lists.next().unwrap_or_default();
            for list in lists {
                if acc.is_empty() {
                    break;
                }
                acc = acc.intersect(&list);
            }
            acc
        };

        for query in self.queries(Occur::MustNot) {
            if result.is_empty() {
                break;
            }
            result = result.difference(&query.postings(segment));
        }
        result
    }
}

impl fmt::Display for BooleanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match &clause.query {
                Query::Boolean(inner) => write!(f, "{}({inner})", clause.occur.prefix())?,
                query => write!(f, "{}{query}", clause.occur.prefix())?,
            }
        }
        Ok(())
    }
}
