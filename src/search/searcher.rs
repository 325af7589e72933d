//! Searcher over a fixed snapshot of segments.

use std::sync::Arc;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::Result;
use crate::index::{PostingList, Segment, SegmentId, SegmentSnapshot};
use crate::query::Query;
use crate::schema::Schema;

/// One matching document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchHit {
    /// Segment the document lives in.
    pub segment_id: SegmentId,
    /// Document ID.
    pub doc_id: u64,
}

/// The hits of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Up to `limit` hits, newest segment first, then by document ID.
    pub hits: Vec<SearchHit>,
    /// Number of matching documents, including those beyond the limit.
    pub total_hits: u64,
}

impl SearchResults {
    /// Whether no hit was returned.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Number of returned hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

/// Evaluates queries against the segments published when it was created.
///
/// Segments appended to the store later are not visible to an existing
/// searcher. A searcher is cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Searcher {
    snapshot: SegmentSnapshot,
    schema: Arc<Schema>,
}

impl Searcher {
    /// Create a searcher over a snapshot.
    pub fn new(snapshot: SegmentSnapshot, schema: Arc<Schema>) -> Self {
        Searcher { snapshot, schema }
    }

    /// The snapshot being searched.
    pub fn snapshot(&self) -> &SegmentSnapshot {
        &self.snapshot
    }

    /// Number of searchable documents.
    pub fn num_docs(&self) -> u64 {
        self.snapshot.doc_count()
    }

    /// Run a query and return up to `limit` hits.
    ///
    /// Hits from the most recently flushed segment come first; within a
    /// segment hits are in ascending document ID order.
    pub fn search(&self, query: &Query, limit: usize) -> Result<SearchResults> {
        let per_segment = self.evaluate(query)?;
        let total_hits = per_segment.iter().map(|(_, postings)| postings.len() as u64).sum();

        let hits = per_segment
            .iter()
            .rev()
            .flat_map(|(segment_id, postings)| {
                postings.iter().map(move |doc_id| SearchHit {
                    segment_id: *segment_id,
                    doc_id,
                })
            })
            .take(limit)
            .collect();

        debug!("Query '{query}' matched {total_hits} documents");
        Ok(SearchResults { hits, total_hits })
    }

    /// Count the documents matching a query.
    pub fn count(&self, query: &Query) -> Result<u64> {
        Ok(self
            .evaluate(query)?
            .iter()
            .map(|(_, postings)| postings.len() as u64)
            .sum())
    }

    /// Stored fields of a hit.
    pub fn doc(&self, hit: &SearchHit) -> Result<Document> {
        self.snapshot
            .stored_fields(hit.segment_id, hit.doc_id)
            .cloned()
    }

    /// Matching postings of every segment, oldest segment first.
    fn evaluate(&self, query: &Query) -> Result<Vec<(SegmentId, PostingList)>> {
        query.validate(&self.schema)?;

        Ok(self
            .snapshot
            .as_slice()
            .par_iter()
            .map(|segment: &Arc<Segment>| (segment.id(), query.postings(segment)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexWriter, SegmentStore, WriterConfig};
    use crate::query::{BooleanQuery, TermQuery};
    use crate::storage::MemoryStorage;

    fn tweet(polarity: &str, user: &str, text: &str) -> Document {
        Document::builder()
            .add_field("polarity", polarity)
            .add_field("id", "1")
            .add_field("date", "Mon Apr 06")
            .add_field("query", "NO_QUERY")
            .add_field("user", user)
            .add_field("text", text)
            .build()
    }

    /// Two segments: {0: bob, 1: amy} then {2: bob}.
    fn store() -> Arc<SegmentStore> {
        let store = Arc::new(SegmentStore::open(Arc::new(MemoryStorage::new())).unwrap());
        let mut writer =
            IndexWriter::new(store.clone(), Schema::tweets(), WriterConfig::default()).unwrap();
        writer.add_document(tweet("0", "bob", "first")).unwrap();
        writer.add_document(tweet("4", "amy", "second")).unwrap();
        writer.flush().unwrap();
        writer.add_document(tweet("4", "bob", "third")).unwrap();
        writer.flush().unwrap();
        store
    }

    fn searcher(store: &SegmentStore) -> Searcher {
        Searcher::new(store.list_segments(), Arc::new(Schema::tweets()))
    }

    #[test]
    fn test_hits_are_newest_segment_first() {
        let store = store();
        let results = searcher(&store)
            .search(&TermQuery::new("user", "bob").into(), 10)
            .unwrap();

        assert_eq!(results.total_hits, 2);
        assert_eq!(
            results.hits,
            vec![
                SearchHit {
                    segment_id: SegmentId::new(1),
                    doc_id: 2
                },
                SearchHit {
                    segment_id: SegmentId::new(0),
                    doc_id: 0
                },
            ]
        );
    }

    #[test]
    fn test_limit() {
        let store = store();
        let searcher = searcher(&store);
        let query: Query = BooleanQuery::new()
            .should(TermQuery::new("user", "bob"))
            .should(TermQuery::new("user", "amy"))
            .into();

        let results = searcher.search(&query, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.total_hits, 3);
        assert_eq!(results.hits[1].doc_id, 0);

        let results = searcher.search(&query, 0).unwrap();
        assert!(results.is_empty());
        assert_eq!(results.total_hits, 3);
        assert_eq!(searcher.count(&query).unwrap(), 3);
    }

    #[test]
    fn test_doc_resolves_hits() {
        let store = store();
        let searcher = searcher(&store);
        let results = searcher.search(&TermQuery::new("polarity", "4").into(), 10).unwrap();

        let texts: Vec<String> = results
            .hits
            .iter()
            .map(|hit| searcher.doc(hit).unwrap().get("text").unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["third", "second"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let store = SegmentStore::open(Arc::new(MemoryStorage::new())).unwrap();
        let results = searcher(&store)
            .search(&TermQuery::new("user", "bob").into(), 10)
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(results.total_hits, 0);
    }

    #[test]
    fn test_invalid_query_is_rejected() {
        let store = store();
        let searcher = searcher(&store);
        assert!(searcher.search(&BooleanQuery::new().into(), 10).is_err());
        assert!(searcher.search(&TermQuery::new("lang", "en").into(), 10).is_err());
    }
}
