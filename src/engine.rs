//! High-level entry points tying storage, schema, writer and searcher
//! together.
//!
//! ```no_run
//! use tweetdex::engine::{EngineConfig, SearchEngine};
//! use tweetdex::query::TermQuery;
//! use tweetdex::schema::Schema;
//!
//! let engine = SearchEngine::open_dir("tweets_index", Schema::tweets(), EngineConfig::default())?;
//! engine.index_csv("tweets.csv", false)?;
//!
//! let report = engine.search_summaries(&TermQuery::new("user", "scotthamilton").into(), 10)?;
//! for hit in &report.hits {
//!     println!("{} : {}", hit.user.as_deref().unwrap_or(""), hit.text.as_deref().unwrap_or(""));
//! }
//! # Ok::<(), tweetdex::error::TweetdexError>(())
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};
use serde::Serialize;

use crate::document::{Document, TweetCsvReader};
use crate::error::Result;
use crate::index::{IndexWriter, SegmentId, SegmentStore, WriterConfig};
use crate::query::Query;
use crate::schema::{Schema, TEXT, USER};
use crate::search::{SearchResults, Searcher};
use crate::storage::{FileStorage, Storage, StorageConfig};

/// Configuration of a [`SearchEngine`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// File storage settings.
    pub storage: StorageConfig,
    /// Index writer settings.
    pub writer: WriterConfig,
}

/// Outcome of an indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexingReport {
    /// Documents added to the index.
    pub indexed: u64,
    /// Malformed records that were skipped.
    pub rejected: u64,
    /// Segments published by the run.
    pub segments: u64,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// A printable summary of one hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HitSummary {
    /// Segment of the document.
    pub segment_id: SegmentId,
    /// Document ID.
    pub doc_id: u64,
    /// Stored author, if any.
    pub user: Option<String>,
    /// Stored tweet text, if any.
    pub text: Option<String>,
}

/// Outcome of a search with resolved summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Summaries of the returned hits, in hit order.
    pub hits: Vec<HitSummary>,
    /// Number of matching documents, including those beyond the limit.
    pub total_hits: u64,
    /// Wall-clock time of the search.
    pub elapsed: Duration,
}

/// An index with its schema and configuration.
#[derive(Debug)]
pub struct SearchEngine {
    store: Arc<SegmentStore>,
    schema: Arc<Schema>,
    config: EngineConfig,
}

impl SearchEngine {
    /// Open (or create) an index in a directory.
    pub fn open_dir<P: AsRef<Path>>(path: P, schema: Schema, config: EngineConfig) -> Result<Self> {
        let storage = FileStorage::new(path, config.storage.clone())?;
        Self::open(Arc::new(storage), schema, config)
    }

    /// Open the index kept in `storage`.
    pub fn open(storage: Arc<dyn Storage>, schema: Schema, config: EngineConfig) -> Result<Self> {
        let store = SegmentStore::open(storage)?;
        Ok(SearchEngine {
            store: Arc::new(store),
            schema: Arc::new(schema),
            config,
        })
    }

    /// The schema documents are indexed with.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The segment store.
    pub fn store(&self) -> &Arc<SegmentStore> {
        &self.store
    }

    /// Create a writer, taking the index's write lock.
    pub fn writer(&self) -> Result<IndexWriter> {
        IndexWriter::new(
            Arc::clone(&self.store),
            Schema::clone(&self.schema),
            self.config.writer.clone(),
        )
    }

    /// Create a searcher over the currently published segments.
    pub fn searcher(&self) -> Searcher {
        Searcher::new(self.store.list_segments(), Arc::clone(&self.schema))
    }

    /// Index a sequence of records and flush them.
    ///
    /// Each record is an ordered list of `(field, value)` pairs or the
    /// error that prevented reading it. Ingest errors skip the record
    /// unless `strict` is set, in which case the first one ends the run.
    /// Any other error ends the run; segments published before it remain.
    pub fn index_records<I, R>(&self, records: I, strict: bool) -> Result<IndexingReport>
    where
        I: IntoIterator<Item = Result<R>>,
        R: Into<Document>,
    {
        let start = Instant::now();
        let mut writer = self.writer()?;
        let mut report = IndexingReport::default();

        for (index, record) in records.into_iter().enumerate() {
            let result = record.and_then(|fields| writer.add_document(fields.into()));
            match result {
                Ok(_) => report.indexed += 1,
                Err(e) if e.is_ingest() && !strict => {
                    warn!("Skipping record {}: {e}", index + 1);
                    report.rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }

        writer.flush()?;
        report.segments = writer.stats().segments_flushed;
        report.elapsed = start.elapsed();

        info!(
            "Indexed {} documents ({} rejected) into {} segments in {:.3}s",
            report.indexed,
            report.rejected,
            report.segments,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    /// Index a tweet CSV file.
    pub fn index_csv<P: AsRef<Path>>(&self, path: P, strict: bool) -> Result<IndexingReport> {
        let reader = TweetCsvReader::from_path(path, &self.schema)?;
        self.index_records(reader, strict)
    }

    /// Run a query against the currently published segments.
    pub fn search(&self, query: &Query, limit: usize) -> Result<SearchResults> {
        self.searcher().search(query, limit)
    }

    /// Run a query and resolve the user and text of every hit.
    pub fn search_summaries(&self, query: &Query, limit: usize) -> Result<SearchReport> {
        let start = Instant::now();
        let searcher = self.searcher();
        let results = searcher.search(query, limit)?;

        let hits = results
            .hits
            .iter()
            .map(|hit| {
                let doc = searcher.doc(hit)?;
                Ok(HitSummary {
                    segment_id: hit.segment_id,
                    doc_id: hit.doc_id,
                    user: doc.get(USER).map(str::to_string),
                    text: doc.get(TEXT).map(str::to_string),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SearchReport {
            hits,
            total_hits: results.total_hits,
            elapsed: start.elapsed(),
        })
    }
}
