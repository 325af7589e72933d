//! Index writer.
//!
//! [`IndexWriter`] turns documents into postings and buffers them, together
//! with the stored fields, in an accumulator it owns exclusively. `flush`
//! builds an immutable [`Segment`] from the accumulator and hands it to the
//! [`SegmentStore`]; the accumulator is only cleared once the store has
//! published the segment.

use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, info, warn};

use crate::analysis::tokenizer::tokenizer_for;
use crate::document::Document;
use crate::error::{Result, TweetdexError};
use crate::index::segment::{Segment, SegmentId};
use crate::index::store::{SegmentStore, WRITE_LOCK};
use crate::index::term::Term;
use crate::schema::Schema;
use crate::storage::StorageLock;

/// Index writer configuration.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Number of buffered documents that triggers a flush. `0` disables
    /// automatic flushing.
    pub max_buffered_docs: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            max_buffered_docs: 10000,
        }
    }
}

/// Statistics about the writing process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Number of documents added.
    pub docs_added: u64,
    /// Number of segments published.
    pub segments_flushed: u64,
    /// Number of unique terms in the accumulator.
    pub unique_terms: u64,
}

/// Documents and postings buffered since the last flush.
#[derive(Debug, Default)]
struct Accumulator {
    base_doc_id: u64,
    docs: Vec<Document>,
    postings: AHashMap<Term, Vec<u64>>,
}

impl Accumulator {
    fn new(base_doc_id: u64) -> Self {
        Accumulator {
            base_doc_id,
            ..Default::default()
        }
    }

    fn len(&self) -> usize {
        self.docs.len()
    }

    fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn next_doc_id(&self) -> u64 {
        self.base_doc_id + self.docs.len() as u64
    }

    fn commit(&mut self, stored: Document, terms: Vec<Term>) -> u64 {
        let doc_id = self.next_doc_id();
        for term in terms {
            let doc_ids = self.postings.entry(term).or_default();
            if doc_ids.last() != Some(&doc_id) {
                doc_ids.push(doc_id);
            }
        }
        self.docs.push(stored);
        doc_id
    }

    fn build_segment(&self, id: SegmentId) -> Result<Segment> {
        let postings = self
            .postings
            .iter()
            .map(|(term, doc_ids)| (term.clone(), doc_ids.clone()));
        Segment::build(id, self.base_doc_id, self.docs.clone(), postings)
    }
}

/// Builds segments from documents. One writer per store at a time.
pub struct IndexWriter {
    store: Arc<SegmentStore>,
    schema: Schema,
    config: WriterConfig,
    accumulator: Accumulator,
    stats: WriterStats,
    /// Held for the writer's lifetime; released on drop.
    _lock: Box<dyn StorageLock>,
}

impl std::fmt::Debug for IndexWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriter")
            .field("config", &self.config)
            .field("next_doc_id", &self.accumulator.next_doc_id())
            .field("buffered_docs_count", &self.accumulator.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl IndexWriter {
    /// Create a writer, taking the store's write lock.
    ///
    /// Fails with a storage error if another writer holds the lock.
    pub fn new(store: Arc<SegmentStore>, schema: Schema, config: WriterConfig) -> Result<Self> {
        let lock = store.storage().acquire_lock(WRITE_LOCK).map_err(|e| {
            TweetdexError::storage(format!("index is locked by another writer ({e})"))
        })?;

        let removed = store.remove_orphans()?;
        if removed > 0 {
            debug!("Removed {removed} files left over by an interrupted flush");
        }

        let base_doc_id = store.next_doc_id();
        Ok(IndexWriter {
            store,
            schema,
            config,
            accumulator: Accumulator::new(base_doc_id),
            stats: WriterStats::default(),
            _lock: lock,
        })
    }

    /// Add a document, returning its ID.
    ///
    /// The document must carry every required schema field, at most once,
    /// and nothing else. A rejected document consumes no ID.
    pub fn add_document(&mut self, doc: Document) -> Result<u64> {
        self.validate(&doc)?;

        if self.should_flush() {
            self.flush()?;
        }

        let (stored, terms) = self.analyze(doc)?;
        let doc_id = self.accumulator.commit(stored, terms);

        self.stats.docs_added += 1;
        self.stats.unique_terms = self.accumulator.postings.len() as u64;
        Ok(doc_id)
    }

    /// Publish the buffered documents as a new segment.
    ///
    /// Returns `None` if nothing was buffered. On error the buffer is kept,
    /// so the flush can be retried.
    pub fn flush(&mut self) -> Result<Option<SegmentId>> {
        if self.accumulator.is_empty() {
            return Ok(None);
        }

        let segment_id = self.store.next_segment_id();
        debug!(
            "Flushing {} documents into segment {segment_id}",
            self.accumulator.len()
        );
        let segment = self.accumulator.build_segment(segment_id)?;
        self.store.append(segment)?;

        self.accumulator = Accumulator::new(self.store.next_doc_id());
        self.stats.segments_flushed += 1;
        self.stats.unique_terms = 0;
        Ok(Some(segment_id))
    }

    /// Discard the buffered documents.
    pub fn rollback(&mut self) {
        let discarded = self.accumulator.len();
        self.accumulator = Accumulator::new(self.store.next_doc_id());
        self.stats.unique_terms = 0;
        if discarded > 0 {
            info!("Rolled back {discarded} buffered documents");
        }
    }

    /// Number of buffered documents.
    pub fn pending_docs(&self) -> usize {
        self.accumulator.len()
    }

    /// ID the next added document will get.
    pub fn next_doc_id(&self) -> u64 {
        self.accumulator.next_doc_id()
    }

    /// Get writer statistics.
    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// The schema documents are validated against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The store segments are published to.
    pub fn store(&self) -> &Arc<SegmentStore> {
        &self.store
    }

    fn should_flush(&self) -> bool {
        self.config.max_buffered_docs > 0
            && self.accumulator.len() >= self.config.max_buffered_docs
    }

    fn validate(&self, doc: &Document) -> Result<()> {
        let fields = doc.fields();
        for (i, (name, _)) in fields.iter().enumerate() {
            if self.schema.field(name).is_none() {
                return Err(TweetdexError::ingest(format!("unknown field '{name}'")));
            }
            if fields[..i].iter().any(|(other, _)| other == name) {
                return Err(TweetdexError::ingest(format!("duplicate field '{name}'")));
            }
        }
        for entry in self.schema.fields() {
            if entry.required && !doc.has_field(&entry.name) {
                return Err(TweetdexError::ingest(format!(
                    "missing required field '{}'",
                    entry.name
                )));
            }
        }
        Ok(())
    }

    /// Split a validated document into its stored fields and its terms.
    fn analyze(&self, doc: Document) -> Result<(Document, Vec<Term>)> {
        let mut stored = Document::new();
        let mut terms = Vec::new();

        for (name, value) in doc.into_fields() {
            let Some(entry) = self.schema.field(&name) else {
                continue;
            };
            if entry.indexed {
                for token in tokenizer_for(entry.mode).tokenize(&value)? {
                    terms.push(Term::new(name.as_str(), token.text));
                }
            }
            if entry.stored {
                stored.add_field(name, value);
            }
        }

        Ok((stored, terms))
    }
}

impl Drop for IndexWriter {
    fn drop(&mut self) {
        if !self.accumulator.is_empty() {
            warn!(
                "Index writer dropped with {} unflushed documents",
                self.accumulator.len()
            );
        }
    }
}
