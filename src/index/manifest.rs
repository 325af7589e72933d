//! The segment manifest.
//!
//! `segments.json` lists the published segments in flush order. A segment
//! file exists on disk before it is listed, and the manifest is replaced by
//! writing `segments.json.tmp` and renaming it over the old one, so a crash
//! at any point leaves either the old or the new manifest in place.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TweetdexError};
use crate::index::segment::{Segment, SegmentId};
use crate::storage::{Storage, StorageOutput};

/// Name of the manifest file.
pub const MANIFEST_FILE: &str = "segments.json";

const MANIFEST_TMP_FILE: &str = "segments.json.tmp";

/// Manifest entry for one published segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMeta {
    /// Segment ID.
    pub id: SegmentId,
    /// Segment file name.
    pub name: String,
    /// ID of the first document.
    pub base_doc_id: u64,
    /// Number of documents.
    pub doc_count: u64,
    /// Number of distinct terms.
    pub term_count: u64,
    /// When the segment was published.
    pub created_at: DateTime<Utc>,
}

impl SegmentMeta {
    /// Describe a segment about to be published.
    pub fn for_segment(segment: &Segment) -> Self {
        SegmentMeta {
            id: segment.id(),
            name: segment.id().file_name(),
            base_doc_id: segment.base_doc_id(),
            doc_count: segment.doc_count(),
            term_count: segment.term_count() as u64,
            created_at: Utc::now(),
        }
    }
}

/// The list of published segments and the ID counters of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version.
    pub version: u32,
    /// Incremented on every publish.
    pub generation: u64,
    /// ID the next segment will get.
    pub next_segment_id: SegmentId,
    /// ID the next document will get.
    pub next_doc_id: u64,
    /// Published segments, oldest first.
    pub segments: Vec<SegmentMeta>,
}

impl Manifest {
    /// Current manifest format version.
    pub const VERSION: u32 = 1;

    /// An empty manifest.
    pub fn new() -> Self {
        Manifest {
            version: Self::VERSION,
            generation: 0,
            next_segment_id: SegmentId::new(0),
            next_doc_id: 0,
            segments: Vec::new(),
        }
    }

    /// The manifest that results from publishing `meta` after this one.
    pub fn with_segment(&self, meta: SegmentMeta) -> Result<Self> {
        if meta.id < self.next_segment_id {
            return Err(TweetdexError::storage(format!(
                "segment {} was already allocated (next is {})",
                meta.id, self.next_segment_id
            )));
        }
        if meta.base_doc_id != self.next_doc_id {
            return Err(TweetdexError::storage(format!(
                "segment {} starts at document {}, expected {}",
                meta.id, meta.base_doc_id, self.next_doc_id
            )));
        }

        let mut next = self.clone();
        next.generation += 1;
        next.next_segment_id = meta.id.next();
        next.next_doc_id = meta.base_doc_id + meta.doc_count;
        next.segments.push(meta);
        Ok(next)
    }

    /// Total number of documents across all segments.
    pub fn doc_count(&self) -> u64 {
        self.segments.iter().map(|s| s.doc_count).sum()
    }

    /// Load the manifest, or `None` if the store has never been published to.
    pub fn load(storage: &dyn Storage) -> Result<Option<Self>> {
        if !storage.file_exists(MANIFEST_FILE) {
            return Ok(None);
        }

        let mut input = storage.open_input(MANIFEST_FILE)?;
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;

        let manifest: Manifest = serde_json::from_slice(&data)?;
        manifest.validate()?;
        Ok(Some(manifest))
    }

    /// Durably replace the stored manifest with this one.
    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)?;

        let mut output = storage.create_output(MANIFEST_TMP_FILE)?;
        output.write_all(&data)?;
        output.close()?;
        drop(output);

        storage.rename_file(MANIFEST_TMP_FILE, MANIFEST_FILE)?;
        storage.sync()
    }

    fn validate(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(TweetdexError::storage(format!(
                "unsupported manifest version {}",
                self.version
            )));
        }

        let mut expected_doc_id = 0;
        let mut min_segment_id = SegmentId::new(0);
        for meta in &self.segments {
            if meta.id < min_segment_id || meta.base_doc_id != expected_doc_id {
                return Err(TweetdexError::storage(format!(
                    "manifest entry for segment {} is out of sequence",
                    meta.id
                )));
            }
            min_segment_id = meta.id.next();
            expected_doc_id = meta.base_doc_id + meta.doc_count;
        }

        if self.next_segment_id < min_segment_id || self.next_doc_id != expected_doc_id {
            return Err(TweetdexError::storage(
                "manifest counters disagree with its segments",
            ));
        }
        Ok(())
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}
