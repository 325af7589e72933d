//! The segment store.
//!
//! [`SegmentStore`] owns the published segments of one index. Appending a
//! segment writes its file, then publishes a new manifest; only then is the
//! in-memory segment list swapped. Readers take a [`SegmentSnapshot`], which
//! is just a clone of the current list's `Arc`, so they never wait on a
//! writer's I/O and never observe a half-published segment.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};

use crate::document::Document;
use crate::error::{Result, TweetdexError};
use crate::index::manifest::{Manifest, SegmentMeta};
use crate::index::segment::{SEGMENT_EXTENSION, Segment, SegmentId};
use crate::storage::Storage;

/// Name of the lock file held by the active writer.
pub const WRITE_LOCK: &str = "write.lock";

/// An immutable view of the segments published at one point in time,
/// oldest first.
#[derive(Debug, Clone, Default)]
pub struct SegmentSnapshot {
    segments: Arc<Vec<Arc<Segment>>>,
}

impl SegmentSnapshot {
    /// Iterate over the segments, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Segment>> {
        self.segments.iter()
    }

    /// The segments as a slice, oldest first.
    pub fn as_slice(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the snapshot has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Look up a segment by ID.
    pub fn get(&self, id: SegmentId) -> Option<&Arc<Segment>> {
        // IDs are ascending, oldest first.
        self.segments
            .binary_search_by_key(&id, |segment| segment.id())
            .ok()
            .map(|index| &self.segments[index])
    }

    /// IDs of the segments, oldest first.
    pub fn ids(&self) -> Vec<SegmentId> {
        self.segments.iter().map(|segment| segment.id()).collect()
    }

    /// Total number of documents.
    pub fn doc_count(&self) -> u64 {
        self.segments.iter().map(|segment| segment.doc_count()).sum()
    }

    /// Stored fields of a document.
    pub fn stored_fields(&self, segment_id: SegmentId, doc_id: u64) -> Result<&Document> {
        let segment = self
            .get(segment_id)
            .ok_or_else(|| TweetdexError::not_found(format!("segment {segment_id}")))?;
        segment.stored_fields(doc_id).ok_or_else(|| {
            TweetdexError::not_found(format!("document {doc_id} in segment {segment_id}"))
        })
    }
}

impl PartialEq for SegmentSnapshot {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.segments, &other.segments)
            || (self.segments.len() == other.segments.len()
                && self
                    .segments
                    .iter()
                    .zip(other.segments.iter())
                    .all(|(a, b)| Arc::ptr_eq(a, b)))
    }
}

impl Eq for SegmentSnapshot {}

impl<'a> IntoIterator for &'a SegmentSnapshot {
    type Item = &'a Arc<Segment>;
    type IntoIter = std::slice::Iter<'a, Arc<Segment>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug)]
struct StoreState {
    manifest: Manifest,
    segments: Arc<Vec<Arc<Segment>>>,
}

/// Durable, append-only collection of segments.
#[derive(Debug)]
pub struct SegmentStore {
    storage: Arc<dyn Storage>,
    state: RwLock<StoreState>,
    /// Serializes appends; readers never take it.
    append_lock: Mutex<()>,
}

impl SegmentStore {
    /// Open the store kept in `storage`.
    ///
    /// A storage without a manifest is an empty store. Every listed segment
    /// is loaded and its checksum verified.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self> {
        let manifest = Manifest::load(storage.as_ref())?.unwrap_or_default();

        let mut segments = Vec::with_capacity(manifest.segments.len());
        for meta in &manifest.segments {
            let segment = Segment::read_from(storage.as_ref(), &meta.name).map_err(|e| {
                TweetdexError::storage(format!("failed to load segment {}: {e}", meta.name))
            })?;
            if segment.id() != meta.id
                || segment.base_doc_id() != meta.base_doc_id
                || segment.doc_count() != meta.doc_count
            {
                return Err(TweetdexError::storage(format!(
                    "segment file {} does not match its manifest entry",
                    meta.name
                )));
            }
            segments.push(Arc::new(segment));
        }

        debug!(
            "Opened segment store: generation {}, {} segments, {} documents",
            manifest.generation,
            segments.len(),
            manifest.doc_count()
        );

        Ok(SegmentStore {
            storage,
            state: RwLock::new(StoreState {
                manifest,
                segments: Arc::new(segments),
            }),
            append_lock: Mutex::new(()),
        })
    }

    /// The underlying storage.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Durably publish a segment.
    ///
    /// The segment must start at [`next_doc_id`](Self::next_doc_id) and use
    /// an ID not below [`next_segment_id`](Self::next_segment_id). On error
    /// the store is unchanged. Once the new manifest has been renamed into
    /// place the segment counts as published: a failure of the final sync
    /// is logged and the segment is still returned, matching what a reopen
    /// of the index would see.
    pub fn append(&self, segment: Segment) -> Result<Arc<Segment>> {
        let _guard = self.append_lock.lock();
        let current = self.state.read().manifest.clone();

        let meta = SegmentMeta::for_segment(&segment);
        let next = current.with_segment(meta.clone())?;

        let tmp_name = format!("{}.tmp", meta.name);
        let written = segment
            .write_to(self.storage.as_ref(), &tmp_name)
            .and_then(|size| {
                self.storage.rename_file(&tmp_name, &meta.name)?;
                Ok(size)
            });
        let size = match written {
            Ok(size) => size,
            Err(e) => {
                self.remove_quietly(&tmp_name);
                return Err(e);
            }
        };

        if let Err(e) = next.save(self.storage.as_ref()) {
            match self.published_manifest_lists(&meta.name) {
                // The rename landed and a later sync failed. A reopen sees
                // the segment, so this store publishes it too.
                Ok(true) => warn!(
                    "Segment {} is published but the final sync failed: {e}",
                    meta.name
                ),
                Ok(false) => {
                    self.remove_quietly(&meta.name);
                    return Err(e);
                }
                // Outcome unknown; the next writer's orphan cleanup decides.
                Err(_) => return Err(e),
            }
        }

        let segment = Arc::new(segment);
        {
            let mut state = self.state.write();
            let mut segments = Vec::with_capacity(state.segments.len() + 1);
            segments.extend(state.segments.iter().cloned());
            segments.push(Arc::clone(&segment));
            state.segments = Arc::new(segments);
            state.manifest = next;
        }

        info!(
            "Published segment {} ({} docs, {} terms, {size} bytes)",
            meta.name, meta.doc_count, meta.term_count
        );
        Ok(segment)
    }

    /// Snapshot of the published segments, oldest first.
    pub fn list_segments(&self) -> SegmentSnapshot {
        SegmentSnapshot {
            segments: Arc::clone(&self.state.read().segments),
        }
    }

    /// Stored fields of a document.
    pub fn get_stored_fields(&self, segment_id: SegmentId, doc_id: u64) -> Result<Document> {
        self.list_segments()
            .stored_fields(segment_id, doc_id)
            .cloned()
    }

    /// ID the next published document must start at.
    pub fn next_doc_id(&self) -> u64 {
        self.state.read().manifest.next_doc_id
    }

    /// ID the next segment gets.
    pub fn next_segment_id(&self) -> SegmentId {
        self.state.read().manifest.next_segment_id
    }

    /// Number of published documents.
    pub fn doc_count(&self) -> u64 {
        self.state.read().manifest.doc_count()
    }

    /// Number of published segments.
    pub fn segment_count(&self) -> usize {
        self.state.read().segments.len()
    }

    /// Manifest generation, incremented on every publish.
    pub fn generation(&self) -> u64 {
        self.state.read().manifest.generation
    }

    /// Delete temporary files and segment files the manifest does not list.
    ///
    /// Only safe while holding the write lock.
    pub(crate) fn remove_orphans(&self) -> Result<usize> {
        let _guard = self.append_lock.lock();
        let state = self.state.read();

        let mut removed = 0;
        for name in self.storage.list_files()? {
            let orphan_segment = name.ends_with(&format!(".{SEGMENT_EXTENSION}"))
                && !state.manifest.segments.iter().any(|meta| meta.name == name);
            if name.ends_with(".tmp") || orphan_segment {
                debug!("Removing orphan file {name}");
                self.storage.delete_file(&name)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Whether the manifest currently on storage lists `name`.
    fn published_manifest_lists(&self, name: &str) -> Result<bool> {
        Ok(Manifest::load(self.storage.as_ref())?
            .is_some_and(|manifest| manifest.segments.iter().any(|meta| meta.name == name)))
    }

    fn remove_quietly(&self, name: &str) {
        if let Err(e) = self.storage.delete_file(name) {
            warn!("Failed to remove {name}: {e}");
        }
    }
}
