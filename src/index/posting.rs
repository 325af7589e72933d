//! Posting lists.
//!
//! A posting list is the ascending, duplicate-free list of document IDs that
//! contain a term. The set operations here are linear merges over two sorted
//! lists, which is all the boolean evaluator needs.

use crate::error::{Result, TweetdexError};
use crate::storage::structured::{StructReader, StructWriter};
use crate::storage::{StorageInput, StorageOutput};

/// A sorted, deduplicated list of document IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    doc_ids: Vec<u64>,
}

impl PostingList {
    /// Create an empty posting list.
    pub fn new() -> Self {
        PostingList {
            doc_ids: Vec::new(),
        }
    }

    /// Build a posting list from IDs in any order, dropping duplicates.
    pub fn from_unsorted(mut doc_ids: Vec<u64>) -> Self {
        doc_ids.sort_unstable();
        doc_ids.dedup();
        PostingList { doc_ids }
    }

    /// Number of documents in the list.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// The document IDs, ascending.
    pub fn as_slice(&self) -> &[u64] {
        &self.doc_ids
    }

    /// Iterate over the document IDs, ascending.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u64>> {
        self.doc_ids.iter().copied()
    }

    /// Check whether a document is in the list.
    pub fn contains(&self, doc_id: u64) -> bool {
        self.doc_ids.binary_search(&doc_id).is_ok()
    }

    /// Documents present in both lists.
    pub fn intersect(&self, other: &PostingList) -> PostingList {
        let (a, b) = (&self.doc_ids, &other.doc_ids);
        let mut result = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    result.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        PostingList { doc_ids: result }
    }

    /// Documents present in either list.
    pub fn union(&self, other: &PostingList) -> PostingList {
        let (a, b) = (&self.doc_ids, &other.doc_ids);
        let mut result = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => {
                    result.push(a[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    result.push(b[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    result.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        result.extend_from_slice(&a[i..]);
        result.extend_from_slice(&b[j..]);
        PostingList { doc_ids: result }
    }

    /// Documents in this list but not in `other`.
    pub fn difference(&self, other: &PostingList) -> PostingList {
        if other.is_empty() {
            return self.clone();
        }
        let mut result = Vec::with_capacity(self.doc_ids.len());
        let mut j = 0;
        for &doc_id in &self.doc_ids {
            while j < other.doc_ids.len() && other.doc_ids[j] < doc_id {
                j += 1;
            }
            if j >= other.doc_ids.len() || other.doc_ids[j] != doc_id {
                result.push(doc_id);
            }
        }
        PostingList { doc_ids: result }
    }

    /// Union of any number of lists.
    pub fn union_all<'a, I>(lists: I) -> PostingList
    where
        I: IntoIterator<Item = &'a PostingList>,
    {
        let mut doc_ids = Vec::new();
        for list in lists {
            doc_ids.extend_from_slice(&list.doc_ids);
        }
        Self::from_unsorted(doc_ids)
    }

    /// Write the list as a count followed by delta-encoded varints.
    pub fn encode<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        writer.write_varint(self.doc_ids.len() as u64)?;

        let mut prev_doc_id = 0u64;
        for &doc_id in &self.doc_ids {
            writer.write_varint(doc_id - prev_doc_id)?;
            prev_doc_id = doc_id;
        }
        Ok(())
    }

    /// Read a list written by [`PostingList::encode`].
    pub fn decode<R: StorageInput>(reader: &mut StructReader<R>) -> Result<Self> {
        let count = reader.read_varint()?;
        // Every entry takes at least one byte.
        if count > reader.remaining() {
            return Err(TweetdexError::storage(format!(
                "posting count {count} exceeds remaining data"
            )));
        }

        let mut doc_ids = Vec::with_capacity(count as usize);
        let mut prev_doc_id = 0u64;
        for i in 0..count {
            let delta = reader.read_varint()?;
            if i > 0 && delta == 0 {
                return Err(TweetdexError::storage("posting list is not strictly ascending"));
            }
            let doc_id = prev_doc_id
                .checked_add(delta)
                .ok_or_else(|| TweetdexError::storage("posting doc ID overflow"))?;
            doc_ids.push(doc_id);
            prev_doc_id = doc_id;
        }

        Ok(PostingList { doc_ids })
    }
}

impl From<Vec<u64>> for PostingList {
    fn from(doc_ids: Vec<u64>) -> Self {
        Self::from_unsorted(doc_ids)
    }
}

impl<'a> IntoIterator for &'a PostingList {
    type Item = u64;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, u64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
