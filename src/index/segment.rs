//! Immutable index segments.
//!
//! A segment holds the stored fields and the term dictionary of one flushed
//! batch of documents. Its documents have consecutive IDs starting at
//! `base_doc_id`.
//!
//! On disk a segment is a single file:
//!
//! ```text
//! magic "TWSG" | version u32 | segment id u64 | base doc id u64 | doc count u64
//! per document: field count varint, then (name, value) strings
//! term count varint
//! per term: field string, text string, posting list (count + deltas)
//! CRC32 trailer
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{Result, TweetdexError};
use crate::index::posting::PostingList;
use crate::index::term::Term;
use crate::storage::Storage;
use crate::storage::structured::{StructReader, StructWriter};

const SEGMENT_MAGIC: &[u8; 4] = b"TWSG";
const SEGMENT_VERSION: u32 = 1;

/// Extension of published segment files.
pub const SEGMENT_EXTENSION: &str = "seg";

/// Store-unique identifier of a segment. Later segments have larger IDs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SegmentId(u64);

impl SegmentId {
    /// Wrap a raw segment number.
    pub const fn new(id: u64) -> Self {
        SegmentId(id)
    }

    /// The raw segment number.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The ID that follows this one.
    pub const fn next(self) -> Self {
        SegmentId(self.0 + 1)
    }

    /// Name of the segment file, e.g. `segment_000003.seg`.
    pub fn file_name(self) -> String {
        format!("segment_{:06}.{SEGMENT_EXTENSION}", self.0)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable batch of indexed documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    id: SegmentId,
    base_doc_id: u64,
    docs: Vec<Document>,
    terms: BTreeMap<Term, PostingList>,
}

impl Segment {
    /// Build a segment from stored documents and raw postings.
    ///
    /// `docs[i]` gets the ID `base_doc_id + i`. Posting lists are sorted and
    /// deduplicated; empty ones are dropped. Any posting outside the
    /// segment's ID range is rejected.
    pub fn build<I>(id: SegmentId, base_doc_id: u64, docs: Vec<Document>, postings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Term, Vec<u64>)>,
    {
        let mut terms = BTreeMap::new();
        for (term, doc_ids) in postings {
            let list = PostingList::from_unsorted(doc_ids);
            if list.is_empty() {
                continue;
            }
            terms.insert(term, list);
        }

        let segment = Segment {
            id,
            base_doc_id,
            docs,
            terms,
        };
        segment.check_postings()?;
        Ok(segment)
    }

    /// The segment ID.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// ID of the first document in the segment.
    pub fn base_doc_id(&self) -> u64 {
        self.base_doc_id
    }

    /// Number of documents in the segment.
    pub fn doc_count(&self) -> u64 {
        self.docs.len() as u64
    }

    /// The range of document IDs held by the segment.
    pub fn doc_ids(&self) -> Range<u64> {
        self.base_doc_id..self.base_doc_id + self.doc_count()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Look up the posting list of a term.
    pub fn postings(&self, term: &Term) -> Option<&PostingList> {
        self.terms.get(term)
    }

    /// All terms of one field with their postings, in term order.
    pub fn field_terms<'a>(
        &'a self,
        field: &'a str,
    ) -> impl Iterator<Item = (&'a Term, &'a PostingList)> + 'a {
        self.prefixed_terms(field, "")
    }

    /// Terms of one field whose text starts with `prefix`, in term order.
    pub fn prefixed_terms<'a>(
        &'a self,
        field: &'a str,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a Term, &'a PostingList)> + 'a {
        self.terms
            .range(Term::new(field, prefix)..)
            .take_while(move |(term, _)| term.field() == field && term.text().starts_with(prefix))
    }

    /// All terms with their postings, in term order.
    pub fn terms(&self) -> impl Iterator<Item = (&Term, &PostingList)> {
        self.terms.iter()
    }

    /// Stored fields of a document, if the document is in this segment.
    pub fn stored_fields(&self, doc_id: u64) -> Option<&Document> {
        if !self.doc_ids().contains(&doc_id) {
            return None;
        }
        self.docs.get((doc_id - self.base_doc_id) as usize)
    }

    /// Write the segment to `name`, returning the file size.
    pub fn write_to(&self, storage: &dyn Storage, name: &str) -> Result<u64> {
        let output = storage.create_output(name)?;
        let mut writer = StructWriter::new(output);

        writer.write_raw(SEGMENT_MAGIC)?;
        writer.write_u32(SEGMENT_VERSION)?;
        writer.write_u64(self.id.value())?;
        writer.write_u64(self.base_doc_id)?;
        writer.write_u64(self.doc_count())?;

        for doc in &self.docs {
            writer.write_varint(doc.len() as u64)?;
            for (name, value) in doc.fields() {
                writer.write_string(name)?;
                writer.write_string(value)?;
            }
        }

        writer.write_varint(self.terms.len() as u64)?;
        for (term, postings) in &self.terms {
            writer.write_string(term.field())?;
            writer.write_string(term.text())?;
            postings.encode(&mut writer)?;
        }

        // Trailer is 4 bytes.
        let size = writer.position() + 4;
        writer.close()?;
        Ok(size)
    }

    /// Read and verify a segment file.
    pub fn read_from(storage: &dyn Storage, name: &str) -> Result<Self> {
        let input = storage.open_input(name)?;
        let mut reader = StructReader::new(input)?;

        let magic = reader.read_raw(4)?;
        if magic != SEGMENT_MAGIC {
            return Err(TweetdexError::storage(format!(
                "{name}: not a segment file"
            )));
        }
        let version = reader.read_u32()?;
        if version != SEGMENT_VERSION {
            return Err(TweetdexError::storage(format!(
                "{name}: unsupported segment version {version}"
            )));
        }

        let id = SegmentId::new(reader.read_u64()?);
        let base_doc_id = reader.read_u64()?;
        let doc_count = reader.read_u64()?;
        check_count(&reader, doc_count, name)?;

        let mut docs = Vec::with_capacity(doc_count as usize);
        for _ in 0..doc_count {
            let field_count = reader.read_varint()?;
            check_count(&reader, field_count, name)?;
            let mut doc = Document::new();
            for _ in 0..field_count {
                let field = reader.read_string()?;
                let value = reader.read_string()?;
                doc.add_field(field, value);
            }
            docs.push(doc);
        }

        let term_count = reader.read_varint()?;
        check_count(&reader, term_count, name)?;
        let mut terms = BTreeMap::new();
        let mut previous: Option<Term> = None;
        for _ in 0..term_count {
            let field = reader.read_string()?;
            let text = reader.read_string()?;
            let term = Term::new(field, text);
            if previous.as_ref().is_some_and(|prev| *prev >= term) {
                return Err(TweetdexError::storage(format!(
                    "{name}: term dictionary out of order at '{term}'"
                )));
            }
            let postings = PostingList::decode(&mut reader)?;
            if postings.is_empty() {
                return Err(TweetdexError::storage(format!(
                    "{name}: empty posting list for '{term}'"
                )));
            }
            previous = Some(term.clone());
            terms.insert(term, postings);
        }

        reader.verify_checksum().map_err(|e| {
            TweetdexError::storage(format!("{name}: {e}"))
        })?;

        let segment = Segment {
            id,
            base_doc_id,
            docs,
            terms,
        };
        segment.check_postings()?;

        debug!(
            "Loaded segment {} from {name}: {} docs, {} terms",
            segment.id,
            segment.doc_count(),
            segment.term_count()
        );
        Ok(segment)
    }

    fn check_postings(&self) -> Result<()> {
        let range = self.doc_ids();
        for (term, postings) in &self.terms {
            let (Some(&first), Some(&last)) = (postings.as_slice().first(), postings.as_slice().last())
            else {
                continue;
            };
            if first < range.start || last >= range.end {
                return Err(TweetdexError::storage(format!(
                    "segment {}: postings of '{term}' fall outside documents {}..{}",
                    self.id, range.start, range.end
                )));
            }
        }
        Ok(())
    }
}

/// Every counted entry takes at least one byte, so a count larger than
/// the remaining payload means the file is corrupt.
fn check_count<R: crate::storage::StorageInput>(
    reader: &StructReader<R>,
    count: u64,
    name: &str,
) -> Result<()> {
    if count > reader.remaining() {
        return Err(TweetdexError::storage(format!(
            "{name}: entry count {count} exceeds remaining data"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageOutput};

    fn sample_segment() -> Segment {
        let docs = vec![
            Document::from(vec![
                ("user".to_string(), "bob".to_string()),
                ("text".to_string(), "hello @alice".to_string()),
            ]),
            Document::from(vec![
                ("user".to_string(), "amy".to_string()),
                ("text".to_string(), "Hello again".to_string()),
            ]),
        ];
        let postings = vec![
            (Term::new("user", "bob"), vec![10]),
            (Term::new("user", "amy"), vec![11]),
            (Term::new("text", "hello"), vec![11, 10, 11]),
            (Term::new("text", "@alice"), vec![10]),
            (Term::new("text", "again"), vec![11]),
            (Term::new("text", "unused"), vec![]),
        ];
        Segment::build(SegmentId::new(3), 10, docs, postings).unwrap()
    }

    #[test]
    fn test_build_normalizes_postings() {
        let segment = sample_segment();

        assert_eq!(segment.doc_ids(), 10..12);
        assert_eq!(segment.term_count(), 5);
        assert_eq!(
            segment.postings(&Term::new("text", "hello")).unwrap().as_slice(),
            &[10, 11]
        );
        assert!(segment.postings(&Term::new("text", "unused")).is_none());
    }

    #[test]
    fn test_build_rejects_out_of_range_postings() {
        let result = Segment::build(
            SegmentId::new(0),
            0,
            vec![Document::new()],
            vec![(Term::new("user", "bob"), vec![1])],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_field_terms() {
        let segment = sample_segment();
        let texts: Vec<&str> = segment.field_terms("text").map(|(t, _)| t.text()).collect();
        assert_eq!(texts, vec!["@alice", "again", "hello"]);
        assert_eq!(segment.field_terms("user").count(), 2);
        assert_eq!(segment.field_terms("date").count(), 0);

        let prefixed: Vec<&str> = segment.prefixed_terms("text", "a").map(|(t, _)| t.text()).collect();
        assert_eq!(prefixed, vec!["again"]);
    }

    #[test]
    fn test_stored_fields() {
        let segment = sample_segment();
        assert_eq!(segment.stored_fields(10).unwrap().get("user"), Some("bob"));
        assert_eq!(segment.stored_fields(11).unwrap().get("text"), Some("Hello again"));
        assert!(segment.stored_fields(9).is_none());
        assert!(segment.stored_fields(12).is_none());
    }

    #[test]
    fn test_write_and_read() {
        let storage = MemoryStorage::new();
        let segment = sample_segment();
        let name = segment.id().file_name();
        assert_eq!(name, "segment_000003.seg");

        let size = segment.write_to(&storage, &name).unwrap();
        assert_eq!(size, storage.total_size());

        let loaded = Segment::read_from(&storage, &name).unwrap();
        assert_eq!(loaded, segment);
    }

    #[test]
    fn test_read_rejects_corruption() {
        let storage = MemoryStorage::new();
        let segment = sample_segment();
        segment.write_to(&storage, "seg").unwrap();

        let mut data = Vec::new();
        std::io::Read::read_to_end(&mut storage.open_input("seg").unwrap(), &mut data).unwrap();
        let last = data.len() - 5;
        data[last] ^= 0x01;
        let mut output = storage.create_output("seg").unwrap();
        std::io::Write::write_all(&mut output, &data).unwrap();
        output.close().unwrap();

        let err = Segment::read_from(&storage, "seg").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_read_rejects_foreign_file() {
        let storage = MemoryStorage::new();
        let mut writer = StructWriter::new(storage.create_output("other").unwrap());
        writer.write_raw(b"NOPE").unwrap();
        writer.close().unwrap();

        assert!(Segment::read_from(&storage, "other").is_err());
    }
}
