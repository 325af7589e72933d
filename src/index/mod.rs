//! Inverted index: terms, posting lists, segments and the segment store.
//!
//! Documents enter through an [`IndexWriter`], which buffers them and
//! publishes immutable [`Segment`]s to a [`SegmentStore`]. Searchers read a
//! [`SegmentSnapshot`] taken from the store.

pub mod manifest;
pub mod posting;
pub mod segment;
pub mod store;
pub mod term;
pub mod writer;

pub use manifest::{Manifest, SegmentMeta};
pub use posting::PostingList;
pub use segment::{Segment, SegmentId};
pub use store::{SegmentSnapshot, SegmentStore};
pub use term::Term;
pub use writer::{IndexWriter, WriterConfig, WriterStats};
