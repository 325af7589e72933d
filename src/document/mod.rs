//! Documents and the readers that produce them.
//!
//! A [`Document`] is an ordered list of raw field name/value pairs. The
//! [`csv`] module turns tweet CSV rows into documents.

pub mod csv;
#[allow(clippy::module_inception)]
pub mod document;

// Re-export commonly used types
pub use self::csv::TweetCsvReader;
pub use document::{Document, DocumentBuilder};
