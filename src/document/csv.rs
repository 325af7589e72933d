//! CSV reader for tweet data.
//!
//! The input has no header row. Every row carries one quoted value per
//! schema field, in schema order:
//!
//! ```csv
//! "0","1467810369","Mon Apr 06 22:19:45 PDT 2009","NO_QUERY","_TheSpecialOne_","@switchfoot http://twitpic.com/2y1zl - Awww"
//! ```
//!
//! A row that cannot be read or has the wrong number of columns becomes an
//! [`Ingest`](crate::error::TweetdexError::Ingest) error for that row only;
//! the reader moves on to the next row. Bytes that are not valid UTF-8 are
//! replaced with U+FFFD rather than rejecting the row.

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use ::csv::{ByteRecordsIntoIter, ReaderBuilder};
use log::warn;

use crate::document::document::Document;
use crate::error::{Result, TweetdexError};
use crate::schema::Schema;

/// An iterator of documents read from tweet CSV rows.
pub struct TweetCsvReader<R: Read> {
    records: ByteRecordsIntoIter<R>,
    field_names: Vec<String>,
}

impl<R: Read> std::fmt::Debug for TweetCsvReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweetCsvReader")
            .field("field_names", &self.field_names)
            .finish()
    }
}

impl TweetCsvReader<File> {
    /// Open a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            TweetdexError::storage(format!(
                "Failed to open data file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self::from_reader(file, schema))
    }
}

impl<R: Read> TweetCsvReader<R> {
    /// Read CSV rows from any reader, mapping columns to the schema fields
    /// in order.
    pub fn from_reader(reader: R, schema: &Schema) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_byte_records();

        TweetCsvReader {
            records,
            field_names: schema.field_names().map(str::to_string).collect(),
        }
    }
}

impl<R: Read> Iterator for TweetCsvReader<R> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Some(Err(TweetdexError::Csv(e))),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                return Some(Err(TweetdexError::ingest(format!(
                    "line {line}: malformed CSV row: {e}"
                ))));
            }
        };

        if record.len() != self.field_names.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Some(Err(TweetdexError::ingest(format!(
                "line {line}: expected {} fields, found {}",
                self.field_names.len(),
                record.len()
            ))));
        }

        let mut replaced = false;
        let doc: Document = self
            .field_names
            .iter()
            .zip(record.iter())
            .map(|(name, value)| {
                let value = match String::from_utf8_lossy(value) {
                    Cow::Borrowed(value) => value.to_string(),
                    Cow::Owned(value) => {
                        replaced = true;
                        value
                    }
                };
                (name.as_str(), value)
            })
            .collect();

        if replaced {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            warn!("line {line}: replaced invalid UTF-8 bytes");
        }
        Some(Ok(doc))
    }
}
