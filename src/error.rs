//! Error types for the tweetdex library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`TweetdexError`] enum. The variants follow the life of a document:
//! records that cannot be ingested, storage that cannot be written, queries
//! that cannot be evaluated and lookups that find nothing.
//!
//! # Examples
//!
//! ```
//! use tweetdex::error::{Result, TweetdexError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TweetdexError::query("boolean query has no positive clause"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for tweetdex operations.
#[derive(Error, Debug)]
pub enum TweetdexError {
    /// I/O errors (file operations, directory access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record could not be turned into a document (missing or unknown
    /// field, wrong column count, malformed CSV).
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Storage-related errors (failed writes, corrupt segments, locks).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Query-related errors (parsing, unknown fields, empty boolean queries).
    #[error("Query error: {0}")]
    Query(String),

    /// A requested segment or document does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Schema-related errors.
    #[error("Schema error: {0}")]
    Schema(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reader errors that are not tied to a single record.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for operations that may fail with TweetdexError.
pub type Result<T> = std::result::Result<T, TweetdexError>;

impl TweetdexError {
    /// Create a new ingest error.
    pub fn ingest<S: Into<String>>(msg: S) -> Self {
        TweetdexError::Ingest(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        TweetdexError::Storage(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        TweetdexError::Query(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        TweetdexError::Query(msg.into()) // Parse errors are treated as query errors
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        TweetdexError::NotFound(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        TweetdexError::Schema(msg.into())
    }

    /// Whether this error only concerns a single input record.
    ///
    /// Ingestion loops skip such records and keep going; every other error
    /// aborts the run.
    pub fn is_ingest(&self) -> bool {
        matches!(self, TweetdexError::Ingest(_))
    }

    /// Whether this error means the durable store could not be read or written.
    pub fn is_io(&self) -> bool {
        matches!(self, TweetdexError::Io(_) | TweetdexError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = TweetdexError::ingest("missing field 'user'");
        assert_eq!(error.to_string(), "Ingest error: missing field 'user'");

        let error = TweetdexError::query("unknown field 'foo'");
        assert_eq!(error.to_string(), "Query error: unknown field 'foo'");

        let error = TweetdexError::not_found("segment 3");
        assert_eq!(error.to_string(), "Not found: segment 3");

        let error = TweetdexError::parse("unterminated quote");
        assert!(matches!(error, TweetdexError::Query(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = TweetdexError::from(io_error);

        assert!(matches!(error, TweetdexError::Io(_)));
        assert!(error.is_io());
        assert!(!error.is_ingest());
    }

    #[test]
    fn test_error_classification() {
        assert!(TweetdexError::ingest("bad row").is_ingest());
        assert!(TweetdexError::storage("disk full").is_io());
        assert!(!TweetdexError::query("bad").is_io());
    }
}
