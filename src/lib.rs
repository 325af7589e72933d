//! # tweetdex
//!
//! A small full-text index for tweet CSV data.
//!
//! ## Features
//!
//! - Append-only, checksummed segments published atomically through a manifest
//! - Exact and whitespace tokenization per field
//! - Term, wildcard and boolean queries with a query string parser
//! - Snapshot-isolated searchers that evaluate segments in parallel
//! - A CLI that indexes a CSV file and runs queries against the index
//!
//! ```
//! use std::sync::Arc;
//!
//! use tweetdex::document::Document;
//! use tweetdex::engine::{EngineConfig, SearchEngine};
//! use tweetdex::query::QueryParser;
//! use tweetdex::schema::Schema;
//! use tweetdex::storage::MemoryStorage;
//!
//! let engine = SearchEngine::open(
//!     Arc::new(MemoryStorage::new()),
//!     Schema::tweets(),
//!     EngineConfig::default(),
//! )?;
//!
//! let mut writer = engine.writer()?;
//! writer.add_document(
//!     Document::builder()
//!         .add_field("polarity", "4")
//!         .add_field("id", "1")
//!         .add_field("date", "Mon Apr 06 22:19:45 PDT 2009")
//!         .add_field("query", "NO_QUERY")
//!         .add_field("user", "bob")
//!         .add_field("text", "hello @alice #fun")
//!         .build(),
//! )?;
//! writer.flush()?;
//!
//! let query = QueryParser::new().parse("+text:*#* +polarity:4")?;
//! let results = engine.search(&query, 10)?;
//! assert_eq!(results.total_hits, 1);
//! # Ok::<(), tweetdex::error::TweetdexError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod query;
pub mod schema;
pub mod search;
pub mod storage;
pub mod util;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
