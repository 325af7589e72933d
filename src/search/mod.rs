//! Query execution over segment snapshots.

pub mod searcher;

pub use searcher::{SearchHit, SearchResults, Searcher};
