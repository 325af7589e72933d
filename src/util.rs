//! Shared utility modules used across tweetdex components.

pub mod varint;
