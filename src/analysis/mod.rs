//! Text analysis: turning raw field values into index terms.
//!
//! A field is analyzed according to its [`IndexMode`](crate::schema::IndexMode):
//! exact fields become one case-sensitive token, tokenized fields are split
//! on whitespace, stripped of surrounding punctuation and lower-cased.

pub mod token;
pub mod tokenizer;

pub use token::{Token, TokenStream};
pub use tokenizer::{KeywordTokenizer, Tokenizer, WhitespaceTokenizer, tokenizer_for};
