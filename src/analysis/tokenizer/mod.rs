//! Tokenizer implementations for text analysis.
//!
//! - [`KeywordTokenizer`] emits the whole value as a single token
//! - [`WhitespaceTokenizer`] splits on whitespace and normalizes each word
//!
//! # Examples
//!
//! ```
//! use tweetdex::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello, world!").unwrap().collect();
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;
use crate::schema::IndexMode;

/// Trait for tokenizers that convert text into tokens.
///
/// The returned stream is lazy and borrows the input; calling `tokenize`
/// again on the same text restarts it from the beginning.
pub trait Tokenizer: Send + Sync + std::fmt::Debug {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize<'a>(&self, text: &'a str) -> Result<TokenStream<'a>>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod keyword;
pub mod whitespace;

pub use keyword::KeywordTokenizer;
pub use whitespace::WhitespaceTokenizer;

static KEYWORD: KeywordTokenizer = KeywordTokenizer;
static WHITESPACE: WhitespaceTokenizer = WhitespaceTokenizer;

/// Get the tokenizer used for fields indexed with `mode`.
pub fn tokenizer_for(mode: IndexMode) -> &'static dyn Tokenizer {
    match mode {
        IndexMode::Exact => &KEYWORD,
        IndexMode::Tokenized => &WHITESPACE,
    }
}
