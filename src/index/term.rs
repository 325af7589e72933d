//! Index terms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `(field, text)` pair, the unit a posting list is keyed by.
///
/// Terms order by field first, so all terms of one field are contiguous in a
/// sorted term dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    field: String,
    text: String,
}

impl Term {
    /// Create a new term.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        Term {
            field: field.into(),
            text: text.into(),
        }
    }

    /// The field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The term text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)
    }
}
