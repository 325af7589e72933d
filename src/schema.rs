//! Field schema for tweet documents.
//!
//! A [`Schema`] is the fixed, ordered list of fields a document may carry.
//! Each entry says how the field is analyzed ([`IndexMode`]), whether its
//! raw value is stored for retrieval and whether it must be present.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TweetdexError};

/// Field name of the sentiment polarity column.
pub const POLARITY: &str = "polarity";
/// Field name of the tweet ID column.
pub const ID: &str = "id";
/// Field name of the tweet date column.
pub const DATE: &str = "date";
/// Field name of the collection query column.
pub const QUERY: &str = "query";
/// Field name of the author column.
pub const USER: &str = "user";
/// Field name of the tweet body column.
pub const TEXT: &str = "text";

/// How a field value is turned into terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// The whole value is one case-sensitive term.
    Exact,
    /// The value is split into lower-cased words.
    Tokenized,
}

/// Definition of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Field name.
    pub name: String,
    /// Analysis mode for indexed values.
    pub mode: IndexMode,
    /// Whether the raw value is kept in the document store.
    #[serde(default = "default_true")]
    pub stored: bool,
    /// Whether the value contributes postings.
    #[serde(default = "default_true")]
    pub indexed: bool,
    /// Whether every document must carry the field.
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl FieldEntry {
    /// A stored, indexed, required exact field.
    pub fn exact<S: Into<String>>(name: S) -> Self {
        FieldEntry {
            name: name.into(),
            mode: IndexMode::Exact,
            stored: true,
            indexed: true,
            required: true,
        }
    }

    /// A stored, indexed, required tokenized field.
    pub fn tokenized<S: Into<String>>(name: S) -> Self {
        FieldEntry {
            mode: IndexMode::Tokenized,
            ..Self::exact(name)
        }
    }

    /// Set whether the field is stored.
    pub fn stored(mut self, stored: bool) -> Self {
        self.stored = stored;
        self
    }

    /// Set whether the field is indexed.
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Set whether the field is required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// An ordered set of field definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldEntry>,
}

impl Schema {
    /// Build a schema, rejecting empty or duplicate field names.
    pub fn new(fields: Vec<FieldEntry>) -> Result<Self> {
        if fields.is_empty() {
            return Err(TweetdexError::schema("schema has no fields"));
        }
        for (i, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(TweetdexError::schema("field name must not be empty"));
            }
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(TweetdexError::schema(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
        }
        Ok(Schema { fields })
    }

    /// The six-column tweet schema, in CSV column order.
    pub fn tweets() -> Self {
        Schema {
            fields: vec![
                FieldEntry::exact(POLARITY),
                FieldEntry::exact(ID),
                FieldEntry::exact(DATE),
                FieldEntry::exact(QUERY),
                FieldEntry::exact(USER),
                FieldEntry::tokenized(TEXT),
            ],
        }
    }

    /// Load a schema from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&data)
    }

    /// Parse a schema from JSON text.
    pub fn from_json(data: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(data)?;
        Self::new(schema.fields)
    }

    /// Get a field definition by name.
    pub fn field(&self, name: &str) -> Option<&FieldEntry> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get all field definitions in order.
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::tweets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweet_schema() {
        let schema = Schema::tweets();
        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, vec!["polarity", "id", "date", "query", "user", "text"]);
        assert_eq!(schema.field(TEXT).unwrap().mode, IndexMode::Tokenized);
        assert_eq!(schema.field(USER).unwrap().mode, IndexMode::Exact);
        assert!(schema.fields().iter().all(|f| f.stored && f.indexed));
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let err = Schema::new(vec![FieldEntry::exact("a"), FieldEntry::exact("a")]).unwrap_err();
        assert!(matches!(err, TweetdexError::Schema(_)));

        assert!(Schema::new(vec![FieldEntry::exact("")]).is_err());
        assert!(Schema::new(Vec::new()).is_err());
    }

    #[test]
    fn test_from_json_defaults() {
        let schema = Schema::from_json(
            r#"{"fields": [
                {"name": "user", "mode": "exact"},
                {"name": "text", "mode": "tokenized", "required": false},
                {"name": "note", "mode": "exact", "indexed": false}
            ]}"#,
        )
        .unwrap();

        assert_eq!(schema.len(), 3);
        assert!(!schema.field("text").unwrap().required);
        assert!(schema.field("text").unwrap().stored);
        assert!(!schema.field("note").unwrap().indexed);
    }

    #[test]
    fn test_from_json_rejects_duplicates() {
        let result = Schema::from_json(
            r#"{"fields": [{"name": "a", "mode": "exact"}, {"name": "a", "mode": "exact"}]}"#,
        );
        assert!(result.is_err());
    }
}
