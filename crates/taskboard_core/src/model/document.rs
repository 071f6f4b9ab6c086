//! Schemaless document shape exchanged with the document store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat string field map of one document.
pub type DocumentFields = BTreeMap<String, String>;

/// One document as stored in a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier assigned by the store.
    pub id: String,
    #[serde(default)]
    pub fields: DocumentFields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: DocumentFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns one field value, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
