use serde::{Deserialize, Serialize};

use crate::model::metadata::{Metadata, MetadataValue};

/// A single stored item: unique id, document text, metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
}

impl Record {
    #[must_use]
    pub fn new(id: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document: document.into(),
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Look up a string metadata field.
    #[must_use]
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetadataValue::as_str)
    }
}

/// Selection of records within a collection.
///
/// All conditions are combined with AND. Results come back in insertion
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub ids: Option<Vec<String>>,
    pub filters: Vec<(String, MetadataValue)>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl RecordQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Require `metadata[key] == value`.
    #[must_use]
    pub fn where_eq(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}
