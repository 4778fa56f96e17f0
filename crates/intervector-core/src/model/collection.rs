use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::error::{Error, Result};
use crate::model::ids::CollectionId;
use crate::model::metadata::Metadata;

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 63;

/// A named group of records with its own descriptive metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,

    /// Unique, user-facing name.
    pub name: String,

    pub metadata: Metadata,

    pub created_at: DateTime<Utc>,
}

impl Collection {
    #[must_use]
    pub fn new(name: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: CollectionId::new(),
            name: name.into(),
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// Check a collection name against the naming rules.
///
/// A valid name is 3-63 characters of `[A-Za-z0-9._-]`, starts and ends
/// with an alphanumeric character, contains no `..`, and is not an IPv4
/// address.
pub fn validate_collection_name(name: &str) -> Result<()> {
    let invalid = |reason| {
        Err(Error::InvalidCollectionName {
            name: name.to_string(),
            reason,
        })
    };

    if name.len() < MIN_NAME_LEN || name.len() > MAX_NAME_LEN {
        return invalid("length must be between 3 and 63 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return invalid("only ASCII letters, digits, '.', '_' and '-' are allowed");
    }

    let first = name.chars().next();
    let last = name.chars().last();
    if !first.is_some_and(|c| c.is_ascii_alphanumeric())
        || !last.is_some_and(|c| c.is_ascii_alphanumeric())
    {
        return invalid("must start and end with a letter or digit");
    }
    if name.contains("..") {
        return invalid("must not contain two consecutive periods");
    }
    if name.parse::<Ipv4Addr>().is_ok() {
        return invalid("must not be a valid IPv4 address");
    }

    Ok(())
}
