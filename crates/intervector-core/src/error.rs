use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("collection {name} already exists")]
    CollectionExists { name: String },

    #[error("record {id} already exists in collection {collection}")]
    DuplicateRecord { collection: String, id: String },

    #[error("invalid collection name {name:?}: {reason}")]
    InvalidCollectionName { name: String, reason: &'static str },

    #[error("store at {} is not writable: {source}", path.display())]
    ReadOnly {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("unsupported SQLite {found}: at least {required} is needed")]
    UnsupportedSqlite { found: String, required: String },
}

impl Error {
    /// Returns `true` when the error means the target was already present:
    /// a collection name that is taken, or a record id that is in use.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::CollectionExists { .. } | Self::DuplicateRecord { .. }
        )
    }

    /// Returns `true` when the error indicates a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Whether a SQLite error is a UNIQUE/PRIMARY KEY constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_classification() {
        let exists = Error::CollectionExists {
            name: "agent_directory".to_string(),
        };
        let dup = Error::DuplicateRecord {
            collection: "agent_directory".to_string(),
            id: "agent_prometheus".to_string(),
        };
        let invalid = Error::InvalidCollectionName {
            name: "x".to_string(),
            reason: "too short",
        };

        assert!(exists.is_already_exists());
        assert!(dup.is_already_exists());
        assert!(!invalid.is_already_exists());
        assert!(!Error::InvalidData("empty id".to_string()).is_already_exists());
    }

    #[test]
    fn test_not_found() {
        let err = Error::NotFound {
            entity: "collection",
            id: "missing".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());
        assert_eq!(err.to_string(), "not found: collection with id missing");
    }
}
