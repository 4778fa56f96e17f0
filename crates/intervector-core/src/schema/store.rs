use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::error::{is_unique_violation, Error, Result};
use crate::model::{
    validate_collection_name, Collection, CollectionId, Metadata, Record, RecordQuery,
};

use super::migrations::MIGRATIONS;

/// File name of the SQLite database inside the store directory.
pub const STORE_FILE: &str = "intervector.sqlite3";

/// Oldest SQLite release with the JSON functions built in.
pub const MIN_SQLITE_VERSION: i32 = 3_038_000;

/// Verify that the linked SQLite library supports everything the store uses.
pub fn check_requirements() -> Result<()> {
    let found = rusqlite::version_number();
    if found < MIN_SQLITE_VERSION {
        return Err(Error::UnsupportedSqlite {
            found: rusqlite::version().to_string(),
            required: "3.38.0".to_string(),
        });
    }
    log::debug!("SQLite {} available", rusqlite::version());
    Ok(())
}

/// A persistent store of named collections and their records.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    location: Option<PathBuf>,
}

impl Store {
    /// Open (or create) a store rooted at the given directory and apply
    /// migrations.
    ///
    /// The directory is created if it does not exist yet. A store that
    /// SQLite can only open read-only fails with [`Error::ReadOnly`].
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join(STORE_FILE))?;
        let store = Self {
            conn,
            location: Some(dir.to_path_buf()),
        };
        store.prepare()?;
        store.ensure_writable(dir)?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            location: None,
        };
        store.prepare()?;
        Ok(store)
    }

    /// Directory backing this store, `None` when in memory.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn prepare(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.apply_migrations()
    }

    /// Write the header page inside a transaction that is rolled back.
    ///
    /// SQLite silently falls back to read-only access for files it cannot
    /// write, and a directory without write permission only fails once the
    /// rollback journal is created.
    fn ensure_writable(&self, dir: &Path) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        let written = {
            let tx = self.conn.unchecked_transaction()?;
            tx.execute_batch(&format!("PRAGMA user_version = {version}"))
        };

        written.map_err(|source| Error::ReadOnly {
            path: dir.to_path_buf(),
            source,
        })
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                let tx = self.conn.unchecked_transaction()?;
                tx.execute_batch(migration.sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    }
}

// Collections
impl Store {
    /// Create a new collection.
    ///
    /// Fails with [`Error::CollectionExists`] when the name is taken and
    /// with [`Error::InvalidCollectionName`] when it breaks the naming rules.
    pub fn create_collection(&self, name: &str, metadata: Metadata) -> Result<Collection> {
        validate_collection_name(name)?;
        ensure_finite(&metadata)?;

        let collection = Collection::new(name, metadata);
        let inserted = self.conn.execute(
            "INSERT INTO collections (id, name, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                collection.id.to_string(),
                collection.name,
                serde_json::to_string(&collection.metadata)?,
                collection.created_at.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {
                log::info!("Created collection {} ({})", collection.name, collection.id);
                Ok(collection)
            }
            Err(e) if is_unique_violation(&e) => Err(Error::CollectionExists {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a collection by name.
    pub fn get_collection(&self, name: &str) -> Result<Collection> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, metadata, created_at FROM collections WHERE name = ?1",
                [name],
                CollectionRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => row.into_collection(),
            None => Err(Error::NotFound {
                entity: "collection",
                id: name.to_string(),
            }),
        }
    }

    /// Fetch a collection, creating it with `metadata` if it is missing.
    ///
    /// Metadata of an existing collection is left untouched.
    pub fn get_or_create_collection(&self, name: &str, metadata: Metadata) -> Result<Collection> {
        match self.create_collection(name, metadata) {
            Err(e) if e.is_already_exists() => self.get_collection(name),
            other => other,
        }
    }

    /// List all collections in creation order.
    pub fn list_collections(&self) -> Result<Vec<Collection>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, metadata, created_at FROM collections ORDER BY rowid")?;

        let rows = stmt
            .query_map([], CollectionRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(CollectionRow::into_collection).collect()
    }
}

// Records
impl Store {
    /// Insert new records into a collection.
    ///
    /// The batch is atomic. An id that is already present (including twice
    /// in the same batch) yields [`Error::DuplicateRecord`] for that id, an
    /// empty id yields [`Error::InvalidData`]; in both cases nothing is
    /// written.
    pub fn add_records(&self, collection: &Collection, records: &[Record]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (collection_id, id, document, metadata, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            )?;
            let collection_id = collection.id.to_string();
            let now = Utc::now().to_rfc3339();

            for record in records {
                ensure_record_id(record)?;
                let inserted = stmt.execute(rusqlite::params![
                    collection_id,
                    record.id,
                    record.document,
                    serde_json::to_string(&record.metadata)?,
                    now,
                ]);
                match inserted {
                    Ok(_) => {}
                    Err(e) if is_unique_violation(&e) => {
                        return Err(Error::DuplicateRecord {
                            collection: collection.name.clone(),
                            id: record.id.clone(),
                        });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        tx.commit()?;

        log::debug!("Added {} record(s) to {}", records.len(), collection.name);
        Ok(())
    }

    /// Insert records, replacing document and metadata of ids that already
    /// exist in the collection.
    pub fn upsert_records(&self, collection: &Collection, records: &[Record]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (collection_id, id, document, metadata, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT (collection_id, id) DO UPDATE SET
                    document = excluded.document,
                    metadata = excluded.metadata,
                    updated_at = excluded.updated_at",
            )?;
            let collection_id = collection.id.to_string();
            let now = Utc::now().to_rfc3339();

            for record in records {
                ensure_record_id(record)?;
                stmt.execute(rusqlite::params![
                    collection_id,
                    record.id,
                    record.document,
                    serde_json::to_string(&record.metadata)?,
                    now,
                ])?;
            }
        }
        tx.commit()?;

        log::debug!("Upserted {} record(s) into {}", records.len(), collection.name);
        Ok(())
    }

    /// Fetch records matching `query`, in insertion order.
    pub fn get_records(&self, collection: &Collection, query: &RecordQuery) -> Result<Vec<Record>> {
        let mut sql =
            String::from("SELECT id, document, metadata FROM records WHERE collection_id = ?");
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(collection.id.to_string())];

        if let Some(ids) = &query.ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            sql.push_str(" AND id IN (");
            sql.push_str(&vec!["?"; ids.len()].join(", "));
            sql.push(')');
            for id in ids {
                params.push(Box::new(id.clone()));
            }
        }

        for (key, value) in &query.filters {
            let path = json_path(key)?;
            sql.push_str(" AND json_type(metadata, ?) = ? AND json_extract(metadata, ?) = ?");
            params.push(Box::new(path.clone()));
            params.push(Box::new(value.json_type()));
            params.push(Box::new(path));
            params.push(Box::new(value.clone()));
        }

        sql.push_str(" ORDER BY seq LIMIT ? OFFSET ?");
        let limit = query
            .limit
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        params.push(Box::new(limit));
        params.push(Box::new(i64::try_from(query.offset).unwrap_or(i64::MAX)));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, document, metadata)| -> Result<Record> {
                Ok(Record {
                    id,
                    document,
                    metadata: serde_json::from_str(&metadata)?,
                })
            })
            .collect()
    }

    /// Fetch a single record by id, `None` when absent.
    pub fn get_record(&self, collection: &Collection, id: &str) -> Result<Option<Record>> {
        let mut records = self.get_records(collection, &RecordQuery::new().ids([id]))?;
        Ok(records.pop())
    }

    /// Number of records in a collection.
    pub fn count_records(&self, collection: &Collection) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection_id = ?1",
            [collection.id.to_string()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn ensure_record_id(record: &Record) -> Result<()> {
    if record.id.is_empty() {
        return Err(Error::InvalidData("record id must not be empty".to_string()));
    }
    ensure_finite(&record.metadata)
}

/// JSON has no representation for NaN or infinities.
fn ensure_finite(metadata: &Metadata) -> Result<()> {
    match metadata.iter().find(|(_, value)| !value.is_finite()) {
        Some((key, value)) => Err(Error::InvalidData(format!(
            "metadata {key:?} is not a finite number: {value}"
        ))),
        None => Ok(()),
    }
}

/// JSON path for a top-level metadata key.
fn json_path(key: &str) -> Result<String> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(Error::InvalidData(format!("invalid metadata key: {key:?}")));
    }
    Ok(format!("$.\"{key}\""))
}

/// Raw column values of a `collections` row.
struct CollectionRow {
    id: String,
    name: String,
    metadata: String,
    created_at: String,
}

impl CollectionRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            metadata: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn into_collection(self) -> Result<Collection> {
        let id = self
            .id
            .parse::<CollectionId>()
            .map_err(|e| Error::InvalidData(format!("collection id {}: {e}", self.id)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| Error::InvalidData(format!("collection timestamp {}: {e}", self.created_at)))?
            .with_timezone(&Utc);

        Ok(Collection {
            id,
            name: self.name,
            metadata: serde_json::from_str(&self.metadata)?,
            created_at,
        })
    }
}
