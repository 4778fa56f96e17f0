//! Embedded collection store for intervector.
//!
//! This crate defines the store model (collections, records, flat
//! metadata), the SQLite schema, and the typed errors callers use to tell
//! "already exists" apart from real failures.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
pub use model::{Collection, Metadata, MetadataValue, Record, RecordQuery};
pub use schema::{check_requirements, Store};
