pub mod migrations;
pub mod store;

pub use store::{check_requirements, Store, MIN_SQLITE_VERSION, STORE_FILE};
