pub mod collection;
pub mod ids;
pub mod metadata;
pub mod record;

pub use collection::{validate_collection_name, Collection};
pub use ids::CollectionId;
pub use metadata::{Metadata, MetadataValue};
pub use record::{Record, RecordQuery};
