pub mod config;
pub mod error;
pub mod metadata;
pub mod naming;
pub mod scan;
pub mod server;

pub use config::Config;
pub use error::{PhotodeckError, Result};
pub use metadata::{build_index, CollisionPolicy, MetadataIndex, MetadataRecord};
pub use scan::{list_all, scan_single, walk_media, Library, LinkBuilder, MediaRecord, ShallowListing};
