//! Bulk ingestion of video documents

pub mod document;
pub mod loader;
pub mod timestamp;

pub use document::VideoDocument;
pub use loader::{DEFAULT_BATCH_SIZE, LoadReport, Loader, LoaderConfig};
pub use timestamp::parse_timestamp;
