pub mod backend;
pub mod models;

pub use backend::{VideoStore, backend_name, infer_backend_from_url};
pub use models::{ResetReport, StoreCounts};
