//! vidstat - video engagement analytics
//!
//! Two independent paths share one relational store:
//! - ingestion: JSON document → `ingest::Loader` → `videos` / `video_snapshots`
//! - questions: text → `query::SqlTranslator` → guard → `query::SqlExecutor` → integer
//!
//! # Architecture
//! - `storage`: connection pool, migrations, bulk writes
//! - `ingest`: document parsing and transactional loading
//! - `query`: translator, statement guard, scalar executor, orchestrator
//! - `interfaces`: command-line front-end
//! - `config`: configuration loading
//! - `runtime`: composition root
//! - `system`: logging

pub mod cli;
pub mod config;
pub mod errors;
pub mod ingest;
pub mod interfaces;
pub mod query;
pub mod runtime;
pub mod storage;
pub mod system;

pub use errors::{Result, VidstatError};
