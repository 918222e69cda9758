//! CLI command implementations

pub mod ask;
pub mod config_gen;
pub mod load;
pub mod sql;
pub mod stats;

pub use ask::{answer_question, report_query_error, run_repl};
pub use config_gen::generate_config;
pub use load::load_document;
pub use sql::run_statement;
pub use stats::{reset_store, show_stats};
