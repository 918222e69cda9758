//! Application startup
//!
//! The composition root builds the store once and hands it to each command.

pub mod startup;

pub use startup::{StartupContext, prepare_startup};
