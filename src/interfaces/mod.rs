//! User interfaces

pub mod cli;
