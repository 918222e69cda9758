//! CLI interface module
//!
//! This module provides command-line interface functionality for vidstat.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::errors::VidstatError;
use crate::runtime::StartupContext;
use commands::{
    answer_question, generate_config, load_document, reset_store, run_repl, run_statement,
    show_stats,
};

/// 面向用户的道歉语，查询失败时与具体错误一起输出
pub const APOLOGY: &str = "Sorry, I couldn't answer that question. Try rephrasing it.";

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
    /// 查询链路失败（已向用户输出道歉）
    QueryError(VidstatError),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
            CliError::QueryError(err) => err.format_simple(),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
            CliError::QueryError(err) => err.format_colored(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<VidstatError> for CliError {
    fn from(err: VidstatError) -> Self {
        match err {
            VidstatError::QueryAnswer { .. }
            | VidstatError::UnsafeStatement(_)
            | VidstatError::QueryExecution { .. }
            | VidstatError::NonNumericResult(_) => CliError::QueryError(err),
            VidstatError::Config(msg) | VidstatError::Validation(msg) => CliError::ParseError(msg),
            other => CliError::StorageError(other.format_simple()),
        }
    }
}

/// 不需要数据库的命令；返回 None 表示需要继续构建 StartupContext
pub async fn run_offline_command(cmd: &Commands) -> Option<Result<(), CliError>> {
    match cmd {
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => Some(generate_config(output_path.clone(), *force).await),
        _ => None,
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(ctx: &StartupContext, cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Load {
            path,
            reset,
            batch_size,
        } => load_document(ctx, path, reset, batch_size).await,

        Commands::Ask { question, show_sql } => {
            answer_question(ctx, &Commands::join_question(&question), show_sql).await
        }

        Commands::Repl { show_sql } => run_repl(ctx, show_sql).await,

        Commands::Sql { statement } => run_statement(ctx, &statement).await,

        Commands::Stats => show_stats(ctx).await,

        Commands::Reset { yes } => reset_store(ctx, yes).await,

        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => generate_config(output_path, force).await,
    }
}
