//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for vidstat using clap's derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// vidstat - video engagement analytics
#[derive(Parser, Debug)]
#[command(name = "vidstat")]
#[command(version)]
#[command(
    about = "Load video engagement snapshots and answer questions about them",
    long_about = None
)]
pub struct Cli {
    /// Path to the TOML configuration file (default: ./config.toml if present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a video document into the store
    Load {
        /// Document path (default: loader.default_path)
        path: Option<PathBuf>,

        /// Clear all rows before loading
        #[arg(long)]
        reset: bool,

        /// Snapshot rows per batch
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Answer one question and print the number
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Also print the generated SQL
        #[arg(long)]
        show_sql: bool,
    },

    /// Interactive question loop (type `exit` or `quit` to leave)
    Repl {
        /// Print the generated SQL for each answer
        #[arg(long)]
        show_sql: bool,
    },

    /// Run a single read-only statement through the guard and executor
    Sql {
        /// The SELECT statement
        statement: String,
    },

    /// Show row counts
    Stats,

    /// Delete all videos and snapshots
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.toml)
        output_path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// 多个参数拼成一个问题
    pub fn join_question(words: &[String]) -> String {
        words.join(" ").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_joins_words() {
        let cli = Cli::parse_from([
            "vidstat", "ask", "How", "many", "videos", "are", "there?", "--show-sql",
        ]);
        match cli.command {
            Commands::Ask { question, show_sql } => {
                assert_eq!(Commands::join_question(&question), "How many videos are there?");
                assert!(show_sql);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_load_with_global_config() {
        let cli = Cli::parse_from([
            "vidstat",
            "load",
            "data/videos.json",
            "--reset",
            "--batch-size",
            "100",
            "--config",
            "custom.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Load {
                path,
                reset,
                batch_size,
            } => {
                assert_eq!(path, Some(PathBuf::from("data/videos.json")));
                assert!(reset);
                assert_eq!(batch_size, Some(100));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["vidstat", "ask"]).is_err());
    }

    #[test]
    fn test_config_generate() {
        let cli = Cli::parse_from(["vidstat", "config", "generate", "out.toml", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigCommands::Generate { force: true, .. }
            }
        ));
    }
}
