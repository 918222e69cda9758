//! Store maintenance commands (stats / reset)

use std::io::Write;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::interfaces::cli::CliError;
use crate::runtime::StartupContext;
use crate::storage::backend_name;

pub async fn show_stats(ctx: &StartupContext) -> Result<(), CliError> {
    let counts = ctx.store.counts().await?;

    println!(
        "{} {}",
        "Backend:".bold(),
        backend_name(ctx.store.backend()).cyan()
    );
    println!("  {} {}", "videos:".bold(), counts.videos.to_string().green());
    println!(
        "  {} {}",
        "snapshots:".bold(),
        counts.snapshots.to_string().green()
    );
    Ok(())
}

pub async fn reset_store(ctx: &StartupContext, yes: bool) -> Result<(), CliError> {
    if !yes {
        print!(
            "{} ",
            "This deletes every video and snapshot. Type 'yes' to continue:".yellow()
        );
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| CliError::CommandError(format!("Failed to read stdin: {}", e)))?;
        if line.trim() != "yes" {
            println!("{} Reset cancelled", "ℹ".bold().blue());
            return Ok(());
        }
    }

    let removed = ctx.store.reset().await?;
    println!(
        "{} Removed {} videos and {} snapshots",
        "✓".bold().green(),
        removed.videos.to_string().cyan(),
        removed.snapshots.to_string().cyan()
    );
    Ok(())
}
