//! Load command

use std::path::PathBuf;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::runtime::StartupContext;

pub async fn load_document(
    ctx: &StartupContext,
    path: Option<PathBuf>,
    reset: bool,
    batch_size: Option<usize>,
) -> Result<(), CliError> {
    let path = path.unwrap_or_else(|| PathBuf::from(&ctx.config.loader.default_path));
    let loader = ctx.loader(batch_size)?;

    if reset {
        let removed = ctx.store.reset().await?;
        println!(
            "{} Cleared {} videos and {} snapshots",
            "✓".bold().green(),
            removed.videos.to_string().cyan(),
            removed.snapshots.to_string().cyan()
        );
    }

    println!(
        "{} {}",
        "Loading".yellow(),
        path.display().to_string().blue()
    );

    match loader.load(&path).await {
        Ok(report) => {
            println!(
                "{} Loaded {} videos and {} snapshots in {} batches ({} ms)",
                "✓".bold().green(),
                report.videos.to_string().green(),
                report.snapshots.to_string().green(),
                report.snapshot_batches,
                report.elapsed.as_millis()
            );
            Ok(())
        }
        Err(e) => {
            println!(
                "{} {}",
                "✗".bold().red(),
                "Load failed, no rows were committed".red()
            );
            Err(e.into())
        }
    }
}
