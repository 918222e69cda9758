//! Generate config command

use std::path::PathBuf;

use colored::Colorize;

use crate::config::{DEFAULT_CONFIG_PATH, StaticConfig};
use crate::interfaces::cli::CliError;

/// Generate example configuration file
pub async fn generate_config(output_path: Option<PathBuf>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let shown = path.display().to_string();

    if path.exists() && !force {
        return Err(CliError::CommandError(format!(
            "{} already exists (use --force to overwrite)",
            shown
        )));
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        shown.blue()
    );

    match StaticConfig::default().save_to_file(&path) {
        Ok(()) => {
            println!(
                "  {} {}",
                "Configuration file generated successfully".green(),
                shown.blue()
            );
            println!(
                "  {}",
                "Set translator.api_key (or OPENAI_API_KEY) before asking questions".yellow()
            );
            Ok(())
        }
        Err(e) => {
            println!(
                "  {} {}",
                "Failed to generate configuration file".red(),
                e.to_string().red()
            );
            Err(CliError::CommandError(format!(
                "Unable to write configuration file: {}",
                e
            )))
        }
    }
}
