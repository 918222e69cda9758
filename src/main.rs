use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::debug;

use vidstat::cli::Cli;
use vidstat::config::StaticConfig;
use vidstat::interfaces::cli::{CliError, run_cli_command, run_offline_command};
use vidstat::runtime::prepare_startup;
use vidstat::system::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // 查询错误已经输出过道歉和详情
            if !matches!(e.downcast_ref::<CliError>(), Some(CliError::QueryError(_))) {
                eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // config generate 不需要配置文件和数据库
    if let Some(result) = run_offline_command(&cli.command).await {
        return result.map_err(Into::into);
    }

    let config =
        StaticConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _guard = init_logging(&config.logging).context("Failed to initialize logging")?;
    debug!("Configuration loaded");

    let ctx = prepare_startup(config).await?;
    run_cli_command(&ctx, cli.command).await?;
    Ok(())
}
