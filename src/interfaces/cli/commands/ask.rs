//! Question answering commands (ask / repl)

use std::io::Write;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::errors::VidstatError;
use crate::interfaces::cli::{APOLOGY, CliError};
use crate::query::QueryOrchestrator;
use crate::runtime::StartupContext;

/// 输出道歉和错误详情，返回 QueryError
pub fn report_query_error(err: VidstatError) -> CliError {
    println!("{}", APOLOGY.yellow());
    eprintln!("{}", err.format_colored());
    if let Some(sql) = err.attempted_sql() {
        eprintln!("  {} {}", "SQL:".dimmed(), sql.dimmed());
    }
    CliError::QueryError(err)
}

async fn ask_once(
    orchestrator: &QueryOrchestrator,
    question: &str,
    show_sql: bool,
) -> Result<(), CliError> {
    match orchestrator.answer_detailed(question).await {
        Ok(answer) => {
            if show_sql {
                println!("{} {}", "SQL:".dimmed(), answer.sql.dimmed());
            }
            println!("{}", answer.value);
            Ok(())
        }
        Err(e) => Err(report_query_error(e)),
    }
}

pub async fn answer_question(
    ctx: &StartupContext,
    question: &str,
    show_sql: bool,
) -> Result<(), CliError> {
    let orchestrator = ctx.orchestrator()?;
    ask_once(&orchestrator, question, show_sql).await
}

/// 交互模式；单个问题失败不会结束循环
pub async fn run_repl(ctx: &StartupContext, show_sql: bool) -> Result<(), CliError> {
    let orchestrator = ctx.orchestrator()?;

    println!(
        "{} {}",
        "Ask a question about the videos.".bold(),
        "Type 'exit' or 'quit' to leave.".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".cyan().bold());
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(CliError::CommandError(format!("Failed to read stdin: {}", e))),
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        // 错误已输出，继续下一个问题
        let _ = ask_once(&orchestrator, question, show_sql).await;
    }

    println!("{}", "Bye".dimmed());
    Ok(())
}
