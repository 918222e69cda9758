//! Run a raw statement through the guard and executor

use colored::Colorize;

use super::ask::report_query_error;
use crate::errors::VidstatError;
use crate::interfaces::cli::CliError;
use crate::query::{ScalarOutcome, check_statement};
use crate::runtime::StartupContext;

pub async fn run_statement(ctx: &StartupContext, statement: &str) -> Result<(), CliError> {
    let sql = check_statement(statement)
        .map_err(|e| report_query_error(VidstatError::query_answer(Some(statement.to_string()), e)))?;

    let outcome = ctx
        .executor()
        .execute_scalar(&sql)
        .await
        .map_err(|e| report_query_error(VidstatError::query_answer(Some(sql.clone()), e)))?;

    match outcome {
        ScalarOutcome::Value(v) => println!("{}", v),
        ScalarOutcome::Empty => println!("0 {}", "(no value)".dimmed()),
        ScalarOutcome::Unparseable(raw) => {
            println!("0 {}", format!("(non-numeric result: {})", raw).yellow())
        }
    }
    Ok(())
}
