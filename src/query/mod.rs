//! Question answering pipeline
//!
//! question → translator → guard → executor → integer

pub mod executor;
pub mod guard;
pub mod orchestrator;
pub mod prompt;
pub mod scalar;
pub mod translator;

pub use executor::{ExecutorConfig, SqlExecutor};
pub use guard::{ForbiddenKeyword, check_statement};
pub use orchestrator::{Answer, QueryOrchestrator};
pub use prompt::{TranslationContext, build_system_prompt};
pub use scalar::ScalarOutcome;
pub use translator::{OpenAiTranslator, SqlTranslator, clean_sql_response, with_deadline};
