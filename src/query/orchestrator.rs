use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::executor::SqlExecutor;
use super::guard::check_statement;
use super::scalar::ScalarOutcome;
use super::translator::SqlTranslator;
use crate::config::QueryConfig;
use crate::errors::{Result, VidstatError};

/// 一次问答的完整结果
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question: String,
    /// 实际执行的 SQL（已去掉结尾分号）
    pub sql: String,
    pub outcome: ScalarOutcome,
    pub value: i64,
}

/// 问题 → SQL → 整数
///
/// 每次调用都重新翻译并执行，不缓存。克隆只复制内部 `Arc`，
/// 可以在多个任务中并发调用 `answer`。
#[derive(Clone)]
pub struct QueryOrchestrator {
    translator: Arc<dyn SqlTranslator>,
    executor: Arc<SqlExecutor>,
    config: QueryConfig,
}

impl QueryOrchestrator {
    pub fn new(
        translator: Arc<dyn SqlTranslator>,
        executor: Arc<SqlExecutor>,
        config: QueryConfig,
    ) -> Self {
        Self {
            translator,
            executor,
            config,
        }
    }

    pub async fn answer(&self, question: &str) -> Result<i64> {
        self.answer_detailed(question).await.map(|a| a.value)
    }

    /// 失败时返回 QueryAnswer，携带原始错误和已生成的 SQL
    pub async fn answer_detailed(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(VidstatError::query_answer(
                None,
                VidstatError::validation("question must not be empty"),
            ));
        }

        let generated = self
            .translator
            .translate(question)
            .await
            .map_err(|e| VidstatError::query_answer(None, e))?;
        info!("{} translated question into: {}", self.translator.name(), generated);

        self.run_sql(question, generated).await
    }

    async fn run_sql(&self, question: &str, generated: String) -> Result<Answer> {
        let sql = match check_statement(&generated) {
            Ok(sql) => sql,
            Err(e) => {
                warn!("Refusing generated statement: {}", e);
                return Err(VidstatError::query_answer(Some(generated), e));
            }
        };

        let outcome = match self.executor.execute_scalar(&sql).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(VidstatError::query_answer(Some(sql), e)),
        };

        let value = match outcome {
            ScalarOutcome::Value(v) => v,
            ScalarOutcome::Empty => 0,
            ScalarOutcome::Unparseable(ref raw) if self.config.reject_non_numeric => {
                let err = VidstatError::non_numeric_result(format!(
                    "query returned non-numeric value '{}'",
                    raw
                ));
                return Err(VidstatError::query_answer(Some(sql), err));
            }
            ScalarOutcome::Unparseable(ref raw) => {
                warn!("Query returned a non-numeric value '{}', answering 0", raw);
                0
            }
        };

        Ok(Answer {
            question: question.to_string(),
            sql,
            outcome,
            value,
        })
    }
}
