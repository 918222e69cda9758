use std::time::Duration;

use sea_orm::prelude::Decimal;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseTransaction, DbBackend, DbErr, FromQueryResult,
    QueryResult, Statement, TransactionTrait,
};
use tracing::{debug, warn};

use super::scalar::{ScalarOutcome, classify_text, truncate_decimal, truncate_f64};
use crate::config::DatabaseConfig;
use crate::errors::{Result, VidstatError};
use crate::storage::VideoStore;

#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    pub statement_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            statement_timeout: Duration::from_secs(15),
        }
    }
}

impl From<&DatabaseConfig> for ExecutorConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            statement_timeout: config.statement_timeout(),
        }
    }
}

/// 第一行第一列
struct ScalarCell(ScalarOutcome);

impl FromQueryResult for ScalarCell {
    fn from_query_result(res: &QueryResult, _pre: &str) -> std::result::Result<Self, DbErr> {
        Ok(Self(extract_first_column(res)))
    }
}

/// 按 整数 → 浮点 → 定点 → 文本 的顺序尝试取值
fn extract_first_column(res: &QueryResult) -> ScalarOutcome {
    macro_rules! try_int {
        ($ty:ty) => {
            if let Ok(v) = res.try_get_by_index::<Option<$ty>>(0) {
                return v.map_or(ScalarOutcome::Empty, |v| ScalarOutcome::Value(i64::from(v)));
            }
        };
    }
    try_int!(i64);
    try_int!(i32);
    try_int!(i16);

    if let Ok(v) = res.try_get_by_index::<Option<f64>>(0) {
        return float_outcome(v);
    }
    if let Ok(v) = res.try_get_by_index::<Option<f32>>(0) {
        return float_outcome(v.map(f64::from));
    }
    if let Ok(v) = res.try_get_by_index::<Option<Decimal>>(0) {
        return v.map_or(ScalarOutcome::Empty, |d| {
            ScalarOutcome::Value(truncate_decimal(d))
        });
    }
    if let Ok(v) = res.try_get_by_index::<Option<String>>(0) {
        return v.map_or(ScalarOutcome::Empty, classify_text);
    }

    ScalarOutcome::Unparseable("<unsupported column type>".to_string())
}

fn float_outcome(value: Option<f64>) -> ScalarOutcome {
    match value {
        None => ScalarOutcome::Empty,
        Some(f) => match truncate_f64(f) {
            Some(v) => ScalarOutcome::Value(v),
            None => ScalarOutcome::Unparseable(f.to_string()),
        },
    }
}

/// 单值 SQL 执行器
///
/// 每次调用使用独立的只读事务（SQLite 不支持访问模式，仅用普通事务），
/// 读完后总是回滚。语句超时除 tokio 截止时间外，PostgreSQL 还会下发
/// `SET LOCAL statement_timeout` 让服务端取消执行。
#[derive(Clone)]
pub struct SqlExecutor {
    store: VideoStore,
    config: ExecutorConfig,
}

impl SqlExecutor {
    pub fn new(store: VideoStore, config: ExecutorConfig) -> Self {
        Self { store, config }
    }

    pub fn backend(&self) -> DbBackend {
        self.store.backend()
    }

    /// 执行并归一化为整数；无值和无法解析的值都返回 0
    pub async fn execute(&self, sql: &str) -> Result<i64> {
        let outcome = self.execute_scalar(sql).await?;
        if let ScalarOutcome::Unparseable(ref raw) = outcome {
            warn!("Query returned a non-numeric value '{}', answering 0", raw);
        }
        Ok(outcome.value_or_zero())
    }

    pub async fn execute_scalar(&self, sql: &str) -> Result<ScalarOutcome> {
        let timeout = self.config.statement_timeout;
        match tokio::time::timeout(timeout, self.run(sql)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Statement exceeded {} ms: {}", timeout.as_millis(), sql);
                Err(VidstatError::query_timeout(timeout))
            }
        }
    }

    async fn run(&self, sql: &str) -> Result<ScalarOutcome> {
        let db = self.store.get_db();
        let backend = db.get_database_backend();
        let access_mode = match backend {
            DbBackend::Sqlite => None,
            _ => Some(AccessMode::ReadOnly),
        };

        let txn = db
            .begin_with_config(None, access_mode)
            .await
            .map_err(VidstatError::query_execution)?;

        let result = self.read(&txn, backend, sql).await;

        if let Err(e) = txn.rollback().await {
            warn!("Failed to roll back read transaction: {}", e);
        }
        result
    }

    async fn read(
        &self,
        txn: &DatabaseTransaction,
        backend: DbBackend,
        sql: &str,
    ) -> Result<ScalarOutcome> {
        if backend == DbBackend::Postgres {
            txn.execute_unprepared(&format!(
                "SET LOCAL statement_timeout = {}",
                self.config.statement_timeout.as_millis()
            ))
            .await
            .map_err(VidstatError::query_execution)?;
        }

        debug!("Executing scalar query: {}", sql);
        let cell = ScalarCell::find_by_statement(Statement::from_string(backend, sql))
            .one(txn)
            .await
            .map_err(VidstatError::query_execution)?;

        Ok(cell.map_or(ScalarOutcome::Empty, |c| c.0))
    }
}
