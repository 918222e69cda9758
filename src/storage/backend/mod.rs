//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod mutations;
mod query;

use sea_orm::{DatabaseConnection, DbBackend};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, VidstatError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use mutations::{insert_snapshots, insert_videos, max_bind_params, rows_per_statement};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<DbBackend> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok(DbBackend::Sqlite)
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok(DbBackend::MySql)
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok(DbBackend::Postgres)
    } else {
        Err(VidstatError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 后端显示名称
pub fn backend_name(backend: DbBackend) -> &'static str {
    match backend {
        DbBackend::Sqlite => "sqlite",
        DbBackend::MySql => "mysql",
        DbBackend::Postgres => "postgres",
        // DbBackend 为 non_exhaustive
        #[allow(unreachable_patterns)]
        _ => "unknown",
    }
}

/// 视频数据存储句柄
///
/// 内部持有连接池；克隆只复制池的引用。由组合根创建一次，
/// 显式传给导入器和执行器。
#[derive(Clone)]
pub struct VideoStore {
    db: DatabaseConnection,
    backend: DbBackend,
}

impl VideoStore {
    /// 连接数据库并运行迁移
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.trim();
        if database_url.is_empty() {
            return Err(VidstatError::database_config("DATABASE_URL 未设置"));
        }

        let backend = infer_backend_from_url(database_url)?;

        // 根据不同数据库类型配置连接选项
        let db = if backend == DbBackend::Sqlite {
            connect_sqlite(database_url, config).await?
        } else {
            connect_generic(database_url, backend_name(backend), config).await?
        };

        // 运行迁移
        run_migrations(&db).await?;

        info!(
            "{} storage initialized (max {} connections)",
            backend_name(backend).to_uppercase(),
            config.max_connections()
        );
        Ok(Self { db, backend })
    }

    /// 包装已有连接（迁移需由调用方负责）
    pub fn from_connection(db: DatabaseConnection) -> Self {
        let backend = db.get_database_backend();
        Self { db, backend }
    }

    pub fn backend(&self) -> DbBackend {
        self.backend
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(
            infer_backend_from_url("sqlite://videos.db?mode=rwc").unwrap(),
            DbBackend::Sqlite
        );
        assert_eq!(infer_backend_from_url("data/videos.db").unwrap(), DbBackend::Sqlite);
        assert_eq!(infer_backend_from_url(":memory:").unwrap(), DbBackend::Sqlite);
        assert_eq!(infer_backend_from_url("sqlite::memory:").unwrap(), DbBackend::Sqlite);
        assert_eq!(
            infer_backend_from_url("postgresql://u:p@localhost/videos").unwrap(),
            DbBackend::Postgres
        );
        assert_eq!(
            infer_backend_from_url("mariadb://localhost/videos").unwrap(),
            DbBackend::MySql
        );
    }

    #[test]
    fn test_infer_backend_rejects_unknown_scheme() {
        let err = infer_backend_from_url("redis://localhost").unwrap_err();
        assert!(matches!(err, VidstatError::DatabaseConfig(_)));
    }
}
