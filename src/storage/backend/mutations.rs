//! Write operations
//!
//! 多行 INSERT 在批次超过后端绑定参数上限时拆成多条语句，
//! 但始终在调用方给出的连接（通常是事务）上执行。

use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, TransactionTrait};
use tracing::{debug, info};

use super::VideoStore;
use crate::errors::{Result, VidstatError};
use crate::storage::models::ResetReport;

use migration::entities::{video, video_snapshot};

const SQLITE_MAX_BIND_PARAMS: usize = 32766;
const DEFAULT_MAX_BIND_PARAMS: usize = 65535;

const VIDEO_COLUMNS: usize = 9;
const SNAPSHOT_COLUMNS: usize = 12;

/// 单条语句允许的绑定参数上限
pub fn max_bind_params(backend: DbBackend) -> usize {
    match backend {
        DbBackend::Sqlite => SQLITE_MAX_BIND_PARAMS,
        _ => DEFAULT_MAX_BIND_PARAMS,
    }
}

/// 单条 INSERT 最多可容纳的行数
pub fn rows_per_statement(backend: DbBackend, columns: usize) -> usize {
    (max_bind_params(backend) / columns.max(1)).max(1)
}

/// 批量插入视频行，返回插入行数
pub async fn insert_videos<C>(conn: &C, rows: Vec<video::ActiveModel>) -> Result<u64>
where
    C: ConnectionTrait,
{
    let per_statement = rows_per_statement(conn.get_database_backend(), VIDEO_COLUMNS);
    let mut inserted = 0u64;
    let mut rows = rows.into_iter().peekable();

    while rows.peek().is_some() {
        let chunk: Vec<video::ActiveModel> = rows.by_ref().take(per_statement).collect();
        let len = chunk.len() as u64;
        video::Entity::insert_many(chunk)
            .exec(conn)
            .await
            .map_err(|e| VidstatError::from_write_error("插入视频失败", e))?;
        inserted += len;
    }

    debug!("Inserted {} video rows", inserted);
    Ok(inserted)
}

/// 批量插入快照行，返回插入行数
pub async fn insert_snapshots<C>(conn: &C, rows: Vec<video_snapshot::ActiveModel>) -> Result<u64>
where
    C: ConnectionTrait,
{
    let per_statement = rows_per_statement(conn.get_database_backend(), SNAPSHOT_COLUMNS);
    let mut inserted = 0u64;
    let mut rows = rows.into_iter().peekable();

    while rows.peek().is_some() {
        let chunk: Vec<video_snapshot::ActiveModel> = rows.by_ref().take(per_statement).collect();
        let len = chunk.len() as u64;
        video_snapshot::Entity::insert_many(chunk)
            .exec(conn)
            .await
            .map_err(|e| VidstatError::from_write_error("插入快照失败", e))?;
        inserted += len;
    }

    Ok(inserted)
}

impl VideoStore {
    /// 清空所有数据（先快照后视频，单事务）
    pub async fn reset(&self) -> Result<ResetReport> {
        let txn = self
            .get_db()
            .begin()
            .await
            .map_err(|e| VidstatError::database_operation(format!("开始事务失败: {}", e)))?;

        let snapshots = video_snapshot::Entity::delete_many()
            .exec(&txn)
            .await
            .map_err(|e| VidstatError::database_operation(format!("删除快照失败: {}", e)))?
            .rows_affected;
        let videos = video::Entity::delete_many()
            .exec(&txn)
            .await
            .map_err(|e| VidstatError::database_operation(format!("删除视频失败: {}", e)))?
            .rows_affected;

        txn.commit()
            .await
            .map_err(|e| VidstatError::database_operation(format!("提交事务失败: {}", e)))?;

        info!("Store reset: removed {} videos, {} snapshots", videos, snapshots);
        Ok(ResetReport { videos, snapshots })
    }
}
