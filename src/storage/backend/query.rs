//! Read-only row counts

use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait,
};

use super::VideoStore;
use crate::errors::{Result, VidstatError};
use crate::storage::models::StoreCounts;

use migration::entities::{video, video_snapshot};

impl VideoStore {
    pub async fn count_videos(&self) -> Result<u64> {
        video::Entity::find()
            .count(self.get_db())
            .await
            .map_err(|e| VidstatError::database_operation(format!("统计视频失败: {}", e)))
    }

    pub async fn count_snapshots(&self) -> Result<u64> {
        video_snapshot::Entity::find()
            .count(self.get_db())
            .await
            .map_err(|e| VidstatError::database_operation(format!("统计快照失败: {}", e)))
    }

    /// 找不到所属视频的快照数量（正常情况下恒为 0）
    pub async fn count_orphan_snapshots(&self) -> Result<u64> {
        video_snapshot::Entity::find()
            .join(JoinType::LeftJoin, video_snapshot::Relation::Video.def())
            .filter(video::Column::Id.is_null())
            .count(self.get_db())
            .await
            .map_err(|e| VidstatError::database_operation(format!("统计孤立快照失败: {}", e)))
    }

    pub async fn counts(&self) -> Result<StoreCounts> {
        Ok(StoreCounts {
            videos: self.count_videos().await?,
            snapshots: self.count_snapshots().await?,
        })
    }
}
