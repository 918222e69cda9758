//! video_snapshots 表迁移
//!
//! 每小时一次的测量记录：
//! - 当前计数器（测量时刻的值）
//! - 增量计数器（与上一次测量的差值，允许为负）
//! - video_id 外键，删除视频时级联删除其快照

use sea_orm_migration::prelude::*;

use crate::m20251120_000001_videos::Videos;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VideoSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VideoSnapshots::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VideoSnapshots::VideoId).string().not_null())
                    .col(
                        ColumnDef::new(VideoSnapshots::ViewsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VideoSnapshots::LikesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VideoSnapshots::CommentsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VideoSnapshots::ReportsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VideoSnapshots::DeltaViewsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VideoSnapshots::DeltaLikesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VideoSnapshots::DeltaCommentsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VideoSnapshots::DeltaReportsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VideoSnapshots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VideoSnapshots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_snapshots_video_id")
                            .from(VideoSnapshots::Table, VideoSnapshots::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 测量时间索引（"某天增长了多少"类查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_video_snapshots_created_at")
                    .table(VideoSnapshots::Table)
                    .col(VideoSnapshots::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 外键列索引（级联删除和按视频聚合）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_video_snapshots_video_id")
                    .table(VideoSnapshots::Table)
                    .col(VideoSnapshots::VideoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_video_snapshots_video_id")
                    .table(VideoSnapshots::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_video_snapshots_created_at")
                    .table(VideoSnapshots::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(VideoSnapshots::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VideoSnapshots {
    #[sea_orm(iden = "video_snapshots")]
    Table,
    Id,
    VideoId,
    ViewsCount,
    LikesCount,
    CommentsCount,
    ReportsCount,
    DeltaViewsCount,
    DeltaLikesCount,
    DeltaCommentsCount,
    DeltaReportsCount,
    CreatedAt,
    UpdatedAt,
}
