//! Video entity: one row per content item with its final counters

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub creator_id: String,
    /// 发布时间（按日期范围查询的主要过滤列）
    pub video_created_at: DateTimeUtc,
    pub views_count: i64,
    pub likes_count: i32,
    pub comments_count: i32,
    pub reports_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::video_snapshot::Entity")]
    VideoSnapshot,
}

impl Related<super::video_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoSnapshot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
