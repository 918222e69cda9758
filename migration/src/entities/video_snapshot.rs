//! Hourly measurement of a video's counters
//!
//! `created_at` is the measurement instant, not record bookkeeping.
//! Daily activity questions filter on it.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "video_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub video_id: String,
    pub views_count: i64,
    pub likes_count: i32,
    pub comments_count: i32,
    pub reports_count: i32,
    /// 与上一次测量相比的增量，可能为负（上游修正）
    pub delta_views_count: i64,
    pub delta_likes_count: i32,
    pub delta_comments_count: i32,
    pub delta_reports_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::video::Entity",
        from = "Column::VideoId",
        to = "super::video::Column::Id",
        on_delete = "Cascade"
    )]
    Video,
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Video.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
