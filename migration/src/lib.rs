pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20251120_000001_videos;
mod m20251120_000002_video_snapshots;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251120_000001_videos::Migration),
            Box::new(m20251120_000002_video_snapshots::Migration),
        ]
    }
}
