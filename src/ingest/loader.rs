use std::path::Path;
use std::time::{Duration, Instant};

use sea_orm::{DatabaseTransaction, IntoActiveModel, TransactionTrait};
use serde::Serialize;
use tracing::{info, warn};

use super::document::VideoDocument;
use crate::config::LoaderSection;
use crate::errors::{Result, VidstatError};
use crate::storage::VideoStore;
use crate::storage::backend::{insert_snapshots, insert_videos};

use migration::entities::{video, video_snapshot};

pub const DEFAULT_BATCH_SIZE: usize = 5000;

#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    /// 每批快照行数
    pub batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl From<&LoaderSection> for LoaderConfig {
    fn from(section: &LoaderSection) -> Self {
        Self {
            batch_size: section.batch_size,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub videos: u64,
    pub snapshots: u64,
    pub snapshot_batches: usize,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }
}

/// 批量导入器
///
/// 一次导入在单个事务内完成：先写全部视频，再按批写快照。
/// 任何一步失败都回滚整个事务，存储保持导入前状态。
pub struct Loader {
    store: VideoStore,
    config: LoaderConfig,
}

impl Loader {
    pub fn new(store: VideoStore, config: LoaderConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(VidstatError::config("loader batch_size must be at least 1"));
        }
        Ok(Self { store, config })
    }

    pub async fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            VidstatError::file_operation(format!("无法读取文件 {}: {}", path.display(), e))
        })?;
        info!("Loading video document from {}", path.display());
        self.load_str(&text).await
    }

    pub async fn load_str(&self, text: &str) -> Result<LoadReport> {
        let doc = VideoDocument::parse(text)?;
        self.load_document(doc).await
    }

    pub async fn load_document(&self, doc: VideoDocument) -> Result<LoadReport> {
        let started = Instant::now();
        info!(
            "Starting load: {} videos, {} snapshots (batch size {})",
            doc.videos.len(),
            doc.snapshots.len(),
            self.config.batch_size
        );

        let txn = self
            .store
            .get_db()
            .begin()
            .await
            .map_err(|e| VidstatError::database_operation(format!("开始事务失败: {}", e)))?;

        match self.write_all(&txn, doc).await {
            Ok((videos, snapshots, snapshot_batches)) => {
                txn.commit().await.map_err(|e| {
                    VidstatError::database_operation(format!("提交事务失败: {}", e))
                })?;

                let report = LoadReport {
                    videos,
                    snapshots,
                    snapshot_batches,
                    elapsed: started.elapsed(),
                };
                info!(
                    "Load committed: {} videos, {} snapshots in {} ms",
                    report.videos,
                    report.snapshots,
                    report.elapsed.as_millis()
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Rollback after failed load also failed: {}", rollback_err);
                }
                warn!("Load aborted, no rows committed: {}", e);
                Err(e)
            }
        }
    }

    async fn write_all(
        &self,
        txn: &DatabaseTransaction,
        doc: VideoDocument,
    ) -> Result<(u64, u64, usize)> {
        let video_rows: Vec<video::ActiveModel> = doc
            .videos
            .into_iter()
            .map(IntoActiveModel::into_active_model)
            .collect();
        let videos = insert_videos(txn, video_rows).await?;
        info!("inserted {} videos", videos);

        let total = doc.snapshots.len();
        let mut snapshots = 0u64;
        let mut batches = 0usize;
        let mut rows = doc.snapshots.into_iter().peekable();

        while rows.peek().is_some() {
            let batch: Vec<video_snapshot::ActiveModel> = rows
                .by_ref()
                .take(self.config.batch_size)
                .map(IntoActiveModel::into_active_model)
                .collect();
            snapshots += insert_snapshots(txn, batch).await?;
            batches += 1;
            info!("inserted {}/{} snapshots", snapshots, total);
        }

        Ok((videos, snapshots, batches))
    }
}
