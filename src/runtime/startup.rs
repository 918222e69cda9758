use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::errors::VidstatError;
use crate::ingest::{Loader, LoaderConfig};
use crate::query::{ExecutorConfig, OpenAiTranslator, QueryOrchestrator, SqlExecutor};
use crate::storage::{VideoStore, backend_name};

/// 组合根：持有配置和唯一的存储句柄，按需构建各组件
pub struct StartupContext {
    pub config: StaticConfig,
    pub store: VideoStore,
}

/// 打开存储（含迁移）
pub async fn prepare_startup(config: StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Opening video store...");

    let store = VideoStore::new(&config.database)
        .await
        .context("Failed to open video store")?;
    info!(
        "Using storage backend: {} ({} ms)",
        backend_name(store.backend()),
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { config, store })
}

impl StartupContext {
    /// `batch_size` 覆盖配置中的批次大小
    pub fn loader(&self, batch_size: Option<usize>) -> std::result::Result<Loader, VidstatError> {
        let mut config = LoaderConfig::from(&self.config.loader);
        if let Some(size) = batch_size {
            config.batch_size = size;
        }
        Loader::new(self.store.clone(), config)
    }

    pub fn executor(&self) -> SqlExecutor {
        SqlExecutor::new(
            self.store.clone(),
            ExecutorConfig::from(&self.config.database),
        )
    }

    pub fn orchestrator(&self) -> std::result::Result<QueryOrchestrator, VidstatError> {
        let translator = OpenAiTranslator::new(&self.config.translator, self.store.backend())?;
        Ok(QueryOrchestrator::new(
            Arc::new(translator),
            Arc::new(self.executor()),
            self.config.query.clone(),
        ))
    }
}
