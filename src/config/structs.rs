use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VidstatError};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - database: 数据库连接与连接池
/// - loader: 导入批次大小与默认文档路径
/// - translator: 自然语言转 SQL 服务
/// - query: 查询结果处理策略
/// - logging: 日志配置
///
/// 由组合根加载一次后显式传递给各组件，不存在全局实例。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub loader: LoaderSection,
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：VS，分隔符：__
    /// 示例：VS__DATABASE__DATABASE_URL=postgres://localhost/videos
    ///
    /// 显式传入的路径必须存在；省略时 `config.toml` 为可选。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        use config::{Config, Environment, File};

        let (source, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Path::new(DEFAULT_CONFIG_PATH).to_path_buf(), false),
        };

        let builder = Config::builder()
            // 1. 从 TOML 文件加载
            .add_source(File::from(source.as_path()).required(required))
            // 2. 从环境变量覆盖，前缀 VS，分隔符 __
            .add_source(
                Environment::with_prefix("VS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder
            .build()
            .map_err(|e| VidstatError::config(format!("Failed to build config: {}", e)))?;
        let mut config = settings
            .try_deserialize::<StaticConfig>()
            .map_err(|e| VidstatError::config(format!("Failed to deserialize config: {}", e)))?;

        if config.translator.api_key.is_empty()
            && let Ok(key) = std::env::var("OPENAI_API_KEY")
        {
            config.translator.api_key = key;
        }

        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<()> {
        if self.database.database_url.trim().is_empty() {
            return Err(VidstatError::config("database.database_url must not be empty"));
        }
        if self.database.pool_size == 0 {
            return Err(VidstatError::config("database.pool_size must be at least 1"));
        }
        if self.loader.batch_size == 0 {
            return Err(VidstatError::config("loader.batch_size must be at least 1"));
        }
        if self.translator.timeout_secs == 0 {
            return Err(VidstatError::config("translator.timeout_secs must be at least 1"));
        }
        if let Some(ref today) = self.translator.today {
            NaiveDate::parse_from_str(today, "%Y-%m-%d").map_err(|e| {
                VidstatError::config(format!(
                    "translator.today must be YYYY-MM-DD, got '{}': {}",
                    today, e
                ))
            })?;
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(VidstatError::config(format!(
                "logging.format must be 'text' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VidstatError::config(format!("Failed to render config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// 常驻连接数
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 超出常驻数的额外连接上限
    #[serde(default = "default_max_overflow")]
    pub max_overflow: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn max_connections(&self) -> u32 {
        self.pool_size.saturating_add(self.max_overflow)
    }

    pub fn min_connections(&self) -> u32 {
        self.pool_size.min(5)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_millis(self.statement_timeout_ms)
    }
}

/// 导入配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderSection {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_document_path")]
    pub default_path: String,
}

/// 自然语言转 SQL 服务配置（OpenAI 兼容接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// 为空时回退到 OPENAI_API_KEY
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_translator_timeout_secs")]
    pub timeout_secs: u64,
    /// 问题未给出年份时假定的年份
    #[serde(default = "default_year")]
    pub default_year: i32,
    /// 固定的"今天"（YYYY-MM-DD），为空时使用当前 UTC 日期
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<String>,
}

impl TranslatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 查询结果处理配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    /// 为 true 时，无法解析为数字的结果返回 NonNumericResult 而不是 0
    #[serde(default)]
    pub reject_non_numeric: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_database_url() -> String {
    "sqlite://videos.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_max_overflow() -> u32 {
    20
}

fn default_acquire_timeout_secs() -> u64 {
    8
}

fn default_statement_timeout_ms() -> u64 {
    15_000
}

fn default_batch_size() -> usize {
    5000
}

fn default_document_path() -> String {
    "data/videos.json".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_translator_timeout_secs() -> u64 {
    30
}

fn default_year() -> i32 {
    2025
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            max_overflow: default_max_overflow(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            statement_timeout_ms: default_statement_timeout_ms(),
        }
    }
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            default_path: default_document_path(),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_translator_timeout_secs(),
            default_year: default_year(),
            today: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
