use std::fmt;
use std::time::Duration;

use sea_orm::{DbErr, SqlErr};

#[derive(Debug)]
pub enum VidstatError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Config(String),
    Validation(String),
    /// 导入文档无法解析，或缺少顶层结构
    MalformedInput(String),
    /// 记录缺少必填字段，`location` 形如 `videos[3].snapshots[7]`
    MissingField {
        location: String,
        field: &'static str,
    },
    DuplicateKey(String),
    ReferentialIntegrity(String),
    Translator(String),
    TranslatorTimeout(Duration),
    UnsafeStatement(String),
    QueryExecution {
        message: String,
        source: Option<DbErr>,
    },
    NonNumericResult(String),
    /// 编排层包装：保留原始错误和尝试执行的 SQL
    QueryAnswer {
        sql: Option<String>,
        source: Box<VidstatError>,
    },
}

impl VidstatError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            VidstatError::DatabaseConfig(_) => "E001",
            VidstatError::DatabaseConnection(_) => "E002",
            VidstatError::DatabaseOperation(_) => "E003",
            VidstatError::FileOperation(_) => "E004",
            VidstatError::Config(_) => "E005",
            VidstatError::Validation(_) => "E006",
            VidstatError::MalformedInput(_) => "E101",
            VidstatError::MissingField { .. } => "E102",
            VidstatError::DuplicateKey(_) => "E103",
            VidstatError::ReferentialIntegrity(_) => "E104",
            VidstatError::Translator(_) => "E201",
            VidstatError::TranslatorTimeout(_) => "E202",
            VidstatError::UnsafeStatement(_) => "E203",
            VidstatError::QueryExecution { .. } => "E204",
            VidstatError::NonNumericResult(_) => "E205",
            VidstatError::QueryAnswer { .. } => "E206",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            VidstatError::DatabaseConfig(_) => "Database Configuration Error",
            VidstatError::DatabaseConnection(_) => "Database Connection Error",
            VidstatError::DatabaseOperation(_) => "Database Operation Error",
            VidstatError::FileOperation(_) => "File Operation Error",
            VidstatError::Config(_) => "Configuration Error",
            VidstatError::Validation(_) => "Validation Error",
            VidstatError::MalformedInput(_) => "Malformed Input",
            VidstatError::MissingField { .. } => "Missing Field",
            VidstatError::DuplicateKey(_) => "Duplicate Key",
            VidstatError::ReferentialIntegrity(_) => "Referential Integrity Violation",
            VidstatError::Translator(_) => "Translator Error",
            VidstatError::TranslatorTimeout(_) => "Translator Timeout",
            VidstatError::UnsafeStatement(_) => "Unsafe Statement",
            VidstatError::QueryExecution { .. } => "Query Execution Error",
            VidstatError::NonNumericResult(_) => "Non-numeric Result",
            VidstatError::QueryAnswer { .. } => "Query Answer Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> String {
        match self {
            VidstatError::DatabaseConfig(msg)
            | VidstatError::DatabaseConnection(msg)
            | VidstatError::DatabaseOperation(msg)
            | VidstatError::FileOperation(msg)
            | VidstatError::Config(msg)
            | VidstatError::Validation(msg)
            | VidstatError::MalformedInput(msg)
            | VidstatError::DuplicateKey(msg)
            | VidstatError::ReferentialIntegrity(msg)
            | VidstatError::Translator(msg)
            | VidstatError::UnsafeStatement(msg)
            | VidstatError::NonNumericResult(msg) => msg.clone(),
            VidstatError::MissingField { location, field } => {
                format!("{} is missing required field '{}'", location, field)
            }
            VidstatError::TranslatorTimeout(after) => {
                format!("no SQL produced within {} ms", after.as_millis())
            }
            VidstatError::QueryExecution { message, .. } => message.clone(),
            VidstatError::QueryAnswer { sql, source } => match sql {
                Some(sql) => format!("{} (sql: {})", source.format_simple(), sql),
                None => source.format_simple(),
            },
        }
    }

    /// 格式化为彩色输出
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 剥掉 QueryAnswer 包装，返回最内层的错误
    pub fn root_cause(&self) -> &VidstatError {
        match self {
            VidstatError::QueryAnswer { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// QueryAnswer 携带的 SQL（若有）
    pub fn attempted_sql(&self) -> Option<&str> {
        match self {
            VidstatError::QueryAnswer { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for VidstatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for VidstatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VidstatError::QueryExecution {
                source: Some(err), ..
            } => Some(err),
            VidstatError::QueryAnswer { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

// 便捷的构造函数
impl VidstatError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        VidstatError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        VidstatError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        VidstatError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        VidstatError::FileOperation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        VidstatError::Config(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        VidstatError::Validation(msg.into())
    }

    pub fn malformed_input<T: Into<String>>(msg: T) -> Self {
        VidstatError::MalformedInput(msg.into())
    }

    pub fn missing_field<T: Into<String>>(location: T, field: &'static str) -> Self {
        VidstatError::MissingField {
            location: location.into(),
            field,
        }
    }

    pub fn duplicate_key<T: Into<String>>(msg: T) -> Self {
        VidstatError::DuplicateKey(msg.into())
    }

    pub fn referential_integrity<T: Into<String>>(msg: T) -> Self {
        VidstatError::ReferentialIntegrity(msg.into())
    }

    pub fn translator<T: Into<String>>(msg: T) -> Self {
        VidstatError::Translator(msg.into())
    }

    pub fn unsafe_statement<T: Into<String>>(msg: T) -> Self {
        VidstatError::UnsafeStatement(msg.into())
    }

    pub fn query_execution(source: DbErr) -> Self {
        VidstatError::QueryExecution {
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn query_timeout(after: Duration) -> Self {
        VidstatError::QueryExecution {
            message: format!("statement timed out after {} ms", after.as_millis()),
            source: None,
        }
    }

    pub fn non_numeric_result<T: Into<String>>(msg: T) -> Self {
        VidstatError::NonNumericResult(msg.into())
    }

    pub fn query_answer(sql: Option<String>, source: VidstatError) -> Self {
        // 不重复包装
        if let VidstatError::QueryAnswer { .. } = source {
            return source;
        }
        VidstatError::QueryAnswer {
            sql,
            source: Box::new(source),
        }
    }

    /// 将写入错误按约束类型分类
    ///
    /// - 唯一约束冲突 → DuplicateKey
    /// - 外键约束冲突 → ReferentialIntegrity
    /// - 其他 → DatabaseOperation
    pub fn from_write_error(context: &str, err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                return VidstatError::duplicate_key(format!("{}: {}", context, detail));
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                return VidstatError::referential_integrity(format!("{}: {}", context, detail));
            }
            _ => {}
        }

        // 回退到字符串匹配（驱动未给出可识别的错误码时）
        let text = err.to_string();
        let lowered = text.to_lowercase();
        if lowered.contains("unique constraint") || lowered.contains("duplicate key") {
            VidstatError::duplicate_key(format!("{}: {}", context, text))
        } else if lowered.contains("foreign key constraint") {
            VidstatError::referential_integrity(format!("{}: {}", context, text))
        } else {
            VidstatError::database_operation(format!("{}: {}", context, text))
        }
    }
}

// 为常见的错误类型实现 From trait
impl From<DbErr> for VidstatError {
    fn from(err: DbErr) -> Self {
        VidstatError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for VidstatError {
    fn from(err: std::io::Error) -> Self {
        VidstatError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for VidstatError {
    fn from(err: serde_json::Error) -> Self {
        VidstatError::MalformedInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VidstatError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_missing_field_message_names_location_and_field() {
        let err = VidstatError::missing_field("videos[2].snapshots[0]", "delta_views_count");
        assert_eq!(err.code(), "E102");
        assert!(err.message().contains("videos[2].snapshots[0]"));
        assert!(err.message().contains("delta_views_count"));
    }

    #[test]
    fn test_query_answer_keeps_cause_and_sql() {
        let inner = VidstatError::unsafe_statement("statement separator");
        let err = VidstatError::query_answer(Some("SELECT 1; DROP TABLE videos".into()), inner);

        assert_eq!(err.attempted_sql(), Some("SELECT 1; DROP TABLE videos"));
        assert!(matches!(err.root_cause(), VidstatError::UnsafeStatement(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("DROP TABLE"));
    }

    #[test]
    fn test_query_answer_is_not_double_wrapped() {
        let once = VidstatError::query_answer(None, VidstatError::translator("down"));
        let twice = VidstatError::query_answer(Some("SELECT 1".into()), once);
        match twice {
            VidstatError::QueryAnswer { sql, source } => {
                assert!(sql.is_none());
                assert!(matches!(*source, VidstatError::Translator(_)));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_write_error_string_fallback() {
        let err = VidstatError::from_write_error(
            "insert videos",
            DbErr::Custom("UNIQUE constraint failed: videos.id".to_string()),
        );
        assert!(matches!(err, VidstatError::DuplicateKey(_)));

        let err = VidstatError::from_write_error(
            "insert snapshots",
            DbErr::Custom("FOREIGN KEY constraint failed".to_string()),
        );
        assert!(matches!(err, VidstatError::ReferentialIntegrity(_)));

        let err = VidstatError::from_write_error(
            "insert snapshots",
            DbErr::Custom("disk I/O error".to_string()),
        );
        assert!(matches!(err, VidstatError::DatabaseOperation(_)));
    }

    #[test]
    fn test_query_timeout_has_no_db_source() {
        let err = VidstatError::query_timeout(Duration::from_millis(250));
        assert!(err.message().contains("250"));
        assert!(err.source().is_none());
    }
}
