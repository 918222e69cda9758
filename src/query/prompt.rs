//! System prompt for the SQL translator

use std::fmt::Write;

use chrono::{NaiveDate, Utc};
use sea_orm::DbBackend;

use crate::config::TranslatorConfig;
use crate::errors::{Result, VidstatError};

/// 翻译时注入的上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationContext {
    /// 固定的"今天"；为 None 时每次取当前 UTC 日期
    pub fixed_today: Option<NaiveDate>,
    /// 问题未给出年份时假定的年份
    pub default_year: i32,
}

impl Default for TranslationContext {
    fn default() -> Self {
        Self {
            fixed_today: None,
            default_year: 2025,
        }
    }
}

impl TranslationContext {
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        let fixed_today = match config.today.as_deref() {
            Some(s) if !s.trim().is_empty() => Some(
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
                    VidstatError::config(format!("invalid translator.today '{}': {}", s, e))
                })?,
            ),
            _ => None,
        };
        Ok(Self {
            fixed_today,
            default_year: config.default_year,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

fn dialect_name(backend: DbBackend) -> &'static str {
    match backend {
        DbBackend::Postgres => "PostgreSQL",
        DbBackend::MySql => "MySQL",
        _ => "SQLite",
    }
}

/// 将时间戳列转换为日期的表达式
pub fn date_expr(backend: DbBackend, column: &str) -> String {
    match backend {
        DbBackend::Postgres => format!("{}::date", column),
        _ => format!("DATE({})", column),
    }
}

const SCHEMA: &str = "\
## Database schema

### Table `videos` (final statistics per video)
- id (TEXT) - video identifier
- creator_id (TEXT) - creator identifier
- video_created_at (TIMESTAMP WITH TIME ZONE) - when the video was published
- views_count (BIGINT) - final number of views
- likes_count (INTEGER) - final number of likes
- comments_count (INTEGER) - final number of comments
- reports_count (INTEGER) - final number of reports
- created_at (TIMESTAMP WITH TIME ZONE) - record creation time
- updated_at (TIMESTAMP WITH TIME ZONE) - record update time

### Table `video_snapshots` (hourly measurements)
- id (TEXT) - snapshot identifier
- video_id (TEXT) - the measured video (FK -> videos.id)
- views_count (BIGINT) - views at measurement time
- likes_count (INTEGER) - likes at measurement time
- comments_count (INTEGER) - comments at measurement time
- reports_count (INTEGER) - reports at measurement time
- delta_views_count (BIGINT) - views gained since the previous measurement (may be negative)
- delta_likes_count (INTEGER) - likes gained since the previous measurement
- delta_comments_count (INTEGER) - comments gained since the previous measurement
- delta_reports_count (INTEGER) - reports gained since the previous measurement
- created_at (TIMESTAMP WITH TIME ZONE) - measurement time (hourly)
- updated_at (TIMESTAMP WITH TIME ZONE) - record update time
";

/// 构建系统提示词
pub fn build_system_prompt(backend: DbBackend, ctx: &TranslationContext) -> String {
    let dialect = dialect_name(backend);
    let video_date = date_expr(backend, "video_created_at");
    let snapshot_date = date_expr(backend, "created_at");
    let year = ctx.default_year;

    let mut prompt = String::with_capacity(4096);
    let _ = writeln!(
        prompt,
        "You are a {} expert. Translate the user's question into SQL and reply with the SQL only.\n",
        dialect
    );
    prompt.push_str(SCHEMA);

    let _ = write!(
        prompt,
        "
## Rules

1. Reply with exactly one SQL statement: no markdown, no quotes, no explanation.
2. The statement must be a single SELECT that returns exactly one number (COUNT, SUM, AVG, ...).
3. To count videos, use the `videos` table.
4. For growth or activity on a given date, use `video_snapshots` and sum the `delta_*` columns.
5. To filter by date, convert timestamps with `{video_date}` / `{snapshot_date}`; write dates as 'YYYY-MM-DD'; use BETWEEN or >= and <= for ranges (inclusive).
6. If the question has no year, assume {year}.
7. Today is {today}.
8. Always wrap SUM in COALESCE(..., 0) so an empty range yields 0.
9. Count distinct videos with COUNT(DISTINCT video_id).
10. \"More than N\" means >, \"less than N\" means <.

## Examples

Question: How many videos are there in total?
SQL: SELECT COUNT(id) FROM videos

Question: How many videos did creator abc123 publish from November 1 to November 5, {year} inclusive?
SQL: SELECT COUNT(id) FROM videos WHERE creator_id = 'abc123' AND {video_date} BETWEEN '{year}-11-01' AND '{year}-11-05'

Question: How many videos have more than 100000 views?
SQL: SELECT COUNT(id) FROM videos WHERE views_count > 100000

Question: How many views did all videos gain in total on November 28, {year}?
SQL: SELECT COALESCE(SUM(delta_views_count), 0) FROM video_snapshots WHERE {snapshot_date} = '{year}-11-28'

Question: How many different videos received new views on November 27, {year}?
SQL: SELECT COUNT(DISTINCT video_id) FROM video_snapshots WHERE {snapshot_date} = '{year}-11-27' AND delta_views_count > 0

Question: How many likes did all videos gain from November 26 to 28?
SQL: SELECT COALESCE(SUM(delta_likes_count), 0) FROM video_snapshots WHERE {snapshot_date} BETWEEN '{year}-11-26' AND '{year}-11-28'
",
        today = ctx.today().format("%Y-%m-%d"),
    );

    prompt
}
