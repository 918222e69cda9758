//! 导入文档的解析与行投影
//!
//! 文档结构：`{ "videos": [ { ..., "snapshots": [ { ... } ] } ] }`。
//! 所有错误都带记录位置（`videos[i]` / `videos[i].snapshots[j]`）。

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{Result, VidstatError};
use crate::ingest::timestamp::parse_timestamp;

use migration::entities::{video, video_snapshot};

#[derive(Debug, Deserialize)]
struct RawVideo {
    id: Option<String>,
    creator_id: Option<String>,
    video_created_at: Option<String>,
    views_count: Option<i64>,
    likes_count: Option<i64>,
    comments_count: Option<i64>,
    reports_count: Option<i64>,
    created_at: Option<String>,
    updated_at: Option<String>,
    #[serde(default)]
    snapshots: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    id: Option<String>,
    video_id: Option<String>,
    views_count: Option<i64>,
    likes_count: Option<i64>,
    comments_count: Option<i64>,
    reports_count: Option<i64>,
    delta_views_count: Option<i64>,
    delta_likes_count: Option<i64>,
    delta_comments_count: Option<i64>,
    delta_reports_count: Option<i64>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// 解析并校验后的文档，行按源文档顺序排列
#[derive(Debug, Clone, Default)]
pub struct VideoDocument {
    pub videos: Vec<video::Model>,
    pub snapshots: Vec<video_snapshot::Model>,
}

impl VideoDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| VidstatError::malformed_input(format!("invalid JSON document: {}", e)))?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self> {
        let Value::Object(mut root) = root else {
            return Err(VidstatError::malformed_input(
                "document root must be an object with a 'videos' list",
            ));
        };
        let records = match root.remove("videos") {
            Some(Value::Array(records)) => records,
            Some(_) => {
                return Err(VidstatError::malformed_input("'videos' must be a list"));
            }
            None => {
                return Err(VidstatError::malformed_input(
                    "document is missing the top-level 'videos' list",
                ));
            }
        };

        let mut doc = VideoDocument {
            videos: Vec::with_capacity(records.len()),
            snapshots: Vec::new(),
        };

        for (i, record) in records.into_iter().enumerate() {
            let location = format!("videos[{}]", i);
            let mut raw: RawVideo = decode(record, &location)?;
            let snapshots = raw.snapshots.take().unwrap_or_default();
            doc.videos.push(project_video(&location, raw)?);

            doc.snapshots.reserve(snapshots.len());
            for (j, snapshot) in snapshots.into_iter().enumerate() {
                let location = format!("videos[{}].snapshots[{}]", i, j);
                let raw: RawSnapshot = decode(snapshot, &location)?;
                doc.snapshots.push(project_snapshot(&location, raw)?);
            }
        }

        Ok(doc)
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, location: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| VidstatError::malformed_input(format!("{}: {}", location, e)))
}

fn project_video(location: &str, raw: RawVideo) -> Result<video::Model> {
    Ok(video::Model {
        id: required(location, "id", raw.id)?,
        creator_id: required(location, "creator_id", raw.creator_id)?,
        video_created_at: timestamp(location, "video_created_at", raw.video_created_at)?,
        views_count: counter(location, "views_count", raw.views_count)?,
        likes_count: small_counter(location, "likes_count", raw.likes_count)?,
        comments_count: small_counter(location, "comments_count", raw.comments_count)?,
        reports_count: small_counter(location, "reports_count", raw.reports_count)?,
        created_at: timestamp(location, "created_at", raw.created_at)?,
        updated_at: timestamp(location, "updated_at", raw.updated_at)?,
    })
}

fn project_snapshot(location: &str, raw: RawSnapshot) -> Result<video_snapshot::Model> {
    Ok(video_snapshot::Model {
        id: required(location, "id", raw.id)?,
        video_id: required(location, "video_id", raw.video_id)?,
        views_count: counter(location, "views_count", raw.views_count)?,
        likes_count: small_counter(location, "likes_count", raw.likes_count)?,
        comments_count: small_counter(location, "comments_count", raw.comments_count)?,
        reports_count: small_counter(location, "reports_count", raw.reports_count)?,
        delta_views_count: required(location, "delta_views_count", raw.delta_views_count)?,
        delta_likes_count: small_delta(location, "delta_likes_count", raw.delta_likes_count)?,
        delta_comments_count: small_delta(
            location,
            "delta_comments_count",
            raw.delta_comments_count,
        )?,
        delta_reports_count: small_delta(
            location,
            "delta_reports_count",
            raw.delta_reports_count,
        )?,
        created_at: timestamp(location, "created_at", raw.created_at)?,
        updated_at: timestamp(location, "updated_at", raw.updated_at)?,
    })
}

fn required<T>(location: &str, field: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| VidstatError::missing_field(location, field))
}

fn timestamp(location: &str, field: &'static str, value: Option<String>) -> Result<DateTime<Utc>> {
    let raw = required(location, field, value)?;
    parse_timestamp(&raw)
        .map_err(|e| VidstatError::malformed_input(format!("{}.{}: {}", location, field, e)))
}

/// 当前计数：非负，64 位
fn counter(location: &str, field: &'static str, value: Option<i64>) -> Result<i64> {
    let value = required(location, field, value)?;
    if value < 0 {
        return Err(VidstatError::malformed_input(format!(
            "{}.{}: counter must be non-negative, got {}",
            location, field, value
        )));
    }
    Ok(value)
}

/// 当前计数：非负，32 位
fn small_counter(location: &str, field: &'static str, value: Option<i64>) -> Result<i32> {
    let value = counter(location, field, value)?;
    narrow(location, field, value)
}

/// 增量：允许负值，32 位
fn small_delta(location: &str, field: &'static str, value: Option<i64>) -> Result<i32> {
    let value = required(location, field, value)?;
    narrow(location, field, value)
}

fn narrow(location: &str, field: &'static str, value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        VidstatError::malformed_input(format!(
            "{}.{}: {} does not fit a 32-bit counter",
            location, field, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(id: &str, video_id: &str, delta: i64) -> Value {
        json!({
            "id": id, "video_id": video_id,
            "views_count": 100, "likes_count": 5, "comments_count": 1, "reports_count": 0,
            "delta_views_count": delta, "delta_likes_count": 0,
            "delta_comments_count": 0, "delta_reports_count": 0,
            "created_at": "2025-11-27T10:00:00Z", "updated_at": "2025-11-27T10:00:00Z"
        })
    }

    fn video(id: &str, snapshots: Vec<Value>) -> Value {
        json!({
            "id": id, "creator_id": "c1",
            "video_created_at": "2025-11-20T08:00:00+00:00",
            "views_count": 1000, "likes_count": 50, "comments_count": 3, "reports_count": 0,
            "created_at": "2025-11-20T08:00:00Z", "updated_at": "2025-11-28T08:00:00Z",
            "snapshots": snapshots
        })
    }

    #[test]
    fn test_preserves_source_order() {
        let doc = VideoDocument::from_value(json!({
            "videos": [
                video("v1", vec![snapshot("s1", "v1", 10), snapshot("s2", "v1", 0)]),
                video("v2", vec![snapshot("s3", "v2", 5)]),
            ]
        }))
        .unwrap();

        let ids: Vec<&str> = doc.snapshots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2", "s3"]);
        assert_eq!(doc.videos.len(), 2);
        assert_eq!(doc.videos[1].id, "v2");
    }

    #[test]
    fn test_missing_top_level_list() {
        let err = VideoDocument::parse(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, VidstatError::MalformedInput(_)));

        let err = VideoDocument::parse("not json").unwrap_err();
        assert!(matches!(err, VidstatError::MalformedInput(_)));

        let err = VideoDocument::parse(r#"[1, 2]"#).unwrap_err();
        assert!(matches!(err, VidstatError::MalformedInput(_)));
    }

    #[test]
    fn test_missing_field_names_snapshot_location() {
        let mut broken = snapshot("s2", "v1", 1);
        broken.as_object_mut().unwrap().remove("delta_views_count");

        let err = VideoDocument::from_value(json!({
            "videos": [video("v0", vec![]), video("v1", vec![snapshot("s1", "v1", 1), broken])]
        }))
        .unwrap_err();

        match err {
            VidstatError::MissingField { location, field } => {
                assert_eq!(location, "videos[1].snapshots[1]");
                assert_eq!(field, "delta_views_count");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_video_field() {
        let mut broken = video("v1", vec![]);
        broken.as_object_mut().unwrap().remove("creator_id");

        let err = VideoDocument::from_value(json!({ "videos": [broken] })).unwrap_err();
        assert!(matches!(
            err,
            VidstatError::MissingField { ref location, field: "creator_id" } if location == "videos[0]"
        ));
    }

    #[test]
    fn test_snapshots_key_is_optional() {
        let mut record = video("v1", vec![]);
        record.as_object_mut().unwrap().remove("snapshots");

        let doc = VideoDocument::from_value(json!({ "videos": [record] })).unwrap();
        assert_eq!(doc.videos.len(), 1);
        assert!(doc.snapshots.is_empty());
    }

    #[test]
    fn test_negative_delta_is_accepted() {
        let doc = VideoDocument::from_value(json!({
            "videos": [video("v1", vec![snapshot("s1", "v1", -42)])]
        }))
        .unwrap();
        assert_eq!(doc.snapshots[0].delta_views_count, -42);
    }

    #[test]
    fn test_negative_current_counter_is_rejected() {
        let mut record = video("v1", vec![]);
        record["views_count"] = json!(-1);
        let err = VideoDocument::from_value(json!({ "videos": [record] })).unwrap_err();
        assert!(matches!(err, VidstatError::MalformedInput(_)));
    }

    #[test]
    fn test_wrong_type_and_overflow() {
        let mut record = video("v1", vec![]);
        record["likes_count"] = json!("many");
        let err = VideoDocument::from_value(json!({ "videos": [record] })).unwrap_err();
        assert!(err.message().contains("videos[0]"));

        let mut record = video("v1", vec![]);
        record["likes_count"] = json!(5_000_000_000i64);
        let err = VideoDocument::from_value(json!({ "videos": [record] })).unwrap_err();
        assert!(err.message().contains("likes_count"));
    }

    #[test]
    fn test_bad_timestamp_names_field() {
        let mut record = video("v1", vec![]);
        record["video_created_at"] = json!("last tuesday");
        let err = VideoDocument::from_value(json!({ "videos": [record] })).unwrap_err();
        assert!(matches!(err, VidstatError::MalformedInput(_)));
        assert!(err.message().contains("videos[0].video_created_at"));
    }
}
