//! Ingestion integration tests
//!
//! 使用临时 SQLite 文件验证导入的事务性和错误分类

use serde_json::{Value, json};
use tempfile::TempDir;

use vidstat::VidstatError;
use vidstat::config::DatabaseConfig;
use vidstat::ingest::{Loader, LoaderConfig};
use vidstat::storage::VideoStore;

// =============================================================================
// Helpers
// =============================================================================

async fn create_store(temp_dir: &TempDir) -> VideoStore {
    let db_path = temp_dir.path().join("videos.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };
    VideoStore::new(&config).await.expect("Failed to create store")
}

fn loader(store: &VideoStore, batch_size: usize) -> Loader {
    Loader::new(store.clone(), LoaderConfig { batch_size }).expect("valid loader config")
}

fn snapshot(id: &str, video_id: &str, delta_views: i64, created_at: &str) -> Value {
    json!({
        "id": id,
        "video_id": video_id,
        "views_count": 100,
        "likes_count": 10,
        "comments_count": 1,
        "reports_count": 0,
        "delta_views_count": delta_views,
        "delta_likes_count": 0,
        "delta_comments_count": 0,
        "delta_reports_count": 0,
        "created_at": created_at,
        "updated_at": created_at
    })
}

fn video(id: &str, creator: &str, snapshots: Vec<Value>) -> Value {
    json!({
        "id": id,
        "creator_id": creator,
        "video_created_at": "2025-11-20T08:00:00+00:00",
        "views_count": 1000,
        "likes_count": 50,
        "comments_count": 5,
        "reports_count": 0,
        "created_at": "2025-11-20T08:00:00+00:00",
        "updated_at": "2025-11-28T08:00:00+00:00",
        "snapshots": snapshots
    })
}

fn sample_document() -> String {
    json!({
        "videos": [
            video("v1", "c1", vec![
                snapshot("s1", "v1", 10, "2025-11-27T10:00:00+00:00"),
                snapshot("s2", "v1", 0, "2025-11-27T11:00:00+00:00"),
                snapshot("s3", "v1", 5, "2025-11-27T12:00:00+00:00"),
            ]),
            video("v2", "c2", vec![
                snapshot("s4", "v2", 7, "2025-11-28T10:00:00+00:00"),
                snapshot("s5", "v2", -2, "2025-11-28T11:00:00+00:00"),
            ]),
            video("v3", "c1", vec![]),
        ]
    })
    .to_string()
}

// =============================================================================
// 导入成功路径
// =============================================================================

#[cfg(test)]
mod load_tests {
    use super::*;

    #[tokio::test]
    async fn test_load_reports_counts_and_batches() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;

        let report = loader(&store, 2).load_str(&sample_document()).await.unwrap();

        assert_eq!(report.videos, 3);
        assert_eq!(report.snapshots, 5);
        assert_eq!(report.snapshot_batches, 3);

        let counts = store.counts().await.unwrap();
        assert_eq!(counts.videos, 3);
        assert_eq!(counts.snapshots, 5);
        assert_eq!(store.count_orphan_snapshots().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;
        let path = temp_dir.path().join("videos.json");
        std::fs::write(&path, sample_document()).unwrap();

        let report = loader(&store, 5000).load(&path).await.unwrap();
        assert_eq!(report.videos, 3);
        assert_eq!(report.snapshot_batches, 1);
    }

    #[tokio::test]
    async fn test_empty_video_list_loads_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;

        let report = loader(&store, 10).load_str(r#"{"videos": []}"#).await.unwrap();
        assert_eq!(report.videos, 0);
        assert_eq!(report.snapshots, 0);
        assert_eq!(report.snapshot_batches, 0);
    }

    #[tokio::test]
    async fn test_reset_then_reload() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;
        let loader = loader(&store, 100);

        loader.load_str(&sample_document()).await.unwrap();
        let removed = store.reset().await.unwrap();
        assert_eq!(removed.videos, 3);
        assert_eq!(removed.snapshots, 5);
        assert_eq!(store.count_videos().await.unwrap(), 0);

        // 清空后可重新导入同一文档
        loader.load_str(&sample_document()).await.unwrap();
        assert_eq!(store.count_snapshots().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;
        let result = Loader::new(store, LoaderConfig { batch_size: 0 });
        assert!(matches!(result, Err(VidstatError::Config(_))));
    }
}

// =============================================================================
// 失败时全部回滚
// =============================================================================

#[cfg(test)]
mod atomicity_tests {
    use super::*;

    #[tokio::test]
    async fn test_dangling_snapshot_rolls_back_everything() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;

        // 第三批才引用不存在的视频，前两批已写入事务
        let doc = json!({
            "videos": [
                video("v1", "c1", vec![
                    snapshot("s1", "v1", 1, "2025-11-27T10:00:00Z"),
                    snapshot("s2", "v1", 1, "2025-11-27T11:00:00Z"),
                    snapshot("s3", "v1", 1, "2025-11-27T12:00:00Z"),
                    snapshot("s4", "v1", 1, "2025-11-27T13:00:00Z"),
                    snapshot("s5", "missing", 1, "2025-11-27T14:00:00Z"),
                ]),
            ]
        })
        .to_string();

        let err = loader(&store, 2).load_str(&doc).await.unwrap_err();
        assert!(
            matches!(err, VidstatError::ReferentialIntegrity(_)),
            "unexpected error: {}",
            err
        );

        let counts = store.counts().await.unwrap();
        assert_eq!(counts.videos, 0);
        assert_eq!(counts.snapshots, 0);
    }

    #[tokio::test]
    async fn test_duplicate_reload_is_rejected_and_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;
        let loader = loader(&store, 2);

        loader.load_str(&sample_document()).await.unwrap();
        let err = loader.load_str(&sample_document()).await.unwrap_err();
        assert!(matches!(err, VidstatError::DuplicateKey(_)), "unexpected error: {}", err);

        let counts = store.counts().await.unwrap();
        assert_eq!(counts.videos, 3);
        assert_eq!(counts.snapshots, 5);
    }

    #[tokio::test]
    async fn test_duplicate_snapshot_id_within_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;

        let doc = json!({
            "videos": [
                video("v1", "c1", vec![snapshot("s1", "v1", 1, "2025-11-27T10:00:00Z")]),
                video("v2", "c1", vec![snapshot("s1", "v2", 1, "2025-11-27T10:00:00Z")]),
            ]
        })
        .to_string();

        let err = loader(&store, 1).load_str(&doc).await.unwrap_err();
        assert!(matches!(err, VidstatError::DuplicateKey(_)));
        assert_eq!(store.count_videos().await.unwrap(), 0);
    }
}

// =============================================================================
// 输入错误（写库之前拒绝）
// =============================================================================

#[cfg(test)]
mod input_error_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_field_reports_location() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;

        let mut bad = snapshot("s2", "v1", 1, "2025-11-27T10:00:00Z");
        bad.as_object_mut().unwrap().remove("delta_views_count");
        let doc = json!({
            "videos": [video("v1", "c1", vec![snapshot("s1", "v1", 1, "2025-11-27T09:00:00Z"), bad])]
        })
        .to_string();

        match loader(&store, 10).load_str(&doc).await {
            Err(VidstatError::MissingField { location, field }) => {
                assert_eq!(location, "videos[0].snapshots[1]");
                assert_eq!(field, "delta_views_count");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
        assert_eq!(store.count_snapshots().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;

        let err = loader(&store, 10).load_str("{\"videos\": [").await.unwrap_err();
        assert!(matches!(err, VidstatError::MalformedInput(_)));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir).await;

        let err = loader(&store, 10)
            .load(temp_dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, VidstatError::FileOperation(_)));
    }
}
