use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sonozen_core::{SleepAnalysis, SleepAnalysisRecord};
use sonozen_storage::{
    AnalysisHistory, FileStorage, LocalStorage, MemoryStorage, StorageError, StorageResult,
    HISTORY_KEY,
};
use tempfile::TempDir;

fn record(n: u32, score: i64) -> SleepAnalysisRecord {
    SleepAnalysisRecord::with_id(
        format!("id-{n}"),
        Utc.with_ymd_and_hms(2025, 1, n, 8, 0, 0).unwrap(),
        format!("night {n}"),
        SleepAnalysis {
            main_issues: vec!["late caffeine".to_string()],
            recommendations: vec!["no coffee after 2pm".to_string(), "dim lights".to_string()],
            sleep_score: score,
            summary: format!("summary {n}"),
        },
    )
}

#[tokio::test]
async fn test_load_empty_when_absent() {
    let history = AnalysisHistory::new(Arc::new(MemoryStorage::new()));
    assert!(history.load().await.is_empty());
}

#[tokio::test]
async fn test_append_then_load_is_newest_first_and_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(FileStorage::new(temp_dir.path().to_path_buf()));
    let history = AnalysisHistory::new(storage);

    let appended: Vec<_> = (1..=4).map(|n| record(n, 50 + n as i64)).collect();
    for r in &appended {
        history.append(r.clone()).await.unwrap();
    }

    let loaded = history.load().await;
    assert_eq!(loaded.len(), 4);
    let expected: Vec<_> = appended.into_iter().rev().collect();
    assert_eq!(loaded, expected);
}

#[tokio::test]
async fn test_history_survives_new_handle() {
    let temp_dir = TempDir::new().unwrap();
    let first = AnalysisHistory::new(Arc::new(FileStorage::new(temp_dir.path().to_path_buf())));
    first.append(record(1, 70)).await.unwrap();

    let second = AnalysisHistory::new(Arc::new(FileStorage::new(temp_dir.path().to_path_buf())));
    assert_eq!(second.load().await, vec![record(1, 70)]);
}

#[tokio::test]
async fn test_stored_layout_is_camel_case_array() {
    let storage = Arc::new(MemoryStorage::new());
    let history = AnalysisHistory::new(storage.clone());
    history.append(record(2, 61)).await.unwrap();

    let raw = storage.get_item(HISTORY_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value.as_array().unwrap()[0];
    assert_eq!(first["id"], "id-2");
    assert_eq!(first["date"], "2025-01-02T08:00:00.000Z");
    assert_eq!(first["userMessage"], "night 2");
    assert_eq!(first["analysis"]["sleepScore"], 61);
}

#[tokio::test]
async fn test_corrupt_history_fails_closed_and_is_replaced() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(HISTORY_KEY, "{not json").await.unwrap();

    let history = AnalysisHistory::new(storage.clone());
    assert!(history.load().await.is_empty());

    history.append(record(3, 40)).await.unwrap();
    assert_eq!(history.load().await, vec![record(3, 40)]);
}

#[tokio::test]
async fn test_wrong_shape_fails_closed() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set_item(HISTORY_KEY, r#"[{"id": 1, "unexpected": true}]"#)
        .await
        .unwrap();

    let history = AnalysisHistory::new(storage);
    assert!(history.load().await.is_empty());
}

struct BrokenStorage;

#[async_trait]
impl LocalStorage for BrokenStorage {
    async fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Io(std::io::Error::other("read failed")))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }

    async fn remove_item(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_read_errors_fail_closed_but_write_errors_propagate() {
    let history = AnalysisHistory::new(Arc::new(BrokenStorage));
    assert!(history.load().await.is_empty());
    assert!(matches!(
        history.append(record(1, 10)).await,
        Err(StorageError::Io(_))
    ));
}
