use std::sync::Arc;

use mockito::Matcher;
use serde_json::json;
use sonozen_cli::pages::{SubmitOutcome, SubmitPage};
use sonozen_cli::{AnalysisBackend, AnalysisClient, ClientError, Route};
use sonozen_core::{ANALYZE_PATH, GENERIC_FAILURE_MESSAGE};
use sonozen_storage::{AnalysisHistory, FileStorage};
use tempfile::TempDir;

fn success_body() -> serde_json::Value {
    json!({
        "success": true,
        "analysis": {
            "id": "a1",
            "date": "2025-01-02T08:00:00.000Z",
            "userMessage": "I wake up at 3am",
            "analysis": {
                "mainIssues": ["early waking"],
                "recommendations": ["keep a fixed wake time", "avoid screens"],
                "sleepScore": 61,
                "summary": "Fragmented sleep."
            }
        }
    })
}

#[tokio::test]
async fn test_analyze_posts_message_and_returns_record() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", ANALYZE_PATH)
        .match_body(Matcher::Json(json!({ "message": "I wake up at 3am" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body().to_string())
        .create_async()
        .await;

    let client = AnalysisClient::new(format!("{}/", server.url()));
    let record = client.analyze("I wake up at 3am").await.unwrap();

    mock.assert_async().await;
    assert_eq!(record.id, "a1");
    assert_eq!(record.analysis.sleep_score, 61);
    assert_eq!(record.analysis.recommendations.len(), 2);
}

#[tokio::test]
async fn test_error_envelope_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", ANALYZE_PATH)
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(json!({ "success": false, "error": "Incorrect API key provided" }).to_string())
        .create_async()
        .await;

    let client = AnalysisClient::new(server.url());
    let err = client.analyze("hello").await.unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref m) if m == "Incorrect API key provided"));
}

#[tokio::test]
async fn test_non_json_failure_uses_generic_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", ANALYZE_PATH)
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let client = AnalysisClient::new(server.url());
    let err = client.analyze("hello").await.unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref m) if m == GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = AnalysisClient::new("http://127.0.0.1:1");
    let err = client.analyze("hello").await.unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.to_string().starts_with("Could not reach the SonoZen server"));
}

#[tokio::test]
async fn test_submit_persists_record_on_disk() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", ANALYZE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body().to_string())
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path().to_path_buf());
    storage.init().await.unwrap();
    let history = AnalysisHistory::new(Arc::new(storage));

    let client = AnalysisClient::new(server.url());
    let page = SubmitPage::new("  I wake up at 3am  ");
    let outcome = page.submit(&client, &history).await;

    assert_eq!(outcome, SubmitOutcome::Navigate(Route::Dashboard));
    assert!(dir.path().join("sleepAnalyses.json").exists());

    // 重新打开同一目录读取
    let reopened = AnalysisHistory::new(Arc::new(FileStorage::new(dir.path().to_path_buf())));
    let records = reopened.load().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_message, "I wake up at 3am");
}

#[tokio::test]
async fn test_failed_submit_keeps_input_and_history() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", ANALYZE_PATH)
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(json!({ "success": false, "error": "Failed to call the OpenAI API" }).to_string())
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let history = AnalysisHistory::new(Arc::new(FileStorage::new(dir.path().to_path_buf())));

    let client = AnalysisClient::new(server.url());
    let page = SubmitPage::new("I snore");
    let outcome = page.submit(&client, &history).await;

    assert_eq!(outcome, SubmitOutcome::Stay);
    assert_eq!(page.error().as_deref(), Some("Failed to call the OpenAI API"));
    assert_eq!(page.input(), "I snore");
    assert!(history.load().await.is_empty());
}
