use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use serde_json::json;
use sonozen_session::{
    AuthEvent, IdentityClient, Session, SessionError, SessionProvider, User, SESSION_KEY,
};
use sonozen_storage::{LocalStorage, MemoryStorage};
use tokio::sync::mpsc;

fn token_body(access: &str, expires_in: i64) -> String {
    json!({
        "access_token": access,
        "token_type": "bearer",
        "expires_in": expires_in,
        "refresh_token": format!("refresh-{access}"),
        "user": { "id": "user-1", "email": "ana@example.com" }
    })
    .to_string()
}

fn stored(expires_at: i64) -> Session {
    Session {
        access_token: "old-access".to_string(),
        refresh_token: "old-refresh".to_string(),
        token_type: "bearer".to_string(),
        expires_at,
        user: User {
            id: "user-1".to_string(),
            email: Some("ana@example.com".to_string()),
        },
    }
}

async fn seed(storage: &MemoryStorage, session: &Session) {
    storage
        .set_item(SESSION_KEY, &serde_json::to_string(session).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sign_in_persists_session_and_notifies() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .match_header("apikey", "anon-key")
        .match_body(Matcher::Json(json!({ "email": "ana@example.com", "password": "pw" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_body("access-1", 3600))
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let client = IdentityClient::new(server.url(), "anon-key", storage.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _subscription = client.on_change(Box::new(move |event| {
        let _ = tx.send(event);
    }));

    let session = client
        .sign_in_with_password("ana@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(session.access_token, "access-1");
    assert_eq!(session.email(), Some("ana@example.com"));
    mock.assert_async().await;

    assert!(storage.get_item(SESSION_KEY).await.unwrap().is_some());
    assert_eq!(client.current_session().await, Some(session.clone()));

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, AuthEvent::SignedIn(session));
}

#[tokio::test]
async fn test_sign_in_rejected_credentials() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let client = IdentityClient::new(server.url(), "anon-key", storage.clone());

    let err = client
        .sign_in_with_password("ana@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Auth { status: 400, .. }));
    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(client.current_session().await.is_none());
}

#[tokio::test]
async fn test_sign_out_clears_local_session_even_if_remote_fails() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/logout")
        .match_header("authorization", "Bearer old-access")
        .with_status(500)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    seed(&storage, &stored(chrono::Utc::now().timestamp() + 3600)).await;
    let client = IdentityClient::new(server.url(), "anon-key", storage.clone());
    assert!(client.is_authenticated().await);

    client.sign_out().await.unwrap();
    mock.assert_async().await;

    assert!(storage.get_item(SESSION_KEY).await.unwrap().is_none());
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_expired_session_is_refreshed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
        .match_body(Matcher::Json(json!({ "refresh_token": "old-refresh" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_body("access-2", 3600))
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    seed(&storage, &stored(chrono::Utc::now().timestamp() - 10)).await;
    let client = IdentityClient::new(server.url(), "anon-key", storage.clone());

    let session = client.current_session().await.unwrap();
    assert_eq!(session.access_token, "access-2");
    mock.assert_async().await;

    let raw = storage.get_item(SESSION_KEY).await.unwrap().unwrap();
    assert!(raw.contains("access-2"));
}

#[tokio::test]
async fn test_failed_refresh_signs_out_locally() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"msg":"Invalid Refresh Token"}"#)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    seed(&storage, &stored(chrono::Utc::now().timestamp() - 10)).await;
    let client = IdentityClient::new(server.url(), "anon-key", storage.clone());

    assert!(client.current_session().await.is_none());
    assert!(storage.get_item(SESSION_KEY).await.unwrap().is_none());
}
