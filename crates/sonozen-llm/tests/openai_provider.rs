use mockito::Matcher;
use serde_json::json;
use sonozen_llm::{
    ChatRequest, LLMError, LLMProvider, Message, OpenAiProvider, ProviderConfig,
};

fn provider_for(server: &mockito::ServerGuard, api_key: &str) -> OpenAiProvider {
    let config = ProviderConfig::new("openai", server.url()).with_api_key(api_key);
    OpenAiProvider::with_config(config).unwrap()
}

fn sample_request() -> ChatRequest {
    ChatRequest::new("")
        .with_message(Message::system("system prompt"))
        .with_message(Message::user("I can't sleep"))
        .temperature(0.7)
        .json_object()
}

#[tokio::test]
async fn test_chat_sends_openai_body_and_parses_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o",
            "temperature": 0.7,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": "system prompt" },
                { "role": "user", "content": "I can't sleep" }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-42",
                "model": "gpt-4o",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "{\"summary\":\"ok\"}" },
                    "finish_reason": "stop"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let provider = provider_for(&server, "sk-test");
    let response = provider.chat(sample_request()).await.unwrap();

    assert_eq!(response.content.as_deref(), Some("{\"summary\":\"ok\"}"));
    assert_eq!(provider.provider_id(), "openai");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_surfaces_provider_error_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#)
        .create_async()
        .await;

    let provider = provider_for(&server, "sk-wrong");
    let err = provider.chat(sample_request()).await.unwrap_err();

    match &err {
        LLMError::Api { status, .. } => assert_eq!(*status, 401),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.upstream_message(), Some("Incorrect API key provided"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_error_without_json_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let provider = provider_for(&server, "sk-test");
    let err = provider.chat(sample_request()).await.unwrap_err();

    assert!(matches!(err, LLMError::Api { status: 502, message: None }));
    assert_eq!(err.upstream_message(), None);
}

#[tokio::test]
async fn test_chat_network_failure() {
    let config = ProviderConfig::new("openai", "http://127.0.0.1:1").with_api_key("sk-test");
    let provider = OpenAiProvider::with_config(config).unwrap();

    let err = provider.chat(sample_request()).await.unwrap_err();
    assert!(matches!(err, LLMError::Network(_)));
}

#[tokio::test]
async fn test_chat_reply_without_choices() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"x","choices":[]}"#)
        .create_async()
        .await;

    let provider = provider_for(&server, "sk-test");
    let err = provider.chat(sample_request()).await.unwrap_err();
    assert!(matches!(err, LLMError::Transform(_)));
}
