//! HTTP status -> error taxonomy mapping, exercised end to end against a
//! mock server. The status table must hold uniformly across provider
//! families, and an error-status response must never yield any deltas.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wonton::prelude::*;
use wonton::providers::anthropic::AnthropicClient;
use wonton::providers::gemini::GeminiClient;
use wonton::providers::ollama::OllamaClient;
use wonton::providers::openai::{OpenAiClient, OpenAiConfig};

fn anthropic_client(base_url: String) -> AnthropicClient {
    AnthropicClient::new(
        "test-key".to_string(),
        base_url,
        reqwest::Client::new(),
        CommonParams::with_model("claude-test"),
        HttpConfig::default(),
    )
}

async fn mock_status(server: &MockServer, endpoint: &str, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn status_429_maps_to_rate_limited_with_no_deltas() {
    let server = MockServer::start().await;
    mock_status(&server, "/v1/messages", 429, "").await;

    let client = anthropic_client(server.uri());

    // Non-streaming path
    let err = client
        .chat(vec![ChatMessage::user("hi").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::RateLimitError(_)), "got {err:?}");

    // Streaming path short-circuits before any frame is parsed
    let err = client
        .chat_stream(vec![ChatMessage::user("hi").build()], None)
        .await
        .err()
        .expect("stream creation must fail");
    assert!(matches!(err, LlmError::RateLimitError(_)), "got {err:?}");
}

#[tokio::test]
async fn status_401_maps_to_authentication_failed_across_families() {
    // Anthropic
    let server = MockServer::start().await;
    mock_status(&server, "/v1/messages", 401, r#"{"error":{"message":"bad key"}}"#).await;
    let err = anthropic_client(server.uri())
        .chat(vec![ChatMessage::user("hi").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::AuthenticationError(_)));

    // OpenAI
    let server = MockServer::start().await;
    mock_status(&server, "/chat/completions", 401, "").await;
    let openai = OpenAiClient::new(
        OpenAiConfig::new("bad-key")
            .with_base_url(server.uri())
            .with_model("gpt-test"),
        reqwest::Client::new(),
    );
    let err = openai
        .chat(vec![ChatMessage::user("hi").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::AuthenticationError(_)));

    // Gemini
    let server = MockServer::start().await;
    mock_status(&server, "/models/gemini-test:generateContent", 401, "").await;
    let gemini = GeminiClient::new(
        "bad-key".to_string(),
        server.uri(),
        reqwest::Client::new(),
        CommonParams::with_model("gemini-test"),
        HttpConfig::default(),
    );
    let err = gemini
        .chat(vec![ChatMessage::user("hi").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::AuthenticationError(_)));

    // Ollama
    let server = MockServer::start().await;
    mock_status(&server, "/api/chat", 401, "").await;
    let ollama = OllamaClient::new(
        server.uri(),
        reqwest::Client::new(),
        CommonParams::with_model("llama3"),
        HttpConfig::default(),
    );
    let err = ollama
        .chat(vec![ChatMessage::user("hi").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::AuthenticationError(_)));
}

#[tokio::test]
async fn status_404_maps_to_model_not_found() {
    let server = MockServer::start().await;
    mock_status(&server, "/v1/messages", 404, r#"{"error":{"message":"model missing"}}"#).await;
    let err = anthropic_client(server.uri())
        .chat(vec![ChatMessage::user("hi").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::ModelNotFound(_)));
}

#[tokio::test]
async fn status_400_with_billing_phrase_maps_to_quota() {
    let server = MockServer::start().await;
    mock_status(
        &server,
        "/v1/messages",
        400,
        r#"{"error":{"type":"invalid_request_error","message":"Your credit balance is too low"}}"#,
    )
    .await;
    let err = anthropic_client(server.uri())
        .chat(vec![ChatMessage::user("hi").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::QuotaExceededError(_)), "got {err:?}");
}

#[tokio::test]
async fn status_500_maps_to_overloaded() {
    let server = MockServer::start().await;
    mock_status(&server, "/v1/messages", 500, "oops").await;
    let err = anthropic_client(server.uri())
        .chat(vec![ChatMessage::user("hi").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::OverloadedError(_)));
}

#[tokio::test]
async fn malformed_2xx_body_maps_to_parse_error() {
    let server = MockServer::start().await;
    mock_status(&server, "/v1/messages", 200, "not json at all").await;
    let err = anthropic_client(server.uri())
        .chat(vec![ChatMessage::user("hi").build()])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::ParseError(_)));
}
