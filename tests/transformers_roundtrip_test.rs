//! Encode/decode round-trip tests
//!
//! For a plain text-only conversation, encoding the request and decoding
//! the vendor's own response shape must preserve text content exactly,
//! for every supported family.

use serde_json::json;
use wonton::prelude::*;
use wonton::transformers::{RequestTransformer, ResponseTransformer};

fn text_request(model: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system("You are terse.").build(),
            ChatMessage::user("Say exactly: grüß dich, wörld").build(),
        ],
        common_params: CommonParams::with_model(model),
        ..Default::default()
    }
}

const ECHO: &str = "grüß dich, wörld";

#[test]
fn anthropic_round_trip_preserves_text() {
    use wonton::providers::anthropic::{AnthropicRequestTransformer, AnthropicResponseTransformer};

    let body = AnthropicRequestTransformer
        .transform_chat(&text_request("claude-test"))
        .expect("encode");
    assert_eq!(body["messages"][0]["content"], "Say exactly: grüß dich, wörld");

    let response = AnthropicResponseTransformer
        .transform_chat_response(&json!({
            "id": "msg_1",
            "model": "claude-test",
            "content": [{ "type": "text", "text": ECHO }],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 10, "output_tokens": 5 }
        }))
        .expect("decode");
    assert_eq!(response.text(), ECHO);
}

#[test]
fn openai_round_trip_preserves_text() {
    use wonton::providers::openai::{OpenAiRequestTransformer, OpenAiResponseTransformer};

    let body = OpenAiRequestTransformer
        .transform_chat(&text_request("gpt-test"))
        .expect("encode");
    assert_eq!(body["messages"][1]["content"], "Say exactly: grüß dich, wörld");

    let response = OpenAiResponseTransformer
        .transform_chat_response(&json!({
            "id": "chatcmpl-1",
            "model": "gpt-test",
            "choices": [{
                "message": { "role": "assistant", "content": ECHO },
                "finish_reason": "stop"
            }]
        }))
        .expect("decode");
    assert_eq!(response.text(), ECHO);
}

#[test]
fn openai_responses_round_trip_preserves_text() {
    use wonton::providers::openai::{
        OpenAiResponsesRequestTransformer, OpenAiResponsesResponseTransformer,
    };

    let body = OpenAiResponsesRequestTransformer
        .transform_chat(&text_request("o3-mini"))
        .expect("encode");
    assert_eq!(
        body["input"][0]["content"][0]["text"],
        "Say exactly: grüß dich, wörld"
    );

    let response = OpenAiResponsesResponseTransformer
        .transform_chat_response(&json!({
            "id": "resp_1",
            "model": "o3-mini",
            "status": "completed",
            "output": [{
                "type": "message",
                "content": [{ "type": "output_text", "text": ECHO }]
            }]
        }))
        .expect("decode");
    assert_eq!(response.text(), ECHO);
}

#[test]
fn gemini_round_trip_preserves_text() {
    use wonton::providers::gemini::{GeminiRequestTransformer, GeminiResponseTransformer};

    let body = GeminiRequestTransformer
        .transform_chat(&text_request("gemini-test"))
        .expect("encode");
    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        "Say exactly: grüß dich, wörld"
    );

    let response = GeminiResponseTransformer
        .transform_chat_response(&json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": ECHO }] },
                "finishReason": "STOP"
            }]
        }))
        .expect("decode");
    assert_eq!(response.text(), ECHO);
}

#[test]
fn ollama_round_trip_preserves_text() {
    use wonton::providers::ollama::{OllamaRequestTransformer, OllamaResponseTransformer};

    let body = OllamaRequestTransformer
        .transform_chat(&text_request("llama3"))
        .expect("encode");
    assert_eq!(body["messages"][1]["content"], "Say exactly: grüß dich, wörld");

    let response = OllamaResponseTransformer
        .transform_chat_response(&json!({
            "model": "llama3",
            "message": { "role": "assistant", "content": ECHO },
            "done": true
        }))
        .expect("decode");
    assert_eq!(response.text(), ECHO);
}
