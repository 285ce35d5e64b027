//! Transformers for the OpenAI chat completions API

use crate::error::LlmError;
use crate::transformers::{RequestTransformer, ResponseTransformer};
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, ContentPart, FinishReason, FunctionCall, MediaSource,
    MessageContent, MessageRole, ToolCall, ToolChoice, Usage,
};
use serde::Deserialize;

/// Map the unified ToolChoice onto OpenAI's encoding
pub(crate) fn convert_tool_choice(choice: &ToolChoice) -> serde_json::Value {
    match choice {
        ToolChoice::Auto => serde_json::json!("auto"),
        ToolChoice::Required => serde_json::json!("required"),
        ToolChoice::None => serde_json::json!("none"),
        ToolChoice::Tool { name } => serde_json::json!({
            "type": "function",
            "function": { "name": name }
        }),
    }
}

/// Render an image part as OpenAI's `image_url` content part.
///
/// OpenAI accepts both remote URLs and inline data URLs, so no source is
/// rejected here.
fn convert_image_part(
    source: &MediaSource,
    media_type: Option<&str>,
    detail: Option<crate::types::ImageDetail>,
) -> serde_json::Value {
    use base64::Engine;
    let url = match source {
        MediaSource::Url { url } => url.clone(),
        MediaSource::Base64 { data } => {
            let media_type = media_type.unwrap_or("image/jpeg");
            format!("data:{media_type};base64,{data}")
        }
        MediaSource::Binary { data } => {
            let media_type = media_type.unwrap_or("image/jpeg");
            let encoded = base64::engine::general_purpose::STANDARD.encode(data);
            format!("data:{media_type};base64,{encoded}")
        }
    };
    let mut part = serde_json::json!({
        "type": "image_url",
        "image_url": { "url": url }
    });
    if let Some(detail) = detail {
        let detail = match detail {
            crate::types::ImageDetail::Auto => "auto",
            crate::types::ImageDetail::Low => "low",
            crate::types::ImageDetail::High => "high",
        };
        part["image_url"]["detail"] = serde_json::json!(detail);
    }
    part
}

/// Convert one message into OpenAI chat format. Tool-result parts expand
/// into separate `role: "tool"` messages; assistant tool calls move into
/// the `tool_calls` array.
pub(crate) fn convert_message(message: &ChatMessage) -> Result<Vec<serde_json::Value>, LlmError> {
    let role = match message.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::Tool => "tool",
    };

    match &message.content {
        MessageContent::Text(text) => Ok(vec![serde_json::json!({
            "role": role,
            "content": text
        })]),
        MessageContent::MultiModal(parts) => {
            let mut content_parts = Vec::new();
            let mut tool_calls = Vec::new();
            let mut tool_results = Vec::new();

            for part in parts {
                match part {
                    ContentPart::Text { text } => {
                        content_parts.push(serde_json::json!({
                            "type": "text",
                            "text": text
                        }));
                    }
                    ContentPart::Image {
                        source,
                        media_type,
                        detail,
                    } => {
                        content_parts.push(convert_image_part(
                            source,
                            media_type.as_deref(),
                            *detail,
                        ));
                    }
                    ContentPart::Audio {
                        transcript,
                        duration,
                    } => {
                        let text =
                            crate::utils::audio_transcript_text(transcript.as_deref(), *duration)?;
                        content_parts.push(serde_json::json!({
                            "type": "text",
                            "text": text
                        }));
                    }
                    ContentPart::ToolCall {
                        tool_call_id,
                        tool_name,
                        arguments,
                    } => {
                        tool_calls.push(serde_json::json!({
                            "id": tool_call_id,
                            "type": "function",
                            "function": {
                                "name": tool_name,
                                "arguments": arguments.to_string()
                            }
                        }));
                    }
                    ContentPart::ToolResult {
                        tool_call_id,
                        result,
                        ..
                    } => {
                        let content = match result {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        tool_results.push(serde_json::json!({
                            "role": "tool",
                            "tool_call_id": tool_call_id,
                            "content": content
                        }));
                    }
                }
            }

            let mut out = Vec::new();
            if !content_parts.is_empty() || !tool_calls.is_empty() {
                let mut msg = serde_json::json!({ "role": role });
                if !content_parts.is_empty() {
                    msg["content"] = serde_json::Value::Array(content_parts);
                }
                if !tool_calls.is_empty() {
                    msg["tool_calls"] = serde_json::Value::Array(tool_calls);
                    if msg.get("content").is_none() {
                        msg["content"] = serde_json::Value::Null;
                    }
                }
                out.push(msg);
            }
            out.extend(tool_results);
            Ok(out)
        }
    }
}

/// Request transformer for OpenAI chat completions
#[derive(Clone, Default)]
pub struct OpenAiRequestTransformer;

impl RequestTransformer for OpenAiRequestTransformer {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn transform_chat(&self, req: &ChatRequest) -> Result<serde_json::Value, LlmError> {
        req.common_params.validate()?;

        let mut messages = Vec::new();
        for message in &req.messages {
            messages.extend(convert_message(message)?);
        }

        let mut body = serde_json::json!({
            "model": req.common_params.model,
            "messages": messages,
        });
        if let Some(t) = req.common_params.temperature {
            body["temperature"] = serde_json::json!(t);
        }
        if let Some(max) = req.common_params.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        if let Some(tp) = req.common_params.top_p {
            body["top_p"] = serde_json::json!(tp);
        }
        // top_k has no OpenAI equivalent and is skipped
        if let Some(stops) = &req.common_params.stop_sequences {
            body["stop"] = serde_json::json!(stops);
        }
        if let Some(seed) = req.common_params.seed {
            body["seed"] = serde_json::json!(seed);
        }
        if let Some(tools) = &req.tools
            && !tools.is_empty()
        {
            body["tools"] = serde_json::json!(tools);
            if let Some(choice) = &req.tool_choice {
                body["tool_choice"] = convert_tool_choice(choice);
            }
        }
        if req.stream {
            body["stream"] = serde_json::json!(true);
            // Without this the vendor never reports usage mid-stream
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiResponseToolCall>>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseToolCall {
    id: String,
    #[serde(default)]
    function: Option<OpenAiResponseFunction>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OpenAiUsage {
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl OpenAiUsage {
    pub(crate) fn into_usage(self) -> Usage {
        let prompt = self.prompt_tokens.unwrap_or(0);
        let completion = self.completion_tokens.unwrap_or(0);
        Usage::with_total(
            prompt,
            completion,
            self.total_tokens.unwrap_or(prompt + completion),
        )
    }
}

/// Map the OpenAI finish reason string
pub(crate) fn parse_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    match reason {
        Some("stop") => Some(FinishReason::Stop),
        Some("length") => Some(FinishReason::Length),
        Some("tool_calls") => Some(FinishReason::ToolCalls),
        Some("content_filter") => Some(FinishReason::ContentFilter),
        Some(other) => Some(FinishReason::Other(other.to_string())),
        None => None,
    }
}

/// Response transformer for OpenAI chat completions
#[derive(Clone, Default)]
pub struct OpenAiResponseTransformer;

impl ResponseTransformer for OpenAiResponseTransformer {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn transform_chat_response(&self, raw: &serde_json::Value) -> Result<ChatResponse, LlmError> {
        let response: OpenAiChatResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LlmError::ParseError(format!("Invalid OpenAI response: {e}")))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ParseError("OpenAI response has no choices".to_string()))?;

        let tool_calls: Option<Vec<ToolCall>> = choice.message.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(|tc| ToolCall {
                    id: tc.id,
                    r#type: "function".to_string(),
                    function: tc.function.map(|f| FunctionCall {
                        name: f.name,
                        arguments: f.arguments,
                    }),
                })
                .collect()
        });

        Ok(ChatResponse {
            id: response.id,
            model: response.model,
            content: MessageContent::Text(choice.message.content.unwrap_or_default()),
            usage: response.usage.map(OpenAiUsage::into_usage),
            finish_reason: parse_finish_reason(choice.finish_reason.as_deref()),
            tool_calls,
            thinking: choice.message.reasoning_content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommonParams, Tool};
    use serde_json::json;

    #[test]
    fn system_message_stays_inline() {
        let tx = OpenAiRequestTransformer;
        let req = ChatRequest {
            messages: vec![
                ChatMessage::system("Be brief.").build(),
                ChatMessage::user("hi").build(),
            ],
            common_params: CommonParams::with_model("gpt-test"),
            ..Default::default()
        };
        let body = tx.transform_chat(&req).expect("transform");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
    }

    #[test]
    fn streaming_requests_opt_into_usage_reporting() {
        let tx = OpenAiRequestTransformer;
        let req = ChatRequest {
            messages: vec![ChatMessage::user("hi").build()],
            common_params: CommonParams::with_model("gpt-test"),
            stream: true,
            ..Default::default()
        };
        let body = tx.transform_chat(&req).expect("transform");
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"]["include_usage"], true);
    }

    #[test]
    fn tool_result_becomes_tool_role_message() {
        let tx = OpenAiRequestTransformer;
        let req = ChatRequest {
            messages: vec![ChatMessage::tool_result("call_1", json!({"ok": true})).build()],
            common_params: CommonParams::with_model("gpt-test"),
            ..Default::default()
        };
        let body = tx.transform_chat(&req).expect("transform");
        let msg = &body["messages"][0];
        assert_eq!(msg["role"], "tool");
        assert_eq!(msg["tool_call_id"], "call_1");
    }

    #[test]
    fn image_url_is_allowed_for_openai() {
        let tx = OpenAiRequestTransformer;
        let req = ChatRequest {
            messages: vec![
                ChatMessage::user("look")
                    .with_image_url("https://example.com/cat.png", None)
                    .build(),
            ],
            common_params: CommonParams::with_model("gpt-test"),
            ..Default::default()
        };
        let body = tx.transform_chat(&req).expect("transform");
        let parts = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "https://example.com/cat.png");
    }

    #[test]
    fn tools_serialize_with_nested_schema() {
        let tx = OpenAiRequestTransformer;
        let req = ChatRequest {
            messages: vec![ChatMessage::user("hi").build()],
            tools: Some(vec![Tool::function(
                "lookup",
                "desc",
                json!({
                    "type": "object",
                    "properties": {
                        "filters": {
                            "type": "object",
                            "properties": { "lang": { "type": "string" } }
                        }
                    }
                }),
            )]),
            tool_choice: Some(ToolChoice::Required),
            common_params: CommonParams::with_model("gpt-test"),
            ..Default::default()
        };
        let body = tx.transform_chat(&req).expect("transform");
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["properties"]["filters"]["properties"]
                ["lang"]["type"],
            "string"
        );
        assert_eq!(body["tool_choice"], "required");
    }

    #[test]
    fn decode_text_response() {
        let tx = OpenAiResponseTransformer;
        let raw = json!({
            "id": "chatcmpl-1",
            "model": "gpt-test",
            "choices": [{
                "message": { "role": "assistant", "content": "4" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 8, "completion_tokens": 1, "total_tokens": 9 }
        });
        let response = tx.transform_chat_response(&raw).expect("decode");
        assert_eq!(response.text(), "4");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 9);
    }

    #[test]
    fn decode_tool_call_response() {
        let tx = OpenAiResponseTransformer;
        let raw = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "lookup", "arguments": "{\"q\":\"x\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response = tx.transform_chat_response(&raw).expect("decode");
        assert!(response.has_tool_calls());
        assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
    }
}
