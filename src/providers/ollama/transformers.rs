//! Transformers for Ollama chat

use crate::error::LlmError;
use crate::transformers::{RequestTransformer, ResponseTransformer};
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, ContentPart, FinishReason, FunctionCall, MediaSource,
    MessageContent, MessageRole, ToolCall, Usage,
};

use super::types::OllamaChatResponse;

/// Convert one message to Ollama chat format. Ollama messages are flat
/// (`content` string plus an optional `images` array of base64 payloads);
/// tool results expand into `role: "tool"` messages.
fn convert_message(message: &ChatMessage) -> Result<Vec<serde_json::Value>, LlmError> {
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
            let mut text = String::new();
            let mut images = Vec::new();
            let mut tool_calls = Vec::new();
            let mut tool_results = Vec::new();

            for part in parts {
                match part {
                    ContentPart::Text { text: t } => text.push_str(t),
                    ContentPart::Image { source, .. } => {
                        use base64::Engine;
                        // Ollama wants bare base64 payloads
                        let data = match source {
                            MediaSource::Base64 { data } => data.clone(),
                            MediaSource::Binary { data } => {
                                base64::engine::general_purpose::STANDARD.encode(data)
                            }
                            MediaSource::Url { url } => {
                                return Err(LlmError::InvalidInput(format!(
                                    "Ollama requires inline image data; got remote URL {url}"
                                )));
                            }
                        };
                        images.push(data);
                    }
                    ContentPart::Audio {
                        transcript,
                        duration,
                    } => {
                        text.push_str(&crate::utils::audio_transcript_text(
                            transcript.as_deref(),
                            *duration,
                        )?);
                    }
                    ContentPart::ToolCall {
                        tool_name,
                        arguments,
                        ..
                    } => {
                        tool_calls.push(serde_json::json!({
                            "function": { "name": tool_name, "arguments": arguments }
                        }));
                    }
                    ContentPart::ToolResult { result, .. } => {
                        let content = match result {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        tool_results.push(serde_json::json!({
                            "role": "tool",
                            "content": content
                        }));
                    }
                }
            }

            let mut out = Vec::new();
            if !text.is_empty() || !images.is_empty() || !tool_calls.is_empty() {
                let mut msg = serde_json::json!({ "role": role, "content": text });
                if !images.is_empty() {
                    msg["images"] = serde_json::json!(images);
                }
                if !tool_calls.is_empty() {
                    msg["tool_calls"] = serde_json::Value::Array(tool_calls);
                }
                out.push(msg);
            }
            out.extend(tool_results);
            Ok(out)
        }
    }
}

/// Request transformer for Ollama
#[derive(Clone, Default)]
pub struct OllamaRequestTransformer;

impl RequestTransformer for OllamaRequestTransformer {
    fn provider_id(&self) -> &str {
        "ollama"
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
            "stream": req.stream,
        });

        // Sampling parameters live under `options`, with Ollama's names
        let mut options = serde_json::Map::new();
        if let Some(t) = req.common_params.temperature {
            options.insert("temperature".to_string(), serde_json::json!(t));
        }
        if let Some(tp) = req.common_params.top_p {
            options.insert("top_p".to_string(), serde_json::json!(tp));
        }
        if let Some(tk) = req.common_params.top_k {
            options.insert("top_k".to_string(), serde_json::json!(tk));
        }
        if let Some(max) = req.common_params.max_tokens {
            options.insert("num_predict".to_string(), serde_json::json!(max));
        }
        if let Some(stops) = &req.common_params.stop_sequences {
            options.insert("stop".to_string(), serde_json::json!(stops));
        }
        if let Some(seed) = req.common_params.seed {
            options.insert("seed".to_string(), serde_json::json!(seed));
        }
        if !options.is_empty() {
            body["options"] = serde_json::Value::Object(options);
        }

        if let Some(tools) = &req.tools
            && !tools.is_empty()
        {
            body["tools"] = serde_json::json!(tools);
        }

        Ok(body)
    }
}

/// Map the `done_reason` field; tool calls are handled by the caller
pub(crate) fn parse_done_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("length") => FinishReason::Length,
        None | Some("stop") => FinishReason::Stop,
        Some(other) => FinishReason::Other(other.to_string()),
    }
}

/// Build usage from the terminal line's eval counters
pub(crate) fn usage_from_counts(
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
) -> Option<Usage> {
    match (prompt_eval_count, eval_count) {
        (None, None) => None,
        (prompt, completion) => Some(Usage::new(
            prompt.unwrap_or(0),
            completion.unwrap_or(0),
        )),
    }
}

/// Response transformer for Ollama
#[derive(Clone, Default)]
pub struct OllamaResponseTransformer;

impl ResponseTransformer for OllamaResponseTransformer {
    fn provider_id(&self) -> &str {
        "ollama"
    }

    fn transform_chat_response(&self, raw: &serde_json::Value) -> Result<ChatResponse, LlmError> {
        let response: OllamaChatResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LlmError::ParseError(format!("Invalid Ollama response: {e}")))?;

        let message = response.message.as_ref();
        let mut tool_calls = Vec::new();
        if let Some(calls) = message.and_then(|m| m.tool_calls.as_ref()) {
            for (idx, call) in calls.iter().enumerate() {
                tool_calls.push(ToolCall {
                    // Ollama has no call ids; synthesize positional ones
                    id: format!("call_{idx}"),
                    r#type: "function".to_string(),
                    function: Some(FunctionCall {
                        name: call.function.name.clone(),
                        arguments: call.function.arguments.to_string(),
                    }),
                });
            }
        }

        let finish_reason = if !tool_calls.is_empty() {
            Some(FinishReason::ToolCalls)
        } else if response.done == Some(true) {
            Some(parse_done_reason(response.done_reason.as_deref()))
        } else {
            None
        };

        Ok(ChatResponse {
            id: None,
            model: response.model,
            content: MessageContent::Text(
                message.and_then(|m| m.content.clone()).unwrap_or_default(),
            ),
            usage: usage_from_counts(response.prompt_eval_count, response.eval_count),
            finish_reason,
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            thinking: message.and_then(|m| m.thinking.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommonParams;
    use serde_json::json;

    #[test]
    fn max_tokens_maps_to_num_predict() {
        let tx = OllamaRequestTransformer;
        let req = ChatRequest {
            messages: vec![ChatMessage::user("hi").build()],
            common_params: CommonParams {
                max_tokens: Some(64),
                top_k: Some(40),
                ..CommonParams::with_model("llama3")
            },
            ..Default::default()
        };
        let body = tx.transform_chat(&req).expect("transform");
        assert_eq!(body["options"]["num_predict"], 64);
        assert_eq!(body["options"]["top_k"], 40);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn images_become_bare_base64_payloads() {
        let tx = OllamaRequestTransformer;
        let req = ChatRequest {
            messages: vec![
                ChatMessage::user("look")
                    .with_image_base64("AAECAw==", Some("image/png".to_string()))
                    .build(),
            ],
            common_params: CommonParams::with_model("llava"),
            ..Default::default()
        };
        let body = tx.transform_chat(&req).expect("transform");
        assert_eq!(body["messages"][0]["images"][0], "AAECAw==");
    }

    #[test]
    fn decode_final_response_with_counts() {
        let tx = OllamaResponseTransformer;
        let raw = json!({
            "model": "llama3",
            "message": { "role": "assistant", "content": "hi" },
            "done": true,
            "prompt_eval_count": 10,
            "eval_count": 20
        });
        let response = tx.transform_chat_response(&raw).expect("decode");
        assert_eq!(response.text(), "hi");
        assert_eq!(response.usage.as_ref().unwrap().total_tokens, 30);
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    }

    #[test]
    fn decode_tool_calls_with_synthesized_ids() {
        let tx = OllamaResponseTransformer;
        let raw = json!({
            "model": "llama3",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    { "function": { "name": "lookup", "arguments": { "q": "x" } } }
                ]
            },
            "done": true
        });
        let response = tx.transform_chat_response(&raw).expect("decode");
        let calls = response.tool_calls.as_ref().expect("calls");
        assert_eq!(calls[0].id, "call_0");
        assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
    }
}
