//! Gemini request/response conversion

use crate::error::LlmError;
use crate::transformers::{RequestTransformer, ResponseTransformer};
use crate::types::{
    ChatRequest, ChatResponse, ContentPart, FinishReason, FunctionCall, MediaSource,
    MessageContent, MessageRole, ToolCall, ToolChoice,
};
use base64::Engine;
use std::collections::HashMap;

use super::types::GeminiResponse;

/// Map the Gemini finish reason string
pub(crate) fn parse_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    match reason {
        Some("STOP") => Some(FinishReason::Stop),
        Some("MAX_TOKENS") => Some(FinishReason::Length),
        Some("SAFETY") | Some("RECITATION") | Some("PROHIBITED_CONTENT") => {
            Some(FinishReason::ContentFilter)
        }
        Some(other) => Some(FinishReason::Other(other.to_string())),
        None => None,
    }
}

/// Gemini keys function responses by function name, while the unified
/// model keys tool results by call id. Recover the name from the prior
/// assistant tool-call parts in the same conversation.
fn tool_names_by_call_id(req: &ChatRequest) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for message in &req.messages {
        if message.role != MessageRole::Assistant {
            continue;
        }
        if let MessageContent::MultiModal(parts) = &message.content {
            for part in parts {
                if let ContentPart::ToolCall {
                    tool_call_id,
                    tool_name,
                    ..
                } = part
                {
                    names.insert(tool_call_id.clone(), tool_name.clone());
                }
            }
        }
    }
    names
}

fn convert_parts(
    content: &MessageContent,
    tool_names: &HashMap<String, String>,
) -> Result<Vec<serde_json::Value>, LlmError> {
    let mut parts = Vec::new();
    match content {
        MessageContent::Text(text) => {
            if !text.is_empty() {
                parts.push(serde_json::json!({ "text": text }));
            }
        }
        MessageContent::MultiModal(multi) => {
            for part in multi {
                match part {
                    ContentPart::Text { text } => {
                        parts.push(serde_json::json!({ "text": text }));
                    }
                    ContentPart::Image {
                        source, media_type, ..
                    } => {
                        // Gemini wants inline base64 data
                        let mime_type = media_type.as_deref().unwrap_or("image/jpeg");
                        let data = match source {
                            MediaSource::Base64 { data } => data.clone(),
                            MediaSource::Binary { data } => {
                                base64::engine::general_purpose::STANDARD.encode(data)
                            }
                            MediaSource::Url { url } => {
                                return Err(LlmError::InvalidInput(format!(
                                    "Gemini requires inline image data; got remote URL {url}"
                                )));
                            }
                        };
                        parts.push(serde_json::json!({
                            "inlineData": { "mimeType": mime_type, "data": data }
                        }));
                    }
                    ContentPart::Audio {
                        transcript,
                        duration,
                    } => {
                        let text =
                            crate::utils::audio_transcript_text(transcript.as_deref(), *duration)?;
                        parts.push(serde_json::json!({ "text": text }));
                    }
                    ContentPart::ToolCall {
                        tool_name,
                        arguments,
                        ..
                    } => {
                        parts.push(serde_json::json!({
                            "functionCall": { "name": tool_name, "args": arguments }
                        }));
                    }
                    ContentPart::ToolResult {
                        tool_call_id,
                        result,
                        ..
                    } => {
                        let name = tool_names
                            .get(tool_call_id)
                            .cloned()
                            .unwrap_or_else(|| tool_call_id.clone());
                        parts.push(serde_json::json!({
                            "functionResponse": {
                                "name": name,
                                "response": { "name": name, "content": result }
                            }
                        }));
                    }
                }
            }
        }
    }
    Ok(parts)
}

/// Translate ToolChoice into Gemini's `functionCallingConfig`
fn convert_tool_choice(choice: &ToolChoice) -> serde_json::Value {
    match choice {
        ToolChoice::Auto => serde_json::json!({
            "functionCallingConfig": { "mode": "AUTO" }
        }),
        ToolChoice::Required => serde_json::json!({
            "functionCallingConfig": { "mode": "ANY" }
        }),
        ToolChoice::None => serde_json::json!({
            "functionCallingConfig": { "mode": "NONE" }
        }),
        ToolChoice::Tool { name } => serde_json::json!({
            "functionCallingConfig": { "mode": "ANY", "allowedFunctionNames": [name] }
        }),
    }
}

/// Request transformer for Gemini generateContent
#[derive(Clone, Default)]
pub struct GeminiRequestTransformer;

impl RequestTransformer for GeminiRequestTransformer {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn transform_chat(&self, req: &ChatRequest) -> Result<serde_json::Value, LlmError> {
        req.common_params.validate()?;
        let tool_names = tool_names_by_call_id(req);

        let mut system_parts: Vec<String> = Vec::new();
        let mut contents = Vec::new();

        for message in &req.messages {
            match message.role {
                // System instructions live in a dedicated top-level field
                MessageRole::System => system_parts.push(message.content.all_text()),
                MessageRole::User | MessageRole::Tool => {
                    contents.push(serde_json::json!({
                        "role": "user",
                        "parts": convert_parts(&message.content, &tool_names)?
                    }));
                }
                MessageRole::Assistant => {
                    contents.push(serde_json::json!({
                        "role": "model",
                        "parts": convert_parts(&message.content, &tool_names)?
                    }));
                }
            }
        }

        let mut body = serde_json::json!({ "contents": contents });

        if !system_parts.is_empty() {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system_parts.join("\n\n") }]
            });
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(t) = req.common_params.temperature {
            generation_config.insert("temperature".to_string(), serde_json::json!(t));
        }
        if let Some(tp) = req.common_params.top_p {
            generation_config.insert("topP".to_string(), serde_json::json!(tp));
        }
        if let Some(tk) = req.common_params.top_k {
            generation_config.insert("topK".to_string(), serde_json::json!(tk));
        }
        if let Some(max) = req.common_params.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), serde_json::json!(max));
        }
        if let Some(stops) = &req.common_params.stop_sequences {
            generation_config.insert("stopSequences".to_string(), serde_json::json!(stops));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        if let Some(tools) = &req.tools
            && !tools.is_empty()
        {
            let declarations: Vec<_> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.function.name,
                        "description": t.function.description,
                        "parameters": t.function.parameters
                    })
                })
                .collect();
            body["tools"] = serde_json::json!([{ "functionDeclarations": declarations }]);
            if let Some(choice) = &req.tool_choice {
                body["toolConfig"] = convert_tool_choice(choice);
            }
        }

        Ok(body)
    }
}

/// Response transformer for Gemini generateContent
#[derive(Clone, Default)]
pub struct GeminiResponseTransformer;

impl ResponseTransformer for GeminiResponseTransformer {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn transform_chat_response(&self, raw: &serde_json::Value) -> Result<ChatResponse, LlmError> {
        let response: GeminiResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LlmError::ParseError(format!("Invalid Gemini response: {e}")))?;

        let mut text = String::new();
        let mut thinking = String::new();
        let mut tool_calls = Vec::new();
        let mut finish_reason = None;

        if let Some(candidate) = response.candidates.as_ref().and_then(|c| c.first()) {
            if let Some(parts) = candidate.content.as_ref().and_then(|c| c.parts.as_ref()) {
                for part in parts {
                    if let Some(t) = &part.text {
                        if part.thought == Some(true) {
                            thinking.push_str(t);
                        } else {
                            text.push_str(t);
                        }
                    }
                    if let Some(fc) = &part.function_call {
                        // Gemini has no call ids; synthesize positional ones
                        let id = format!("call_{}", tool_calls.len());
                        let args = fc.args.clone().unwrap_or(serde_json::json!({}));
                        tool_calls.push(ToolCall {
                            id,
                            r#type: "function".to_string(),
                            function: Some(FunctionCall {
                                name: fc.name.clone(),
                                arguments: args.to_string(),
                            }),
                        });
                    }
                }
            }
            finish_reason = parse_finish_reason(candidate.finish_reason.as_deref());
        }

        if !tool_calls.is_empty() {
            finish_reason = Some(FinishReason::ToolCalls);
        }

        Ok(ChatResponse {
            id: response.response_id,
            model: response.model_version,
            content: MessageContent::Text(text),
            usage: response
                .usage_metadata
                .map(super::types::GeminiUsageMetadata::into_usage),
            finish_reason,
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            thinking: if thinking.is_empty() {
                None
            } else {
                Some(thinking)
            },
        })
    }
}
