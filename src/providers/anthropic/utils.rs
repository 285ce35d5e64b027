//! Anthropic utility functions
//!
//! Message/tool conversion between the unified types and the Anthropic
//! messages API, per <https://docs.anthropic.com/en/api/messages>.

use super::types::{AnthropicContentBlock, AnthropicUsage};
use crate::error::LlmError;
use crate::types::{
    ChatMessage, ContentPart, FinishReason, FunctionCall, MediaSource, MessageContent,
    MessageRole, ToolCall, ToolChoice, Usage,
};
use base64::Engine;

/// Convert message content to Anthropic content blocks
pub fn convert_message_content(content: &MessageContent) -> Result<serde_json::Value, LlmError> {
    match content {
        MessageContent::Text(text) => Ok(serde_json::Value::String(text.clone())),
        MessageContent::MultiModal(parts) => {
            let mut blocks = Vec::new();
            for part in parts {
                match part {
                    ContentPart::Text { text } => {
                        blocks.push(serde_json::json!({
                            "type": "text",
                            "text": text
                        }));
                    }
                    ContentPart::Image {
                        source, media_type, ..
                    } => {
                        // Anthropic requires inline base64 image data
                        let media_type = media_type.as_deref().unwrap_or("image/jpeg");
                        let data = match source {
                            MediaSource::Base64 { data } => data.clone(),
                            MediaSource::Binary { data } => {
                                base64::engine::general_purpose::STANDARD.encode(data)
                            }
                            MediaSource::Url { url } => {
                                return Err(LlmError::InvalidInput(format!(
                                    "Anthropic requires inline image data; got remote URL {url}"
                                )));
                            }
                        };
                        blocks.push(serde_json::json!({
                            "type": "image",
                            "source": {
                                "type": "base64",
                                "media_type": media_type,
                                "data": data
                            }
                        }));
                    }
                    ContentPart::Audio {
                        transcript,
                        duration,
                    } => {
                        blocks.push(audio_transcript_block(transcript.as_deref(), *duration)?);
                    }
                    ContentPart::ToolCall {
                        tool_call_id,
                        tool_name,
                        arguments,
                    } => {
                        blocks.push(serde_json::json!({
                            "type": "tool_use",
                            "id": tool_call_id,
                            "name": tool_name,
                            "input": arguments
                        }));
                    }
                    ContentPart::ToolResult {
                        tool_call_id,
                        result,
                        is_error,
                    } => {
                        blocks.push(serde_json::json!({
                            "type": "tool_result",
                            "tool_use_id": tool_call_id,
                            "content": tool_result_content(result),
                            "is_error": is_error
                        }));
                    }
                }
            }
            Ok(serde_json::Value::Array(blocks))
        }
    }
}

/// Anthropic never accepts raw audio; only transcripts are forwarded.
fn audio_transcript_block(
    transcript: Option<&str>,
    duration: Option<f32>,
) -> Result<serde_json::Value, LlmError> {
    let text = crate::utils::audio_transcript_text(transcript, duration)?;
    Ok(serde_json::json!({ "type": "text", "text": text }))
}

/// Anthropic tool_result content: a string when the result is a string,
/// otherwise the JSON rendered as text.
fn tool_result_content(result: &serde_json::Value) -> String {
    match result {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert messages to Anthropic format.
///
/// System messages are pulled out into the dedicated top-level field;
/// multiple system messages are joined with a blank line. Tool-result
/// messages become `tool_result` blocks on a user message.
pub fn convert_messages(
    messages: &[ChatMessage],
) -> Result<(Vec<serde_json::Value>, Option<String>), LlmError> {
    let mut anthropic_messages = Vec::new();
    let mut system_parts: Vec<String> = Vec::new();

    for message in messages {
        match message.role {
            MessageRole::System => {
                system_parts.push(message.content.all_text());
            }
            MessageRole::User => {
                anthropic_messages.push(serde_json::json!({
                    "role": "user",
                    "content": convert_message_content(&message.content)?
                }));
            }
            MessageRole::Assistant => {
                anthropic_messages.push(serde_json::json!({
                    "role": "assistant",
                    "content": convert_message_content(&message.content)?
                }));
            }
            MessageRole::Tool => {
                // Tool results answer a prior tool call from the user side
                anthropic_messages.push(serde_json::json!({
                    "role": "user",
                    "content": convert_message_content(&message.content)?
                }));
            }
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };
    Ok((anthropic_messages, system))
}

/// Convert tools to Anthropic format (`input_schema` carries the JSON
/// schema unchanged, nested properties included)
pub fn convert_tools(tools: &[crate::types::Tool]) -> Vec<serde_json::Value> {
    tools
        .iter()
        .map(|tool| {
            serde_json::json!({
                "name": tool.function.name,
                "description": tool.function.description,
                "input_schema": tool.function.parameters
            })
        })
        .collect()
}

/// Convert the provider-agnostic ToolChoice to Anthropic format.
///
/// Anthropic has no "none" encoding; `ToolChoice::None` returns `None`
/// and the caller removes the tool list instead.
pub fn convert_tool_choice(choice: &ToolChoice) -> Option<serde_json::Value> {
    match choice {
        ToolChoice::Auto => Some(serde_json::json!({ "type": "auto" })),
        ToolChoice::Required => Some(serde_json::json!({ "type": "any" })),
        ToolChoice::None => None,
        ToolChoice::Tool { name } => Some(serde_json::json!({ "type": "tool", "name": name })),
    }
}

/// Parse the Anthropic stop reason
pub fn parse_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    match reason {
        Some("end_turn") => Some(FinishReason::Stop),
        Some("max_tokens") => Some(FinishReason::Length),
        Some("stop_sequence") => Some(FinishReason::Stop),
        Some("tool_use") => Some(FinishReason::ToolCalls),
        Some("refusal") => Some(FinishReason::ContentFilter),
        Some(other) => Some(FinishReason::Other(other.to_string())),
        None => None,
    }
}

/// Parse response content blocks, splitting out tool calls
pub fn parse_response_content_and_tools(
    content_blocks: &[AnthropicContentBlock],
) -> (MessageContent, Option<Vec<ToolCall>>) {
    let mut text_content = String::new();
    let mut tool_calls = Vec::new();

    for block in content_blocks {
        match block.r#type.as_str() {
            "text" => {
                if let Some(text) = &block.text {
                    if !text_content.is_empty() {
                        text_content.push('\n');
                    }
                    text_content.push_str(text);
                }
            }
            "tool_use" => {
                if let (Some(id), Some(name), Some(input)) = (&block.id, &block.name, &block.input)
                {
                    tool_calls.push(ToolCall {
                        id: id.clone(),
                        r#type: "function".to_string(),
                        function: Some(FunctionCall {
                            name: name.clone(),
                            arguments: serde_json::to_string(input).unwrap_or_default(),
                        }),
                    });
                }
            }
            _ => {}
        }
    }

    let tools = if tool_calls.is_empty() {
        None
    } else {
        Some(tool_calls)
    };
    (MessageContent::Text(text_content), tools)
}

/// Extract thinking content from response blocks
pub fn extract_thinking_content(content_blocks: &[AnthropicContentBlock]) -> Option<String> {
    content_blocks
        .iter()
        .find(|b| b.r#type == "thinking")
        .and_then(|b| b.thinking.clone())
}

/// Build usage from the response accounting fields
pub fn create_usage_from_response(usage: Option<AnthropicUsage>) -> Option<Usage> {
    usage.map(|u| Usage {
        prompt_tokens: u.input_tokens,
        completion_tokens: u.output_tokens,
        total_tokens: u.input_tokens + u.output_tokens,
        cached_tokens: u.cache_read_input_tokens,
        reasoning_tokens: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_messages_join_with_blank_line() {
        let messages = vec![
            ChatMessage::system("First rule.").build(),
            ChatMessage::system("Second rule.").build(),
            ChatMessage::user("hi").build(),
        ];
        let (converted, system) = convert_messages(&messages).expect("convert");
        assert_eq!(converted.len(), 1);
        assert_eq!(system.as_deref(), Some("First rule.\n\nSecond rule."));
    }

    #[test]
    fn url_only_image_is_a_hard_input_error() {
        let messages = vec![
            ChatMessage::user("look")
                .with_image_url("https://example.com/cat.png", None)
                .build(),
        ];
        let err = convert_messages(&messages).unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(_)));
    }

    #[test]
    fn audio_without_transcript_is_a_hard_input_error() {
        let content = MessageContent::MultiModal(vec![ContentPart::Audio {
            transcript: None,
            duration: Some(3.5),
        }]);
        let err = convert_message_content(&content).unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(_)));
    }

    #[test]
    fn tool_result_message_becomes_user_tool_result_block() {
        let messages = vec![ChatMessage::tool_result("toolu_1", json!({"temp": 18})).build()];
        let (converted, _) = convert_messages(&messages).expect("convert");
        assert_eq!(converted[0]["role"], "user");
        let block = &converted[0]["content"][0];
        assert_eq!(block["type"], "tool_result");
        assert_eq!(block["tool_use_id"], "toolu_1");
        assert_eq!(block["is_error"], false);
    }

    #[test]
    fn tools_convert_to_input_schema() {
        let tools = vec![crate::types::Tool::function(
            "lookup",
            "Look something up",
            json!({
                "type": "object",
                "properties": { "q": { "type": "string" } },
                "required": ["q"]
            }),
        )];
        let converted = convert_tools(&tools);
        assert_eq!(converted[0]["name"], "lookup");
        assert_eq!(converted[0]["input_schema"]["properties"]["q"]["type"], "string");
    }

    #[test]
    fn finish_reasons_map_per_docs() {
        assert_eq!(parse_finish_reason(Some("end_turn")), Some(FinishReason::Stop));
        assert_eq!(parse_finish_reason(Some("max_tokens")), Some(FinishReason::Length));
        assert_eq!(parse_finish_reason(Some("tool_use")), Some(FinishReason::ToolCalls));
        assert_eq!(parse_finish_reason(Some("refusal")), Some(FinishReason::ContentFilter));
        assert_eq!(parse_finish_reason(None), None);
    }

    #[test]
    fn response_blocks_split_text_and_tool_calls() {
        let blocks = vec![
            AnthropicContentBlock {
                r#type: "text".into(),
                text: Some("Let me check.".into()),
                thinking: None,
                id: None,
                name: None,
                input: None,
            },
            AnthropicContentBlock {
                r#type: "tool_use".into(),
                text: None,
                thinking: None,
                id: Some("toolu_1".into()),
                name: Some("get_weather".into()),
                input: Some(json!({"location": "SF"})),
            },
        ];
        let (content, tool_calls) = parse_response_content_and_tools(&blocks);
        assert_eq!(content.all_text(), "Let me check.");
        let calls = tool_calls.expect("tool calls");
        assert_eq!(calls[0].id, "toolu_1");
        assert_eq!(
            calls[0].function.as_ref().unwrap().arguments,
            r#"{"location":"SF"}"#
        );
    }
}
