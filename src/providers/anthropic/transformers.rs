//! Transformers for the Anthropic messages API
//!
//! Centralizes request/response transformations shared by the chat
//! capability and the streaming path.

use crate::error::LlmError;
use crate::transformers::{RequestTransformer, ResponseTransformer};
use crate::types::{ChatRequest, ChatResponse, ToolChoice};

use super::types::AnthropicChatResponse;
use super::utils::{
    convert_messages, convert_tool_choice, convert_tools, create_usage_from_response,
    extract_thinking_content, parse_finish_reason, parse_response_content_and_tools,
};

/// Anthropic requires `max_tokens`; applied when the caller leaves it unset
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Request transformer for Anthropic
#[derive(Clone, Default)]
pub struct AnthropicRequestTransformer;

impl RequestTransformer for AnthropicRequestTransformer {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    fn transform_chat(&self, req: &ChatRequest) -> Result<serde_json::Value, LlmError> {
        req.common_params.validate()?;
        if let Some(t) = req.common_params.temperature
            && !(0.0..=1.0).contains(&t)
        {
            return Err(LlmError::InvalidInput(
                "Anthropic temperature must be between 0.0 and 1.0".to_string(),
            ));
        }

        let (messages, system) = convert_messages(&req.messages)?;
        let mut body = serde_json::json!({
            "model": req.common_params.model,
            "messages": messages,
            "max_tokens": req.common_params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });
        if let Some(sys) = system {
            body["system"] = serde_json::json!(sys);
        }
        if let Some(t) = req.common_params.temperature {
            body["temperature"] = serde_json::json!(t);
        }
        if let Some(tp) = req.common_params.top_p {
            body["top_p"] = serde_json::json!(tp);
        }
        if let Some(tk) = req.common_params.top_k {
            body["top_k"] = serde_json::json!(tk);
        }
        if let Some(stops) = &req.common_params.stop_sequences {
            body["stop_sequences"] = serde_json::json!(stops);
        }

        // ToolChoice::None has no Anthropic encoding; drop the tools instead
        let drop_tools = matches!(req.tool_choice, Some(ToolChoice::None));
        if let Some(tools) = &req.tools
            && !tools.is_empty()
            && !drop_tools
        {
            body["tools"] = serde_json::Value::Array(convert_tools(tools));
            if let Some(choice) = &req.tool_choice
                && let Some(tc) = convert_tool_choice(choice)
            {
                body["tool_choice"] = tc;
            }
        }

        if req.stream {
            body["stream"] = serde_json::json!(true);
        }
        Ok(body)
    }
}

/// Response transformer for Anthropic
#[derive(Clone, Default)]
pub struct AnthropicResponseTransformer;

impl ResponseTransformer for AnthropicResponseTransformer {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    fn transform_chat_response(&self, raw: &serde_json::Value) -> Result<ChatResponse, LlmError> {
        let response: AnthropicChatResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LlmError::ParseError(format!("Invalid Anthropic response: {e}")))?;

        let (content, tool_calls) = parse_response_content_and_tools(&response.content);
        let thinking = extract_thinking_content(&response.content);

        Ok(ChatResponse {
            id: Some(response.id),
            model: Some(response.model),
            content,
            usage: create_usage_from_response(response.usage),
            finish_reason: parse_finish_reason(response.stop_reason.as_deref()),
            tool_calls,
            thinking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatMessage, CommonParams, Tool};
    use serde_json::json;

    fn request_with(messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            messages,
            common_params: CommonParams::with_model("claude-test"),
            ..Default::default()
        }
    }

    #[test]
    fn body_has_mandatory_max_tokens() {
        let tx = AnthropicRequestTransformer;
        let body = tx
            .transform_chat(&request_with(vec![ChatMessage::user("hi").build()]))
            .expect("transform");
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn system_message_moves_to_top_level_field() {
        let tx = AnthropicRequestTransformer;
        let body = tx
            .transform_chat(&request_with(vec![
                ChatMessage::system("Be brief.").build(),
                ChatMessage::user("hi").build(),
            ]))
            .expect("transform");
        assert_eq!(body["system"], "Be brief.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn temperature_out_of_anthropic_range_is_rejected() {
        let tx = AnthropicRequestTransformer;
        let mut req = request_with(vec![ChatMessage::user("hi").build()]);
        req.common_params.temperature = Some(1.5);
        assert!(matches!(
            tx.transform_chat(&req),
            Err(LlmError::InvalidInput(_))
        ));
    }

    #[test]
    fn tool_choice_none_drops_tools() {
        let tx = AnthropicRequestTransformer;
        let mut req = request_with(vec![ChatMessage::user("hi").build()]);
        req.tools = Some(vec![Tool::function("f", "d", json!({"type": "object"}))]);
        req.tool_choice = Some(ToolChoice::None);
        let body = tx.transform_chat(&req).expect("transform");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn decode_text_and_usage() {
        let tx = AnthropicResponseTransformer;
        let raw = json!({
            "id": "msg_1",
            "model": "claude-test",
            "content": [{"type": "text", "text": "4"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 8, "output_tokens": 1}
        });
        let response = tx.transform_chat_response(&raw).expect("decode");
        assert_eq!(response.text(), "4");
        assert_eq!(response.usage.as_ref().unwrap().total_tokens, 9);
        assert_eq!(
            response.finish_reason,
            Some(crate::types::FinishReason::Stop)
        );
    }

    #[test]
    fn decode_schema_mismatch_is_parse_error() {
        let tx = AnthropicResponseTransformer;
        let err = tx
            .transform_chat_response(&json!({"unexpected": true}))
            .unwrap_err();
        assert!(matches!(err, LlmError::ParseError(_)));
    }
}
