//! Chat response types

use serde::{Deserialize, Serialize};

use super::chat::{ChatMessage, MessageContent, MessageRole};
use super::common::{FinishReason, Usage};
use super::tools::ToolCall;

/// Chat response from a provider
///
/// Produced once per non-streaming call, or once per fully drained stream
/// as the payload of the terminal stream event.
///
/// # Examples
///
/// ```rust
/// use wonton::types::{ChatResponse, MessageContent, ToolCall};
///
/// let mut response = ChatResponse::new(MessageContent::Text("Searching...".into()));
/// response.tool_calls = Some(vec![ToolCall::function("call_1", "search", "{}")]);
/// assert!(response.has_tool_calls());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response ID
    pub id: Option<String>,
    /// The response content
    pub content: MessageContent,
    /// Model that produced the response
    pub model: Option<String>,
    /// Usage statistics
    pub usage: Option<Usage>,
    /// Finish reason
    pub finish_reason: Option<FinishReason>,
    /// Tool calls requested by the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Reasoning/thinking text, for models that expose it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
}

impl ChatResponse {
    /// Create a new chat response
    pub fn new(content: MessageContent) -> Self {
        Self {
            id: None,
            content,
            model: None,
            usage: None,
            finish_reason: None,
            tool_calls: None,
            thinking: None,
        }
    }

    /// Create an empty response with a specific finish reason
    pub fn empty_with_finish_reason(reason: FinishReason) -> Self {
        Self {
            finish_reason: Some(reason),
            ..Self::new(MessageContent::Text(String::new()))
        }
    }

    /// Get the text content of the response
    pub fn content_text(&self) -> Option<&str> {
        self.content.text()
    }

    /// Get all text content of the response
    pub fn text(&self) -> String {
        self.content.all_text()
    }

    /// Check whether the response carries tool calls
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Convert the response into an assistant message for conversation
    /// history in multi-step tool calling loops.
    pub fn to_assistant_message(&self) -> ChatMessage {
        ChatMessage {
            role: MessageRole::Assistant,
            content: self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_with_finish_reason() {
        let response = ChatResponse::empty_with_finish_reason(FinishReason::Length);
        assert_eq!(response.finish_reason, Some(FinishReason::Length));
        assert_eq!(response.text(), "");
        assert!(!response.has_tool_calls());
    }

    #[test]
    fn to_assistant_message_preserves_content() {
        let response = ChatResponse::new(MessageContent::Text("hi".into()));
        let msg = response.to_assistant_message();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.content_text(), Some("hi"));
    }
}
