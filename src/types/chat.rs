//! Chat message and multimodal content types

use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Media data source for images.
///
/// Providers that require inline data reject URL-only sources at encode
/// time with a structured `InvalidInput` error; no implicit download
/// happens inside this library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum MediaSource {
    /// Remote URL
    Url { url: String },
    /// Base64-encoded data
    Base64 { data: String },
    /// Raw binary data
    Binary { data: Vec<u8> },
}

/// Image detail level (for providers that support it)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Auto,
    Low,
    High,
}

/// Content part - provider-agnostic multimodal content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentPart {
    /// Text content
    Text { text: String },

    /// Image content - URL, base64 or raw bytes plus its media type
    Image {
        #[serde(flatten)]
        source: MediaSource,
        /// Media type (e.g. "image/png"); defaults to "image/jpeg" on the wire
        #[serde(skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
        /// Optional detail level
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<ImageDetail>,
    },

    /// Audio content.
    ///
    /// The providers covered here never accept raw audio; only the
    /// transcript is forwarded (annotated with its duration when known).
    /// Audio without a transcript is a hard encode-time error.
    Audio {
        /// Transcript of the audio
        #[serde(skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
        /// Duration in seconds
        #[serde(skip_serializing_if = "Option::is_none")]
        duration: Option<f32>,
    },

    /// Tool call (function call request from the model)
    #[serde(rename = "tool-call")]
    ToolCall {
        /// Tool call ID (used to match with the tool result)
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Tool/function name
        #[serde(rename = "toolName")]
        tool_name: String,
        /// Arguments as a JSON value
        #[serde(rename = "input")]
        arguments: serde_json::Value,
    },

    /// Tool result (answer to a prior tool call)
    #[serde(rename = "tool-result")]
    ToolResult {
        /// The tool call this result answers
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Result payload
        result: serde_json::Value,
        /// Whether the tool execution failed
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentPart {
    /// Create a text content part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part from a URL
    pub fn image_url(url: impl Into<String>, media_type: Option<String>) -> Self {
        Self::Image {
            source: MediaSource::Url { url: url.into() },
            media_type,
            detail: None,
        }
    }

    /// Create an image part from base64 data
    pub fn image_base64(data: impl Into<String>, media_type: Option<String>) -> Self {
        Self::Image {
            source: MediaSource::Base64 { data: data.into() },
            media_type,
            detail: None,
        }
    }

    /// Create an audio part from a transcript
    pub fn audio_transcript(transcript: impl Into<String>, duration: Option<f32>) -> Self {
        Self::Audio {
            transcript: Some(transcript.into()),
            duration,
        }
    }

    /// Create a tool call part
    pub fn tool_call(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::ToolCall {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Create a tool result part
    pub fn tool_result(tool_call_id: impl Into<String>, result: serde_json::Value) -> Self {
        Self::ToolResult {
            tool_call_id: tool_call_id.into(),
            result,
            is_error: false,
        }
    }

    /// Create a failed tool result part
    pub fn tool_error(tool_call_id: impl Into<String>, result: serde_json::Value) -> Self {
        Self::ToolResult {
            tool_call_id: tool_call_id.into(),
            result,
            is_error: true,
        }
    }

    /// Check whether this part is a tool call
    pub fn is_tool_call(&self) -> bool {
        matches!(self, Self::ToolCall { .. })
    }
}

/// Message content: plain text or an ordered sequence of parts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Multimodal content parts in order
    MultiModal(Vec<ContentPart>),
}

impl MessageContent {
    /// Get the text if this is plain text content
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::MultiModal(_) => None,
        }
    }

    /// Collect all text across parts
    pub fn all_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::MultiModal(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    /// Whether the content carries no parts at all
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::MultiModal(parts) => parts.is_empty(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Chat message
///
/// A message in a conversation. Every message carries at least one content
/// part, except tool-result messages which may be a pure structured
/// payload.
///
/// # Examples
///
/// ```rust
/// use wonton::types::{ChatMessage, ContentPart};
/// use serde_json::json;
///
/// let msg = ChatMessage::user("Hello!").build();
///
/// let msg = ChatMessage::user("What is in this picture?")
///     .with_image_base64("AAECAw==", Some("image/png".to_string()))
///     .build();
///
/// let msg = ChatMessage::tool_result("call_123", json!({"temp_c": 18})).build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role
    pub role: MessageRole,
    /// Content
    pub content: MessageContent,
}

impl ChatMessage {
    /// Creates a user message builder
    pub fn user(content: impl Into<String>) -> ChatMessageBuilder {
        ChatMessageBuilder::new(MessageRole::User, content)
    }

    /// Creates a system message builder
    pub fn system(content: impl Into<String>) -> ChatMessageBuilder {
        ChatMessageBuilder::new(MessageRole::System, content)
    }

    /// Creates an assistant message builder
    pub fn assistant(content: impl Into<String>) -> ChatMessageBuilder {
        ChatMessageBuilder::new(MessageRole::Assistant, content)
    }

    /// Creates an assistant message with explicit content parts
    pub fn assistant_with_content(parts: Vec<ContentPart>) -> ChatMessageBuilder {
        ChatMessageBuilder {
            role: MessageRole::Assistant,
            parts,
            text: None,
        }
    }

    /// Creates a tool result message
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        result: serde_json::Value,
    ) -> ChatMessageBuilder {
        ChatMessageBuilder {
            role: MessageRole::Tool,
            parts: vec![ContentPart::tool_result(tool_call_id, result)],
            text: None,
        }
    }

    /// Creates a tool error message
    pub fn tool_error(
        tool_call_id: impl Into<String>,
        error: serde_json::Value,
    ) -> ChatMessageBuilder {
        ChatMessageBuilder {
            role: MessageRole::Tool,
            parts: vec![ContentPart::tool_error(tool_call_id, error)],
            text: None,
        }
    }

    /// Get the text content of the message, if plain text
    pub fn content_text(&self) -> Option<&str> {
        self.content.text()
    }
}

/// Chat message builder
#[derive(Debug, Clone)]
pub struct ChatMessageBuilder {
    role: MessageRole,
    text: Option<String>,
    parts: Vec<ContentPart>,
}

impl ChatMessageBuilder {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            text: Some(content.into()),
            parts: Vec::new(),
        }
    }

    /// Attach an image from a URL
    pub fn with_image_url(mut self, url: impl Into<String>, media_type: Option<String>) -> Self {
        self.parts.push(ContentPart::image_url(url, media_type));
        self
    }

    /// Attach an image from base64 data
    pub fn with_image_base64(
        mut self,
        data: impl Into<String>,
        media_type: Option<String>,
    ) -> Self {
        self.parts.push(ContentPart::image_base64(data, media_type));
        self
    }

    /// Attach an audio transcript
    pub fn with_audio_transcript(
        mut self,
        transcript: impl Into<String>,
        duration: Option<f32>,
    ) -> Self {
        self.parts
            .push(ContentPart::audio_transcript(transcript, duration));
        self
    }

    /// Attach an arbitrary content part
    pub fn with_part(mut self, part: ContentPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Build the message
    pub fn build(self) -> ChatMessage {
        let content = match (self.text, self.parts.is_empty()) {
            (Some(text), true) => MessageContent::Text(text),
            (Some(text), false) => {
                let mut parts = vec![ContentPart::text(text)];
                parts.extend(self.parts);
                MessageContent::MultiModal(parts)
            }
            (None, _) => MessageContent::MultiModal(self.parts),
        };
        ChatMessage {
            role: self.role,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_text_message() {
        let msg = ChatMessage::user("hi").build();
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content_text(), Some("hi"));
    }

    #[test]
    fn text_plus_image_becomes_parallel_parts() {
        let msg = ChatMessage::user("look")
            .with_image_base64("AAECAw==", Some("image/png".to_string()))
            .build();
        match msg.content {
            MessageContent::MultiModal(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[0], ContentPart::Text { .. }));
                assert!(matches!(parts[1], ContentPart::Image { .. }));
            }
            other => panic!("expected multimodal content, got {other:?}"),
        }
    }

    #[test]
    fn tool_result_message_is_pure_payload() {
        let msg = ChatMessage::tool_result("call_1", json!({"ok": true})).build();
        assert_eq!(msg.role, MessageRole::Tool);
        match msg.content {
            MessageContent::MultiModal(parts) => {
                assert!(matches!(
                    &parts[0],
                    ContentPart::ToolResult { tool_call_id, is_error, .. }
                        if tool_call_id == "call_1" && !is_error
                ));
            }
            other => panic!("expected multimodal content, got {other:?}"),
        }
    }

    #[test]
    fn all_text_joins_text_parts_only() {
        let content = MessageContent::MultiModal(vec![
            ContentPart::text("a"),
            ContentPart::tool_call("id", "f", json!({})),
            ContentPart::text("b"),
        ]);
        assert_eq!(content.all_text(), "ab");
    }
}
