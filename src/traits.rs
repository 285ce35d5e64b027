//! Capability traits

use crate::error::LlmError;
use crate::stream::ChatStream;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, Tool};
use async_trait::async_trait;

/// The chat capability every provider client implements.
///
/// `chat_with_tools` is the non-streaming path; `chat_stream` yields the
/// unified delta sequence. Both take ownership of nothing shared: each
/// call owns its connection and stream-scoped state, so independent calls
/// run fully concurrently.
#[async_trait]
pub trait ChatCapability: Send + Sync {
    /// Plain chat without tools
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError> {
        self.chat_with_tools(messages, None).await
    }

    /// Chat with an optional tool set
    async fn chat_with_tools(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponse, LlmError>;

    /// Streaming chat with an optional tool set
    async fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatStream, LlmError>;

    /// Full chat request (preferred unified path). Default falls back to
    /// `chat_with_tools`.
    async fn chat_request(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.chat_with_tools(request.messages, request.tools).await
    }

    /// Full streaming chat request. Default falls back to `chat_stream`.
    async fn chat_stream_request(&self, request: ChatRequest) -> Result<ChatStream, LlmError> {
        self.chat_stream(request.messages, request.tools).await
    }

    /// One-shot convenience: ask a single question, get the text back
    async fn ask(&self, prompt: String) -> Result<String, LlmError> {
        let response = self.chat(vec![ChatMessage::user(prompt).build()]).await?;
        Ok(response.text())
    }
}
