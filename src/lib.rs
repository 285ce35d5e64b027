//! # Wonton
//!
//! A unified multi-provider LLM interface for Rust. One request model,
//! one stream event model and one error taxonomy across vendors with
//! wildly different wire protocols: Anthropic-style SSE, OpenAI chat and
//! Responses SSE, Gemini `alt=sse` and Ollama NDJSON.
//!
//! The pipeline per request:
//!
//! ```text
//! ChatRequest -> RequestTransformer (vendor JSON) -> HTTP POST
//!   -> status check / error classification
//!   -> frame reader (SSE or NDJSON)
//!   -> per-vendor event converter (+ tool-call accumulator)
//!   -> unified ChatStreamEvent sequence
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use futures_util::StreamExt;
//! use wonton::prelude::*;
//!
//! # async fn example() -> Result<(), wonton::LlmError> {
//! let model = ModelId::parse("anthropic:claude-sonnet-4")?;
//! let client = client_for_model(&model, ProviderConfig::new("sk-ant-..."))?;
//!
//! // Non-streaming
//! let response = client.chat(vec![ChatMessage::user("2+2?").build()]).await?;
//! println!("{}", response.text());
//!
//! // Streaming
//! let mut stream = client.chat_stream(vec![ChatMessage::user("2+2?").build()], None).await?;
//! while let Some(event) = stream.next().await {
//!     if let ChatStreamEvent::ContentDelta { delta, .. } = event? {
//!         print!("{delta}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod executors;
pub mod provider;
pub mod providers;
pub mod stream;
pub mod traits;
pub mod transformers;
pub mod types;
pub mod utils;

// Re-exports for the public API
pub use client::LlmClient;
pub use error::{ErrorCategory, LlmError};
pub use provider::{ModelId, ProviderConfig, client_for_model};
pub use stream::{ChatStream, ChatStreamEvent};
pub use traits::ChatCapability;

/// Convenience prelude
pub mod prelude {
    pub use crate::client::LlmClient;
    pub use crate::error::LlmError;
    pub use crate::provider::{ModelId, ProviderConfig, client_for_model};
    pub use crate::stream::{ChatStream, ChatStreamEvent};
    pub use crate::traits::ChatCapability;
    pub use crate::types::{
        ChatMessage, ChatRequest, ChatResponse, CommonParams, ContentPart, FinishReason,
        HttpConfig, MessageContent, MessageRole, Tool, ToolChoice, Usage,
    };
}
