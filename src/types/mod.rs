//! Core types shared across providers
//!
//! Vendor-neutral data model: messages and multimodal content, generation
//! parameters, tool definitions, requests and responses. These types carry
//! no provider logic; the per-provider codecs under `crate::providers`
//! translate them to and from each vendor's wire format.

mod chat;
mod common;
mod params;
mod request;
mod response;
mod tools;

pub use chat::{
    ChatMessage, ChatMessageBuilder, ContentPart, ImageDetail, MediaSource, MessageContent,
    MessageRole,
};
pub use common::{FinishReason, HttpConfig, ProviderType, ResponseMetadata, Usage};
pub use params::CommonParams;
pub use request::{ChatRequest, ChatRequestBuilder};
pub use response::ChatResponse;
pub use tools::{FunctionCall, Tool, ToolCall, ToolChoice, ToolFunction};
