//! Anthropic provider implementation
//!
//! Messages-API codec plus the SSE event converter for Anthropic's
//! `message_start` / `content_block_*` / `message_stop` event taxonomy.

pub mod client;
pub mod streaming;
pub mod transformers;
pub mod types;
pub mod utils;

pub use client::AnthropicClient;
pub use streaming::AnthropicEventConverter;
pub use transformers::{AnthropicRequestTransformer, AnthropicResponseTransformer};

/// Default Anthropic API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
