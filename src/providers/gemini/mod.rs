//! Google Gemini provider implementation
//!
//! generateContent codec and the `alt=sse` streaming reader. Gemini
//! delivers tool calls as atomic `functionCall` parts (arguments arrive
//! whole, never fragmented) and reports usage via `usageMetadata`.

pub mod client;
pub mod convert;
pub mod streaming;
pub mod types;

pub use client::GeminiClient;
pub use convert::{GeminiRequestTransformer, GeminiResponseTransformer};
pub use streaming::GeminiEventConverter;

/// Default Gemini API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
