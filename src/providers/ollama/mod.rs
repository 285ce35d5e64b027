//! Ollama provider implementation
//!
//! Local-inference style wire format: plain JSON for non-streaming calls
//! and NDJSON (one object per line) for streaming, with `done: true`
//! terminating the stream. No authentication.

pub mod client;
pub mod streaming;
pub mod transformers;
pub mod types;

pub use client::OllamaClient;
pub use streaming::OllamaEventConverter;
pub use transformers::{OllamaRequestTransformer, OllamaResponseTransformer};

/// Default Ollama base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
