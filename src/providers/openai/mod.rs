//! OpenAI provider implementation
//!
//! Two wire variants of the same vendor family: the classic chat
//! completions endpoint (SSE with `choices[].delta`, terminated by a
//! literal `[DONE]`) and the richer Responses endpoint (typed
//! `response.*` events). Which endpoint a model uses is a static table
//! keyed by model id (see [`config`]), overridable per client.

pub mod client;
pub mod config;
pub mod responses;
pub mod streaming;
pub mod transformers;

pub use client::OpenAiClient;
pub use config::{OpenAiConfig, model_uses_responses_api};
pub use responses::{OpenAiResponsesEventConverter, OpenAiResponsesRequestTransformer,
    OpenAiResponsesResponseTransformer};
pub use streaming::OpenAiEventConverter;
pub use transformers::{OpenAiRequestTransformer, OpenAiResponseTransformer};

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
