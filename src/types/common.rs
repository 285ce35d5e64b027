//! Common enums and metadata types used across the library.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Provider family enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    OpenAi,
    Anthropic,
    Gemini,
    Ollama,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

impl ProviderType {
    /// Construct a ProviderType from a provider name string.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            "gemini" | "google" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

/// Reason why the model stopped generating tokens.
///
/// # Examples
///
/// ```rust
/// use wonton::types::FinishReason;
///
/// let finish_reason = Some(FinishReason::Stop);
/// match finish_reason {
///     Some(FinishReason::Stop) => println!("Completed"),
///     Some(FinishReason::Length) => println!("Hit max tokens"),
///     _ => println!("Other reason"),
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Model completed naturally or hit a stop sequence.
    ///
    /// Maps to OpenAI `stop`, Anthropic `end_turn`/`stop_sequence`,
    /// Gemini `STOP`, Ollama `done`.
    Stop,
    /// Model reached the maximum number of output tokens.
    ///
    /// Maps to OpenAI `length`, Anthropic `max_tokens`, Gemini `MAX_TOKENS`.
    Length,
    /// Model requested tool/function calls.
    ///
    /// Maps to OpenAI `tool_calls`, Anthropic `tool_use`. Takes priority
    /// over the vendor's own stop signal whenever a tool call completed
    /// during the stream.
    ToolCalls,
    /// Content was filtered for safety/policy reasons.
    ///
    /// Maps to OpenAI `content_filter`, Anthropic `refusal`,
    /// Gemini `SAFETY`/`RECITATION`.
    ContentFilter,
    /// Provider-specific finish reason not covered above.
    Other(String),
}

/// Response metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Response ID
    pub id: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Creation time
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    /// Provider name
    pub provider: String,
}

/// Usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Input tokens used
    pub prompt_tokens: u32,
    /// Output tokens generated
    pub completion_tokens: u32,
    /// Total tokens used; vendor-reported when available, otherwise the sum
    pub total_tokens: u32,
    /// Cached prompt tokens (if reported)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u32>,
    /// Reasoning tokens (for reasoning-capable models)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
}

impl Usage {
    /// Create new usage statistics; the total is derived from the parts
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            cached_tokens: None,
            reasoning_tokens: None,
        }
    }

    /// Create usage with a vendor-reported total that may differ from the sum
    pub const fn with_total(prompt_tokens: u32, completion_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
            cached_tokens: None,
            reasoning_tokens: None,
        }
    }
}

/// HTTP configuration applied when building the underlying client.
///
/// Read-only for the duration of a request; supplied by the caller, never
/// mutated by this library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// Connection timeout
    pub connect_timeout: Option<Duration>,
    /// Extra headers merged into every request
    pub headers: HashMap<String, String>,
    /// Proxy URL
    pub proxy: Option<String>,
    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(120)),
            connect_timeout: Some(Duration::from_secs(10)),
            headers: HashMap::new(),
            proxy: None,
            user_agent: Some(concat!("wonton/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl HttpConfig {
    /// Build a `reqwest::Client` honoring this configuration.
    ///
    /// Timeouts surface as `LlmError::TimeoutError` when they fire.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::LlmError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
                crate::error::LlmError::ConfigurationError(format!("Invalid proxy URL: {e}"))
            })?;
            builder = builder.proxy(proxy);
        }
        builder.build().map_err(|e| {
            crate::error::LlmError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })
    }
}
