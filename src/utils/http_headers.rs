//! Per-vendor HTTP header construction
//!
//! Every provider uses a JSON content type plus its own authentication
//! header scheme. The exact header names are constants of each vendor's
//! API, not user-configurable; callers can only add extra headers on top.

use crate::error::LlmError;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Builders for each provider's constant header table
pub struct ProviderHeaders;

impl ProviderHeaders {
    /// Anthropic: `x-api-key` plus a versioned header pair
    pub fn anthropic(
        api_key: &str,
        custom_headers: &HashMap<String, String>,
    ) -> Result<HeaderMap, LlmError> {
        let mut headers = base_headers(custom_headers)?;
        headers.insert("x-api-key", header_value(api_key)?);
        headers.insert("anthropic-version", header_value(ANTHROPIC_VERSION)?);
        Ok(headers)
    }

    /// OpenAI: bearer token
    pub fn openai(
        api_key: &str,
        custom_headers: &HashMap<String, String>,
    ) -> Result<HeaderMap, LlmError> {
        let mut headers = base_headers(custom_headers)?;
        headers.insert(
            reqwest::header::AUTHORIZATION,
            header_value(&format!("Bearer {api_key}"))?,
        );
        Ok(headers)
    }

    /// Gemini: `x-goog-api-key`
    pub fn gemini(
        api_key: &str,
        custom_headers: &HashMap<String, String>,
    ) -> Result<HeaderMap, LlmError> {
        let mut headers = base_headers(custom_headers)?;
        headers.insert("x-goog-api-key", header_value(api_key)?);
        Ok(headers)
    }

    /// Ollama: no authentication, JSON content type only
    pub fn ollama(custom_headers: &HashMap<String, String>) -> Result<HeaderMap, LlmError> {
        base_headers(custom_headers)
    }
}

fn base_headers(custom_headers: &HashMap<String, String>) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (key, value) in custom_headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid header name {key}: {e}")))?;
        headers.insert(name, header_value(value)?);
    }
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, LlmError> {
    HeaderValue::from_str(value)
        .map_err(|e| LlmError::ConfigurationError(format!("Invalid header value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anthropic_headers_carry_versioned_pair() {
        let headers = ProviderHeaders::anthropic("sk-test", &HashMap::new()).expect("headers");
        assert_eq!(headers.get("x-api-key").unwrap(), "sk-test");
        assert_eq!(headers.get("anthropic-version").unwrap(), ANTHROPIC_VERSION);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn openai_headers_use_bearer_auth() {
        let headers = ProviderHeaders::openai("sk-test", &HashMap::new()).expect("headers");
        assert_eq!(
            headers.get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer sk-test"
        );
    }

    #[test]
    fn gemini_headers_use_goog_api_key() {
        let headers = ProviderHeaders::gemini("g-test", &HashMap::new()).expect("headers");
        assert_eq!(headers.get("x-goog-api-key").unwrap(), "g-test");
    }

    #[test]
    fn custom_headers_are_merged() {
        let mut custom = HashMap::new();
        custom.insert("x-extra".to_string(), "1".to_string());
        let headers = ProviderHeaders::ollama(&custom).expect("headers");
        assert_eq!(headers.get("x-extra").unwrap(), "1");
    }

    #[test]
    fn invalid_header_value_is_a_configuration_error() {
        let mut custom = HashMap::new();
        custom.insert("x-bad".to_string(), "line\nbreak".to_string());
        let err = ProviderHeaders::ollama(&custom).unwrap_err();
        assert!(matches!(err, LlmError::ConfigurationError(_)));
    }
}
