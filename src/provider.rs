//! Provider facade: model identifiers and the client factory
//!
//! The factory is the single entry point external callers use: a tagged
//! [`ModelId`] picks the vendor family (and, for OpenAI, the wire
//! variant via the static endpoint table), and [`client_for_model`]
//! assembles the matching client. Credentials arrive pre-resolved in
//! [`ProviderConfig`]; this library never consults the environment.

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::types::{CommonParams, HttpConfig, ProviderType};

/// Tagged model identifier: provider family plus the vendor's model name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelId {
    Anthropic(String),
    OpenAi(String),
    Gemini(String),
    Ollama(String),
}

impl ModelId {
    /// Parse a `provider:model` string (e.g. `"anthropic:claude-sonnet-4"`)
    pub fn parse(s: &str) -> Result<Self, LlmError> {
        let Some((provider, model)) = s.split_once(':') else {
            return Err(LlmError::ConfigurationError(format!(
                "Model id `{s}` is missing a provider prefix (expected `provider:model`)"
            )));
        };
        if model.is_empty() {
            return Err(LlmError::ConfigurationError(format!(
                "Model id `{s}` has an empty model name"
            )));
        }
        match ProviderType::from_name(provider) {
            Some(ProviderType::Anthropic) => Ok(Self::Anthropic(model.to_string())),
            Some(ProviderType::OpenAi) => Ok(Self::OpenAi(model.to_string())),
            Some(ProviderType::Gemini) => Ok(Self::Gemini(model.to_string())),
            Some(ProviderType::Ollama) => Ok(Self::Ollama(model.to_string())),
            None => Err(LlmError::ConfigurationError(format!(
                "Unknown provider `{provider}` in model id `{s}`"
            ))),
        }
    }

    /// The provider family this model belongs to
    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::Anthropic(_) => ProviderType::Anthropic,
            Self::OpenAi(_) => ProviderType::OpenAi,
            Self::Gemini(_) => ProviderType::Gemini,
            Self::Ollama(_) => ProviderType::Ollama,
        }
    }

    /// The vendor-side model name
    pub fn model_name(&self) -> &str {
        match self {
            Self::Anthropic(m) | Self::OpenAi(m) | Self::Gemini(m) | Self::Ollama(m) => m,
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.provider_type(), self.model_name())
    }
}

/// Injected, read-only provider configuration.
///
/// Resolved credentials are supplied by the caller (env lookup, keychain,
/// whatever) and are never mutated here.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Resolved API key; optional because local providers need none
    pub api_key: Option<String>,
    /// Base URL override
    pub base_url: Option<String>,
    /// Generation parameter defaults applied to every request
    pub params: CommonParams,
    /// HTTP configuration
    pub http_config: HttpConfig,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_params(mut self, params: CommonParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = http_config;
        self
    }

    fn require_api_key(&self, provider: &ProviderType) -> Result<String, LlmError> {
        self.api_key.clone().ok_or_else(|| {
            LlmError::MissingApiKey(format!("Provider `{provider}` requires an API key"))
        })
    }
}

/// Build the client for a model id.
///
/// Each vendor family maps to exactly one implementing type; for OpenAI
/// the model id additionally selects between the chat and Responses wire
/// variants through the static table in the provider's config.
pub fn client_for_model(
    model: &ModelId,
    config: ProviderConfig,
) -> Result<Box<dyn LlmClient>, LlmError> {
    let http_client = config.http_config.build_client()?;
    let mut params = config.params.clone();
    params.model = model.model_name().to_string();

    match model {
        #[cfg(feature = "anthropic")]
        ModelId::Anthropic(_) => {
            let api_key = config.require_api_key(&ProviderType::Anthropic)?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| crate::providers::anthropic::DEFAULT_BASE_URL.to_string());
            Ok(Box::new(crate::providers::anthropic::AnthropicClient::new(
                api_key,
                base_url,
                http_client,
                params,
                config.http_config,
            )))
        }
        #[cfg(feature = "openai")]
        ModelId::OpenAi(_) => {
            let api_key = config.require_api_key(&ProviderType::OpenAi)?;
            let mut openai_config = crate::providers::openai::OpenAiConfig::new(api_key)
                .with_common_params(params)
                .with_http_config(config.http_config.clone());
            if let Some(base_url) = config.base_url.clone() {
                openai_config = openai_config.with_base_url(base_url);
            }
            Ok(Box::new(crate::providers::openai::OpenAiClient::new(
                openai_config,
                http_client,
            )))
        }
        #[cfg(feature = "google")]
        ModelId::Gemini(_) => {
            let api_key = config.require_api_key(&ProviderType::Gemini)?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| crate::providers::gemini::DEFAULT_BASE_URL.to_string());
            Ok(Box::new(crate::providers::gemini::GeminiClient::new(
                api_key,
                base_url,
                http_client,
                params,
                config.http_config,
            )))
        }
        #[cfg(feature = "ollama")]
        ModelId::Ollama(_) => {
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| crate::providers::ollama::DEFAULT_BASE_URL.to_string());
            Ok(Box::new(crate::providers::ollama::OllamaClient::new(
                base_url,
                http_client,
                params,
                config.http_config,
            )))
        }
        #[allow(unreachable_patterns)]
        other => Err(LlmError::UnsupportedOperation(format!(
            "Provider `{}` is not enabled in this build",
            other.provider_type()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_parsing() {
        assert_eq!(
            ModelId::parse("anthropic:claude-sonnet-4").unwrap(),
            ModelId::Anthropic("claude-sonnet-4".to_string())
        );
        assert_eq!(
            ModelId::parse("google:gemini-2.0-flash").unwrap(),
            ModelId::Gemini("gemini-2.0-flash".to_string())
        );
        assert!(matches!(
            ModelId::parse("no-prefix"),
            Err(LlmError::ConfigurationError(_))
        ));
        assert!(matches!(
            ModelId::parse("mystery:model"),
            Err(LlmError::ConfigurationError(_))
        ));
        assert!(matches!(
            ModelId::parse("openai:"),
            Err(LlmError::ConfigurationError(_))
        ));
    }

    #[test]
    fn model_id_display_round_trips() {
        let id = ModelId::parse("openai:gpt-4o-mini").unwrap();
        assert_eq!(id.to_string(), "openai:gpt-4o-mini");
        assert_eq!(ModelId::parse(&id.to_string()).unwrap(), id);
    }

    #[cfg(feature = "anthropic")]
    #[test]
    fn factory_requires_api_key_for_hosted_providers() {
        let err = client_for_model(
            &ModelId::Anthropic("claude-test".to_string()),
            ProviderConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(_)));
    }

    #[cfg(feature = "ollama")]
    #[test]
    fn factory_builds_ollama_without_api_key() {
        let client = client_for_model(
            &ModelId::Ollama("llama3".to_string()),
            ProviderConfig::default(),
        )
        .expect("client");
        assert_eq!(client.provider_name(), "ollama");
    }

    #[cfg(feature = "openai")]
    #[test]
    fn factory_builds_openai_clients() {
        let client = client_for_model(
            &ModelId::OpenAi("gpt-4o-mini".to_string()),
            ProviderConfig::new("sk-test"),
        )
        .expect("client");
        assert_eq!(client.provider_name(), "openai");
    }
}
