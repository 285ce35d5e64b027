//! OpenAI client configuration and endpoint selection

use crate::types::{CommonParams, HttpConfig};

/// Model-id prefixes that are served by the Responses endpoint.
///
/// Selection is a static table, not runtime negotiation: reasoning-model
/// families only speak the Responses wire format.
const RESPONSES_API_MODEL_PREFIXES: &[&str] = &["o1", "o3", "o4", "gpt-5", "codex"];

/// Whether a model id is served by the Responses endpoint by default
pub fn model_uses_responses_api(model: &str) -> bool {
    RESPONSES_API_MODEL_PREFIXES
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

/// OpenAI client configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub common_params: CommonParams,
    pub http_config: HttpConfig,
    /// Force the Responses endpoint on or off; `None` consults the table
    pub use_responses_api: Option<bool>,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: super::DEFAULT_BASE_URL.to_string(),
            common_params: CommonParams::default(),
            http_config: HttpConfig::default(),
            use_responses_api: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.common_params.model = model.into();
        self
    }

    pub fn with_common_params(mut self, params: CommonParams) -> Self {
        self.common_params = params;
        self
    }

    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = http_config;
        self
    }

    pub fn with_responses_api(mut self, enabled: bool) -> Self {
        self.use_responses_api = Some(enabled);
        self
    }

    /// Resolve which wire variant this configuration uses
    pub fn responses_api_enabled(&self) -> bool {
        self.use_responses_api
            .unwrap_or_else(|| model_uses_responses_api(&self.common_params.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasoning_models_default_to_responses_endpoint() {
        assert!(model_uses_responses_api("o3-mini"));
        assert!(model_uses_responses_api("gpt-5"));
        assert!(!model_uses_responses_api("gpt-4o-mini"));
    }

    #[test]
    fn explicit_override_beats_the_table() {
        let config = OpenAiConfig::new("k")
            .with_model("gpt-4o-mini")
            .with_responses_api(true);
        assert!(config.responses_api_enabled());

        let config = OpenAiConfig::new("k")
            .with_model("o3-mini")
            .with_responses_api(false);
        assert!(!config.responses_api_enabled());
    }
}
