//! Common generation parameter types.
//!
//! This module defines `CommonParams`, used across providers. Every field
//! except the model is optional; providers apply their own defaults and
//! translate names to their wire format (e.g. `max_tokens` becomes
//! `num_predict` for Ollama and `max_output_tokens` for Gemini).

use serde::{Deserialize, Serialize};

/// Common generation parameters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommonParams {
    /// Model name
    pub model: String,

    /// Sampling temperature (must be non-negative)
    pub temperature: Option<f32>,

    /// Maximum output tokens
    pub max_tokens: Option<u32>,

    /// Nucleus sampling parameter
    pub top_p: Option<f32>,

    /// Top-k sampling parameter (honored by Anthropic, Gemini and Ollama;
    /// silently ignored by OpenAI, which has no equivalent)
    pub top_k: Option<u32>,

    /// Stop sequences
    pub stop_sequences: Option<Vec<String>>,

    /// Random seed
    pub seed: Option<u64>,
}

impl CommonParams {
    /// Create parameters for a model with everything else defaulted
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Validate common parameters.
    ///
    /// Raised synchronously before any network call; encode-time
    /// validation failures are never silently dropped.
    pub fn validate(&self) -> Result<(), crate::error::LlmError> {
        if self.model.is_empty() {
            return Err(crate::error::LlmError::InvalidInput(
                "Model name cannot be empty".to_string(),
            ));
        }

        if let Some(temp) = self.temperature
            && temp < 0.0
        {
            return Err(crate::error::LlmError::InvalidInput(
                "Temperature must be non-negative".to_string(),
            ));
        }

        if let Some(top_p) = self.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            return Err(crate::error::LlmError::InvalidInput(
                "top_p must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }
}
