//! Gemini wire types

use serde::Deserialize;

/// generateContent response (shared by the non-streaming endpoint and
/// each streaming chunk)
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "usageMetadata")]
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(rename = "modelVersion")]
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(rename = "responseId")]
    #[serde(default)]
    pub response_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Option<Vec<GeminiPart>>,
    #[serde(default)]
    pub role: Option<String>,
}

/// One part of a candidate's content: text, a thought summary, or an
/// atomic function call
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: Option<String>,
    /// Whether this part is a thought summary (thinking models)
    #[serde(default)]
    pub thought: Option<bool>,
    #[serde(rename = "functionCall")]
    #[serde(default)]
    pub function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiUsageMetadata {
    #[serde(rename = "promptTokenCount")]
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    #[serde(default)]
    pub total_token_count: Option<u32>,
    #[serde(rename = "thoughtsTokenCount")]
    #[serde(default)]
    pub thoughts_token_count: Option<u32>,
}

impl GeminiUsageMetadata {
    pub fn into_usage(self) -> crate::types::Usage {
        let prompt = self.prompt_token_count.unwrap_or(0);
        let completion = self.candidates_token_count.unwrap_or(0);
        crate::types::Usage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: self.total_token_count.unwrap_or(prompt + completion),
            cached_tokens: None,
            reasoning_tokens: self.thoughts_token_count,
        }
    }
}
