//! Ollama client implementation

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::executors::{ChatExecutor, HttpChatExecutor};
use crate::stream::ChatStream;
use crate::traits::ChatCapability;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, CommonParams, HttpConfig, Tool};
use crate::utils::http_headers::ProviderHeaders;
use crate::utils::url::join_url;

/// Ollama client
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    http_client: reqwest::Client,
    http_config: HttpConfig,
    common_params: CommonParams,
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("provider_name", &"ollama")
            .field("model", &self.common_params.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OllamaClient {
    /// Creates a new Ollama client. Local inference needs no API key.
    pub fn new(
        base_url: String,
        http_client: reqwest::Client,
        common_params: CommonParams,
        http_config: HttpConfig,
    ) -> Self {
        Self {
            base_url,
            http_client,
            http_config,
            common_params,
        }
    }

    fn executor(&self) -> HttpChatExecutor {
        let base = self.base_url.clone();
        let custom_headers = self.http_config.headers.clone();
        HttpChatExecutor {
            provider_id: "ollama".to_string(),
            http_client: self.http_client.clone(),
            request_transformer: Arc::new(super::transformers::OllamaRequestTransformer),
            response_transformer: Arc::new(super::transformers::OllamaResponseTransformer),
            build_url: Box::new(move |_stream| join_url(&base, "/api/chat")),
            build_headers: Box::new(move || ProviderHeaders::ollama(&custom_headers)),
        }
    }

    fn request(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
        stream: bool,
    ) -> ChatRequest {
        ChatRequest {
            messages,
            tools,
            tool_choice: None,
            common_params: self.common_params.clone(),
            http_config: None,
            stream,
        }
    }
}

#[async_trait]
impl ChatCapability for OllamaClient {
    async fn chat_with_tools(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponse, LlmError> {
        let request = self.request(messages, tools, false);
        self.executor().execute(&request).await
    }

    async fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatStream, LlmError> {
        let request = self.request(messages, tools, true);
        let converter = super::streaming::OllamaEventConverter::new(&self.common_params.model);
        self.executor()
            .execute_stream_ndjson(&request, converter)
            .await
    }

    async fn chat_request(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.executor().execute(&request).await
    }

    async fn chat_stream_request(&self, mut request: ChatRequest) -> Result<ChatStream, LlmError> {
        request.stream = true;
        let converter = super::streaming::OllamaEventConverter::new(&request.common_params.model);
        self.executor()
            .execute_stream_ndjson(&request, converter)
            .await
    }
}

impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn clone_box(&self) -> Box<dyn LlmClient> {
        Box::new(self.clone())
    }
}
