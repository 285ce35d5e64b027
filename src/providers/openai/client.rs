//! OpenAI client implementation
//!
//! One client serving both wire variants; the configured endpoint table
//! decides per model whether a request goes to `/chat/completions` or
//! `/responses`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::executors::{ChatExecutor, HttpChatExecutor};
use crate::stream::ChatStream;
use crate::traits::ChatCapability;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, Tool};
use crate::utils::http_headers::ProviderHeaders;
use crate::utils::url::join_url;

use super::config::OpenAiConfig;

/// OpenAI client
#[derive(Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("provider_name", &"openai")
            .field("model", &self.config.common_params.model)
            .field("base_url", &self.config.base_url)
            .field("responses_api", &self.config.responses_api_enabled())
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn executor(&self) -> HttpChatExecutor {
        let responses_api = self.config.responses_api_enabled();
        let base = self.config.base_url.clone();
        let api_key = self.config.api_key.clone();
        let custom_headers = self.config.http_config.headers.clone();
        let path = if responses_api {
            "/responses"
        } else {
            "/chat/completions"
        };
        let request_transformer: Arc<dyn crate::transformers::RequestTransformer> =
            if responses_api {
                Arc::new(super::responses::OpenAiResponsesRequestTransformer)
            } else {
                Arc::new(super::transformers::OpenAiRequestTransformer)
            };
        let response_transformer: Arc<dyn crate::transformers::ResponseTransformer> =
            if responses_api {
                Arc::new(super::responses::OpenAiResponsesResponseTransformer)
            } else {
                Arc::new(super::transformers::OpenAiResponseTransformer)
            };
        HttpChatExecutor {
            provider_id: "openai".to_string(),
            http_client: self.http_client.clone(),
            request_transformer,
            response_transformer,
            build_url: Box::new(move |_stream| join_url(&base, path)),
            build_headers: Box::new(move || ProviderHeaders::openai(&api_key, &custom_headers)),
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
            common_params: self.config.common_params.clone(),
            http_config: None,
            stream,
        }
    }

    async fn stream_request(&self, request: ChatRequest) -> Result<ChatStream, LlmError> {
        let executor = self.executor();
        if self.config.responses_api_enabled() {
            let converter =
                super::responses::OpenAiResponsesEventConverter::new(&request.common_params.model);
            executor.execute_stream_sse(&request, converter).await
        } else {
            let converter = super::streaming::OpenAiEventConverter::new(&request.common_params.model);
            executor.execute_stream_sse(&request, converter).await
        }
    }
}

#[async_trait]
impl ChatCapability for OpenAiClient {
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
        self.stream_request(request).await
    }

    async fn chat_request(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.executor().execute(&request).await
    }

    async fn chat_stream_request(&self, mut request: ChatRequest) -> Result<ChatStream, LlmError> {
        request.stream = true;
        self.stream_request(request).await
    }
}

impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn clone_box(&self) -> Box<dyn LlmClient> {
        Box::new(self.clone())
    }
}
