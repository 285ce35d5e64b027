//! Generic HTTP chat executor
//!
//! Wires a provider's transformers and stream converter to HTTP. All
//! providers share this path, which guarantees the ordering the error
//! contract requires: the HTTP status is checked and classified before a
//! single stream frame is parsed.

use crate::error::{LlmError, classify_http_error};
use crate::stream::ChatStream;
use crate::transformers::{RequestTransformer, ResponseTransformer};
use crate::types::{ChatRequest, ChatResponse};
use crate::utils::streaming::{JsonEventConverter, SseEventConverter, StreamFactory};
use reqwest::header::HeaderMap;
use std::sync::Arc;

/// Non-streaming execution contract
#[async_trait::async_trait]
pub trait ChatExecutor: Send + Sync {
    async fn execute(&self, req: &ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// Generic HTTP-based chat executor
pub struct HttpChatExecutor {
    pub provider_id: String,
    pub http_client: reqwest::Client,
    pub request_transformer: Arc<dyn RequestTransformer>,
    pub response_transformer: Arc<dyn ResponseTransformer>,
    /// Strategy hooks: URL may differ between streaming and not
    pub build_url: Box<dyn Fn(bool) -> String + Send + Sync>,
    pub build_headers: Box<dyn Fn() -> Result<HeaderMap, LlmError> + Send + Sync>,
}

impl HttpChatExecutor {
    /// POST the encoded request; classify any non-2xx status before
    /// anything downstream touches the body.
    async fn send(&self, req: &ChatRequest) -> Result<reqwest::Response, LlmError> {
        let body = self.request_transformer.transform_chat(req)?;
        let url = (self.build_url)(req.stream);
        let headers = (self.build_headers)()?;

        tracing::debug!(provider = %self.provider_id, url = %url, stream = req.stream, "sending chat request");

        let resp = self
            .http_client
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let headers = resp.headers().clone();
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_http_error(
                &self.provider_id,
                status.as_u16(),
                &text,
                &headers,
                status.canonical_reason(),
            ));
        }
        Ok(resp)
    }

    /// Streaming execution over SSE framing
    pub async fn execute_stream_sse<C>(
        &self,
        req: &ChatRequest,
        converter: C,
    ) -> Result<ChatStream, LlmError>
    where
        C: SseEventConverter + 'static,
    {
        let resp = self.send(req).await?;
        Ok(StreamFactory::create_sse_stream(resp, converter))
    }

    /// Streaming execution over NDJSON framing
    pub async fn execute_stream_ndjson<C>(
        &self,
        req: &ChatRequest,
        converter: C,
    ) -> Result<ChatStream, LlmError>
    where
        C: JsonEventConverter + 'static,
    {
        let resp = self.send(req).await?;
        Ok(StreamFactory::create_ndjson_stream(resp, converter))
    }
}

#[async_trait::async_trait]
impl ChatExecutor for HttpChatExecutor {
    async fn execute(&self, req: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let resp = self.send(req).await?;
        let text = resp.text().await?;
        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| LlmError::ParseError(format!("Failed to parse response JSON: {e}")))?;
        self.response_transformer.transform_chat_response(&json)
    }
}
