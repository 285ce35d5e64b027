//! Gemini streaming implementation (`alt=sse`)
//!
//! Gemini streams generateContent chunks as SSE frames whose payload is
//! the same JSON shape as the non-streaming response. Function calls are
//! atomic - the arguments arrive whole in one `functionCall` part, so a
//! call opens, appends once and closes within the same frame. The final
//! chunk carries `finishReason` and `usageMetadata`.

use crate::error::LlmError;
use crate::stream::ChatStreamEvent;
use crate::types::{ChatResponse, FinishReason, MessageContent, ResponseMetadata, Usage};
use crate::utils::streaming::{EventBuilder, SseEventConverter, SseEventFuture};
use eventsource_stream::Event;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::types::GeminiResponse;

#[derive(Default)]
struct StreamState {
    response_id: Option<String>,
    model: Option<String>,
    usage: Option<Usage>,
}

/// Gemini event converter
pub struct GeminiEventConverter {
    model: String,
    state: Mutex<StreamState>,
    /// Gemini has no call ids; synthesized per stream
    next_tool_call_id: AtomicU64,
    stream_started: AtomicBool,
    stream_ended: AtomicBool,
    tool_call_completed: AtomicBool,
}

impl GeminiEventConverter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            state: Mutex::new(StreamState::default()),
            next_tool_call_id: AtomicU64::new(0),
            stream_started: AtomicBool::new(false),
            stream_ended: AtomicBool::new(false),
            tool_call_completed: AtomicBool::new(false),
        }
    }

    fn take_stream_start(&self) -> Option<ResponseMetadata> {
        if self.stream_started.swap(true, Ordering::Relaxed) {
            return None;
        }
        let state = self.state.lock().expect("stream state lock");
        Some(ResponseMetadata {
            id: state.response_id.clone(),
            model: state.model.clone().or_else(|| Some(self.model.clone())),
            created: Some(chrono::Utc::now()),
            provider: "gemini".to_string(),
        })
    }

    fn convert_gemini_response(&self, response: GeminiResponse) -> Vec<ChatStreamEvent> {
        {
            let mut state = self.state.lock().expect("stream state lock");
            if state.response_id.is_none() {
                state.response_id = response.response_id.clone();
            }
            if state.model.is_none() {
                state.model = response.model_version.clone();
            }
            // usageMetadata may appear on any chunk; keep the latest
            if let Some(usage) = &response.usage_metadata {
                state.usage = Some(usage.clone().into_usage());
            }
        }

        let mut builder = EventBuilder::new();
        if let Some(metadata) = self.take_stream_start() {
            builder = builder.add_stream_start(metadata);
        }

        let Some(candidate) = response.candidates.as_ref().and_then(|c| c.first()) else {
            return builder.build();
        };

        if let Some(parts) = candidate.content.as_ref().and_then(|c| c.parts.as_ref()) {
            for part in parts {
                if let Some(text) = &part.text {
                    if part.thought == Some(true) {
                        builder = builder.add_thinking_delta(text.clone());
                    } else {
                        builder = builder.add_content_delta(text.clone(), None);
                    }
                }
                if let Some(fc) = &part.function_call {
                    // Atomic delivery: open, deliver the whole argument
                    // payload, and complete in one step
                    let id_num = self.next_tool_call_id.fetch_add(1, Ordering::Relaxed);
                    let id = format!("call_{id_num}");
                    let args = fc.args.clone().unwrap_or(serde_json::json!({}));
                    self.tool_call_completed.store(true, Ordering::Relaxed);
                    builder = builder
                        .add_tool_call_delta(
                            id.clone(),
                            Some(fc.name.clone()),
                            Some(args.to_string()),
                            None,
                        )
                        .add_tool_call_completed(id, fc.name.clone(), args);
                }
            }
        }

        if let Some(reason) = &candidate.finish_reason {
            if self.stream_ended.swap(true, Ordering::Relaxed) {
                return builder.build();
            }
            let vendor_reason = super::convert::parse_finish_reason(Some(reason.as_str()))
                .unwrap_or(FinishReason::Stop);
            let finish_reason = if self.tool_call_completed.load(Ordering::Relaxed) {
                FinishReason::ToolCalls
            } else {
                vendor_reason
            };
            let mut state = self.state.lock().expect("stream state lock");
            let response = ChatResponse {
                id: state.response_id.clone(),
                model: state.model.clone(),
                content: MessageContent::Text(String::new()),
                usage: state.usage.take(),
                finish_reason: Some(finish_reason),
                tool_calls: None,
                thinking: None,
            };
            builder = builder.add_stream_end(response);
        }

        builder.build()
    }
}

impl SseEventConverter for GeminiEventConverter {
    fn convert_event(&self, event: Event) -> SseEventFuture<'_> {
        Box::pin(async move {
            match serde_json::from_str::<GeminiResponse>(&event.data) {
                Ok(response) => self
                    .convert_gemini_response(response)
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, data = %event.data, "skipping malformed Gemini frame");
                    vec![]
                }
            }
        })
    }

    fn handle_stream_end(&self) -> Vec<Result<ChatStreamEvent, LlmError>> {
        // Gemini ends its stream after the finishReason chunk; if that
        // chunk never arrived the stream broke and no terminal event is
        // synthesized.
        Vec::new()
    }
}
