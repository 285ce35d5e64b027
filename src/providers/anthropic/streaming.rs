//! Anthropic streaming implementation using eventsource-stream
//!
//! Converts the Anthropic SSE event taxonomy (`message_start`,
//! `content_block_start`, `content_block_delta`, `content_block_stop`,
//! `message_delta`, `message_stop`, `error`) into the unified event
//! sequence. Tool-call argument fragments (`input_json_delta`) pass
//! through the accumulator keyed by block index and complete at
//! `content_block_stop`.

use crate::error::LlmError;
use crate::stream::ChatStreamEvent;
use crate::types::{ChatResponse, FinishReason, MessageContent, ResponseMetadata, Usage};
use crate::utils::accumulator::{ToolCallAccumulator, ToolCallKey};
use crate::utils::streaming::{EventBuilder, SseEventConverter, SseEventFuture, parse_completed_arguments};
use eventsource_stream::Event;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Anthropic stream event structure.
/// Flexible on purpose: unknown fields and absent members never fail a parse.
#[derive(Debug, Clone, Deserialize)]
struct AnthropicStreamEvent {
    r#type: String,
    #[serde(default)]
    message: Option<AnthropicStreamMessage>,
    #[serde(default)]
    delta: Option<AnthropicDelta>,
    #[serde(default)]
    usage: Option<AnthropicStreamUsage>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    content_block: Option<serde_json::Value>,
}

/// `message_start` payload
#[derive(Debug, Clone, Deserialize)]
struct AnthropicStreamMessage {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicStreamUsage>,
}

/// Delta payloads: text_delta, input_json_delta, thinking_delta, plus the
/// stop fields carried by message_delta
#[derive(Debug, Clone, Deserialize)]
struct AnthropicDelta {
    #[serde(rename = "type")]
    #[serde(default)]
    delta_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    partial_json: Option<String>,
    #[serde(default)]
    thinking: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnthropicStreamUsage {
    #[serde(default)]
    input_tokens: Option<u32>,
    #[serde(default)]
    output_tokens: Option<u32>,
}

/// Per-stream mutable state. Owned by one converter, which is owned by
/// one stream; discarded when the stream is dropped.
#[derive(Default)]
struct StreamState {
    response_id: Option<String>,
    model: Option<String>,
    block_types: HashMap<usize, String>,
    accumulator: ToolCallAccumulator,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

/// Anthropic event converter
pub struct AnthropicEventConverter {
    model: String,
    state: Mutex<StreamState>,
    stream_started: AtomicBool,
    stream_ended: AtomicBool,
    tool_call_completed: AtomicBool,
}

impl AnthropicEventConverter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            state: Mutex::new(StreamState::default()),
            stream_started: AtomicBool::new(false),
            stream_ended: AtomicBool::new(false),
            tool_call_completed: AtomicBool::new(false),
        }
    }

    /// The first frame of any kind opens the stream
    fn take_stream_start(&self) -> Option<ResponseMetadata> {
        if self.stream_started.swap(true, Ordering::Relaxed) {
            return None;
        }
        let state = self.state.lock().expect("stream state lock");
        Some(ResponseMetadata {
            id: state.response_id.clone(),
            model: state.model.clone().or_else(|| Some(self.model.clone())),
            created: Some(chrono::Utc::now()),
            provider: "anthropic".to_string(),
        })
    }

    fn merge_usage(state: &mut StreamState, usage: &AnthropicStreamUsage) {
        let current = state.usage.get_or_insert_with(Usage::default);
        if let Some(input) = usage.input_tokens {
            current.prompt_tokens = input;
        }
        if let Some(output) = usage.output_tokens {
            current.completion_tokens = output;
        }
        current.total_tokens = current.prompt_tokens + current.completion_tokens;
    }

    /// Convert one parsed Anthropic event into zero or more unified events
    fn convert_anthropic_event(&self, event: AnthropicStreamEvent) -> Vec<ChatStreamEvent> {
        let mut builder = EventBuilder::new();

        match event.r#type.as_str() {
            "message_start" => {
                if let Some(message) = event.message {
                    let mut state = self.state.lock().expect("stream state lock");
                    state.response_id = message.id;
                    state.model = message.model;
                    if let Some(usage) = &message.usage {
                        Self::merge_usage(&mut state, usage);
                    }
                }
                if let Some(metadata) = self.take_stream_start() {
                    builder = builder.add_stream_start(metadata);
                }
                builder.build()
            }
            "content_block_start" => {
                if let Some(metadata) = self.take_stream_start() {
                    builder = builder.add_stream_start(metadata);
                }
                let Some(content_block) = event.content_block else {
                    return builder.build();
                };
                let block_type = content_block
                    .get("type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();

                let mut state = self.state.lock().expect("stream state lock");
                if let Some(idx) = event.index {
                    state.block_types.insert(idx, block_type.clone());
                }

                if block_type == "tool_use" {
                    let id = content_block
                        .get("id")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string();
                    let name = content_block
                        .get("name")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string();
                    if !id.is_empty() && !name.is_empty() {
                        state.accumulator.open(&id, &name, event.index);
                        builder =
                            builder.add_tool_call_delta(id, Some(name), None, event.index);
                    }
                }
                builder.build()
            }
            "content_block_delta" => {
                if let Some(metadata) = self.take_stream_start() {
                    builder = builder.add_stream_start(metadata);
                }
                let Some(delta) = event.delta else {
                    return builder.build();
                };
                match delta.delta_type.as_deref() {
                    Some("text_delta") | None => {
                        if let Some(text) = delta.text {
                            builder = builder.add_content_delta(text, None);
                        }
                        if let Some(thinking) = delta.thinking {
                            builder = builder.add_thinking_delta(thinking);
                        }
                    }
                    Some("thinking_delta") => {
                        if let Some(thinking) = delta.thinking {
                            builder = builder.add_thinking_delta(thinking);
                        }
                    }
                    Some("input_json_delta") => {
                        if let (Some(partial_json), Some(idx)) = (delta.partial_json, event.index)
                            && !partial_json.is_empty()
                        {
                            let mut state = self.state.lock().expect("stream state lock");
                            if state
                                .accumulator
                                .append(ToolCallKey::Index(idx), &partial_json)
                            {
                                let id = state
                                    .accumulator
                                    .id_for(ToolCallKey::Index(idx))
                                    .unwrap_or_default()
                                    .to_string();
                                builder = builder.add_tool_call_delta(
                                    id,
                                    None,
                                    Some(partial_json),
                                    Some(idx),
                                );
                            } else {
                                tracing::warn!(index = idx, "input_json_delta for unopened tool call");
                            }
                        }
                    }
                    Some(_) => {}
                }
                builder.build()
            }
            "content_block_stop" => {
                let Some(idx) = event.index else {
                    return builder.build();
                };
                let mut state = self.state.lock().expect("stream state lock");
                if state.block_types.get(&idx).map(String::as_str) == Some("tool_use")
                    && let Some(call) = state.accumulator.close(ToolCallKey::Index(idx))
                    && let Some((id, name, arguments)) = parse_completed_arguments(call)
                {
                    self.tool_call_completed.store(true, Ordering::Relaxed);
                    builder = builder.add_tool_call_completed(id, name, arguments);
                }
                builder.build()
            }
            "message_delta" => {
                if let Some(usage) = &event.usage {
                    // Captured silently; attached to the terminal event
                    let mut state = self.state.lock().expect("stream state lock");
                    Self::merge_usage(&mut state, usage);
                }
                if let Some(delta) = &event.delta {
                    if let Some(thinking) = &delta.thinking
                        && !thinking.is_empty()
                    {
                        builder = builder.add_thinking_delta(thinking.clone());
                    }
                    if let Some(stop_reason) = &delta.stop_reason {
                        let mut state = self.state.lock().expect("stream state lock");
                        state.stop_reason = Some(stop_reason.clone());
                    }
                }
                builder.build()
            }
            "message_stop" => {
                if self.stream_ended.swap(true, Ordering::Relaxed) {
                    return builder.build();
                }
                let mut state = self.state.lock().expect("stream state lock");
                let vendor_reason =
                    super::utils::parse_finish_reason(state.stop_reason.as_deref())
                        .unwrap_or(FinishReason::Stop);
                // Tool-call completion takes priority over the vendor's stop signal
                let finish_reason = if self.tool_call_completed.load(Ordering::Relaxed) {
                    FinishReason::ToolCalls
                } else {
                    vendor_reason
                };
                let response = ChatResponse {
                    id: state.response_id.clone(),
                    model: state.model.clone(),
                    content: MessageContent::Text(String::new()),
                    usage: state.usage.take(),
                    finish_reason: Some(finish_reason),
                    tool_calls: None,
                    thinking: None,
                };
                builder.add_stream_end(response).build()
            }
            "error" => {
                let error = event
                    .error
                    .as_ref()
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| "Anthropic streaming error".to_string());
                vec![ChatStreamEvent::Error { error }]
            }
            // ping and future event types
            _ => builder.build(),
        }
    }
}

impl SseEventConverter for AnthropicEventConverter {
    fn convert_event(&self, event: Event) -> SseEventFuture<'_> {
        Box::pin(async move {
            match serde_json::from_str::<AnthropicStreamEvent>(&event.data) {
                Ok(anthropic_event) => self
                    .convert_anthropic_event(anthropic_event)
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Err(e) => {
                    // A malformed frame is not a malformed stream
                    tracing::warn!(error = %e, data = %event.data, "skipping malformed Anthropic frame");
                    vec![]
                }
            }
        })
    }

    fn handle_stream_end(&self) -> Vec<Result<ChatStreamEvent, LlmError>> {
        // No message_stop means the stream broke before finishing; unclosed
        // tool calls and pending usage are discarded, never surfaced.
        let state = self.state.lock().expect("stream state lock");
        if !state.accumulator.is_empty() {
            tracing::warn!(
                open_calls = state.accumulator.len(),
                "stream ended with unclosed tool calls; dropping them"
            );
        }
        Vec::new()
    }
}
