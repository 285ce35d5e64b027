//! OpenAI chat completions streaming implementation
//!
//! Converts `choices[].delta` SSE frames into the unified event sequence.
//! Tool-call argument fragments arrive keyed by positional index (the
//! call id and function name appear only on the opening fragment); they
//! pass through the accumulator and complete when the vendor reports a
//! finish reason. The trailing usage-only frame (requested via
//! `stream_options.include_usage`) is captured silently and attached to
//! the terminal event produced by the literal `[DONE]` payload.

use crate::error::LlmError;
use crate::stream::ChatStreamEvent;
use crate::types::{ChatResponse, FinishReason, MessageContent, ResponseMetadata, Usage};
use crate::utils::accumulator::{ToolCallAccumulator, ToolCallKey};
use crate::utils::streaming::{EventBuilder, SseEventConverter, SseEventFuture, parse_completed_arguments};
use eventsource_stream::Event;
use serde::Deserialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// OpenAI stream event structure
#[derive(Debug, Clone, Deserialize)]
struct OpenAiStreamEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Option<Vec<OpenAiStreamChoice>>,
    #[serde(default)]
    usage: Option<super::transformers::OpenAiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiStreamChoice {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    delta: Option<OpenAiStreamDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone)]
struct OpenAiStreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCallDelta>>,
    thinking: Option<String>,
}

impl<'de> serde::Deserialize<'de> for OpenAiStreamDelta {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;

        // Reasoning text appears under different names across compatible
        // backends; priority order: reasoning_content > thinking > reasoning
        let thinking = extract_thinking_from_multiple_fields(&value);
        let content = value
            .get("content")
            .and_then(|v| v.as_str())
            .map(String::from);
        let tool_calls = value
            .get("tool_calls")
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        Ok(OpenAiStreamDelta {
            content,
            tool_calls,
            thinking,
        })
    }
}

/// Extract reasoning content from the known field names, in priority order
pub(crate) fn extract_thinking_from_multiple_fields(value: &serde_json::Value) -> Option<String> {
    ["reasoning_content", "thinking", "reasoning"]
        .iter()
        .find_map(|field| {
            value
                .get(field)
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(String::from)
        })
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiToolCallDelta {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<OpenAiFunctionCallDelta>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiFunctionCallDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Default)]
struct StreamState {
    response_id: Option<String>,
    model: Option<String>,
    accumulator: ToolCallAccumulator,
    finish_reason: Option<String>,
    usage: Option<Usage>,
}

/// OpenAI event converter
pub struct OpenAiEventConverter {
    model: String,
    state: Mutex<StreamState>,
    stream_started: AtomicBool,
    stream_ended: AtomicBool,
    tool_call_completed: AtomicBool,
}

impl OpenAiEventConverter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            state: Mutex::new(StreamState::default()),
            stream_started: AtomicBool::new(false),
            stream_ended: AtomicBool::new(false),
            tool_call_completed: AtomicBool::new(false),
        }
    }

    fn take_stream_start(&self, event: &OpenAiStreamEvent) -> Option<ResponseMetadata> {
        if self.stream_started.swap(true, Ordering::Relaxed) {
            return None;
        }
        Some(ResponseMetadata {
            id: event.id.clone(),
            model: event.model.clone().or_else(|| Some(self.model.clone())),
            created: Some(chrono::Utc::now()),
            provider: "openai".to_string(),
        })
    }

    fn convert_openai_event(&self, event: OpenAiStreamEvent) -> Vec<ChatStreamEvent> {
        let mut builder = EventBuilder::new();

        if let Some(metadata) = self.take_stream_start(&event) {
            builder = builder.add_stream_start(metadata);
        }

        {
            let mut state = self.state.lock().expect("stream state lock");
            if state.response_id.is_none() {
                state.response_id = event.id.clone();
            }
            if state.model.is_none() {
                state.model = event.model.clone();
            }
            // The trailing usage frame produces no visible delta
            if let Some(usage) = event.usage {
                state.usage = Some(usage.into_usage());
            }
        }

        let Some(choice) = event.choices.as_ref().and_then(|c| c.first()) else {
            return builder.build();
        };
        let choice_index = choice.index;

        if let Some(delta) = &choice.delta {
            if let Some(content) = &delta.content
                && !content.is_empty()
            {
                builder = builder.add_content_delta(content.clone(), choice_index);
            }
            if let Some(thinking) = &delta.thinking {
                builder = builder.add_thinking_delta(thinking.clone());
            }
            if let Some(tool_calls) = &delta.tool_calls {
                let mut state = self.state.lock().expect("stream state lock");
                for tc in tool_calls {
                    let index = tc.index.unwrap_or(0);
                    let name = tc.function.as_ref().and_then(|f| f.name.clone());
                    let fragment = tc.function.as_ref().and_then(|f| f.arguments.clone());

                    // The opening fragment carries the id (and usually the
                    // name); later fragments address the call by index only
                    if let Some(id) = &tc.id {
                        state
                            .accumulator
                            .open(id, name.clone().unwrap_or_default(), Some(index));
                    }
                    let id = state
                        .accumulator
                        .id_for(ToolCallKey::Index(index))
                        .unwrap_or_default()
                        .to_string();
                    if id.is_empty() {
                        tracing::warn!(index, "tool-call fragment for unopened call");
                        continue;
                    }
                    if let Some(fragment) = &fragment {
                        state.accumulator.append(ToolCallKey::Index(index), fragment);
                    }
                    builder = builder.add_tool_call_delta(id, name, fragment, Some(index));
                }
            }
        }

        if let Some(finish_reason) = &choice.finish_reason {
            let mut state = self.state.lock().expect("stream state lock");
            state.finish_reason = Some(finish_reason.clone());
            // The finish frame is the close signal: flush every open call
            for call in state.accumulator.close_all() {
                if let Some((id, name, arguments)) = parse_completed_arguments(call) {
                    self.tool_call_completed.store(true, Ordering::Relaxed);
                    builder = builder.add_tool_call_completed(id, name, arguments);
                }
            }
        }

        builder.build()
    }
}

impl SseEventConverter for OpenAiEventConverter {
    fn convert_event(&self, event: Event) -> SseEventFuture<'_> {
        Box::pin(async move {
            match serde_json::from_str::<OpenAiStreamEvent>(&event.data) {
                Ok(openai_event) => self
                    .convert_openai_event(openai_event)
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, data = %event.data, "skipping malformed OpenAI frame");
                    vec![]
                }
            }
        })
    }

    /// `[DONE]` (or byte-source exhaustion) produces the terminal event
    fn handle_stream_end(&self) -> Vec<Result<ChatStreamEvent, LlmError>> {
        if self.stream_ended.swap(true, Ordering::Relaxed) {
            return Vec::new();
        }
        let mut state = self.state.lock().expect("stream state lock");
        if !state.accumulator.is_empty() {
            // No finish frame ever closed these; they are unusable
            tracing::warn!(
                open_calls = state.accumulator.len(),
                "stream ended with unclosed tool calls; dropping them"
            );
        }
        let vendor_reason =
            super::transformers::parse_finish_reason(state.finish_reason.as_deref())
                .unwrap_or(FinishReason::Stop);
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
        EventBuilder::new().add_stream_end(response).build_results()
    }
}
