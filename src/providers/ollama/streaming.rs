//! Ollama NDJSON streaming implementation
//!
//! Each line is one complete JSON object `{model, message, done, ...}`.
//! The `done: true` line terminates the stream and carries the eval
//! counters that become usage. Tool calls arrive whole on a single line
//! with positional keying only, so each one opens and completes in the
//! same step with a synthesized `call_{i}` id.

use crate::stream::ChatStreamEvent;
use crate::types::{ChatResponse, FinishReason, MessageContent, ResponseMetadata};
use crate::utils::streaming::{EventBuilder, JsonEventConverter, JsonEventFuture};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::types::OllamaChatResponse;

/// Ollama event converter
pub struct OllamaEventConverter {
    model: String,
    stream_model: Mutex<Option<String>>,
    next_tool_call_id: AtomicU64,
    stream_started: AtomicBool,
    tool_call_completed: AtomicBool,
}

impl OllamaEventConverter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            stream_model: Mutex::new(None),
            next_tool_call_id: AtomicU64::new(0),
            stream_started: AtomicBool::new(false),
            tool_call_completed: AtomicBool::new(false),
        }
    }

    fn take_stream_start(&self, response: &OllamaChatResponse) -> Option<ResponseMetadata> {
        if self.stream_started.swap(true, Ordering::Relaxed) {
            return None;
        }
        Some(ResponseMetadata {
            id: None,
            model: response.model.clone().or_else(|| Some(self.model.clone())),
            created: Some(chrono::Utc::now()),
            provider: "ollama".to_string(),
        })
    }

    fn convert_ollama_response(&self, response: OllamaChatResponse) -> Vec<ChatStreamEvent> {
        let mut builder = EventBuilder::new();

        if let Some(metadata) = self.take_stream_start(&response) {
            builder = builder.add_stream_start(metadata);
        }
        if let Some(model) = &response.model {
            let mut stream_model = self.stream_model.lock().expect("stream model lock");
            if stream_model.is_none() {
                *stream_model = Some(model.clone());
            }
        }

        if let Some(message) = &response.message {
            if let Some(thinking) = &message.thinking {
                builder = builder.add_thinking_delta(thinking.clone());
            }
            if let Some(content) = &message.content {
                builder = builder.add_content_delta(content.clone(), None);
            }
            if let Some(tool_calls) = &message.tool_calls {
                for call in tool_calls {
                    // Whole-call delivery: open, deliver and complete at once
                    let id_num = self.next_tool_call_id.fetch_add(1, Ordering::Relaxed);
                    let id = format!("call_{id_num}");
                    let args = call.function.arguments.clone();
                    self.tool_call_completed.store(true, Ordering::Relaxed);
                    builder = builder
                        .add_tool_call_delta(
                            id.clone(),
                            Some(call.function.name.clone()),
                            Some(args.to_string()),
                            None,
                        )
                        .add_tool_call_completed(id, call.function.name.clone(), args);
                }
            }
        }

        // done=true terminates the stream regardless of remaining bytes
        if response.done == Some(true) {
            let vendor_reason =
                super::transformers::parse_done_reason(response.done_reason.as_deref());
            let finish_reason = if self.tool_call_completed.load(Ordering::Relaxed) {
                FinishReason::ToolCalls
            } else {
                vendor_reason
            };
            let end = ChatResponse {
                id: None,
                model: self
                    .stream_model
                    .lock()
                    .expect("stream model lock")
                    .clone(),
                content: MessageContent::Text(String::new()),
                usage: super::transformers::usage_from_counts(
                    response.prompt_eval_count,
                    response.eval_count,
                ),
                finish_reason: Some(finish_reason),
                tool_calls: None,
                thinking: None,
            };
            builder = builder.add_stream_end(end);
        }

        builder.build()
    }
}

impl JsonEventConverter for OllamaEventConverter {
    fn convert_json<'a>(&'a self, json_data: &'a str) -> JsonEventFuture<'a> {
        Box::pin(async move {
            match serde_json::from_str::<OllamaChatResponse>(json_data) {
                Ok(response) => self
                    .convert_ollama_response(response)
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, line = %json_data, "skipping malformed Ollama line");
                    vec![]
                }
            }
        })
    }
}
