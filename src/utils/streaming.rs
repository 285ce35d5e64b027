//! Common streaming utilities
//!
//! Shared plumbing for the two frame grammars the covered vendors speak:
//! SSE (`data: {json}\n\n` blocks, parsed through eventsource-stream for
//! correct UTF-8 and line buffering) and NDJSON (one JSON object per
//! line). Provider modules supply a converter that turns each vendor
//! frame into zero or more unified [`ChatStreamEvent`]s; the factories
//! here own framing, termination and backpressure.
//!
//! Backpressure is implicit: both factories are pull-based generators
//! that only read the next chunk of bytes when the consumer polls for the
//! next event, and buffer no more than one frame's worth of bytes.

use crate::error::LlmError;
use crate::stream::{ChatStream, ChatStreamEvent};
use eventsource_stream::{Event, Eventsource};
use futures_util::StreamExt;
use std::future::Future;
use std::pin::Pin;

/// Type alias for SSE event conversion futures - supports multi-event emission
pub type SseEventFuture<'a> =
    Pin<Box<dyn Future<Output = Vec<Result<ChatStreamEvent, LlmError>>> + Send + Sync + 'a>>;

/// Type alias for JSON line conversion futures - supports multi-event emission
pub type JsonEventFuture<'a> =
    Pin<Box<dyn Future<Output = Vec<Result<ChatStreamEvent, LlmError>>> + Send + Sync + 'a>>;

/// Trait for converting provider-specific SSE events to [`ChatStreamEvent`]s.
///
/// A single vendor frame may fan out to zero, one or several unified
/// events (e.g. the first frame of a stream produces `StreamStart` plus a
/// content delta). Converters must skip malformed frames (with a warning)
/// rather than fail the stream - a malformed frame is not a malformed
/// stream.
pub trait SseEventConverter: Send + Sync {
    /// Convert one SSE event into zero or more unified events
    fn convert_event(&self, event: Event) -> SseEventFuture<'_>;

    /// Flush state at end of stream (e.g. a literal `[DONE]` payload or
    /// byte-source exhaustion). Used to close pending tool calls and emit
    /// the terminal event for vendors without an explicit stop frame.
    fn handle_stream_end(&self) -> Vec<Result<ChatStreamEvent, LlmError>> {
        Vec::new()
    }
}

/// Trait for converting NDJSON lines to [`ChatStreamEvent`]s.
pub trait JsonEventConverter: Send + Sync {
    /// Convert one complete JSON line into zero or more unified events
    fn convert_json<'a>(&'a self, json_data: &'a str) -> JsonEventFuture<'a>;
}

/// Stream factory wiring an HTTP response body to a converter.
///
/// The HTTP status has already been checked by the executor before either
/// factory is reached; these only ever see 2xx bodies.
pub struct StreamFactory;

impl StreamFactory {
    /// Create a chat stream over an SSE response body.
    ///
    /// A literal `[DONE]` payload terminates the stream with success.
    /// The stream also terminates right after the converter emits
    /// `StreamEnd`, which keeps the terminal event unique.
    pub fn create_sse_stream<C>(response: reqwest::Response, converter: C) -> ChatStream
    where
        C: SseEventConverter + 'static,
    {
        let byte_stream = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut events = byte_stream.eventsource();
            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => {
                        tracing::debug!(data = %event.data, "SSE frame");
                        if event.data.trim() == "[DONE]" {
                            for e in converter.handle_stream_end() {
                                yield e;
                            }
                            return;
                        }
                        if event.data.trim().is_empty() {
                            continue;
                        }
                        let mut ended = false;
                        for e in converter.convert_event(event).await {
                            if matches!(e, Ok(ChatStreamEvent::StreamEnd { .. })) {
                                ended = true;
                            }
                            yield e;
                        }
                        if ended {
                            return;
                        }
                    }
                    Err(e) => {
                        // Headers were fine by now, so this is a mid-flight break
                        yield Err(LlmError::StreamError(format!("SSE stream error: {e}")));
                        return;
                    }
                }
            }
            // Byte source exhausted without an explicit terminator
            for e in converter.handle_stream_end() {
                yield e;
            }
        };
        Box::pin(stream)
    }

    /// Create a chat stream over an NDJSON response body.
    ///
    /// Each non-empty line is one complete JSON object. The converter's
    /// `StreamEnd` (the vendor's `done: true` line) terminates the stream
    /// successfully regardless of any remaining bytes.
    pub fn create_ndjson_stream<C>(response: reqwest::Response, converter: C) -> ChatStream
    where
        C: JsonEventConverter + 'static,
    {
        let mut byte_stream = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buf: Vec<u8> = Vec::new();
            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(LlmError::StreamError(format!("NDJSON stream error: {e}")));
                        return;
                    }
                };
                buf.extend_from_slice(&chunk);
                while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                    let line_bytes: Vec<u8> = buf.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line_bytes);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    tracing::debug!(line = %line, "NDJSON frame");
                    let mut ended = false;
                    for e in converter.convert_json(line).await {
                        if matches!(e, Ok(ChatStreamEvent::StreamEnd { .. })) {
                            ended = true;
                        }
                        yield e;
                    }
                    if ended {
                        return;
                    }
                }
            }
            // Trailing object without a final newline
            let tail = String::from_utf8_lossy(&buf);
            let tail = tail.trim();
            if !tail.is_empty() {
                for e in converter.convert_json(tail).await {
                    yield e;
                }
            }
        };
        Box::pin(stream)
    }
}

/// Helper for building multi-event conversions
pub struct EventBuilder {
    events: Vec<ChatStreamEvent>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            // Most conversions produce 1-2 events
            events: Vec::with_capacity(2),
        }
    }

    /// Add a StreamStart event
    pub fn add_stream_start(mut self, metadata: crate::types::ResponseMetadata) -> Self {
        self.events.push(ChatStreamEvent::StreamStart { metadata });
        self
    }

    /// Add a ContentDelta event (only if the delta is not empty)
    pub fn add_content_delta(mut self, delta: String, index: Option<usize>) -> Self {
        if !delta.is_empty() {
            self.events
                .push(ChatStreamEvent::ContentDelta { delta, index });
        }
        self
    }

    /// Add a ThinkingDelta event (only if the delta is not empty)
    pub fn add_thinking_delta(mut self, delta: String) -> Self {
        if !delta.is_empty() {
            self.events.push(ChatStreamEvent::ThinkingDelta { delta });
        }
        self
    }

    /// Add a ToolCallDelta event
    pub fn add_tool_call_delta(
        mut self,
        id: String,
        function_name: Option<String>,
        arguments_delta: Option<String>,
        index: Option<usize>,
    ) -> Self {
        self.events.push(ChatStreamEvent::ToolCallDelta {
            id,
            function_name,
            arguments_delta,
            index,
        });
        self
    }

    /// Add a ToolCallCompleted event
    pub fn add_tool_call_completed(
        mut self,
        id: String,
        function_name: String,
        arguments: serde_json::Value,
    ) -> Self {
        self.events.push(ChatStreamEvent::ToolCallCompleted {
            id,
            function_name,
            arguments,
        });
        self
    }

    /// Add a StreamEnd event
    pub fn add_stream_end(mut self, response: crate::types::ChatResponse) -> Self {
        self.events.push(ChatStreamEvent::StreamEnd { response });
        self
    }

    /// Build the events vector
    pub fn build(self) -> Vec<ChatStreamEvent> {
        self.events
    }

    /// Build the events vector wrapped in Results
    pub fn build_results(self) -> Vec<Result<ChatStreamEvent, LlmError>> {
        self.events.into_iter().map(Ok).collect()
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an accumulated tool call's argument text, dropping the call when
/// the JSON never became valid. Shared by every provider converter.
pub(crate) fn parse_completed_arguments(
    call: crate::utils::accumulator::CompletedToolCall,
) -> Option<(String, String, serde_json::Value)> {
    let raw = if call.arguments.trim().is_empty() {
        "{}"
    } else {
        call.arguments.as_str()
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(arguments) => Some((call.id, call.name, arguments)),
        Err(e) => {
            tracing::warn!(
                id = %call.id,
                name = %call.name,
                error = %e,
                "dropping tool call with undecodable arguments"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FinishReason, MessageContent};

    #[test]
    fn event_builder_skips_empty_deltas() {
        let events = EventBuilder::new()
            .add_content_delta(String::new(), None)
            .add_thinking_delta(String::new())
            .add_content_delta("x".to_string(), None)
            .build();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ChatStreamEvent::ContentDelta { delta, .. } if delta == "x"));
    }

    #[test]
    fn event_builder_orders_completion_before_end() {
        let mut response = crate::types::ChatResponse::new(MessageContent::Text(String::new()));
        response.finish_reason = Some(FinishReason::ToolCalls);
        let events = EventBuilder::new()
            .add_tool_call_completed("t1".into(), "f".into(), serde_json::json!({}))
            .add_stream_end(response)
            .build();
        assert!(matches!(events[0], ChatStreamEvent::ToolCallCompleted { .. }));
        assert!(matches!(events[1], ChatStreamEvent::StreamEnd { .. }));
    }

    #[test]
    fn undecodable_arguments_drop_the_call() {
        let call = crate::utils::accumulator::CompletedToolCall {
            id: "t1".into(),
            name: "f".into(),
            index: None,
            arguments: "{\"q\":".into(),
        };
        assert!(parse_completed_arguments(call).is_none());
    }

    #[test]
    fn empty_arguments_become_empty_object() {
        let call = crate::utils::accumulator::CompletedToolCall {
            id: "t1".into(),
            name: "f".into(),
            index: None,
            arguments: String::new(),
        };
        let (_, _, args) = parse_completed_arguments(call).expect("parsed");
        assert_eq!(args, serde_json::json!({}));
    }
}
