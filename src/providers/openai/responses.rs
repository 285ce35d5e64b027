//! OpenAI Responses API wire variant
//!
//! The Responses endpoint speaks a different request shape (`input` items,
//! `instructions`, `max_output_tokens`) and a typed SSE event family
//! (`response.created`, `response.output_text.delta`,
//! `response.function_call_arguments.delta`, `response.completed`, ...)
//! terminated by a literal `[DONE]`. Non-streaming responses carry an
//! `output[]` array of typed items (`message`, `reasoning`,
//! `function_call`).

use crate::error::LlmError;
use crate::stream::ChatStreamEvent;
use crate::transformers::{RequestTransformer, ResponseTransformer};
use crate::types::{
    ChatRequest, ChatResponse, ContentPart, FinishReason, FunctionCall, MessageContent,
    MessageRole, ResponseMetadata, ToolCall, ToolChoice, Usage,
};
use crate::utils::accumulator::{ToolCallAccumulator, ToolCallKey};
use crate::utils::streaming::{EventBuilder, SseEventConverter, SseEventFuture, parse_completed_arguments};
use eventsource_stream::Event;
use serde::Deserialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Request transformer for the Responses endpoint
#[derive(Clone, Default)]
pub struct OpenAiResponsesRequestTransformer;

impl RequestTransformer for OpenAiResponsesRequestTransformer {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn transform_chat(&self, req: &ChatRequest) -> Result<serde_json::Value, LlmError> {
        req.common_params.validate()?;

        let mut instructions: Vec<String> = Vec::new();
        let mut input = Vec::new();

        for message in &req.messages {
            match message.role {
                MessageRole::System => instructions.push(message.content.all_text()),
                MessageRole::User => input.push(serde_json::json!({
                    "role": "user",
                    "content": convert_input_content(&message.content, "input_text")?
                })),
                MessageRole::Assistant => {
                    // Assistant tool calls become standalone function_call items
                    let mut text_parts = Vec::new();
                    if let MessageContent::MultiModal(parts) = &message.content {
                        for part in parts {
                            if let ContentPart::ToolCall {
                                tool_call_id,
                                tool_name,
                                arguments,
                            } = part
                            {
                                input.push(serde_json::json!({
                                    "type": "function_call",
                                    "call_id": tool_call_id,
                                    "name": tool_name,
                                    "arguments": arguments.to_string()
                                }));
                            } else if let ContentPart::Text { text } = part {
                                text_parts.push(text.clone());
                            }
                        }
                    } else {
                        text_parts.push(message.content.all_text());
                    }
                    if !text_parts.is_empty() {
                        input.push(serde_json::json!({
                            "role": "assistant",
                            "content": text_parts.join("")
                        }));
                    }
                }
                MessageRole::Tool => {
                    if let MessageContent::MultiModal(parts) = &message.content {
                        for part in parts {
                            if let ContentPart::ToolResult {
                                tool_call_id,
                                result,
                                ..
                            } = part
                            {
                                let output = match result {
                                    serde_json::Value::String(s) => s.clone(),
                                    other => other.to_string(),
                                };
                                input.push(serde_json::json!({
                                    "type": "function_call_output",
                                    "call_id": tool_call_id,
                                    "output": output
                                }));
                            }
                        }
                    }
                }
            }
        }

        let mut body = serde_json::json!({
            "model": req.common_params.model,
            "input": input,
        });
        if !instructions.is_empty() {
            body["instructions"] = serde_json::json!(instructions.join("\n\n"));
        }
        if let Some(t) = req.common_params.temperature {
            body["temperature"] = serde_json::json!(t);
        }
        if let Some(max) = req.common_params.max_tokens {
            body["max_output_tokens"] = serde_json::json!(max);
        }
        if let Some(tp) = req.common_params.top_p {
            body["top_p"] = serde_json::json!(tp);
        }
        if let Some(tools) = &req.tools
            && !tools.is_empty()
        {
            // Responses tools are flat: name/description/parameters at top level
            let converted: Vec<_> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "name": t.function.name,
                        "description": t.function.description,
                        "parameters": t.function.parameters
                    })
                })
                .collect();
            body["tools"] = serde_json::json!(converted);
            if let Some(choice) = &req.tool_choice {
                body["tool_choice"] = match choice {
                    ToolChoice::Auto => serde_json::json!("auto"),
                    ToolChoice::Required => serde_json::json!("required"),
                    ToolChoice::None => serde_json::json!("none"),
                    ToolChoice::Tool { name } => {
                        serde_json::json!({ "type": "function", "name": name })
                    }
                };
            }
        }
        if req.stream {
            body["stream"] = serde_json::json!(true);
        }
        Ok(body)
    }
}

/// Convert message content into Responses input parts
fn convert_input_content(
    content: &MessageContent,
    text_type: &str,
) -> Result<serde_json::Value, LlmError> {
    match content {
        MessageContent::Text(text) => Ok(serde_json::json!([
            { "type": text_type, "text": text }
        ])),
        MessageContent::MultiModal(parts) => {
            let mut out = Vec::new();
            for part in parts {
                match part {
                    ContentPart::Text { text } => {
                        out.push(serde_json::json!({ "type": text_type, "text": text }));
                    }
                    ContentPart::Image {
                        source, media_type, ..
                    } => {
                        use base64::Engine;
                        let url = match source {
                            crate::types::MediaSource::Url { url } => url.clone(),
                            crate::types::MediaSource::Base64 { data } => {
                                let media_type = media_type.as_deref().unwrap_or("image/jpeg");
                                format!("data:{media_type};base64,{data}")
                            }
                            crate::types::MediaSource::Binary { data } => {
                                let media_type = media_type.as_deref().unwrap_or("image/jpeg");
                                let encoded =
                                    base64::engine::general_purpose::STANDARD.encode(data);
                                format!("data:{media_type};base64,{encoded}")
                            }
                        };
                        out.push(serde_json::json!({
                            "type": "input_image",
                            "image_url": url
                        }));
                    }
                    ContentPart::Audio {
                        transcript,
                        duration,
                    } => {
                        let text =
                            crate::utils::audio_transcript_text(transcript.as_deref(), *duration)?;
                        out.push(serde_json::json!({ "type": text_type, "text": text }));
                    }
                    // Tool parts are handled at the message level
                    ContentPart::ToolCall { .. } | ContentPart::ToolResult { .. } => {}
                }
            }
            Ok(serde_json::Value::Array(out))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResponsesApiResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    output: Vec<ResponsesOutputItem>,
    #[serde(default)]
    usage: Option<ResponsesUsage>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Deserialize)]
struct IncompleteDetails {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesOutputItem {
    r#type: String,
    #[serde(default)]
    content: Option<Vec<ResponsesContentPart>>,
    #[serde(default)]
    summary: Option<Vec<ResponsesSummaryPart>>,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesContentPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesSummaryPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesUsage {
    #[serde(default)]
    input_tokens: Option<u32>,
    #[serde(default)]
    output_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl ResponsesUsage {
    fn into_usage(self) -> Usage {
        let prompt = self.input_tokens.unwrap_or(0);
        let completion = self.output_tokens.unwrap_or(0);
        Usage::with_total(
            prompt,
            completion,
            self.total_tokens.unwrap_or(prompt + completion),
        )
    }
}

/// Response transformer for the Responses endpoint
#[derive(Clone, Default)]
pub struct OpenAiResponsesResponseTransformer;

impl ResponseTransformer for OpenAiResponsesResponseTransformer {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn transform_chat_response(&self, raw: &serde_json::Value) -> Result<ChatResponse, LlmError> {
        let response: ResponsesApiResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LlmError::ParseError(format!("Invalid Responses API response: {e}")))?;

        let mut text = String::new();
        let mut thinking = String::new();
        let mut tool_calls = Vec::new();

        for item in &response.output {
            match item.r#type.as_str() {
                "message" => {
                    if let Some(content) = &item.content {
                        for part in content {
                            if let Some(t) = &part.text {
                                text.push_str(t);
                            }
                        }
                    }
                }
                // Reasoning items carry summary[].text (or content[].text)
                "reasoning" => {
                    if let Some(summary) = &item.summary {
                        for part in summary {
                            if let Some(t) = &part.text {
                                thinking.push_str(t);
                            }
                        }
                    }
                    if let Some(content) = &item.content {
                        for part in content {
                            if let Some(t) = &part.text {
                                thinking.push_str(t);
                            }
                        }
                    }
                }
                "function_call" => {
                    if let (Some(call_id), Some(name)) = (&item.call_id, &item.name) {
                        tool_calls.push(ToolCall {
                            id: call_id.clone(),
                            r#type: "function".to_string(),
                            function: Some(FunctionCall {
                                name: name.clone(),
                                arguments: item.arguments.clone().unwrap_or_default(),
                            }),
                        });
                    }
                }
                _ => {}
            }
        }

        let finish_reason = if !tool_calls.is_empty() {
            Some(FinishReason::ToolCalls)
        } else {
            match (
                response.status.as_deref(),
                response
                    .incomplete_details
                    .as_ref()
                    .and_then(|d| d.reason.as_deref()),
            ) {
                (Some("incomplete"), Some("max_output_tokens")) => Some(FinishReason::Length),
                (Some("incomplete"), Some("content_filter")) => Some(FinishReason::ContentFilter),
                (Some("completed"), _) => Some(FinishReason::Stop),
                (Some(other), _) => Some(FinishReason::Other(other.to_string())),
                (None, _) => None,
            }
        };

        Ok(ChatResponse {
            id: response.id,
            model: response.model,
            content: MessageContent::Text(text),
            usage: response.usage.map(ResponsesUsage::into_usage),
            finish_reason,
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            thinking: if thinking.is_empty() {
                None
            } else {
                Some(thinking)
            },
        })
    }
}

/// Typed streaming event envelope
#[derive(Debug, Deserialize)]
struct ResponsesStreamEvent {
    r#type: String,
    #[serde(default)]
    response: Option<serde_json::Value>,
    #[serde(default)]
    item: Option<serde_json::Value>,
    #[serde(default)]
    output_index: Option<usize>,
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Default)]
struct StreamState {
    response_id: Option<String>,
    model: Option<String>,
    accumulator: ToolCallAccumulator,
    usage: Option<Usage>,
    finish_reason: Option<FinishReason>,
}

/// Responses-endpoint event converter
pub struct OpenAiResponsesEventConverter {
    model: String,
    state: Mutex<StreamState>,
    stream_started: AtomicBool,
    stream_ended: AtomicBool,
    tool_call_completed: AtomicBool,
}

impl OpenAiResponsesEventConverter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            state: Mutex::new(StreamState::default()),
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
            provider: "openai".to_string(),
        })
    }

    fn convert_responses_event(&self, event: ResponsesStreamEvent) -> Vec<ChatStreamEvent> {
        let mut builder = EventBuilder::new();

        match event.r#type.as_str() {
            "response.created" => {
                if let Some(response) = &event.response {
                    let mut state = self.state.lock().expect("stream state lock");
                    state.response_id = response
                        .get("id")
                        .and_then(|v| v.as_str())
                        .map(str::to_string);
                    state.model = response
                        .get("model")
                        .and_then(|v| v.as_str())
                        .map(str::to_string);
                }
                if let Some(metadata) = self.take_stream_start() {
                    builder = builder.add_stream_start(metadata);
                }
                builder.build()
            }
            "response.output_text.delta" => {
                if let Some(metadata) = self.take_stream_start() {
                    builder = builder.add_stream_start(metadata);
                }
                if let Some(delta) = event.delta {
                    builder = builder.add_content_delta(delta, None);
                }
                builder.build()
            }
            "response.reasoning_summary_text.delta" | "response.reasoning_text.delta" => {
                if let Some(metadata) = self.take_stream_start() {
                    builder = builder.add_stream_start(metadata);
                }
                if let Some(delta) = event.delta {
                    builder = builder.add_thinking_delta(delta);
                }
                builder.build()
            }
            "response.output_item.added" => {
                let Some(item) = &event.item else {
                    return builder.build();
                };
                if item.get("type").and_then(|v| v.as_str()) == Some("function_call") {
                    let call_id = item
                        .get("call_id")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string();
                    let name = item
                        .get("name")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string();
                    if !call_id.is_empty() {
                        let mut state = self.state.lock().expect("stream state lock");
                        state.accumulator.open(&call_id, &name, event.output_index);
                        builder = builder.add_tool_call_delta(
                            call_id,
                            Some(name),
                            None,
                            event.output_index,
                        );
                    }
                }
                builder.build()
            }
            "response.function_call_arguments.delta" => {
                if let (Some(delta), Some(index)) = (event.delta, event.output_index)
                    && !delta.is_empty()
                {
                    let mut state = self.state.lock().expect("stream state lock");
                    if state.accumulator.append(ToolCallKey::Index(index), &delta) {
                        let id = state
                            .accumulator
                            .id_for(ToolCallKey::Index(index))
                            .unwrap_or_default()
                            .to_string();
                        builder = builder.add_tool_call_delta(id, None, Some(delta), Some(index));
                    } else {
                        tracing::warn!(index, "arguments delta for unopened function call");
                    }
                }
                builder.build()
            }
            "response.function_call_arguments.done" => {
                let Some(index) = event.output_index else {
                    return builder.build();
                };
                let mut state = self.state.lock().expect("stream state lock");
                if let Some(mut call) = state.accumulator.close(ToolCallKey::Index(index)) {
                    // Prefer the vendor's authoritative full-arguments text
                    // when the fragments never arrived
                    if call.arguments.is_empty()
                        && let Some(arguments) = event.arguments
                    {
                        call.arguments = arguments;
                    }
                    if let Some((id, name, arguments)) = parse_completed_arguments(call) {
                        self.tool_call_completed.store(true, Ordering::Relaxed);
                        builder = builder.add_tool_call_completed(id, name, arguments);
                    }
                }
                builder.build()
            }
            "response.completed" | "response.incomplete" => {
                if let Some(response) = &event.response {
                    let mut state = self.state.lock().expect("stream state lock");
                    if let Ok(usage) =
                        serde_json::from_value::<ResponsesUsage>(
                            response.get("usage").cloned().unwrap_or_default(),
                        )
                    {
                        state.usage = Some(usage.into_usage());
                    }
                    state.finish_reason = match (
                        event.r#type.as_str(),
                        response
                            .get("incomplete_details")
                            .and_then(|d| d.get("reason"))
                            .and_then(|v| v.as_str()),
                    ) {
                        ("response.incomplete", Some("max_output_tokens")) => {
                            Some(FinishReason::Length)
                        }
                        ("response.incomplete", Some("content_filter")) => {
                            Some(FinishReason::ContentFilter)
                        }
                        _ => Some(FinishReason::Stop),
                    };
                }
                // Terminal event waits for [DONE] so trailing frames
                // cannot follow a StreamEnd
                builder.build()
            }
            "response.failed" | "response.error" | "error" => {
                let error = event
                    .response
                    .as_ref()
                    .and_then(|r| r.get("error"))
                    .and_then(|e| e.get("message"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("OpenAI response failed")
                    .to_string();
                vec![ChatStreamEvent::Error { error }]
            }
            _ => builder.build(),
        }
    }
}

impl SseEventConverter for OpenAiResponsesEventConverter {
    fn convert_event(&self, event: Event) -> SseEventFuture<'_> {
        Box::pin(async move {
            match serde_json::from_str::<ResponsesStreamEvent>(&event.data) {
                Ok(responses_event) => self
                    .convert_responses_event(responses_event)
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, data = %event.data, "skipping malformed Responses frame");
                    vec![]
                }
            }
        })
    }

    fn handle_stream_end(&self) -> Vec<Result<ChatStreamEvent, LlmError>> {
        if self.stream_ended.swap(true, Ordering::Relaxed) {
            return Vec::new();
        }
        let mut state = self.state.lock().expect("stream state lock");
        if !state.accumulator.is_empty() {
            tracing::warn!(
                open_calls = state.accumulator.len(),
                "stream ended with unclosed function calls; dropping them"
            );
        }
        let vendor_reason = state.finish_reason.take().unwrap_or(FinishReason::Stop);
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
