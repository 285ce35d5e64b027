//! Unified streaming event types
//!
//! Every provider's wire protocol is normalized into the single
//! [`ChatStreamEvent`] sequence defined here, regardless of whether the
//! vendor speaks SSE or NDJSON and however it chooses to deliver tool-call
//! arguments.
//!
//! Ordering guarantees for one stream:
//! - `StreamStart` is emitted at most once, before any other event.
//! - Deltas arrive strictly in vendor order; no reordering.
//! - Every tool call the vendor closes yields exactly one
//!   `ToolCallCompleted` before `StreamEnd`.
//! - `StreamEnd` is emitted at most once and carries the best-known usage
//!   and finish reason. A dropped (cancelled) stream never emits it.

use crate::error::LlmError;
use crate::types::{ChatResponse, ResponseMetadata};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Chat streaming event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatStreamEvent {
    /// Stream start event with response metadata
    StreamStart {
        /// Response metadata (id/model when the vendor reports them)
        metadata: ResponseMetadata,
    },
    /// Content delta (incremental text)
    ContentDelta {
        /// The incremental text content
        delta: String,
        /// Index of the choice (for vendors with multiple candidates)
        index: Option<usize>,
    },
    /// Thinking/reasoning content delta
    ThinkingDelta {
        /// The incremental reasoning content
        delta: String,
    },
    /// Tool call delta
    ToolCallDelta {
        /// Tool call ID
        id: String,
        /// Function name (present on the fragment that opens the call)
        function_name: Option<String>,
        /// Incremental argument JSON fragment
        arguments_delta: Option<String>,
        /// Positional index of the call within the response
        index: Option<usize>,
    },
    /// A tool call closed; its argument fragments reassembled into JSON
    ToolCallCompleted {
        /// Tool call ID
        id: String,
        /// Function name
        function_name: String,
        /// Fully assembled arguments
        arguments: serde_json::Value,
    },
    /// Stream end event with the final response (usage + finish reason)
    StreamEnd {
        /// Final response
        response: ChatResponse,
    },
    /// Error event delivered inside the vendor stream
    Error {
        /// Error message
        error: String,
    },
}

/// Pull-based chat stream.
///
/// Backpressure is structural: the producer only reads as many bytes as
/// the frame reader needs to assemble the next complete frame. Dropping
/// the stream closes the underlying HTTP connection and discards all
/// stream-scoped state.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatStreamEvent, LlmError>> + Send>>;
