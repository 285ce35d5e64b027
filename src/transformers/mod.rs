//! Request/response transformer seams
//!
//! Each provider implements these two traits to translate between the
//! vendor-neutral types and its own wire format. Keeping the codec behind
//! a trait lets the HTTP executor stay provider-agnostic.

use crate::error::LlmError;
use crate::types::{ChatRequest, ChatResponse};

/// Encode a vendor-neutral request into the vendor's JSON body.
///
/// Encode-time validation errors (missing model, URL-only image for a
/// vendor that needs inline data, audio without transcript) are raised
/// here, synchronously, before any network call.
pub trait RequestTransformer: Send + Sync {
    fn provider_id(&self) -> &str;

    fn transform_chat(&self, req: &ChatRequest) -> Result<serde_json::Value, LlmError>;
}

/// Decode a vendor's non-streaming JSON response into the unified form.
///
/// A schema mismatch on a well-formed 2xx body is a `ParseError`.
pub trait ResponseTransformer: Send + Sync {
    fn provider_id(&self) -> &str;

    fn transform_chat_response(&self, raw: &serde_json::Value) -> Result<ChatResponse, LlmError>;
}
