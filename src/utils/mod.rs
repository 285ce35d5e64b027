//! Utility modules
//!
//! Shared infrastructure used by the provider implementations: SSE/NDJSON
//! stream plumbing, the tool-call accumulator, per-vendor header tables
//! and URL helpers.

pub mod accumulator;
pub mod http_headers;
pub mod streaming;
pub mod url;

pub use streaming::*;
pub use url::*;

/// Render audio content as forwardable transcript text.
///
/// None of the covered vendors accept raw audio on their text endpoints;
/// only the transcript is forwarded, annotated with its duration when
/// known. Audio without a transcript is a hard input error.
pub(crate) fn audio_transcript_text(
    transcript: Option<&str>,
    duration: Option<f32>,
) -> Result<String, crate::error::LlmError> {
    let Some(transcript) = transcript else {
        return Err(crate::error::LlmError::InvalidInput(
            "Audio content without a transcript cannot be sent to a text API".to_string(),
        ));
    };
    Ok(match duration {
        Some(secs) => format!("[Audio transcript ({secs:.0}s)]: {transcript}"),
        None => format!("[Audio transcript]: {transcript}"),
    })
}
