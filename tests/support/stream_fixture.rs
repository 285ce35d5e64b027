//! Test fixture utilities: load SSE streaming chunks from disk and drive
//! converters the same way the stream factory does (including `[DONE]`
//! and end-of-source termination).

use futures_util::StreamExt;
use std::io;

use eventsource_stream::Eventsource;
use wonton::stream::ChatStreamEvent;
use wonton::utils::streaming::SseEventConverter;

/// Load an `.sse` fixture file and split it into SSE byte chunks
/// (separated by blank lines), one chunk per network read.
pub fn load_sse_fixture_as_bytes(path: &str) -> io::Result<Vec<Vec<u8>>> {
    let raw = std::fs::read_to_string(path)?;
    let normalized = raw.replace("\r\n", "\n");
    let mut out = Vec::new();
    for chunk in normalized.split("\n\n") {
        let s = chunk.trim_end_matches('\n');
        if s.is_empty() {
            continue;
        }
        // Restore the SSE blank-line terminator
        let mut owned = String::from(s);
        owned.push_str("\n\n");
        out.push(owned.into_bytes());
    }
    Ok(out)
}

/// Collect the unified event sequence from fixture bytes through an SSE
/// converter, mirroring the factory's termination behavior.
pub async fn collect_sse_events<C>(bytes: Vec<Vec<u8>>, converter: C) -> Vec<ChatStreamEvent>
where
    C: SseEventConverter,
{
    let byte_stream =
        futures_util::stream::iter(bytes.into_iter().map(Ok::<_, std::convert::Infallible>));
    let mut sse_stream = byte_stream.eventsource();

    let mut events = Vec::new();
    while let Some(item) = sse_stream.next().await {
        let event = item.expect("valid SSE event");
        if event.data.trim() == "[DONE]" {
            for e in converter.handle_stream_end() {
                events.push(e.expect("convert ok"));
            }
            return events;
        }
        if event.data.trim().is_empty() {
            continue;
        }
        let mut ended = false;
        for e in converter.convert_event(event).await {
            let e = e.expect("convert ok");
            if matches!(e, ChatStreamEvent::StreamEnd { .. }) {
                ended = true;
            }
            events.push(e);
        }
        if ended {
            return events;
        }
    }
    for e in converter.handle_stream_end() {
        events.push(e.expect("convert ok"));
    }
    events
}
