//! Ollama NDJSON streaming tests
//!
//! NDJSON lines are short enough to keep inline; these drive the
//! converter exactly as the line reader does.

use wonton::providers::ollama::streaming::OllamaEventConverter;
use wonton::stream::ChatStreamEvent;
use wonton::types::FinishReason;
use wonton::utils::streaming::JsonEventConverter;

async fn collect_lines(lines: &[&str]) -> Vec<ChatStreamEvent> {
    let converter = OllamaEventConverter::new("llama3");
    let mut events = Vec::new();
    for line in lines {
        for item in converter.convert_json(line).await {
            let e = item.expect("event");
            let ended = matches!(e, ChatStreamEvent::StreamEnd { .. });
            events.push(e);
            if ended {
                return events;
            }
        }
    }
    events
}

#[tokio::test]
async fn two_line_stream_normalizes_to_start_delta_done() {
    let events = collect_lines(&[
        r#"{"model":"m","message":{"role":"assistant","content":"hi"},"done":false}"#,
        r#"{"model":"m","message":{"role":"assistant","content":""},"done":true}"#,
    ])
    .await;

    assert_eq!(events.len(), 3, "unexpected events: {events:?}");
    assert!(matches!(events[0], ChatStreamEvent::StreamStart { .. }));
    assert!(matches!(
        &events[1],
        ChatStreamEvent::ContentDelta { delta, .. } if delta == "hi"
    ));
    match &events[2] {
        ChatStreamEvent::StreamEnd { response } => {
            assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        }
        other => panic!("expected stream end, got {other:?}"),
    }
}

#[tokio::test]
async fn done_line_terminates_even_with_lines_remaining() {
    let events = collect_lines(&[
        r#"{"model":"m","message":{"content":"a"},"done":false}"#,
        r#"{"model":"m","message":{"content":""},"done":true}"#,
        r#"{"model":"m","message":{"content":"never read"},"done":false}"#,
    ])
    .await;

    let content: String = events
        .iter()
        .filter_map(|e| match e {
            ChatStreamEvent::ContentDelta { delta, .. } => Some(delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(content, "a");
}

#[tokio::test]
async fn malformed_line_is_skipped() {
    let events = collect_lines(&[
        r#"{"model":"m","message":{"content":"a"},"done":false}"#,
        r#"{not json"#,
        r#"{"model":"m","message":{"content":"b"},"done":true,"prompt_eval_count":1,"eval_count":2}"#,
    ])
    .await;

    let content: String = events
        .iter()
        .filter_map(|e| match e {
            ChatStreamEvent::ContentDelta { delta, .. } => Some(delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(content, "ab");
    match events.last().expect("terminal event") {
        ChatStreamEvent::StreamEnd { response } => {
            assert_eq!(response.usage.as_ref().expect("usage").total_tokens, 3);
        }
        other => panic!("expected stream end, got {other:?}"),
    }
}
