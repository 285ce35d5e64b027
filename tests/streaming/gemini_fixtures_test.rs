//! Gemini streaming fixture tests

use wonton::providers::gemini::streaming::GeminiEventConverter;
use wonton::stream::ChatStreamEvent;
use wonton::types::FinishReason;

#[path = "../support/stream_fixture.rs"]
mod support;

#[tokio::test]
async fn text_and_finish_fixture() {
    let bytes = support::load_sse_fixture_as_bytes("tests/fixtures/gemini/text_and_finish.sse")
        .expect("load fixture");
    let events =
        support::collect_sse_events(bytes, GeminiEventConverter::new("gemini-test")).await;

    assert!(matches!(events[0], ChatStreamEvent::StreamStart { .. }));

    let content: String = events
        .iter()
        .filter_map(|e| match e {
            ChatStreamEvent::ContentDelta { delta, .. } => Some(delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(content, "Once upon");

    match events.last().expect("terminal event") {
        ChatStreamEvent::StreamEnd { response } => {
            assert_eq!(response.finish_reason, Some(FinishReason::Stop));
            assert_eq!(response.usage.as_ref().expect("usage").total_tokens, 6);
        }
        other => panic!("expected stream end, got {other:?}"),
    }
}
