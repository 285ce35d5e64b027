//! Anthropic streaming fixture tests

use wonton::providers::anthropic::streaming::AnthropicEventConverter;
use wonton::stream::ChatStreamEvent;
use wonton::types::FinishReason;

#[path = "../support/stream_fixture.rs"]
mod support;

fn converter() -> AnthropicEventConverter {
    AnthropicEventConverter::new("claude-test")
}

#[tokio::test]
async fn message_start_deltas_stop_fixture() {
    let bytes = support::load_sse_fixture_as_bytes(
        "tests/fixtures/anthropic/message_start_deltas_stop.sse",
    )
    .expect("load fixture");
    let events = support::collect_sse_events(bytes, converter()).await;

    let mut content = String::new();
    let mut saw_start = false;
    let mut end = None;
    for e in events {
        match e {
            ChatStreamEvent::StreamStart { metadata } => {
                saw_start = true;
                assert_eq!(metadata.id.as_deref(), Some("msg_1"));
                assert_eq!(metadata.model.as_deref(), Some("claude-test"));
            }
            ChatStreamEvent::ContentDelta { delta, .. } => content.push_str(&delta),
            ChatStreamEvent::StreamEnd { response } => end = Some(response),
            _ => {}
        }
    }
    assert!(saw_start, "expect stream start");
    assert_eq!(content, "Hello world");
    let end = end.expect("expect stream end");
    assert_eq!(end.finish_reason, Some(FinishReason::Stop));
    assert_eq!(end.usage.expect("usage").total_tokens, 12);
}

#[tokio::test]
async fn text_only_scenario_fixture() {
    // Two text deltas ("4" then "") and a message_stop produce exactly
    // Started, one TextDelta, Done(stop).
    let bytes =
        support::load_sse_fixture_as_bytes("tests/fixtures/anthropic/text_only_scenario.sse")
            .expect("load fixture");
    let events = support::collect_sse_events(bytes, converter()).await;

    assert_eq!(events.len(), 3, "unexpected events: {events:?}");
    assert!(matches!(events[0], ChatStreamEvent::StreamStart { .. }));
    assert!(matches!(
        &events[1],
        ChatStreamEvent::ContentDelta { delta, .. } if delta == "4"
    ));
    match &events[2] {
        ChatStreamEvent::StreamEnd { response } => {
            assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        }
        other => panic!("expected stream end, got {other:?}"),
    }
}

#[tokio::test]
async fn corrupted_frame_is_skipped_idempotently() {
    let bytes = support::load_sse_fixture_as_bytes(
        "tests/fixtures/anthropic/corrupted_frame_between_valid.sse",
    )
    .expect("load fixture");
    let events = support::collect_sse_events(bytes, converter()).await;

    let deltas: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            ChatStreamEvent::ContentDelta { delta, .. } => Some(delta.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(deltas, vec!["first", "second"]);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ChatStreamEvent::StreamEnd { .. }))
    );
}

#[tokio::test]
async fn split_tool_call_fixture() {
    let bytes = support::load_sse_fixture_as_bytes("tests/fixtures/anthropic/tool_call_split.sse")
        .expect("load fixture");
    let events = support::collect_sse_events(bytes, converter()).await;

    let fragment_deltas: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ChatStreamEvent::ToolCallDelta {
                arguments_delta: Some(fragment),
                ..
            } => Some(fragment.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(fragment_deltas, vec!["{\"q\":", "\"x\"}"]);

    match events
        .iter()
        .find(|e| matches!(e, ChatStreamEvent::ToolCallCompleted { .. }))
        .expect("completed call")
    {
        ChatStreamEvent::ToolCallCompleted {
            id,
            function_name,
            arguments,
        } => {
            assert_eq!(id, "t1");
            assert_eq!(function_name, "lookup");
            assert_eq!(arguments, &serde_json::json!({"q": "x"}));
        }
        _ => unreachable!(),
    }

    // The vendor said end_turn; tool-call completion takes priority
    match events.last().expect("terminal event") {
        ChatStreamEvent::StreamEnd { response } => {
            assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
        }
        other => panic!("expected stream end, got {other:?}"),
    }
}

#[tokio::test]
async fn partial_stream_without_message_stop_has_no_stream_end() {
    let bytes = support::load_sse_fixture_as_bytes(
        "tests/fixtures/anthropic/partial_without_message_stop.sse",
    )
    .expect("load fixture");
    let events = support::collect_sse_events(bytes, converter()).await;

    assert!(
        events
            .iter()
            .any(|e| matches!(e, ChatStreamEvent::ContentDelta { .. }))
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, ChatStreamEvent::StreamEnd { .. })),
        "no StreamEnd expected for a broken stream"
    );
}
