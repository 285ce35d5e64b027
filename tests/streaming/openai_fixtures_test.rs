//! OpenAI chat completions streaming fixture tests

use wonton::providers::openai::streaming::OpenAiEventConverter;
use wonton::stream::ChatStreamEvent;
use wonton::types::FinishReason;

#[path = "../support/stream_fixture.rs"]
mod support;

fn converter() -> OpenAiEventConverter {
    OpenAiEventConverter::new("gpt-test")
}

#[tokio::test]
async fn text_with_trailing_usage_fixture() {
    let bytes = support::load_sse_fixture_as_bytes("tests/fixtures/openai/text_with_usage.sse")
        .expect("load fixture");
    let events = support::collect_sse_events(bytes, converter()).await;

    assert!(matches!(events[0], ChatStreamEvent::StreamStart { .. }));

    let content: String = events
        .iter()
        .filter_map(|e| match e {
            ChatStreamEvent::ContentDelta { delta, .. } => Some(delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(content, "Hi there");

    // [DONE] closes the stream; the silent usage frame rides along
    match events.last().expect("terminal event") {
        ChatStreamEvent::StreamEnd { response } => {
            assert_eq!(response.finish_reason, Some(FinishReason::Stop));
            assert_eq!(response.usage.as_ref().expect("usage").total_tokens, 10);
        }
        other => panic!("expected stream end, got {other:?}"),
    }
}

#[tokio::test]
async fn fragmented_tool_call_fixture() {
    let bytes = support::load_sse_fixture_as_bytes("tests/fixtures/openai/tool_call_fragments.sse")
        .expect("load fixture");
    let events = support::collect_sse_events(bytes, converter()).await;

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
            assert_eq!(id, "call_1");
            assert_eq!(function_name, "lookup");
            assert_eq!(arguments, &serde_json::json!({"q": "x"}));
        }
        _ => unreachable!(),
    }

    // The fixture's finish frame says "stop"; the completed tool call wins
    match events.last().expect("terminal event") {
        ChatStreamEvent::StreamEnd { response } => {
            assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
        }
        other => panic!("expected stream end, got {other:?}"),
    }
}
