//! End-to-end tests for the backend client against a mock server:
//! request shape, auth header, SSE decoding, and reducer application.

use futures_util::StreamExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use council::api::{ApiError, CouncilClient};
use council::config::Config;
use council::sse::CouncilEvent;
use council::transcript::{StreamEffect, Transcript, Turn};

fn client_for(server: &MockServer, token: Option<&str>) -> CouncilClient {
    CouncilClient::new(&Config {
        base_url: server.uri(),
        api_token: token.map(str::to_string),
    })
}

const FULL_STREAM: &str = concat!(
    ": connected\n",
    "\n",
    "data: {\"type\":\"phase1_start\"}\n",
    "data: {\"type\":\"phase1_update\",\"data\":{\"model\":\"m1\",\"content\":\"answer one\"}}\n",
    "data: {\"type\":\"phase1_error\",\"model\":\"m2\",\"error\":\"timeout\"}\n",
    "data: {\"type\":\"phase1_complete\",\"data\":[{\"model\":\"m1\",\"content\":\"answer one\"}]}\n",
    "data: {\"type\":\"phase2_start\"}\n",
    "data: {\"type\":\"phase2_skipped\",\"metadata\":{\"label_to_model\":{\"Response A\":\"m1\"}}}\n",
    "data: {\"type\":\"phase3_start\"}\n",
    "data: {\"type\":\"phase3_token\",\"data\":\"Hi\"}\n",
    "data: {\"type\":\"phase3_complete\",\"data\":{\"model\":\"chairman\",\"response\":\"Hi there\"}}\n",
    "data: {\"type\":\"title_complete\",\"data\":{\"title\":\"Greetings\"}}\n",
    "data: {\"type\":\"complete\"}\n",
);

#[tokio::test]
async fn test_stream_message_decodes_and_reduces_full_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/conversations/conv-1/message/stream"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(serde_json::json!({"content": "hello council"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FULL_STREAM, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-token"));
    let mut stream = client
        .stream_message("conv-1", "hello council")
        .await
        .expect("stream should open");

    let mut transcript = Transcript::default();
    transcript.begin_exchange("hello council".to_string());

    let mut effects = Vec::new();
    while let Some(result) = stream.next().await {
        let event = result.expect("no transport errors in this stream");
        let effect = transcript.open_turn().unwrap().apply(event);
        if effect != StreamEffect::None {
            effects.push(effect);
        }
    }

    assert_eq!(
        effects,
        vec![
            StreamEffect::TitleUpdated("Greetings".to_string()),
            StreamEffect::Completed,
        ]
    );

    let turn = transcript.open_turn().unwrap();
    let answers = turn.answers.as_ref().unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].content, "answer one");
    assert_eq!(turn.rankings.as_ref().unwrap().len(), 0);
    assert_eq!(turn.synthesis.as_ref().unwrap().content, "Hi there");
    assert_eq!(turn.synthesis.as_ref().unwrap().source_id, "chairman");
    assert_eq!(turn.failures.len(), 1);
    assert_eq!(turn.failures[0].source, "m2");
    assert!(!turn.progress.any());
    assert_eq!(
        turn.metadata.as_ref().unwrap()["label_to_model"]["Response A"],
        "m1"
    );
}

#[tokio::test]
async fn test_stream_message_skips_malformed_frames() {
    let body = concat!(
        "data: {\"type\":\"phase1_start\"}\n",
        "data: {broken json\n",
        "data: {\"type\":\"complete\"}\n",
    );
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/conversations/conv-2/message/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let stream = client.stream_message("conv-2", "hi").await.unwrap();
    let events: Vec<CouncilEvent> = stream.map(|r| r.unwrap()).collect().await;

    assert_eq!(events, vec![CouncilEvent::Phase1Start, CouncilEvent::Complete]);
}

#[tokio::test]
async fn test_stream_message_final_line_without_newline() {
    // Transport may end without a trailing newline; the residual line still
    // decodes exactly once.
    let body = "data: {\"type\":\"phase1_start\"}\ndata: {\"type\":\"complete\"}";
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/conversations/conv-3/message/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let stream = client.stream_message("conv-3", "hi").await.unwrap();
    let events: Vec<CouncilEvent> = stream.map(|r| r.unwrap()).collect().await;

    assert_eq!(events, vec![CouncilEvent::Phase1Start, CouncilEvent::Complete]);
}

#[tokio::test]
async fn test_stream_message_error_status_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/conversations/conv-4/message/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client
        .stream_message("conv-4", "hi")
        .await
        .err()
        .expect("expected server error");
    match err {
        ApiError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_conversations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": "conv-1",
                "created_at": "2026-08-20T10:00:00",
                "title": "Rust lifetimes",
                "message_count": 4
            }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-token"));
    let conversations = client.list_conversations().await.unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].id, "conv-1");
    assert_eq!(conversations[0].title, "Rust lifetimes");
    assert_eq!(conversations[0].message_count, 4);
}

#[tokio::test]
async fn test_get_conversation_parses_persisted_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/conv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "conv-1",
            "created_at": "2026-08-20T10:00:00",
            "title": "Rust lifetimes",
            "messages": [
                {"role": "user", "content": "what is a lifetime?"},
                {
                    "role": "assistant",
                    "phase1": [{"model": "m1", "response": "an answer"}],
                    "phase2": [],
                    "phase3": {"model": "chairman", "response": "the verdict"},
                    "metadata": {"label_to_model": {}}
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let detail = client.get_conversation("conv-1").await.unwrap();
    assert_eq!(detail.messages.len(), 2);
    match &detail.messages[1] {
        Turn::Assistant(turn) => {
            assert_eq!(turn.answers.as_ref().unwrap()[0].content, "an answer");
            assert_eq!(turn.synthesis.as_ref().unwrap().content, "the verdict");
            assert!(!turn.progress.any());
        }
        other => panic!("expected assistant turn, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "conv-new",
            "created_at": "2026-08-23T08:00:00",
            "title": "New Conversation",
            "messages": []
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let detail = client.create_conversation().await.unwrap();
    assert_eq!(detail.id, "conv-new");
    assert!(detail.messages.is_empty());
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    assert!(client.health_check().await.unwrap());
}
