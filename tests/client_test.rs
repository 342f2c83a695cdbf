//! Wiremock integration tests for DrafterClient.
//!
//! These tests verify the HTTP contract and error mapping using mocked responses.

use futures_util::StreamExt;
use serde_json::json;
use specdrafter::document::{self, DocumentRequest};
use specdrafter::{
    Chunk, DrafterClient, DrafterError, Message, ProjectBackend, ProjectUpdate, Role, SpecPhase,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": name,
        "description": "",
        "conversation_history": [
            {"role": "user", "content": "Hi", "timestamp": "2024-01-15T10:00:00Z"},
            {
                "role": "assistant",
                "content": "Hello! What are we building?",
                "data": {"thoughts": "Greet the user."}
            }
        ],
        "current_phase": "Features & User Stories",
        "requirements": {"content": "# Requirements"},
        "createdAt": "2024-01-15T09:59:00Z",
        "updatedAt": "2024-01-15T10:00:05Z"
    })
}

fn sse(frames: &[&str]) -> String {
    frames.iter().map(|f| format!("data: {f}\n\n")).collect()
}

/// Test fetching a project snapshot.
#[tokio::test]
async fn test_get_project_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("p1", "Acme")))
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    let project = client.get_project("p1").await.expect("get should succeed");

    assert_eq!(project.id, "p1");
    assert_eq!(project.name, "Acme");
    assert_eq!(project.current_phase, SpecPhase::Features);
    assert_eq!(project.conversation_history.len(), 2);
    assert_eq!(project.conversation_history[0].role, Role::User);
    assert_eq!(
        project.conversation_history[1].reasoning(),
        Some("Greet the user.")
    );
    assert_eq!(project.requirements_text(), Some("# Requirements"));
    assert_eq!(project.updated_at.as_deref(), Some("2024-01-15T10:00:05Z"));
}

/// Test project listing and creation.
#[tokio::test]
async fn test_list_and_create_projects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            project_json("p1", "One"),
            project_json("p2", "Two"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/projects/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "p3",
            "name": "New Project",
            "description": "",
            "conversation_history": [],
            "current_phase": "Foundation",
            "requirements": {}
        })))
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();

    let projects = client.list_projects().await.expect("list should succeed");
    let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["One", "Two"]);

    let created = client.create_project().await.expect("create should succeed");
    assert_eq!(created.id, "p3");
    assert_eq!(created.current_phase, SpecPhase::Foundation);
    assert!(created.conversation_history.is_empty());
    assert!(created.created_at.is_none());
}

/// Test that updates send only the fields being changed.
#[tokio::test]
async fn test_update_sends_partial_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/projects/p1"))
        .and(body_json(json!({"name": "Acme Corp"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("p1", "Acme Corp")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    let project = client
        .rename_project("p1", "Acme Corp")
        .await
        .expect("rename should succeed");
    assert_eq!(project.name, "Acme Corp");

    let empty = client.update_project("p1", &ProjectUpdate::default()).await;
    assert!(matches!(empty, Err(DrafterError::InvalidInput(_))));
}

/// Test project deletion with an empty 204 response.
#[tokio::test]
async fn test_delete_project() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/projects/p1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    client.delete_project("p1").await.expect("delete should succeed");
}

/// Test that the backend's `detail` message is surfaced.
#[tokio::test]
async fn test_not_found_uses_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Project not found"})),
        )
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    let err = client.get_project("missing").await.unwrap_err();

    match err {
        DrafterError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Project not found");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

/// Test that a bare error status falls back to the reason phrase.
#[tokio::test]
async fn test_server_error_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    let err = client.get_project("p1").await.unwrap_err();

    assert!(err.is_transient());
    assert!(matches!(
        err,
        DrafterError::Api { status: 500, ref message } if message == "Internal Server Error"
    ));
}

/// Test that a refused connection is a transport error.
#[tokio::test]
async fn test_connection_refused() {
    let client = DrafterClient::new("http://127.0.0.1:1").unwrap();
    let err = client.get_project("p1").await.unwrap_err();
    assert!(matches!(err, DrafterError::Http(_)));
}

/// Test streaming a chat response.
#[tokio::test]
async fn test_chat_stream_decodes_chunks() {
    let mock_server = MockServer::start().await;

    let body = sse(&[
        r#"{"type":"thought","content":"Consider scope."}"#,
        r#"{"type":"text","content":"Great, "}"#,
        r#"{"type":"text","content":"who are the users?"}"#,
        r#"{"type":"phase_complete"}"#,
    ]);

    Mock::given(method("POST"))
        .and(path("/projects/p1/chat"))
        .and(body_json(json!({
            "messages": [{"role": "user", "content": "A todo app"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    let stream = client
        .chat_stream("p1", &[Message::user("A todo app")])
        .await
        .expect("chat should open");
    let chunks: Vec<Chunk> = stream.map(|c| c.unwrap()).collect().await;

    assert_eq!(
        chunks,
        vec![
            Chunk::thought("Consider scope."),
            Chunk::text("Great, "),
            Chunk::text("who are the users?"),
            Chunk::PhaseComplete,
        ]
    );
}

/// Test that a rejected chat fails before any chunk.
#[tokio::test]
async fn test_chat_rejected_before_stream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/p1/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "LLM unavailable"})),
        )
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    let result = client.chat_stream("p1", &[Message::user("hi")]).await;

    match result {
        Err(DrafterError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "LLM unavailable");
        }
        Err(other) => panic!("expected Api error, got {other:?}"),
        Ok(_) => panic!("expected the chat request to fail"),
    }
}

/// Test PRD generation streams raw text with the target in the body.
#[tokio::test]
async fn test_generate_prd_streams_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/p1/generate-prd"))
        .and(body_json(json!({"target": "Windsurf"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("# Acme PRD\n\n## Goals\n", "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    let mut seen = String::new();
    let prd = document::generate(
        &client,
        "p1",
        &DocumentRequest::prd("Windsurf"),
        |piece| seen.push_str(piece),
    )
    .await
    .expect("generation should succeed");

    assert_eq!(prd, "# Acme PRD\n\n## Goals\n");
    assert_eq!(seen, prd);
}

/// Test review and edit endpoints.
#[tokio::test]
async fn test_review_and_edit_requirements() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/p1/review"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("Looks complete.", "text/plain"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/projects/p1/edit-requirements"))
        .and(body_json(json!({"content": "Add an offline mode"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("# Requirements\n- Offline mode", "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();

    let review = document::generate(&client, "p1", &DocumentRequest::Review, |_| {})
        .await
        .unwrap();
    assert_eq!(review, "Looks complete.");

    let edited = document::generate(
        &client,
        "p1",
        &DocumentRequest::edit("Add an offline mode"),
        |_| {},
    )
    .await
    .unwrap();
    assert!(edited.contains("Offline mode"));
}

/// Test that a failed document request reports the backend error.
#[tokio::test]
async fn test_generate_prd_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/p1/generate-prd"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model overloaded"))
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    let err = document::generate(&client, "p1", &DocumentRequest::prd("Cursor"), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DrafterError::Api { status: 503, ref message } if message == "model overloaded"
    ));
}

/// Test the audio endpoints.
#[tokio::test]
async fn test_audio_endpoints() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcribe"))
        .and(body_json(json!({"audio": "UklGRg==", "mime_type": "audio/webm"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"transcript": "build me an app"})),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/audio/text-to-speech"))
        .and(body_json(json!({"text": "Hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"audio_content": "SUQz"})))
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();

    let transcript = client
        .transcribe_audio("UklGRg==", "audio/webm")
        .await
        .unwrap();
    assert_eq!(transcript, "build me an app");

    let audio = client.text_to_speech("Hello").await.unwrap();
    assert_eq!(audio, "SUQz");
}

/// Test that invalid ids are rejected without a request.
#[tokio::test]
async fn test_invalid_project_id() {
    let mock_server = MockServer::start().await;
    let client = DrafterClient::new(mock_server.uri()).unwrap();

    let err = client.get_project("../etc").await.unwrap_err();
    assert!(matches!(err, DrafterError::InvalidInput(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

/// Test that an audio-only message is sent without text content.
#[tokio::test]
async fn test_chat_audio_message_omits_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/p1/chat"))
        .and(body_json(json!({
            "messages": [{
                "role": "user",
                "data": {"audio": "UklGRg==", "mimeType": "audio/webm"}
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse(&[r#"{"type":"text","content":"Got it."}"#]),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = DrafterClient::new(mock_server.uri()).unwrap();
    let stream = client
        .chat_stream(
            "p1",
            &[Message::user_audio("", "UklGRg==", "audio/webm")],
        )
        .await
        .expect("chat should open");
    let chunks: Vec<Chunk> = stream.map(|c| c.unwrap()).collect().await;
    assert_eq!(chunks, vec![Chunk::text("Got it.")]);
}
