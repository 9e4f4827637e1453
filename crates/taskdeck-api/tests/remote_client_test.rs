#![allow(clippy::unwrap_used)]
// Integration tests for `RemoteClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskdeck_api::{Error, ItemId, RemoteClient, UploadFile};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RemoteClient) {
    let server = MockServer::start().await;
    let client = RemoteClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Todo tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_todos_preserves_server_order() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/todo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": 2, "item": "Cycle around town." },
                { "id": 1, "item": "Read a book." }
            ]
        })))
        .mount(&server)
        .await;

    let todos = client.list_todos().await.unwrap();

    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].id, ItemId::Number(2));
    assert_eq!(todos[0].item, "Cycle around town.");
    assert_eq!(todos[1].id, ItemId::Number(1));
}

#[tokio::test]
async fn test_create_todo_sends_text_only() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/todo"))
        .and(body_json(json!({ "item": "buy milk" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": ["To-do added."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.create_todo("buy milk").await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("To-do added."));
}

#[tokio::test]
async fn test_update_todo() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/todo/7"))
        .and(body_json(json!({ "item": "x" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "Todo with id 7 has been updated."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.update_todo(&ItemId::Number(7), "x").await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Todo with id 7 has been updated."));
}

#[tokio::test]
async fn test_delete_todo_sends_id_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/todo/2"))
        .and(body_json(json!({ "id": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "To-do with id 2 removed."
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_todo(&ItemId::Number(2)).await.unwrap();
}

#[tokio::test]
async fn test_write_with_empty_body_is_acknowledged() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/todo/abc"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let ack = client
        .update_todo(&ItemId::Text("abc".into()), "y")
        .await
        .unwrap();
    assert_eq!(ack.message, None);
}

// ── Resume tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_resume_multipart() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/resume/highlights"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"resume\""))
        .and(body_string_contains("filename=\"cv.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "title": "Software Engineer",
                "employerName": "Acme",
                "startDate": "2019",
                "endDate": "2022",
                "highlights": [
                    "Built the ingestion pipeline for billing events",
                    "Cut p99 latency of the search API in half"
                ]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = UploadFile::new("cv.pdf", b"%PDF-1.4 fake".to_vec());
    let positions = client.upload_resume(&file).await.unwrap();

    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].title, "Software Engineer");
    assert_eq!(positions[0].employer_name.as_deref(), Some("Acme"));
    assert_eq!(positions[0].highlights.len(), 2);
}

#[tokio::test]
async fn test_upload_file_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("resume.txt");
    std::fs::write(&file_path, "Engineer at Acme").unwrap();

    let file = UploadFile::from_path(&file_path).await.unwrap();
    assert_eq!(file.file_name, "resume.txt");
    assert_eq!(&file.content[..], b"Engineer at Acme");
}

#[tokio::test]
async fn test_improve_highlight() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/resume/improvement"))
        .and(body_json(json!({ "highlight": "Made things faster" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": ["Accelerated request throughput by 40% using async I/O"]
        })))
        .mount(&server)
        .await;

    let suggestions = client.improve_highlight("Made things faster").await.unwrap();
    assert_eq!(
        suggestions,
        vec!["Accelerated request throughput by 40% using async I/O".to_owned()]
    );
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_2xx_maps_to_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/todo"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "database is down" })),
        )
        .mount(&server)
        .await;

    let result = client.list_todos().await;

    match result {
        Err(Error::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database is down");
        }
        other => panic!("expected Server error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_with_plain_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/todo/99"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such todo"))
        .mount(&server)
        .await;

    let err = client.delete_todo(&ItemId::Number(99)).await.unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
    assert!(err.to_string().contains("no such todo"));
}

#[tokio::test]
async fn test_malformed_body_maps_to_deserialization() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/resume/improvement"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.improve_highlight("anything").await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("oops")),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_wrong_shape_maps_to_deserialization() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/todo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let result = client.list_todos().await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

#[tokio::test]
async fn test_connection_refused_maps_to_transport() {
    // Nothing listens on port 1.
    let client = RemoteClient::from_reqwest("http://127.0.0.1:1", reqwest::Client::new()).unwrap();

    let result = client.list_todos().await;
    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}
