//! Session tests against a local HTTP catalog service
//!
//! Each test starts an axum server on an ephemeral port that records the
//! multipart requests it receives and answers with a scripted mode.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use smartcatalog::config::ServiceConfig;
use smartcatalog::remote::{HttpCatalogService, RemoteError};
use smartcatalog::selection::{CandidateFile, Validator};
use smartcatalog::session::{FetchOutcome, NetworkError, SelectError, SubmitOutcome, SyncController};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const TEST_API_KEY: &str = "test-key";

#[derive(Debug, Clone, Copy)]
enum Mode {
    Ok,
    Fail,
    Malformed,
}

#[derive(Debug, Clone)]
struct ReceivedPart {
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    len: usize,
}

#[derive(Debug, Default)]
struct Received {
    parts: Vec<ReceivedPart>,
    api_keys: Vec<Option<String>>,
    upload_requests: usize,
}

struct MockServer {
    mode: Mutex<Mode>,
    received: Mutex<Received>,
}

impl MockServer {
    fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    fn mode(&self) -> Mode {
        *self.mode.lock().unwrap()
    }

    fn received(&self) -> std::sync::MutexGuard<'_, Received> {
        self.received.lock().unwrap()
    }
}

fn api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn upload_handler(
    State(server): State<Arc<MockServer>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let len = field.bytes().await.unwrap().len();
        parts.push(ReceivedPart {
            field: field_name,
            file_name,
            content_type,
            len,
        });
    }

    let items: Vec<_> = parts
        .iter()
        .map(|p| {
            let name = p.file_name.clone().unwrap_or_default();
            json!({
                "name": format!("Product Based on {name}"),
                "description": format!("generated from {name}"),
                "image_url": format!("/static/{name}"),
                "specifications": {"Material": "Synthetic", "Color": "Varied"}
            })
        })
        .collect();

    {
        let mut received = server.received();
        received.upload_requests += 1;
        received.api_keys.push(api_key(&headers));
        received.parts.extend(parts);
    }

    match server.mode() {
        Mode::Ok => Json(items).into_response(),
        Mode::Fail => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        Mode::Malformed => (StatusCode::OK, "{\"error\": \"not a list\"}").into_response(),
    }
}

async fn catalog_handler(State(server): State<Arc<MockServer>>, headers: HeaderMap) -> Response {
    server.received().api_keys.push(api_key(&headers));

    match server.mode() {
        Mode::Ok => Json(json!([{
            "name": "Widget",
            "description": "A widget",
            "image_url": "/static/widget.jpg",
            "specifications": {"Material": "Steel"}
        }]))
        .into_response(),
        Mode::Fail => (StatusCode::SERVICE_UNAVAILABLE, "down").into_response(),
        Mode::Malformed => (StatusCode::OK, "not json").into_response(),
    }
}

async fn start_mock_server(mode: Mode) -> (Arc<MockServer>, String) {
    let server = Arc::new(MockServer {
        mode: Mutex::new(mode),
        received: Mutex::new(Received::default()),
    });

    let app = Router::new()
        .route("/api/upload", post(upload_handler))
        .route("/api/catalog", get(catalog_handler))
        .with_state(server.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (server, format!("http://{addr}"))
}

fn controller(base_url: &str) -> SyncController {
    let config = ServiceConfig {
        base_url: base_url.to_string(),
        api_key: Some(TEST_API_KEY.to_string()),
        ..ServiceConfig::default()
    };
    let service = Arc::new(HttpCatalogService::new(&config).unwrap());

    SyncController::new(service, Validator::default())
        .with_image_base(reqwest::Url::parse(base_url).unwrap())
}

fn png(name: &str, len: usize) -> CandidateFile {
    CandidateFile::from_bytes(name, "image/png", vec![7u8; len])
}

#[tokio::test]
async fn test_startup_fetch_loads_catalog() {
    let (server, base_url) = start_mock_server(Mode::Ok).await;
    let controller = controller(&base_url);

    let outcome = controller.fetch_initial().await.unwrap();

    assert_eq!(outcome, FetchOutcome::Loaded { items: 1 });
    let view = controller.view().await;
    assert_eq!(view.catalog[0].name, "Widget");
    assert_eq!(view.catalog[0].image_url, format!("{base_url}/static/widget.jpg"));
    assert_eq!(server.received().api_keys, vec![Some(TEST_API_KEY.to_string())]);
}

#[tokio::test]
async fn test_upload_sends_one_multipart_request() {
    let (server, base_url) = start_mock_server(Mode::Ok).await;
    let controller = controller(&base_url);

    controller
        .select(vec![
            CandidateFile::from_bytes("photo.jpg", "image/jpeg", vec![1u8; 2048]),
            png("icon.png", 512),
        ])
        .await
        .unwrap();

    let outcome = controller.submit().await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Replaced { items: 2 });

    {
        let received = server.received();
        assert_eq!(received.upload_requests, 1);
        assert_eq!(received.parts.len(), 2);
        assert!(received.parts.iter().all(|p| p.field == "images"));
        assert_eq!(received.parts[0].file_name.as_deref(), Some("photo.jpg"));
        assert_eq!(received.parts[0].content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(received.parts[0].len, 2048);
        assert_eq!(received.parts[1].file_name.as_deref(), Some("icon.png"));
        assert_eq!(received.parts[1].len, 512);
        assert_eq!(received.api_keys, vec![Some(TEST_API_KEY.to_string())]);
    }

    let view = controller.view().await;
    assert_eq!(view.catalog.len(), 2);
    assert_eq!(view.catalog[0].name, "Product Based on photo.jpg");
    assert!(view.previews.is_empty());
    assert!(!view.can_submit);
    assert!(view.error.is_none());
    assert_eq!(controller.metrics().live_previews(), 0);
}

#[tokio::test]
async fn test_server_error_keeps_selection_for_retry() {
    let (server, base_url) = start_mock_server(Mode::Fail).await;
    let controller = controller(&base_url);
    controller.select(vec![png("a.png", 64)]).await.unwrap();

    let err = controller.submit().await.unwrap_err();

    assert!(matches!(
        err,
        NetworkError::UploadFailed(RemoteError::Status { status: 500, .. })
    ));
    let view = controller.view().await;
    assert_eq!(view.error.as_deref(), Some("Upload failed. Please try again."));
    assert_eq!(view.previews.len(), 1);
    assert!(view.can_submit);
    assert!(view.catalog.is_empty());

    server.set_mode(Mode::Ok);
    let outcome = controller.submit().await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Replaced { items: 1 });
    assert_eq!(server.received().upload_requests, 2);
    assert!(controller.view().await.error.is_none());
}

#[tokio::test]
async fn test_malformed_upload_response_is_a_failure() {
    let (_server, base_url) = start_mock_server(Mode::Malformed).await;
    let controller = controller(&base_url);
    controller.select(vec![png("a.png", 64)]).await.unwrap();

    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err.remote(), RemoteError::MalformedBody(_)));
    assert_eq!(controller.view().await.previews.len(), 1);
}

#[tokio::test]
async fn test_fetch_failure_reports_message() {
    let (_server, base_url) = start_mock_server(Mode::Fail).await;
    let controller = controller(&base_url);

    let err = controller.fetch_initial().await.unwrap_err();

    assert!(matches!(err.remote(), RemoteError::Status { status: 503, .. }));
    let view = controller.view().await;
    assert!(view.catalog.is_empty());
    assert_eq!(view.error.as_deref(), Some("Failed to fetch catalog. Please try again."));
    assert_eq!(
        controller.fetch_initial().await.unwrap(),
        FetchOutcome::AlreadyRequested
    );
}

#[tokio::test]
async fn test_unreachable_service() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let controller = controller(&base_url);

    let err = controller.fetch_initial().await.unwrap_err();

    assert!(matches!(err.remote(), RemoteError::RequestFailed(_)));
}

#[tokio::test]
async fn test_upload_files_from_disk() {
    let (server, base_url) = start_mock_server(Mode::Ok).await;
    let controller = controller(&base_url);
    let temp_dir = TempDir::new().unwrap();

    let jpg = temp_dir.path().join("mug.jpg");
    let gif = temp_dir.path().join("spinner.gif");
    std::fs::write(&jpg, vec![0xFFu8; 4096]).unwrap();
    std::fs::write(&gif, b"GIF89a").unwrap();

    let live = controller.select_paths(&[jpg, gif]).await.unwrap();
    assert_eq!(live, 2);

    controller.submit().await.unwrap();

    let received = server.received();
    assert_eq!(received.parts.len(), 2);
    assert_eq!(received.parts[0].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(received.parts[0].len, 4096);
    assert_eq!(received.parts[1].content_type.as_deref(), Some("image/gif"));
    assert_eq!(received.parts[1].len, 6);
}

#[tokio::test]
async fn test_rejected_path_sends_nothing() {
    let (server, base_url) = start_mock_server(Mode::Ok).await;
    let controller = controller(&base_url);
    let temp_dir = TempDir::new().unwrap();

    let notes = temp_dir.path().join("notes.txt");
    std::fs::write(&notes, b"hello").unwrap();

    let err = controller.select_paths(&[notes]).await.unwrap_err();

    assert!(matches!(err, SelectError::Rejected(_)));
    assert_eq!(
        controller.view().await.error.as_deref(),
        Some("Unsupported file type: notes.txt. Only JPEG, PNG, and GIF are allowed.")
    );
    assert_eq!(
        controller.submit().await.unwrap(),
        SubmitOutcome::Skipped(smartcatalog::session::SkipReason::EmptyBatch)
    );
    assert_eq!(server.received().upload_requests, 0);
}
