//! Integration tests for the classification client
//!
//! A stub endpoint on a random local port answers with canned responses;
//! the client's outcome must follow the endpoint's status and body.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, StatusCode},
    routing::post,
    Router,
};
use qiraat_common::Outcome;
use qiraat_ui::capture::AudioPayload;
use qiraat_ui::client::GENERIC_ERROR_MESSAGE;
use qiraat_ui::ClassificationClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Received = Arc<Mutex<Vec<(String, Bytes)>>>;

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: &'static str,
    received: Received,
}

async fn stub_predict(
    State(stub): State<Stub>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    stub.received.lock().unwrap().push((content_type, body));
    (stub.status, [(header::CONTENT_TYPE, "application/json")], stub.body)
}

/// Test helper: serve a canned predict response, return its URL and request log
async fn spawn_stub(status: StatusCode, body: &'static str) -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/predict", post(stub_predict))
        .with_state(Stub {
            status,
            body,
            received: received.clone(),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/predict", addr), received)
}

fn client(url: &str) -> ClassificationClient {
    ClassificationClient::new(url, Duration::from_secs(5)).unwrap()
}

fn payload(file_name: Option<&str>, content_type: Option<&str>) -> AudioPayload {
    AudioPayload {
        file_name: file_name.map(str::to_string),
        content_type: content_type.map(str::to_string),
        bytes: Bytes::from_static(b"RIFF....WAVE"),
    }
}

#[tokio::test]
async fn test_success_response_becomes_prediction() {
    let (url, _) = spawn_stub(StatusCode::OK, r#"{"label":"Imam Nafi’","confidence":0.87}"#).await;

    let record = client(&url)
        .identify(&payload(Some("tilawah.wav"), Some("audio/wav")))
        .await;

    assert_eq!(record.name, "tilawah.wav");
    let prediction = record.prediction().expect("success outcome");
    assert_eq!(prediction.label, "Imam Nafi’");
    assert_eq!(prediction.percent(), 87);
}

#[tokio::test]
async fn test_endpoint_error_message_is_kept() {
    let (url, _) = spawn_stub(StatusCode::BAD_REQUEST, r#"{"error":"File audio tidak ditemukan."}"#).await;

    let record = client(&url)
        .identify(&payload(Some("tilawah.wav"), Some("audio/wav")))
        .await;

    assert!(record.is_failure());
    assert_eq!(record.error_message(), Some("File audio tidak ditemukan."));
}

#[tokio::test]
async fn test_non_json_error_uses_status() {
    let (url, _) = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").await;

    let record = client(&url).identify(&payload(None, None)).await;

    assert_eq!(record.error_message(), Some("HTTP 500"));
}

#[tokio::test]
async fn test_network_failure_uses_generic_message() {
    // Bind then release a port so nothing is listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let record = client(&format!("http://{}/predict", addr))
        .identify(&payload(Some("tilawah.wav"), None))
        .await;

    match record.outcome {
        Outcome::Failure { ref message } => assert_eq!(message, GENERIC_ERROR_MESSAGE),
        Outcome::Success(_) => panic!("expected failure"),
    }
    assert_eq!(record.name, "tilawah.wav");
}

#[tokio::test]
async fn test_network_failure_of_unnamed_clip_is_named_audio() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let record = client(&format!("http://{}/predict", addr))
        .identify(&payload(None, Some("audio/webm")))
        .await;

    assert_eq!(record.name, "audio");
    assert_eq!(record.error_message(), Some(GENERIC_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_endpoint_error_of_unnamed_clip_uses_upload_name() {
    let (url, _) = spawn_stub(StatusCode::SERVICE_UNAVAILABLE, "").await;

    let record = client(&url).identify(&payload(None, Some("audio/webm"))).await;

    assert_eq!(record.name, "rekaman.webm");
    assert_eq!(record.error_message(), Some("HTTP 503"));
}

#[tokio::test]
async fn test_request_carries_file_part() {
    let (url, received) = spawn_stub(StatusCode::OK, r#"{"label":"x","confidence":0.5}"#).await;

    client(&url)
        .identify(&payload(Some("surah.mp3"), Some("audio/mpeg")))
        .await;

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (content_type, body) = &received[0];
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(body);
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="surah.mp3""#));
    assert!(body.to_ascii_lowercase().contains("content-type: audio/mpeg"));
    assert!(body.contains("RIFF....WAVE"));
}

#[tokio::test]
async fn test_unnamed_recording_is_sent_as_webm() {
    let (url, received) = spawn_stub(StatusCode::OK, r#"{"label":"x","confidence":0.5}"#).await;

    let record = client(&url)
        .identify(&payload(None, Some("audio/webm")))
        .await;

    assert_eq!(record.name, "rekaman.webm");
    let received = received.lock().unwrap();
    let body = String::from_utf8_lossy(&received[0].1);
    assert!(body.contains(r#"filename="rekaman.webm""#));
}
