//! Integration tests for qiraat-id API endpoints
//!
//! Tests cover:
//! - POST /predict with an audio part (200 + prediction)
//! - Missing `file` part (400 + fixed message)
//! - Non-multipart body and classifier failure (500 + fixed message)
//! - Health endpoint

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use qiraat_common::api::{MISSING_FILE_MESSAGE, PROCESSING_FAILED_MESSAGE};
use qiraat_common::Prediction;
use qiraat_id::classifier::MOCK_READINGS;
use qiraat_id::{build_router, AppState, MockClassifier};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot` method

const BOUNDARY: &str = "qiraat-test-boundary";

/// Test helper: router backed by the stock mock classifier
fn setup_app() -> axum::Router {
    build_router(AppState::new(Arc::new(MockClassifier::new())))
}

/// Test helper: one multipart part
struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    content_type: Option<&'a str>,
    data: &'a [u8],
}

/// Test helper: encode parts as a multipart/form-data body
fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn predict_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn audio_part(data: &[u8]) -> Part<'_> {
    Part {
        name: "file",
        file_name: Some("tilawah.wav"),
        content_type: Some("audio/wav"),
        data,
    }
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = body.collect().await.expect("Should read body").to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Predict Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_predict_returns_fixed_reading() {
    let app = setup_app();

    let response = app
        .oneshot(predict_request(&[audio_part(b"RIFF....WAVEfmt ")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let label = body["label"].as_str().expect("label is a string");
    let confidence = body["confidence"].as_f64().expect("confidence is a number");
    assert!(
        MOCK_READINGS
            .iter()
            .any(|(l, c)| *l == label && (*c - confidence).abs() < f64::EPSILON),
        "unexpected reading {} / {}",
        label,
        confidence
    );
}

#[tokio::test]
async fn test_predict_uses_configured_classifier() {
    let classifier = MockClassifier::with_choices(vec![Prediction::new("Imam Nafi’", 0.87)]);
    let app = build_router(AppState::new(Arc::new(classifier)));

    let response = app
        .oneshot(predict_request(&[audio_part(b"\x1a\x45\xdf\xa3")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["label"], "Imam Nafi’");
    assert_eq!(body["confidence"], 0.87);
}

#[tokio::test]
async fn test_predict_accepts_part_without_filename() {
    // Recorded clips may arrive with only a content type
    let app = setup_app();
    let part = Part {
        name: "file",
        file_name: None,
        content_type: Some("audio/webm"),
        data: b"webm-bytes",
    };

    let response = app.oneshot(predict_request(&[part])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_predict_skips_unrelated_fields() {
    let app = setup_app();
    let note = Part {
        name: "note",
        file_name: None,
        content_type: None,
        data: b"hello",
    };

    let response = app
        .oneshot(predict_request(&[note, audio_part(b"RIFF")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_predict_without_file_is_bad_request() {
    let app = setup_app();
    let other = Part {
        name: "audio",
        file_name: Some("clip.wav"),
        content_type: Some("audio/wav"),
        data: b"RIFF",
    };

    let response = app.oneshot(predict_request(&[other])).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], MISSING_FILE_MESSAGE);
}

#[tokio::test]
async fn test_predict_text_value_is_not_a_file() {
    let app = setup_app();
    let text = Part {
        name: "file",
        file_name: None,
        content_type: None,
        data: b"not audio",
    };

    let response = app.oneshot(predict_request(&[text])).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "File audio tidak ditemukan.");
}

#[tokio::test]
async fn test_predict_non_multipart_is_internal_error() {
    let app = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file":"nope"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], PROCESSING_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_predict_classifier_failure_is_internal_error() {
    let app = build_router(AppState::new(Arc::new(MockClassifier::with_choices(
        Vec::new(),
    ))));

    let response = app
        .oneshot(predict_request(&[audio_part(b"RIFF")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Gagal memproses permintaan.");
}

#[tokio::test]
async fn test_predict_rejects_get() {
    let app = setup_app();
    let request = Request::builder()
        .uri("/predict")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "qiraat-id");
    assert!(body["version"].is_string());
}
