// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /infer endpoint tests
//!
//! These tests verify that the infer handler:
//! - Accepts a multipart upload with a single `file` part
//! - Hands the exact uploaded bytes to the detection client
//! - Returns the client's JSON result unmodified with status 200
//! - Only registers the POST /infer route

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use stack_detect::{
    api::{create_app, AppState},
    inference::{DetectionClient, InferenceError, InferenceResult},
    storage::ScratchDir,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "----stack-detect-test";

/// What the stub saw for one call
#[derive(Debug, Clone)]
struct RecordedCall {
    path: PathBuf,
    model_id: String,
    bytes: Vec<u8>,
}

/// Detection client returning a fixed result and recording its inputs
struct StubClient {
    response: Value,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubClient {
    fn new(response: Value) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DetectionClient for StubClient {
    async fn infer(
        &self,
        image_path: &Path,
        model_id: &str,
    ) -> Result<InferenceResult, InferenceError> {
        let bytes = std::fs::read(image_path).map_err(|source| InferenceError::ImageUnreadable {
            path: image_path.to_path_buf(),
            source,
        })?;
        self.calls.lock().unwrap().push(RecordedCall {
            path: image_path.to_path_buf(),
            model_id: model_id.to_string(),
            bytes,
        });
        Ok(InferenceResult(self.response.clone()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Helper: 32x32 PNG fixture
fn fixture_png() -> Vec<u8> {
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 200]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

fn file_part_body(file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn infer_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/infer")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Helper: app wired to `client`, scratch files under `dir`
fn setup_app(client: Arc<StubClient>, dir: &TempDir) -> Router {
    let state = AppState::new(
        client,
        ScratchDir::new(dir.path()).unwrap(),
        "degen101-original-stack-size-rn0ra/3",
        10 * 1024 * 1024,
    );
    create_app(Arc::new(state))
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[cfg(test)]
mod infer_endpoint_tests {
    use super::*;

    /// Stubbed provider result comes back byte-for-byte as the response body
    #[tokio::test]
    async fn test_coin_prediction_passthrough() {
        let dir = TempDir::new().unwrap();
        let expected = json!({"predictions": [{"class": "coin", "confidence": 0.9}]});
        let client = Arc::new(StubClient::new(expected.clone()));
        let app = setup_app(client.clone(), &dir);

        let response = app
            .oneshot(infer_request(file_part_body("coins.png", &fixture_png())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(read_json(response).await, expected);
    }

    /// Nested provider payloads are not reshaped
    #[tokio::test]
    async fn test_response_structure_preserved() {
        let dir = TempDir::new().unwrap();
        let expected = json!({
            "time": 0.123,
            "image": {"width": 32, "height": 32},
            "predictions": [
                {"x": 10.5, "y": 12.0, "width": 4, "height": 6, "class": "chip", "confidence": 0.75, "class_id": 2},
                {"x": 20.0, "y": 8.25, "width": 3, "height": 3, "class": "coin", "confidence": 0.51, "class_id": 0}
            ],
            "extra": null
        });
        let client = Arc::new(StubClient::new(expected.clone()));
        let app = setup_app(client, &dir);

        let response = app
            .oneshot(infer_request(file_part_body("stack.png", &fixture_png())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, expected);
    }

    /// The file the client reads holds exactly the uploaded bytes
    #[tokio::test]
    async fn test_client_receives_uploaded_bytes() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(StubClient::new(json!({"predictions": []})));
        let app = setup_app(client.clone(), &dir);
        let png = fixture_png();

        let response = app
            .oneshot(infer_request(file_part_body("coins.png", &png)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].bytes, png);
        assert_eq!(calls[0].model_id, "degen101-original-stack-size-rn0ra/3");
        assert!(calls[0].path.starts_with(dir.path()));
    }

    /// Each request gets its own scratch file, removed afterwards
    #[tokio::test]
    async fn test_requests_use_distinct_scratch_files() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(StubClient::new(json!({})));
        let app = setup_app(client.clone(), &dir);

        for payload in [b"first".as_slice(), b"second".as_slice()] {
            let response = app
                .clone()
                .oneshot(infer_request(file_part_body("photo.jpg", payload)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert_ne!(calls[0].path, calls[1].path);
        assert_eq!(calls[0].bytes, b"first");
        assert_eq!(calls[1].bytes, b"second");
        assert!(!calls[0].path.exists());
        assert!(!calls[1].path.exists());
    }

    /// Concurrent uploads never see each other's image
    #[tokio::test]
    async fn test_concurrent_requests_isolated() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(StubClient::new(json!({})));
        let app = setup_app(client.clone(), &dir);

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    let payload = vec![i; 256];
                    app.oneshot(infer_request(file_part_body("photo.jpg", &payload)))
                        .await
                        .unwrap()
                        .status()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::OK);
        }

        let calls = client.calls();
        assert_eq!(calls.len(), 8);
        for call in calls {
            let first = call.bytes[0];
            assert!(call.bytes.iter().all(|b| *b == first));
        }
    }

    /// GET /infer is not allowed
    #[tokio::test]
    async fn test_infer_rejects_get() {
        let dir = TempDir::new().unwrap();
        let app = setup_app(Arc::new(StubClient::new(json!({}))), &dir);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/infer")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    /// No other routes exist
    #[tokio::test]
    async fn test_unknown_route() {
        let dir = TempDir::new().unwrap();
        let app = setup_app(Arc::new(StubClient::new(json!({}))), &dir);

        for uri in ["/health", "/v1/infer", "/"] {
            let request = Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }
}
