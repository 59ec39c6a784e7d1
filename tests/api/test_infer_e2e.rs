// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end test: upload server wired to the real hosted client,
//! which talks to a local stand-in for the detection API.

use axum::{
    body::Body,
    extract::{Path as UrlPath, Query},
    http::{Method, Request, StatusCode},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use stack_detect::{
    api::{create_app, AppState},
    config::InferenceConfig,
    inference::HostedDetectionClient,
    storage::ScratchDir,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::util::ServiceExt;

const BOUNDARY: &str = "----stack-detect-e2e";

/// What the fake provider received
#[derive(Debug, Default, Clone)]
struct ProviderLog {
    model: String,
    api_key: Option<String>,
    image: Vec<u8>,
}

async fn spawn_provider(log: Arc<Mutex<Vec<ProviderLog>>>) -> String {
    let router = Router::new().route(
        "/:project/:version",
        post(
            move |UrlPath((project, version)): UrlPath<(String, String)>,
                  Query(query): Query<HashMap<String, String>>,
                  body: String| {
                let log = log.clone();
                async move {
                    let image = STANDARD.decode(body.as_bytes()).unwrap_or_default();
                    log.lock().unwrap().push(ProviderLog {
                        model: format!("{}/{}", project, version),
                        api_key: query.get("api_key").cloned(),
                        image,
                    });
                    Json(json!({
                        "predictions": [
                            {"class": "coin", "confidence": 0.9, "x": 1, "y": 2}
                        ]
                    }))
                }
            },
        ),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn upload_request(data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"stack.jpg\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

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

#[tokio::test]
async fn test_upload_reaches_provider_and_result_returns() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let provider = spawn_provider(log.clone()).await;

    let config = InferenceConfig {
        api_url: provider,
        api_key: "e2e-key".to_string(),
        model_id: "degen101-original-stack-size-rn0ra/3".to_string(),
        timeout_secs: 5,
    };
    let client = HostedDetectionClient::new(&config).unwrap();
    let dir = TempDir::new().unwrap();
    let state = AppState::new(
        Arc::new(client),
        ScratchDir::new(dir.path()).unwrap(),
        config.model_id.clone(),
        1024 * 1024,
    );
    let app = create_app(Arc::new(state));

    let image: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let response = app.oneshot(upload_request(&image)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({"predictions": [{"class": "coin", "confidence": 0.9, "x": 1, "y": 2}]})
    );

    let log = log.lock().unwrap().clone();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].model, "degen101-original-stack-size-rn0ra/3");
    assert_eq!(log[0].api_key.as_deref(), Some("e2e-key"));
    assert_eq!(log[0].image, image);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_provider_down_is_bad_gateway() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = InferenceConfig::new("e2e-key");
    config.api_url = format!("http://{}", addr);
    config.timeout_secs = 2;
    let client = HostedDetectionClient::new(&config).unwrap();
    let dir = TempDir::new().unwrap();
    let state = AppState::new(
        Arc::new(client),
        ScratchDir::new(dir.path()).unwrap(),
        "coins/3",
        1024 * 1024,
    );
    let app = create_app(Arc::new(state));

    let response = app.oneshot(upload_request(b"jpeg")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("inference_error"));
    assert!(!text.contains("e2e-key"));
}
