// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference endpoint handler

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::request::extract_upload;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;
use crate::inference::InferenceResult;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// POST /infer - Run object detection on an uploaded image
///
/// Accepts a multipart/form-data body with exactly one part named `file`.
/// The part is written to a per-request scratch file, submitted to the
/// detection API and the scratch file removed afterwards.
///
/// # Response
/// - 200 with the detection API's JSON body, unmodified
///
/// # Errors
/// - 400 Bad Request: not multipart, malformed, missing or repeated `file` part
/// - 413 Payload Too Large: body exceeds the configured upload limit
/// - 500 Internal Server Error: scratch file could not be written
/// - 502 Bad Gateway: the detection API failed or returned an error
pub async fn infer_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let header_value = HeaderValue::from_str(&request_id).ok();

    let mut response = match run_inference(&state, multipart, &request_id).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            warn!("[{}] Inference request failed: {}", request_id, e);
            ApiErrorResponse::new(e, request_id.clone()).into_response()
        }
    };

    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn run_inference(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
    request_id: &str,
) -> Result<InferenceResult, ApiError> {
    let start = Instant::now();

    // 1. Parse the multipart body
    let mut multipart = multipart.map_err(|rejection| {
        ApiError::InvalidRequest(format!("expected multipart/form-data: {}", rejection))
    })?;
    let upload = extract_upload(&mut multipart, state.max_upload_bytes).await?;

    debug!(
        "[{}] Received upload: name={:?}, type={:?}, {} bytes",
        request_id,
        upload.file_name,
        upload.content_type,
        upload.bytes.len()
    );

    // 2. Persist to a scratch file unique to this request
    let scratch = state.scratch.clone();
    let prefix = format!("photo-{}-", request_id);
    let suffix = upload.scratch_suffix();
    let file = tokio::task::spawn_blocking(move || scratch.save(&prefix, &suffix, &upload.bytes))
        .await
        .map_err(|e| ApiError::InternalError(format!("scratch write task failed: {}", e)))??;

    // 3. Run detection; the scratch file is removed when `file` drops
    let result = state.client.infer(file.path(), &state.model_id).await?;
    drop(file);

    info!(
        "[{}] Inference served by {} in {}ms",
        request_id,
        state.client.name(),
        start.elapsed().as_millis()
    );

    Ok(result)
}
