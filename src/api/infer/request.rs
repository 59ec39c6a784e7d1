// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction

use axum::http::StatusCode;
use axum_extra::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;
use tracing::debug;

use crate::api::errors::ApiError;

/// Name of the multipart part carrying the image
pub const FILE_FIELD: &str = "file";

/// Suffix used when the upload has no usable file extension
pub const DEFAULT_SUFFIX: &str = ".jpg";

/// Longest file extension carried over to the scratch file
const MAX_EXTENSION_LEN: usize = 8;

/// The single image part of an upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedImage {
    /// Scratch file suffix derived from the uploaded file name
    ///
    /// Only short alphanumeric extensions are kept; anything else falls
    /// back to `.jpg`.
    pub fn scratch_suffix(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LEN
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string())
    }
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::InvalidRequest(format!("malformed multipart body: {}", err))
    }
}

/// Pull exactly one `file` part out of a multipart body
///
/// Only parts carrying a filename count as the upload; other parts are
/// skipped. No size, type or content checks are made on
/// the file itself.
pub async fn extract_upload(
    multipart: &mut Multipart,
    limit: usize,
) -> Result<UploadedImage, ApiError> {
    let mut upload: Option<UploadedImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        // Form values named `file` are not file uploads
        if field.file_name().is_none() {
            debug!("Skipping '{}' part without a filename", FILE_FIELD);
            continue;
        }

        if upload.is_some() {
            return Err(ApiError::ValidationError {
                field: FILE_FIELD.to_string(),
                message: format!("exactly one '{}' part is allowed", FILE_FIELD),
            });
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

        upload = Some(UploadedImage {
            file_name,
            content_type,
            bytes,
        });
    }

    upload.ok_or_else(|| ApiError::missing_field(FILE_FIELD))
}
