// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hand a captured frame to the detection client

use std::path::Path;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::Frame;
use crate::inference::{DetectionClient, InferenceError, InferenceResult};
use crate::storage::{ScratchDir, StorageError};

/// Scratch file prefix for captured frames
pub const CAPTURE_PREFIX: &str = "photo1-";

const DEFAULT_SUFFIX: &str = ".jpg";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to encode captured frame: {0}")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Save `frame`, run detection on it and return the provider's result
///
/// The frame is written to a scratch file in `scratch`. When `output` is
/// given the file is moved there after the call, otherwise it is deleted.
/// The encoding follows the extension of `output`, JPEG by default.
pub async fn submit_capture(
    frame: &Frame,
    scratch: &ScratchDir,
    output: Option<&Path>,
    client: &dyn DetectionClient,
    model_id: &str,
) -> Result<InferenceResult, SubmitError> {
    let suffix = output
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());

    let file = scratch.reserve(CAPTURE_PREFIX, &suffix)?;
    frame.save(file.path())?;
    debug!(
        "Saved {}x{} capture to {}",
        frame.width(),
        frame.height(),
        file.path().display()
    );

    let result = client.infer(file.path(), model_id).await?;

    if let Some(output) = output {
        let kept = file.persist(output)?;
        info!("Captured image kept at {}", kept.display());
    }

    Ok(result)
}

/// [`submit_capture`] that gives up as soon as `cancel` fires
///
/// Returns `Ok(None)` when cancelled; the scratch file is removed and
/// nothing is written to `output`.
pub async fn submit_capture_until_cancelled(
    frame: &Frame,
    scratch: &ScratchDir,
    output: Option<&Path>,
    client: &dyn DetectionClient,
    model_id: &str,
    cancel: &CancellationToken,
) -> Result<Option<InferenceResult>, SubmitError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!("Inference cancelled");
            Ok(None)
        }
        result = submit_capture(frame, scratch, output, client, model_id) => result.map(Some),
    }
}
