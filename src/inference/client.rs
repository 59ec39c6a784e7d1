// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection client trait definition

use async_trait::async_trait;
use std::path::Path;

use super::types::{InferenceError, InferenceResult};

/// Trait for services that run object detection on an image file
///
/// The upload server and the capture tool depend only on this trait, so a
/// stub can stand in for the hosted API in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DetectionClient: Send + Sync {
    /// Submit the image at `image_path` to the model `model_id`
    ///
    /// The file must exist and be fully written before the call.
    async fn infer(
        &self,
        image_path: &Path,
        model_id: &str,
    ) -> Result<InferenceResult, InferenceError>;

    /// Get the client name for logging
    fn name(&self) -> &'static str;
}
