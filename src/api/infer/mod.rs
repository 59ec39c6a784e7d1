// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference API endpoint module
//!
//! Provides POST /infer for running object detection on an uploaded image.

pub mod handler;
pub mod request;

pub use handler::infer_handler;
pub use request::{extract_upload, UploadedImage, FILE_FIELD};
