// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for inference calls

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Detection output exactly as returned by the provider
///
/// The schema belongs to the provider, so the value is passed through
/// without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InferenceResult(pub serde_json::Value);

impl InferenceResult {
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    /// Number of entries in a top-level `predictions` array, if present
    pub fn prediction_count(&self) -> Option<usize> {
        self.0
            .get("predictions")
            .and_then(|p| p.as_array())
            .map(|p| p.len())
    }
}

impl From<serde_json::Value> for InferenceResult {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Errors that can occur while calling the detection API
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The image to submit could not be read from disk
    #[error("Failed to read image {path}: {source}")]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Connection or protocol failure before a response arrived
    #[error("Inference transport error: {0}")]
    Transport(String),

    #[error("Inference timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The provider answered with a non-success status
    #[error("Inference API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The provider answered 2xx with a body that is not JSON
    #[error("Invalid inference response: {0}")]
    InvalidResponse(String),
}

impl InferenceError {
    /// Whether the failure originated at the remote provider
    pub fn is_upstream(&self) -> bool {
        !matches!(self, InferenceError::ImageUnreadable { .. })
    }

    /// Status code returned by the provider, when there was one
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            InferenceError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
