// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hosted detection API client
//!
//! Images are sent base64-encoded as a form body to
//! `{api_url}/{model_id}?api_key=...`; the JSON reply is returned untouched.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::client::DetectionClient;
use super::types::{InferenceError, InferenceResult};
use crate::config::InferenceConfig;

/// Client for the hosted object-detection service
pub struct HostedDetectionClient {
    client: Client,
    api_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl HostedDetectionClient {
    /// Create a new client from validated configuration
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let api_url = config.api_url.trim_end_matches('/').to_string();
        info!(
            "Detection client configured: endpoint={}, timeout={}s",
            api_url, config.timeout_secs
        );

        Ok(Self {
            client,
            api_url,
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Endpoint for a model, e.g. `https://detect.roboflow.com/coins/3`
    pub fn model_url(&self, model_id: &str) -> String {
        format!("{}/{}", self.api_url, model_id.trim_matches('/'))
    }
}

#[async_trait]
impl DetectionClient for HostedDetectionClient {
    async fn infer(
        &self,
        image_path: &Path,
        model_id: &str,
    ) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();

        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|source| InferenceError::ImageUnreadable {
                path: image_path.to_path_buf(),
                source,
            })?;
        let encoded = STANDARD.encode(&bytes);
        debug!(
            "Submitting {} ({} bytes) to model {}",
            image_path.display(),
            bytes.len(),
            model_id
        );

        let response = self
            .client
            .post(self.model_url(model_id))
            .query(&[("api_key", self.api_key.as_str())])
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encoded)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    InferenceError::Transport(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Detection API returned {} for model {}", status, model_id);
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                InferenceError::Transport(e.without_url().to_string())
            }
        })?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| InferenceError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        let result = InferenceResult(value);
        info!(
            "Inference complete: model={}, predictions={}, {}ms",
            model_id,
            result
                .prediction_count()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            start.elapsed().as_millis()
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}
