// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration for the upload server and the capture tool
//!
//! Every setting has a documented default except the API key, which must
//! always be supplied. The binaries fill these structs from flags and
//! environment variables (see [`crate::cli`]).

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Hosted detection endpoint used when none is configured
pub const DEFAULT_API_URL: &str = "https://detect.roboflow.com";

/// Model the detector was trained for
pub const DEFAULT_MODEL_ID: &str = "degen101-original-stack-size-rn0ra/3";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_HOST: &str = "127.0.0.1";

pub const DEFAULT_PORT: u16 = 5000;

/// Maximum accepted upload size (20MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub const DEFAULT_WINDOW_TITLE: &str = "Live Camera";

pub const DEFAULT_CAPTURE_KEY: char = 'q';

/// Consecutive empty frames tolerated while the camera warms up
pub const DEFAULT_MAX_EMPTY_FRAMES: u32 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

/// Connection settings for the hosted inference API
#[derive(Clone, PartialEq)]
pub struct InferenceConfig {
    /// Base URL of the detection service
    pub api_url: String,
    /// API key sent with every inference call
    pub api_key: String,
    /// Model identifier in `<project>/<version>` form
    pub model_id: String,
    /// Per-call request timeout in seconds
    pub timeout_secs: u64,
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model_id", &self.model_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl InferenceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("api_key"));
        }

        let url = url::Url::parse(&self.api_url).map_err(|e| invalid("api_url", e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid(
                "api_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        validate_model_id(&self.model_id)?;

        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be greater than 0"));
        }
        Ok(())
    }
}

fn validate_model_id(model_id: &str) -> Result<(), ConfigError> {
    match model_id.split_once('/') {
        Some((project, version))
            if !project.is_empty() && !version.is_empty() && !version.contains('/') =>
        {
            Ok(())
        }
        _ => Err(invalid(
            "model_id",
            format!("expected '<project>/<version>', got '{}'", model_id),
        )),
    }
}

/// Upload server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory receiving per-request scratch files
    pub scratch_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            scratch_dir: env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() || self.host.chars().any(char::is_whitespace) {
            return Err(invalid("host", format!("'{}' is not a valid host", self.host)));
        }
        if self.max_upload_bytes == 0 {
            return Err(invalid("max_upload_bytes", "must be greater than 0"));
        }
        Ok(())
    }

    /// Resolve `host:port` to the first address it names
    ///
    /// IP literals are used as given; hostnames such as `localhost` go
    /// through the system resolver.
    pub async fn resolve_bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| invalid("host", format!("cannot resolve '{}': {}", self.host, e)))?;
        addrs
            .next()
            .ok_or_else(|| invalid("host", format!("'{}' resolved to no addresses", self.host)))
    }
}

/// Webcam capture settings
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    pub camera_index: i32,
    pub window_title: String,
    /// Key that captures the current frame
    pub capture_key: char,
    pub scratch_dir: PathBuf,
    /// Keep the captured image at this path instead of a scratch file
    pub output: Option<PathBuf>,
    pub max_empty_frames: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            capture_key: DEFAULT_CAPTURE_KEY,
            scratch_dir: env::temp_dir(),
            output: None,
            max_empty_frames: DEFAULT_MAX_EMPTY_FRAMES,
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera_index < 0 {
            return Err(invalid("camera_index", "must not be negative"));
        }
        if !self.capture_key.is_ascii_graphic() {
            return Err(invalid(
                "capture_key",
                format!("'{}' is not a printable ASCII character", self.capture_key),
            ));
        }
        if let Some(output) = &self.output {
            match output.extension().and_then(|e| e.to_str()) {
                Some(ext) if image::ImageFormat::from_extension(ext).is_some() => {}
                _ => {
                    return Err(invalid(
                        "output",
                        format!("{} has no recognised image extension", output.display()),
                    ))
                }
            }
        }
        Ok(())
    }
}
