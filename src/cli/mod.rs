// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Command-line arguments for the server and capture binaries

use clap::{Args, Parser};
use std::path::PathBuf;

use crate::config::{
    CaptureConfig, ConfigError, InferenceConfig, ServerConfig, DEFAULT_API_URL,
    DEFAULT_CAPTURE_KEY, DEFAULT_HOST, DEFAULT_MAX_EMPTY_FRAMES, DEFAULT_MAX_UPLOAD_BYTES,
    DEFAULT_MODEL_ID, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, DEFAULT_WINDOW_TITLE,
};

/// Detection API settings shared by both binaries
#[derive(Args, Debug, Clone)]
pub struct InferenceArgs {
    /// Base URL of the detection API
    #[arg(long, env = "ROBOFLOW_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// API key for the detection API
    #[arg(long, env = "ROBOFLOW_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Model identifier in <project>/<version> form
    #[arg(long, env = "ROBOFLOW_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    pub model_id: String,

    /// Timeout for a single inference call, in seconds
    #[arg(long, env = "INFERENCE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl InferenceArgs {
    pub fn into_config(self) -> Result<InferenceConfig, ConfigError> {
        let config = InferenceConfig {
            api_url: self.api_url,
            api_key: self.api_key,
            model_id: self.model_id,
            timeout_secs: self.timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Image upload server that forwards to the detection API
#[derive(Parser, Debug)]
#[command(name = "stack-detect")]
#[command(version)]
#[command(about = "HTTP server that runs object detection on uploaded images", long_about = None)]
pub struct ServerCli {
    /// Address to bind
    #[arg(long, env = "STACK_DETECT_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "STACK_DETECT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory for per-request scratch files [default: system temp dir]
    #[arg(long, env = "SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[command(flatten)]
    pub inference: InferenceArgs,
}

impl ServerCli {
    pub fn into_configs(self) -> Result<(ServerConfig, InferenceConfig), ConfigError> {
        let server = ServerConfig {
            host: self.host,
            port: self.port,
            scratch_dir: self.scratch_dir.unwrap_or_else(std::env::temp_dir),
            max_upload_bytes: self.max_upload_bytes,
        };
        server.validate()?;
        Ok((server, self.inference.into_config()?))
    }
}

/// Capture a webcam frame and run object detection on it
#[derive(Parser, Debug)]
#[command(name = "capture-infer")]
#[command(version)]
#[command(about = "Preview the webcam, capture a frame on a key press and run detection", long_about = None)]
pub struct CaptureCli {
    /// Camera device index
    #[arg(long = "camera", env = "CAMERA_INDEX", default_value_t = 0)]
    pub camera_index: i32,

    /// Title of the preview window
    #[arg(long, default_value = DEFAULT_WINDOW_TITLE)]
    pub window_title: String,

    /// Key that captures the current frame
    #[arg(long, default_value_t = DEFAULT_CAPTURE_KEY)]
    pub capture_key: char,

    /// Keep the captured image at this path
    #[arg(long, env = "CAPTURE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Directory for the scratch image [default: system temp dir]
    #[arg(long, env = "SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Consecutive empty frames tolerated before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_EMPTY_FRAMES)]
    pub max_empty_frames: u32,

    #[command(flatten)]
    pub inference: InferenceArgs,
}

impl CaptureCli {
    pub fn into_configs(self) -> Result<(CaptureConfig, InferenceConfig), ConfigError> {
        let capture = CaptureConfig {
            camera_index: self.camera_index,
            window_title: self.window_title,
            capture_key: self.capture_key,
            scratch_dir: self.scratch_dir.unwrap_or_else(std::env::temp_dir),
            output: self.output,
            max_empty_frames: self.max_empty_frames,
        };
        capture.validate()?;
        Ok((capture, self.inference.into_config()?))
    }
}
