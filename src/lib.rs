// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod capture;
pub mod cli;
pub mod config;
pub mod inference;
pub mod storage;
pub mod version;

// Re-export main types
pub use api::{create_app, start_server, AppState};
pub use config::{CaptureConfig, ConfigError, InferenceConfig, ServerConfig};
pub use inference::{DetectionClient, HostedDetectionClient, InferenceError, InferenceResult};
pub use storage::{ScratchDir, ScratchFile, StorageError};
