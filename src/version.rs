// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for stack-detect

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-hosted-inference-2025-11-02";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-02";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multipart-upload",
    "hosted-inference",
    "scratch-cleanup",
    "json-errors",
    "graceful-shutdown",
    "webcam-capture",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("stack-detect {} ({})", VERSION_NUMBER, BUILD_DATE)
}
