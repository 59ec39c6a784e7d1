// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod http_server;
pub mod infer;

pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use http_server::{create_app, shutdown_signal, start_server, AppState};
pub use infer::{infer_handler, UploadedImage};
