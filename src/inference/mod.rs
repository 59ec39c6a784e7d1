// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client side of the hosted object-detection API
//!
//! Both the upload server and the capture tool submit images through the
//! [`DetectionClient`] trait; [`HostedDetectionClient`] is the production
//! implementation.

pub mod client;
pub mod hosted;
pub mod types;

pub use client::DetectionClient;
pub use hosted::HostedDetectionClient;
pub use types::{InferenceError, InferenceResult};
