// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Interactive webcam capture
//!
//! A live, mirrored preview runs until the capture key is pressed, then the
//! frame on screen is handed to the detection client. Camera and window
//! access sit behind the [`FrameSource`] and [`PreviewWindow`] traits; the
//! OpenCV implementations are compiled with the `camera` feature.

pub mod device;
pub mod frame;
#[cfg(feature = "camera")]
pub mod opencv_backend;
pub mod runner;
pub mod session;
pub mod submit;

use thiserror::Error;

pub use device::{FrameSource, KeyEvent, PreviewWindow};
pub use frame::Frame;
#[cfg(feature = "camera")]
pub use opencv_backend::{HighGuiWindow, OpenCvCamera};
pub use runner::{run_capture, wait_for_first_frame, CaptureOutcome, KEY_POLL_DELAY_MS};
pub use session::{CancelReason, CaptureEvent, CaptureSession, CaptureState};
pub use submit::{submit_capture, submit_capture_until_cancelled, SubmitError};

/// Camera and preview window failures; all are fatal for the run
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Camera {index} unavailable: {reason}")]
    CameraUnavailable { index: i32, reason: String },

    #[error("Failed to read frame: {0}")]
    FrameRead(String),

    #[error("No frame received after {attempts} attempts")]
    NoFrames { attempts: u32 },

    #[error("Preview window error: {0}")]
    Display(String),
}
