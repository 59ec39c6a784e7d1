// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Capture state machine
//!
//! ```text
//! Capturing --key == capture key--> Done(frame)
//! Capturing --interrupt----------> Cancelled(Interrupted)
//! Capturing --window closed------> Cancelled(WindowClosed)
//! ```
//!
//! `Done` and `Cancelled` are terminal and ignore further events.

use super::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Ctrl-C or another interrupt signal
    Interrupted,
    /// The operator closed the preview window
    WindowClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Capturing,
    Done(Frame),
    Cancelled(CancelReason),
}

impl CaptureState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CaptureState::Capturing)
    }
}

#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// A key was pressed while `frame` was on screen
    Key { key: char, frame: Frame },
    Interrupted,
    WindowClosed,
}

#[derive(Debug)]
pub struct CaptureSession {
    state: CaptureState,
    capture_key: char,
}

impl CaptureSession {
    pub fn new(capture_key: char) -> Self {
        Self {
            state: CaptureState::Capturing,
            capture_key,
        }
    }

    pub fn capture_key(&self) -> char {
        self.capture_key
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn handle(&mut self, event: CaptureEvent) -> &CaptureState {
        if self.state.is_terminal() {
            return &self.state;
        }

        match event {
            CaptureEvent::Key { key, frame } if key == self.capture_key => {
                self.state = CaptureState::Done(frame);
            }
            CaptureEvent::Key { .. } => {}
            CaptureEvent::Interrupted => {
                self.state = CaptureState::Cancelled(CancelReason::Interrupted);
            }
            CaptureEvent::WindowClosed => {
                self.state = CaptureState::Cancelled(CancelReason::WindowClosed);
            }
        }
        &self.state
    }

    pub fn into_state(self) -> CaptureState {
        self.state
    }
}
