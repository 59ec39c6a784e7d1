// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Camera and preview window traits

use super::{CaptureError, Frame};

/// Something that produces camera frames
pub trait FrameSource {
    /// Read the next frame
    ///
    /// `Ok(None)` means the device delivered an empty frame, which cameras
    /// do while warming up.
    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Release the underlying device
    fn release(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }
}

/// Result of polling the preview window for input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    None,
    Pressed(char),
    WindowClosed,
}

impl KeyEvent {
    /// Decode a highgui-style key code (`-1` when no key was pressed)
    pub fn from_key_code(code: i32) -> Self {
        if code < 0 {
            return KeyEvent::None;
        }
        // Modifier flags live above 0xFFFF; 0xFFxx are special-key keysyms
        let key = code & 0xFFFF;
        if key & 0xFF00 != 0 {
            return KeyEvent::None;
        }
        let low = key as u8;
        if low.is_ascii() {
            KeyEvent::Pressed(low as char)
        } else {
            KeyEvent::None
        }
    }
}

/// Window showing the live preview
pub trait PreviewWindow {
    fn show(&mut self, frame: &Frame) -> Result<(), CaptureError>;

    /// Wait up to `delay_ms` for a key press
    fn wait_key(&mut self, delay_ms: i32) -> Result<KeyEvent, CaptureError>;

    fn close(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }
}
