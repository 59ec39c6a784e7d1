// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenCV camera and highgui preview window

use opencv::{
    core::{self, Mat},
    highgui, imgproc,
    prelude::*,
    videoio,
};
use tracing::{debug, info};

use super::{CaptureError, Frame, FrameSource, KeyEvent, PreviewWindow};

/// Local camera device opened through OpenCV's videoio
pub struct OpenCvCamera {
    capture: videoio::VideoCapture,
    index: i32,
    buffer: Mat,
}

impl OpenCvCamera {
    /// Open camera `index`, failing fast when the device is not usable
    pub fn open(index: i32) -> Result<Self, CaptureError> {
        let unavailable = |reason: String| CaptureError::CameraUnavailable { index, reason };

        let capture = videoio::VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| unavailable(e.to_string()))?;
        let opened = capture
            .is_opened()
            .map_err(|e| unavailable(e.to_string()))?;
        if !opened {
            return Err(unavailable("device could not be opened".to_string()));
        }

        info!("Opened camera {}", index);
        Ok(Self {
            capture,
            index,
            buffer: Mat::default(),
        })
    }

    pub fn index(&self) -> i32 {
        self.index
    }
}

impl FrameSource for OpenCvCamera {
    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let grabbed = self
            .capture
            .read(&mut self.buffer)
            .map_err(|e| CaptureError::FrameRead(e.to_string()))?;
        if !grabbed || self.buffer.empty() {
            return Ok(None);
        }
        bgr_to_frame(&self.buffer).map(Some)
    }

    fn release(&mut self) -> Result<(), CaptureError> {
        debug!("Releasing camera {}", self.index);
        self.capture
            .release()
            .map_err(|e| CaptureError::FrameRead(e.to_string()))
    }
}

fn bgr_to_frame(bgr: &Mat) -> Result<Frame, CaptureError> {
    let read_err = |e: opencv::Error| CaptureError::FrameRead(e.to_string());

    let mut rgb = Mat::default();
    imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(read_err)?;

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let data = rgb.data_bytes().map_err(read_err)?.to_vec();

    Frame::from_raw(width, height, data).ok_or_else(|| {
        CaptureError::FrameRead(format!(
            "unexpected frame layout for {}x{} image",
            width, height
        ))
    })
}

fn frame_to_bgr(frame: &Frame) -> Result<Mat, CaptureError> {
    let display_err = |e: opencv::Error| CaptureError::Display(e.to_string());

    let mut rgb = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        core::CV_8UC3,
        core::Scalar::all(0.0),
    )
    .map_err(display_err)?;
    rgb.data_bytes_mut()
        .map_err(display_err)?
        .copy_from_slice(frame.as_raw());

    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0).map_err(display_err)?;
    Ok(bgr)
}

/// highgui window showing the live preview
pub struct HighGuiWindow {
    title: String,
    open: bool,
}

impl HighGuiWindow {
    pub fn create(title: &str) -> Result<Self, CaptureError> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
            .map_err(|e| CaptureError::Display(e.to_string()))?;
        Ok(Self {
            title: title.to_string(),
            open: true,
        })
    }

    fn is_visible(&self) -> Result<bool, CaptureError> {
        let visible = highgui::get_window_property(&self.title, highgui::WND_PROP_VISIBLE)
            .map_err(|e| CaptureError::Display(e.to_string()))?;
        Ok(visible >= 1.0)
    }
}

impl PreviewWindow for HighGuiWindow {
    fn show(&mut self, frame: &Frame) -> Result<(), CaptureError> {
        let bgr = frame_to_bgr(frame)?;
        highgui::imshow(&self.title, &bgr).map_err(|e| CaptureError::Display(e.to_string()))
    }

    fn wait_key(&mut self, delay_ms: i32) -> Result<KeyEvent, CaptureError> {
        let code =
            highgui::wait_key(delay_ms).map_err(|e| CaptureError::Display(e.to_string()))?;
        match KeyEvent::from_key_code(code) {
            KeyEvent::None if !self.is_visible()? => Ok(KeyEvent::WindowClosed),
            event => Ok(event),
        }
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        highgui::destroy_window(&self.title).map_err(|e| CaptureError::Display(e.to_string()))
    }
}

impl Drop for HighGuiWindow {
    fn drop(&mut self) {
        if self.open {
            let _ = highgui::destroy_window(&self.title);
        }
    }
}
