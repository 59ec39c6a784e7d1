// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Preview loop driving the capture state machine

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    CancelReason, CaptureError, CaptureEvent, CaptureSession, CaptureState, Frame, FrameSource,
    KeyEvent, PreviewWindow,
};

/// Key poll wait per frame; also throttles the preview frame rate
pub const KEY_POLL_DELAY_MS: i32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The mirrored frame on screen when the capture key was pressed
    Captured(Frame),
    Cancelled(CancelReason),
}

/// Read until the camera delivers a frame
///
/// Used before the preview window opens so an unusable camera is reported
/// up front. Fails after `max_empty_frames` consecutive empty reads.
pub fn wait_for_first_frame<S: FrameSource + ?Sized>(
    source: &mut S,
    max_empty_frames: u32,
) -> Result<Frame, CaptureError> {
    let mut empty = 0;
    loop {
        match source.read_frame()? {
            Some(frame) => {
                debug!(
                    "First frame after {} empty reads: {}x{}",
                    empty,
                    frame.width(),
                    frame.height()
                );
                return Ok(frame);
            }
            None => {
                empty += 1;
                if empty > max_empty_frames {
                    return Err(CaptureError::NoFrames { attempts: empty });
                }
            }
        }
    }
}

/// Run the live preview until a frame is captured or the run is cancelled
///
/// The source is released and the window closed on every exit path,
/// including errors.
pub fn run_capture<S, W>(
    source: &mut S,
    window: &mut W,
    session: CaptureSession,
    max_empty_frames: u32,
    cancel: &CancellationToken,
) -> Result<CaptureOutcome, CaptureError>
where
    S: FrameSource + ?Sized,
    W: PreviewWindow + ?Sized,
{
    let outcome = preview_loop(source, window, session, max_empty_frames, cancel);

    let released = source.release();
    let closed = window.close();
    if let Err(e) = &released {
        warn!("Failed to release camera: {}", e);
    }
    if let Err(e) = &closed {
        warn!("Failed to close preview window: {}", e);
    }

    let outcome = outcome?;
    released?;
    closed?;
    Ok(outcome)
}

fn preview_loop<S, W>(
    source: &mut S,
    window: &mut W,
    mut session: CaptureSession,
    max_empty_frames: u32,
    cancel: &CancellationToken,
) -> Result<CaptureOutcome, CaptureError>
where
    S: FrameSource + ?Sized,
    W: PreviewWindow + ?Sized,
{
    let mut empty_streak = 0;
    let mut shown: u64 = 0;

    info!(
        "Preview running, press '{}' to capture",
        session.capture_key()
    );

    loop {
        if cancel.is_cancelled() {
            session.handle(CaptureEvent::Interrupted);
        }

        match session.state() {
            CaptureState::Capturing => {}
            CaptureState::Done(frame) => {
                info!("Captured frame after {} preview frames", shown);
                return Ok(CaptureOutcome::Captured(frame.clone()));
            }
            CaptureState::Cancelled(reason) => {
                info!("Capture cancelled ({:?}) after {} preview frames", reason, shown);
                return Ok(CaptureOutcome::Cancelled(*reason));
            }
        }

        let frame = match source.read_frame()? {
            Some(frame) => {
                empty_streak = 0;
                frame.mirrored()
            }
            None => {
                empty_streak += 1;
                if empty_streak > max_empty_frames {
                    return Err(CaptureError::NoFrames {
                        attempts: empty_streak,
                    });
                }
                continue;
            }
        };

        window.show(&frame)?;
        shown += 1;

        match window.wait_key(KEY_POLL_DELAY_MS)? {
            KeyEvent::None => {}
            KeyEvent::Pressed(key) => {
                session.handle(CaptureEvent::Key { key, frame });
            }
            KeyEvent::WindowClosed => {
                session.handle(CaptureEvent::WindowClosed);
            }
        }
    }
}
