// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use stack_detect::{
    capture::{
        run_capture, submit_capture_until_cancelled, wait_for_first_frame, CancelReason,
        CaptureOutcome, CaptureSession, FrameSource, HighGuiWindow, OpenCvCamera,
    },
    cli::CaptureCli,
    inference::HostedDetectionClient,
    storage::ScratchDir,
    version,
};
use std::env;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Logs go to stderr; stdout carries only the detection result
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = CaptureCli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CaptureCli) -> Result<()> {
    tracing::info!("Starting {}", version::get_version_string());

    let (capture_config, inference_config) =
        cli.into_configs().context("Invalid configuration")?;
    let client = HostedDetectionClient::new(&inference_config)
        .context("Failed to create detection client")?;
    let scratch = ScratchDir::new(&capture_config.scratch_dir)
        .context("Failed to prepare scratch directory")?;

    // Ctrl-C cancels the preview loop
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    // The preview loop blocks; keep it on this thread for the GUI backend
    let outcome = tokio::task::block_in_place(|| -> Result<CaptureOutcome> {
        let mut camera = OpenCvCamera::open(capture_config.camera_index)?;
        wait_for_first_frame(&mut camera, capture_config.max_empty_frames)
            .context("Camera produced no frames")?;
        if cancel.is_cancelled() {
            camera.release()?;
            return Ok(CaptureOutcome::Cancelled(CancelReason::Interrupted));
        }

        let mut window = HighGuiWindow::create(&capture_config.window_title)?;
        let session = CaptureSession::new(capture_config.capture_key);
        Ok(run_capture(
            &mut camera,
            &mut window,
            session,
            capture_config.max_empty_frames,
            &cancel,
        )?)
    })?;

    let frame = match outcome {
        CaptureOutcome::Captured(frame) => frame,
        CaptureOutcome::Cancelled(reason) => {
            tracing::info!("No frame captured ({:?}), skipping inference", reason);
            return Ok(());
        }
    };

    let result = match submit_capture_until_cancelled(
        &frame,
        &scratch,
        capture_config.output.as_deref(),
        &client,
        &inference_config.model_id,
        &cancel,
    )
    .await
    .context("Inference failed")?
    {
        Some(result) => result,
        None => return Ok(()),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
