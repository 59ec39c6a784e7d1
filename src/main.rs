// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use stack_detect::{
    api::{start_server, AppState},
    cli::ServerCli,
    inference::HostedDetectionClient,
    storage::ScratchDir,
    version,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    tracing::info!("Starting {}", version::get_version_string());
    tracing::info!("API server version: {}", version::VERSION);
    tracing::info!("Features: {}", version::FEATURES.join(", "));

    let cli = ServerCli::parse();
    let (server_config, inference_config) =
        cli.into_configs().context("Invalid configuration")?;
    tracing::info!(
        "Model: {}, scratch dir: {}, upload limit: {} bytes",
        inference_config.model_id,
        server_config.scratch_dir.display(),
        server_config.max_upload_bytes
    );

    let client = HostedDetectionClient::new(&inference_config)
        .context("Failed to create detection client")?;
    let scratch = ScratchDir::new(&server_config.scratch_dir)
        .context("Failed to prepare scratch directory")?;

    let state = AppState::new(
        Arc::new(client),
        scratch,
        inference_config.model_id.clone(),
        server_config.max_upload_bytes,
    );

    start_server(&server_config, state).await
}
