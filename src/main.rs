/*
 * Copyright (C) 2025 Jakub Žitník
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 */

mod config;
mod error;
mod handlers;
mod notify;
mod report;
mod server;
mod sftp;
mod state;
mod utils;

use anyhow::Context;
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::server::RunningServer;
use crate::sftp::SftpUploader;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting sftp-bridge");

    let config = Arc::new(Config::from_env().context("Invalid configuration")?);

    let scratch = tempfile::Builder::new()
        .prefix("sftp-bridge-")
        .tempdir()
        .context("Failed to create scratch directory")?;

    let client = Client::builder()
        .build()
        .context("Failed to build reqwest client")?;

    let state = AppState {
        client,
        config: config.clone(),
        transfer: Arc::new(SftpUploader::new(config.sftp.clone())),
        scratch_dir: Arc::new(scratch.path().to_path_buf()),
    };

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let server = RunningServer::spawn(listener, server::router(state))?;

    tracing::info!("Listening on http://{}", server.local_addr());
    tracing::info!(
        "Uploads go to {}@{}:{}{}",
        config.sftp.username,
        config.sftp.host,
        config.sftp.port,
        config.sftp.remote_dir
    );

    if let Some(url) = &config.landing_url {
        match utils::open_browser(url) {
            Ok(()) => tracing::info!("Opened {} in the browser", url),
            Err(e) => tracing::warn!("Could not open browser at {}: {}", url, e),
        }
    }

    if config.notifications {
        notify::announce_startup();
    }

    tracing::info!("Server ready. Keep this program running while you use the tool.");
    server::shutdown_signal().await;
    tracing::info!("Shutdown requested");

    if let Err(e) = server.shutdown().await {
        tracing::error!("Server exited with an error: {}", e);
    }

    if let Err(e) = scratch.close() {
        tracing::debug!("Scratch directory cleanup failed: {}", e);
    }

    Ok(())
}
