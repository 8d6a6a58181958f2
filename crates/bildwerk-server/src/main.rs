// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — image upload and processing service.
//
// Loads configuration from `BILDWERK_CONFIG` and the environment, prepares
// the storage directories and OCR backend, then serves the HTTP API.

use anyhow::Context;
use bildwerk_core::ServerConfig;
use bildwerk_imaging::{Dispatcher, TextRecognizer, default_recognizer};
use bildwerk_server::{AppState, serve};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Bildwerk starting");

    let config = ServerConfig::from_env().context("failed to load configuration")?;
    config
        .ensure_dirs()
        .context("failed to create upload/processed directories")?;

    let recognizer = default_recognizer(config.ocr_model_dir.as_deref());
    tracing::info!(ocr = recognizer.is_available(), "Text recognizer ready");
    let dispatcher = Dispatcher::new(config.processed_dir.clone(), recognizer);

    serve(AppState::new(config, dispatcher))
        .await
        .context("server terminated")?;
    Ok(())
}
