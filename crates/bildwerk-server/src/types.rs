// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared handler state and JSON response bodies.

use std::sync::Arc;

use bildwerk_core::types::{ImageMetadata, OperationKind, OperationParams};
use bildwerk_core::ServerConfig;
use bildwerk_imaging::Dispatcher;
use serde::{Deserialize, Serialize};

/// State shared by every request handler.
///
/// Both members are read-only after startup, so cloning the state per request
/// only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Successful `POST /upload` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// URL path of the processed image, `/processed/<name>`.
    pub processed_image: String,
    /// Recognized text for `ocr`, `null` otherwise.
    pub result: Option<String>,
    pub metadata: ImageMetadata,
}

/// Body of every non-2xx response produced by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub ocr: bool,
}

/// `GET /operations` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationsResponse {
    pub operations: Vec<OperationKind>,
    pub defaults: OperationParams,
}
