// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-server — Axum HTTP front end for the Bildwerk image operations.
//
// # Endpoints
//
// - `POST /upload` — multipart upload (`file` plus operation and parameter
//   fields); answers with the processed image URL, OCR text, and EXIF metadata.
// - `GET /processed/<filename>` — serves a processed image.
// - `GET /health` — liveness and OCR availability.
// - `GET /operations` — supported operation names and default parameters.
//
// ```bash
// curl -F "file=@photo.jpg" -F operation=canny_edge \
//      -F threshold1=50 -F threshold2=150 http://localhost:5000/upload
// ```

mod error;
mod handlers;
mod server;
mod types;
pub mod upload;

pub use error::ApiError;
pub use server::{create_router, serve};
pub use types::{AppState, ErrorResponse, HealthResponse, OperationsResponse, UploadResponse};
