// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use bildwerk_core::types::{Operation, OperationKind, OperationParams};
use bildwerk_core::BildwerkError;
use tracing::{debug, info, instrument};

use crate::error::ApiError;
use crate::types::{AppState, HealthResponse, OperationsResponse, UploadResponse};
use crate::upload;

/// The uploaded file part: client filename and raw bytes.
struct FilePart {
    filename: String,
    data: Bytes,
}

/// `POST /upload`
///
/// Validation happens before anything touches the disk: a request rejected
/// for its filename, operation, or parameters leaves no stored upload.
///
/// A request without an `operation` field runs `gaussian_blur`. Older
/// clients that relied on the missing field being rejected as the
/// unsupported `grayscale` operation now get a blurred image instead.
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file = None;
    let mut operation_name = None;
    let mut fields = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let data = field.bytes().await?;
                file = Some(FilePart { filename, data });
            }
            "operation" => operation_name = Some(field.text().await?),
            _ => fields.push((name, field.text().await?)),
        }
    }

    let file = file.ok_or(BildwerkError::MissingFile)?;
    let secure = upload::validate_filename(&file.filename, &state.config)?;

    let mut params = OperationParams::default();
    for (name, value) in &fields {
        upload::apply_form_field(&mut params, name, value)?;
    }
    let operation_name = operation_name.unwrap_or_else(|| OperationKind::default().to_string());
    let operation = Operation::parse(operation_name.trim(), &params)?;
    debug!(?operation, "Upload request parsed");

    let stored = upload::stored_name(&secure);
    let upload_path = state.config.upload_dir.join(&stored);
    tokio::fs::write(&upload_path, &file.data).await.map_err(BildwerkError::from)?;
    info!(
        file = %stored,
        bytes = file.data.len(),
        operation = %operation.kind(),
        "Upload stored"
    );

    let dispatcher = Arc::clone(&state.dispatcher);
    let processed = tokio::task::spawn_blocking(move || dispatcher.run(&upload_path, &operation))
        .await
        .map_err(|err| ApiError::internal(format!("processing task failed: {err}")))??;

    let name = processed
        .output_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or(stored);

    Ok(Json(UploadResponse {
        processed_image: format!("/processed/{name}"),
        result: processed.text,
        metadata: processed.metadata,
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        ocr: state.dispatcher.ocr_available(),
    })
}

/// `GET /operations`
pub async fn operations() -> Json<OperationsResponse> {
    Json(OperationsResponse {
        operations: OperationKind::ALL.to_vec(),
        defaults: OperationParams::default(),
    })
}
