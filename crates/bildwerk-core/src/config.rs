// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Server configuration: JSON file defaults overlaid with environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, Result};

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind (default `0.0.0.0`).
    pub host: String,
    /// TCP port (default 5000).
    pub port: u16,
    /// Where raw uploads are stored.
    pub upload_dir: PathBuf,
    /// Where processed images are written and served from.
    pub processed_dir: PathBuf,
    /// Lower-case file extensions accepted on upload.
    pub allowed_extensions: Vec<String>,
    /// Maximum accepted request body, in bytes.
    pub max_upload_bytes: usize,
    /// Origins allowed by CORS. `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Directory holding the OCR detection/recognition models. `None` uses the
    /// engine's default cache directory.
    pub ocr_model_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("static/uploads"),
            processed_dir: PathBuf::from("static/processed"),
            allowed_extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            max_upload_bytes: 16 * 1024 * 1024,
            cors_origins: vec!["http://localhost:3000".into()],
            ocr_model_dir: None,
        }
    }
}

impl ServerConfig {
    /// Read a JSON config file. Missing keys fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load the configuration the way the `bildwerk` binary does: the JSON
    /// file named by `BILDWERK_CONFIG` (if any), then environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match lookup("BILDWERK_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(lookup)
    }

    /// Apply environment-style overrides on top of `self`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| BildwerkError::Config(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(host) = lookup("BILDWERK_HOST") {
            self.host = host;
        }
        if let Some(dir) = lookup("BILDWERK_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("BILDWERK_PROCESSED_DIR") {
            self.processed_dir = PathBuf::from(dir);
        }
        if let Some(limit) = lookup("BILDWERK_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = limit.trim().parse().map_err(|_| {
                BildwerkError::Config(format!(
                    "BILDWERK_MAX_UPLOAD_BYTES is not a byte count: {limit}"
                ))
            })?;
        }
        if let Some(origins) = lookup("BILDWERK_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(dir) = lookup("BILDWERK_OCR_MODEL_DIR") {
            self.ocr_model_dir = Some(PathBuf::from(dir));
        }
        Ok(self)
    }

    /// `host:port` string suitable for binding a listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether `extension` (any case) is accepted on upload.
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        let lower = extension.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == lower)
    }

    /// Create the upload and processed directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.processed_dir)?;
        Ok(())
    }
}
