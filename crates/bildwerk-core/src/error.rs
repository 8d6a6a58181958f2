// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use thiserror::Error;

/// Top-level error type for all Bildwerk operations.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Upload errors --
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid file type")]
    InvalidExtension,

    // -- Request errors --
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    // -- Processing errors --
    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("Failed to extract metadata: {0}")]
    Metadata(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BildwerkError {
    /// Shorthand for an [`BildwerkError::InvalidParameter`].
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the request rather than by the server.
    ///
    /// The HTTP layer answers client errors with 400 and everything else
    /// with 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFile
                | Self::EmptyFilename
                | Self::InvalidExtension
                | Self::UnsupportedOperation(_)
                | Self::InvalidParameter { .. }
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_errors_keep_their_wire_messages() {
        assert_eq!(BildwerkError::MissingFile.to_string(), "No file part");
        assert_eq!(BildwerkError::EmptyFilename.to_string(), "No selected file");
        assert_eq!(BildwerkError::InvalidExtension.to_string(), "Invalid file type");
        assert_eq!(
            BildwerkError::UnsupportedOperation("grayscale".into()).to_string(),
            "Unsupported operation: grayscale"
        );
    }

    #[test]
    fn request_problems_are_client_errors() {
        assert!(BildwerkError::MissingFile.is_client_error());
        assert!(BildwerkError::InvalidExtension.is_client_error());
        assert!(BildwerkError::UnsupportedOperation("x".into()).is_client_error());
        assert!(BildwerkError::invalid_parameter("c", "not an integer").is_client_error());
    }

    #[test]
    fn processing_problems_are_server_errors() {
        assert!(!BildwerkError::ImageLoad("a.png".into()).is_client_error());
        assert!(!BildwerkError::OcrError("engine".into()).is_client_error());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(!BildwerkError::from(io).is_client_error());
    }
}
