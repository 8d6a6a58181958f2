// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition backends.
//
// The dispatcher only sees the `TextRecognizer` trait. The neural `ocrs`
// engine lives behind the `ocr` feature; without it the service still runs and
// answers OCR requests with an explanatory engine error.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use tracing::warn;

#[cfg(feature = "ocr")]
pub mod engine;

#[cfg(feature = "ocr")]
pub use engine::{OcrConfig, OcrEngine};

/// Abstraction over an OCR backend.
///
/// Implementations read the image at `image_path` and return the recognized
/// text, lines separated by `\n`.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image_path: &Path) -> Result<String>;

    /// Whether this backend can actually recognize text.
    fn is_available(&self) -> bool {
        true
    }
}

/// Returns a pre-set string, ignoring the image. Useful for tests and demos
/// without OCR models installed.
pub struct StaticRecognizer {
    text: String,
}

impl StaticRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextRecognizer for StaticRecognizer {
    fn recognize(&self, _image_path: &Path) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Fails every recognition with the reason OCR is unavailable.
pub struct UnavailableRecognizer {
    reason: String,
}

impl UnavailableRecognizer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl TextRecognizer for UnavailableRecognizer {
    fn recognize(&self, _image_path: &Path) -> Result<String> {
        Err(BildwerkError::OcrError(self.reason.clone()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Build the best recognizer this build supports.
///
/// With the `ocr` feature, loads the `ocrs` models from `model_dir` (or the
/// default cache directory). Model loading failures are logged and degrade to
/// an [`UnavailableRecognizer`] so the rest of the service keeps working.
pub fn default_recognizer(model_dir: Option<&Path>) -> Box<dyn TextRecognizer> {
    #[cfg(feature = "ocr")]
    {
        let config = match model_dir {
            Some(dir) => OcrConfig::from_dir(dir),
            None => OcrConfig::default(),
        };
        match OcrEngine::new(config) {
            Ok(engine) => Box::new(engine),
            Err(err) => {
                warn!(error = %err, "OCR engine unavailable");
                Box::new(UnavailableRecognizer::new(err.to_string()))
            }
        }
    }

    #[cfg(not(feature = "ocr"))]
    {
        if let Some(dir) = model_dir {
            warn!(
                model_dir = %dir.display(),
                "OCR model directory configured but bildwerk was built without the `ocr` feature"
            );
        }
        Box::new(UnavailableRecognizer::new(
            "OCR support not compiled in; rebuild with `--features ocr`",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_recognizer_returns_preset_text() {
        let r = StaticRecognizer::new("INVOICE\nTotal 12.50");
        assert_eq!(
            r.recognize(Path::new("ignored.png")).unwrap(),
            "INVOICE\nTotal 12.50"
        );
        assert!(r.is_available());
    }

    #[test]
    fn unavailable_recognizer_fails_with_engine_error() {
        let r = UnavailableRecognizer::new("no models");
        let err = r.recognize(Path::new("x.png")).unwrap_err();
        assert!(matches!(err, BildwerkError::OcrError(ref msg) if msg == "no models"));
        assert!(!r.is_available());
    }

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn default_recognizer_without_feature_is_unavailable() {
        assert!(!default_recognizer(None).is_available());
    }
}
