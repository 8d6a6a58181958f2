// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-imaging — Image operations for the Bildwerk upload service.
//
// Provides the pixel operations (Gaussian blur, Sobel and Canny edges, luma
// histogram equalization, adaptive thresholding), EXIF extraction, pluggable
// OCR backends, and the dispatcher that ties them to stored uploads.

pub mod dispatch;
pub mod image;
pub mod metadata;
pub mod ocr;

// Re-export the primary items so callers can use `bildwerk_imaging::Dispatcher` etc.
pub use dispatch::Dispatcher;
pub use crate::image::processor::ImageProcessor;
pub use metadata::extract_metadata;
pub use ocr::{StaticRecognizer, TextRecognizer, UnavailableRecognizer, default_recognizer};

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrEngine};
