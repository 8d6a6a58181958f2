// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: operation names, request parameters, resolved operations,
// and the result triple returned by the dispatcher.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, Result};

/// Default kernel size for `gaussian_blur`.
pub const DEFAULT_KERNEL_SIZE: i32 = 3;
/// Default lower hysteresis threshold for `canny_edge`.
pub const DEFAULT_THRESHOLD1: i32 = 100;
/// Default upper hysteresis threshold for `canny_edge`.
pub const DEFAULT_THRESHOLD2: i32 = 200;
/// Default neighbourhood size for `adaptive_threshold`.
pub const DEFAULT_BLOCK_SIZE: i32 = 11;
/// Default constant subtracted from the local mean for `adaptive_threshold`.
pub const DEFAULT_C: i32 = 2;

/// Largest accepted `kernel_size` for `gaussian_blur` (after forcing odd).
pub const MAX_KERNEL_SIZE: i32 = 255;
/// Largest accepted `block_size` for `adaptive_threshold` (after forcing odd).
pub const MAX_BLOCK_SIZE: i32 = 255;

/// The fixed set of operations the service knows how to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    #[default]
    GaussianBlur,
    SobelEdge,
    CannyEdge,
    HistogramEqualization,
    AdaptiveThreshold,
    Ocr,
}

impl OperationKind {
    /// Every supported operation, in the order clients present them.
    pub const ALL: [OperationKind; 6] = [
        OperationKind::GaussianBlur,
        OperationKind::SobelEdge,
        OperationKind::CannyEdge,
        OperationKind::HistogramEqualization,
        OperationKind::AdaptiveThreshold,
        OperationKind::Ocr,
    ];

    /// Wire name of the operation (the `operation` form field).
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::GaussianBlur => "gaussian_blur",
            OperationKind::SobelEdge => "sobel_edge",
            OperationKind::CannyEdge => "canny_edge",
            OperationKind::HistogramEqualization => "histogram_equalization",
            OperationKind::AdaptiveThreshold => "adaptive_threshold",
            OperationKind::Ocr => "ocr",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = BildwerkError;

    fn from_str(s: &str) -> Result<Self> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BildwerkError::UnsupportedOperation(s.to_string()))
    }
}

/// How the local mean is weighted when thresholding adaptively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveMethod {
    /// Gaussian-weighted neighbourhood mean.
    #[default]
    Gaussian,
    /// Plain box mean over the neighbourhood.
    Mean,
}

impl FromStr for AdaptiveMethod {
    type Err = BildwerkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gaussian" => Ok(AdaptiveMethod::Gaussian),
            "mean" => Ok(AdaptiveMethod::Mean),
            other => Err(BildwerkError::invalid_parameter(
                "adaptive_method",
                format!("expected `gaussian` or `mean`, got `{other}`"),
            )),
        }
    }
}

/// Raw parameter record as submitted with an upload.
///
/// Every field has a default so that clients only send what their chosen
/// operation needs. Values are normalized per operation by
/// [`Operation::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationParams {
    pub kernel_size: i32,
    pub threshold1: i32,
    pub threshold2: i32,
    pub block_size: i32,
    pub c: i32,
    pub adaptive_method: AdaptiveMethod,
}

impl Default for OperationParams {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            threshold1: DEFAULT_THRESHOLD1,
            threshold2: DEFAULT_THRESHOLD2,
            block_size: DEFAULT_BLOCK_SIZE,
            c: DEFAULT_C,
            adaptive_method: AdaptiveMethod::Gaussian,
        }
    }
}

/// Parameters for Gaussian smoothing. `kernel_size` is always odd and >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurParams {
    pub kernel_size: u32,
}

impl BlurParams {
    /// Standard deviation implied by the kernel size, using the same rule
    /// OpenCV applies when sigma is left at zero.
    pub fn sigma(&self) -> f32 {
        0.3 * ((self.kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }
}

/// Hysteresis thresholds for Canny edge detection, ordered `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannyParams {
    pub low: f32,
    pub high: f32,
}

/// Parameters for adaptive thresholding. `block_size` is always odd and >= 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveThresholdParams {
    pub block_size: u32,
    pub c: i32,
    pub method: AdaptiveMethod,
}

impl AdaptiveThresholdParams {
    /// Fixed preprocessing used before text recognition.
    pub const OCR_PREPROCESS: AdaptiveThresholdParams = AdaptiveThresholdParams {
        block_size: 11,
        c: 2,
        method: AdaptiveMethod::Gaussian,
    };
}

/// A fully resolved operation with normalized parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    GaussianBlur(BlurParams),
    SobelEdge,
    CannyEdge(CannyParams),
    HistogramEqualization,
    AdaptiveThreshold(AdaptiveThresholdParams),
    Ocr,
}

impl Operation {
    /// Parse an operation name and resolve its parameters in one step.
    pub fn parse(name: &str, params: &OperationParams) -> Result<Self> {
        Self::resolve(name.parse()?, params)
    }

    /// Resolve the parameters relevant to `kind`, applying per-operation
    /// normalization (odd sizes, ordered thresholds).
    pub fn resolve(kind: OperationKind, params: &OperationParams) -> Result<Self> {
        let op = match kind {
            OperationKind::GaussianBlur => {
                let kernel_size = force_odd(params.kernel_size);
                if !(1..=MAX_KERNEL_SIZE).contains(&kernel_size) {
                    return Err(BildwerkError::invalid_parameter(
                        "kernel_size",
                        format!(
                            "must be between 1 and {MAX_KERNEL_SIZE}, got {}",
                            params.kernel_size
                        ),
                    ));
                }
                Operation::GaussianBlur(BlurParams {
                    kernel_size: kernel_size as u32,
                })
            }
            OperationKind::SobelEdge => Operation::SobelEdge,
            OperationKind::CannyEdge => {
                let (low, high) = if params.threshold1 <= params.threshold2 {
                    (params.threshold1, params.threshold2)
                } else {
                    (params.threshold2, params.threshold1)
                };
                Operation::CannyEdge(CannyParams {
                    low: low as f32,
                    high: high as f32,
                })
            }
            OperationKind::HistogramEqualization => Operation::HistogramEqualization,
            OperationKind::AdaptiveThreshold => {
                let block_size = force_odd(params.block_size);
                if !(3..=MAX_BLOCK_SIZE).contains(&block_size) {
                    return Err(BildwerkError::invalid_parameter(
                        "block_size",
                        format!(
                            "must be between 3 and {MAX_BLOCK_SIZE}, got {}",
                            params.block_size
                        ),
                    ));
                }
                Operation::AdaptiveThreshold(AdaptiveThresholdParams {
                    block_size: block_size as u32,
                    c: params.c,
                    method: params.adaptive_method,
                })
            }
            OperationKind::Ocr => Operation::Ocr,
        };
        Ok(op)
    }

    /// The kind this operation was resolved from.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::GaussianBlur(_) => OperationKind::GaussianBlur,
            Operation::SobelEdge => OperationKind::SobelEdge,
            Operation::CannyEdge(_) => OperationKind::CannyEdge,
            Operation::HistogramEqualization => OperationKind::HistogramEqualization,
            Operation::AdaptiveThreshold(_) => OperationKind::AdaptiveThreshold,
            Operation::Ocr => OperationKind::Ocr,
        }
    }
}

/// Round an even size up to the next odd number. Odd sizes pass through.
pub fn force_odd(size: i32) -> i32 {
    if size % 2 == 0 { size + 1 } else { size }
}

/// Key used when an image carries no EXIF data.
pub const NO_METADATA_KEY: &str = "info";
/// Value used when an image carries no EXIF data.
pub const NO_METADATA_VALUE: &str = "No EXIF metadata found";
/// Key used when metadata extraction failed.
pub const METADATA_ERROR_KEY: &str = "error";

/// EXIF tag name → stringified value.
///
/// Serializes as a plain JSON object. Besides real tags it may hold a single
/// `info` marker (no EXIF present) or a single `error` entry (extraction
/// failed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageMetadata(pub BTreeMap<String, String>);

impl ImageMetadata {
    /// The explicit "no metadata" marker.
    pub fn no_metadata() -> Self {
        let mut map = BTreeMap::new();
        map.insert(NO_METADATA_KEY.to_string(), NO_METADATA_VALUE.to_string());
        Self(map)
    }

    /// A mapping carrying a single extraction error.
    pub fn failed(err: &BildwerkError) -> Self {
        let mut map = BTreeMap::new();
        map.insert(METADATA_ERROR_KEY.to_string(), err.to_string());
        Self(map)
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.0.insert(tag.into(), value.into());
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the "no metadata" marker.
    pub fn is_no_metadata(&self) -> bool {
        self.0.len() == 1 && self.get(NO_METADATA_KEY) == Some(NO_METADATA_VALUE)
    }

    /// Whether extraction failed.
    pub fn is_error(&self) -> bool {
        self.0.len() == 1 && self.0.contains_key(METADATA_ERROR_KEY)
    }
}

/// The result triple of a dispatcher run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    /// Where the processed image was written.
    pub output_path: PathBuf,
    /// Recognized text (OCR only).
    pub text: Option<String>,
    /// EXIF metadata of the input image.
    pub metadata: ImageMetadata,
}
