// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation dispatcher — loads a stored image, routes it to the requested
// operation, writes the processed output, and returns the result triple.

use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::types::{AdaptiveThresholdParams, Operation, OperationParams, ProcessedImage};
use tracing::{debug, error, info, instrument, warn};

use crate::image::ImageProcessor;
use crate::metadata::extract_metadata;
use crate::ocr::TextRecognizer;

/// Routes stored images to their operation and writes the result into the
/// processed directory.
///
/// The dispatcher holds no mutable state, so one instance can be shared by
/// every request thread.
pub struct Dispatcher {
    processed_dir: PathBuf,
    recognizer: Box<dyn TextRecognizer>,
}

impl Dispatcher {
    pub fn new(processed_dir: impl Into<PathBuf>, recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            processed_dir: processed_dir.into(),
            recognizer,
        }
    }

    /// Whether the `ocr` operation can succeed with the configured backend.
    pub fn ocr_available(&self) -> bool {
        self.recognizer.is_available()
    }

    /// Resolve `operation` against `params` and run it on `input`.
    ///
    /// Unknown operation names fail before the image is even opened.
    #[instrument(skip(self, input, params), fields(input = %input.display()))]
    pub fn process(
        &self,
        input: &Path,
        operation: &str,
        params: &OperationParams,
    ) -> Result<ProcessedImage> {
        let operation = Operation::parse(operation, params).inspect_err(|err| {
            warn!(error = %err, "Rejected operation request");
        })?;
        debug!(?operation, "Operation resolved");
        self.run(input, &operation)
    }

    /// Run an already-resolved operation on `input`.
    ///
    /// The output is written to the processed directory under the input's
    /// file name. Nothing is written when the input cannot be decoded.
    #[instrument(
        skip(self, input, operation),
        fields(input = %input.display(), operation = %operation.kind())
    )]
    pub fn run(&self, input: &Path, operation: &Operation) -> Result<ProcessedImage> {
        let result = self.run_inner(input, operation);
        if let Err(err) = &result {
            error!(error = %err, "Error in image processing");
        }
        result
    }

    fn run_inner(&self, input: &Path, operation: &Operation) -> Result<ProcessedImage> {
        let output_path = self.output_path(input)?;
        let processor = ImageProcessor::open(input)?;
        let metadata = extract_metadata(input);

        let mut text = None;
        let processed = match *operation {
            Operation::GaussianBlur(params) => processor.gaussian_blur(params),
            Operation::SobelEdge => processor.sobel_edges(),
            Operation::CannyEdge(params) => processor.canny_edges(params),
            Operation::HistogramEqualization => processor.equalize_luma(),
            Operation::AdaptiveThreshold(params) => processor.adaptive_threshold(params),
            Operation::Ocr => {
                text = Some(self.recognize(&processor)?);
                // The original image is the visible output of OCR.
                processor
            }
        };

        processed.save(&output_path)?;
        info!(output = %output_path.display(), "Processed image written");

        Ok(ProcessedImage {
            output_path,
            text,
            metadata,
        })
    }

    /// Binarize a copy of the image into a temporary file next to the
    /// outputs and hand that file to the recognizer. The temporary file is
    /// removed on every path out of this function.
    fn recognize(&self, processor: &ImageProcessor) -> Result<String> {
        let binary = ImageProcessor::from_dynamic(processor.as_dynamic().clone())
            .adaptive_threshold(AdaptiveThresholdParams::OCR_PREPROCESS);

        let temp_path = tempfile::Builder::new()
            .prefix("temp_")
            .suffix(".png")
            .tempfile_in(&self.processed_dir)?
            .into_temp_path();
        binary.save(&temp_path)?;
        debug!(temp = %temp_path.display(), "Performing OCR");

        let text = self.recognizer.recognize(&temp_path)?;
        debug!(chars = text.len(), "OCR result");

        temp_path.close()?;
        Ok(text)
    }

    fn output_path(&self, input: &Path) -> Result<PathBuf> {
        let name = input.file_name().ok_or_else(|| {
            BildwerkError::ImageLoad(format!("{}: path has no file name", input.display()))
        })?;
        Ok(self.processed_dir.join(name))
    }
}
