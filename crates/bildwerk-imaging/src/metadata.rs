// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EXIF metadata extraction. Failures never abort processing: they are folded
// into the returned mapping as an `error` entry.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bildwerk_core::error::BildwerkError;
use bildwerk_core::types::ImageMetadata;
use tracing::{debug, error, instrument};

/// Read the primary-IFD EXIF fields of the image at `path`.
///
/// Returns tag name → display value (with units where EXIF defines them).
/// An image without EXIF yields [`ImageMetadata::no_metadata`]. Any other
/// failure yields [`ImageMetadata::failed`].
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_metadata(path: &Path) -> ImageMetadata {
    match read_exif(path) {
        Ok(Some(metadata)) => {
            debug!(fields = metadata.len(), "EXIF metadata extracted");
            metadata
        }
        Ok(None) => {
            debug!("No EXIF metadata found");
            ImageMetadata::no_metadata()
        }
        Err(err) => {
            error!(error = %err, "Error extracting metadata");
            ImageMetadata::failed(&err)
        }
    }
}

/// `Ok(None)` means the container was readable but carries no EXIF.
fn read_exif(path: &Path) -> Result<Option<ImageMetadata>, BildwerkError> {
    let file = File::open(path).map_err(|err| BildwerkError::Metadata(err.to_string()))?;
    let mut reader = BufReader::new(file);

    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(err) => return Err(BildwerkError::Metadata(err.to_string())),
    };

    let mut metadata = ImageMetadata::default();
    for field in exif.fields().filter(|f| f.ifd_num == exif::In::PRIMARY) {
        metadata.insert(
            field.tag.to_string(),
            field.display_value().with_unit(&exif).to_string(),
        );
    }

    if metadata.is_empty() {
        Ok(None)
    } else {
        Ok(Some(metadata))
    }
}
