// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload validation — filename sanitization, extension checks, and parsing of
// the form's operation parameters.

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::types::{AdaptiveMethod, OperationParams};
use bildwerk_core::ServerConfig;
use tracing::debug;
use uuid::Uuid;

/// Reduce a client-supplied filename to a safe single path component.
///
/// Path separators and runs of whitespace become `_`, anything outside ASCII
/// `[A-Za-z0-9._-]` is dropped, and leading/trailing `.` and `_` are stripped.
/// The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Lower-case extension after the last `.`, if any.
fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Validate the uploaded filename and return its sanitized form.
pub fn validate_filename(name: &str, config: &ServerConfig) -> Result<String> {
    if name.is_empty() {
        return Err(BildwerkError::EmptyFilename);
    }

    let allowed = |n: &str| extension(n).is_some_and(|ext| config.is_allowed_extension(&ext));
    if !allowed(name) {
        return Err(BildwerkError::InvalidExtension);
    }

    let secure = secure_filename(name);
    if !allowed(&secure) {
        return Err(BildwerkError::InvalidExtension);
    }
    Ok(secure)
}

/// Name the upload is stored under: a random prefix keeps concurrent uploads
/// of the same file from overwriting each other's outputs.
pub fn stored_name(secure: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), secure)
}

/// Apply one text form field to `params`.
///
/// Fields the service does not know are ignored.
pub fn apply_form_field(params: &mut OperationParams, name: &str, value: &str) -> Result<()> {
    let slot = match name {
        "kernel_size" => &mut params.kernel_size,
        "threshold1" => &mut params.threshold1,
        "threshold2" => &mut params.threshold2,
        "block_size" => &mut params.block_size,
        "c" => &mut params.c,
        "adaptive_method" => {
            params.adaptive_method = value.trim().parse::<AdaptiveMethod>()?;
            return Ok(());
        }
        other => {
            debug!(field = other, "Ignoring unknown form field");
            return Ok(());
        }
    };

    *slot = value.trim().parse().map_err(|_| {
        BildwerkError::invalid_parameter(name, format!("expected an integer, got `{value}`"))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_filename_flattens_paths() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\photos\\cat.JPG"), "C_photos_cat.JPG");
        assert_eq!(secure_filename("caf\u{e9} menu.png"), "caf_menu.png");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn filename_validation_order() {
        let config = ServerConfig::default();
        assert!(matches!(
            validate_filename("", &config),
            Err(BildwerkError::EmptyFilename)
        ));
        assert!(matches!(
            validate_filename("anim.gif", &config),
            Err(BildwerkError::InvalidExtension)
        ));
        assert!(matches!(
            validate_filename("noextension", &config),
            Err(BildwerkError::InvalidExtension)
        ));
        assert_eq!(validate_filename("Holiday Photo.JPEG", &config).unwrap(), "Holiday_Photo.JPEG");
    }

    #[test]
    fn name_that_sanitizes_away_is_rejected() {
        let config = ServerConfig::default();
        // Non-ASCII stem vanishes, leaving no extension.
        assert!(matches!(
            validate_filename("\u{5199}\u{771f}.png", &config),
            Err(BildwerkError::InvalidExtension)
        ));
        assert!(matches!(
            validate_filename("..png", &config),
            Err(BildwerkError::InvalidExtension)
        ));
    }

    #[test]
    fn stored_names_are_unique() {
        let a = stored_name("photo.png");
        let b = stored_name("photo.png");
        assert_ne!(a, b);
        assert!(a.ends_with("_photo.png"));
        assert_eq!(a.len(), 32 + 1 + "photo.png".len());
    }

    #[test]
    fn form_fields_update_params() {
        let mut params = OperationParams::default();
        apply_form_field(&mut params, "threshold1", "50").unwrap();
        apply_form_field(&mut params, "threshold2", " 150 ").unwrap();
        apply_form_field(&mut params, "c", "-4").unwrap();
        apply_form_field(&mut params, "adaptive_method", "mean").unwrap();
        apply_form_field(&mut params, "colour", "blue").unwrap();

        assert_eq!(params.threshold1, 50);
        assert_eq!(params.threshold2, 150);
        assert_eq!(params.c, -4);
        assert_eq!(params.adaptive_method, AdaptiveMethod::Mean);
        assert_eq!(params.kernel_size, OperationParams::default().kernel_size);
    }

    #[test]
    fn non_integer_field_is_invalid_parameter() {
        let mut params = OperationParams::default();
        let err = apply_form_field(&mut params, "kernel_size", "big").unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Invalid parameter kernel_size: expected an integer, got `big`"
        );
    }
}
