//! Client-side image validation for admin product uploads.
//!
//! Checks run before any bytes leave the machine: extension allowlist and a
//! size cap. The backend validates again; these exist to fail fast.

use std::fs;
use std::path::Path;

use thiserror::Error;

/// Largest accepted image, in bytes (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Accepted image extensions, compared case-insensitively.
const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "gif", "png"];

/// Reasons an image file is rejected before upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("Please upload a JPEG, GIF, or PNG image")]
    UnsupportedType,

    #[error("Image must be smaller than 10MB")]
    TooLarge,
}

/// Validate an image file for product upload.
///
/// # Errors
///
/// Returns `UploadError` if the file cannot be read, has an extension
/// outside the JPEG/GIF/PNG allowlist, or exceeds [`MAX_IMAGE_BYTES`].
pub fn validate_image(path: &Path) -> Result<(), UploadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if !extension.is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str())) {
        return Err(UploadError::UnsupportedType);
    }

    let metadata = fs::metadata(path).map_err(|source| UploadError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    if metadata.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge);
    }

    Ok(())
}
