//! Upload validators.
//!
//! Three independent checks, cheapest first:
//!
//! - [`validate_file_type`]: extension allow-list, pure string work
//! - [`validate_file_size`]: length probe on a seekable source
//! - [`validate_image`]: magic-byte sniff plus header parse, no pixel decode
//!
//! The two probes borrow the source through [`Rewind`] so the position the
//! caller handed in is the position it gets back, whatever the outcome.
//!
//! Only the JPEG and PNG codecs are compiled in. Content in any other
//! container (GIF, WebP, BMP, ...) fails [`validate_image`] even when the
//! filename carries an allowed extension, so a GIF named `.png` is reported
//! as a corrupt image rather than converted.

use std::io::{self, BufRead, Seek, SeekFrom};

use image::{ImageFormat, ImageReader};
use tracing::debug;

use super::filename;
use super::rewind::Rewind;
use crate::error::IntegrityError;

/// Maximum accepted upload size in bytes (5 MiB).
pub const MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024;

/// Extensions accepted by [`validate_file_type`], lowercase and without dot.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Outcome of a single validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    InvalidType,
    OversizedInvalidSize,
    CorruptImage,
}

impl ValidationResult {
    /// Whether the check passed.
    #[inline]
    pub fn is_valid(self) -> bool {
        self == ValidationResult::Valid
    }
}

/// Header-level facts gathered by the integrity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// Type
// =============================================================================

/// Check the filename's final suffix against [`ALLOWED_EXTENSIONS`].
///
/// Case-insensitive. Names without an extension are rejected.
pub fn validate_file_type(filename: &str) -> ValidationResult {
    match filename::extension(filename) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => ValidationResult::Valid,
        _ => ValidationResult::InvalidType,
    }
}

// =============================================================================
// Size
// =============================================================================

/// Total length of a seekable source, leaving its position untouched.
pub fn measure_len<R: Seek>(source: &mut R) -> io::Result<u64> {
    let mut source = Rewind::new(source)?;
    source.seek(SeekFrom::End(0))
}

/// Check that the source is at most [`MAX_UPLOAD_SIZE`] bytes long.
///
/// The position is restored before returning, on success and on error.
pub fn validate_file_size<R: Seek>(source: &mut R) -> io::Result<ValidationResult> {
    let len = measure_len(source)?;

    if len <= MAX_UPLOAD_SIZE {
        Ok(ValidationResult::Valid)
    } else {
        debug!(len, limit = MAX_UPLOAD_SIZE, "Upload exceeds size limit");
        Ok(ValidationResult::OversizedInvalidSize)
    }
}

// =============================================================================
// Integrity
// =============================================================================

/// Sniff the container and parse its header without decoding pixels.
///
/// The position is restored before returning.
pub fn inspect_image<R: BufRead + Seek>(source: &mut R) -> Result<ImageInfo, IntegrityError> {
    let mut source = Rewind::new(source).map_err(|e| IntegrityError::Truncated(e.to_string()))?;

    let reader = ImageReader::new(&mut *source)
        .with_guessed_format()
        .map_err(|e| IntegrityError::Truncated(e.to_string()))?;

    let format = reader.format().ok_or(IntegrityError::UnknownFormat)?;
    let (width, height) = reader.into_dimensions()?;

    Ok(ImageInfo {
        format,
        width,
        height,
    })
}

/// Check that the source is a structurally valid image.
///
/// Every structural failure maps to [`ValidationResult::CorruptImage`]; the
/// underlying reason is logged at debug level.
pub fn validate_image<R: BufRead + Seek>(source: &mut R) -> ValidationResult {
    match inspect_image(source) {
        Ok(_) => ValidationResult::Valid,
        Err(e) => {
            debug!(reason = %e, "Upload failed structural verification");
            ValidationResult::CorruptImage
        }
    }
}
