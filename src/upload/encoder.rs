//! Image re-encoder.
//!
//! This module normalizes decoded images to a color mode the target codec
//! accepts and re-encodes them with fixed compression settings.
//!
//! # Design Decisions
//!
//! - **Format follows the extension**: `.jpg`/`.jpeg` uploads come back as
//!   JPEG, `.png` uploads as PNG. No cross-format conversion.
//!
//! - **Fixed quality**: JPEG output always uses [`JPEG_QUALITY`]. The
//!   output is a deterministic function of the input and is not guaranteed to
//!   be smaller.
//!
//! - **Lossless PNG**: PNG output uses the best compression level with
//!   adaptive filtering. Pixels, including alpha, are untouched.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage};

use crate::error::PipelineError;

/// JPEG quality used for every recompressed upload (1-100).
pub const JPEG_QUALITY: u8 = 60;

// =============================================================================
// Output Format
// =============================================================================

/// Codec used for the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Pick the output codec from a lowercase or mixed-case extension.
    ///
    /// `jpg` and `jpeg` map to JPEG, everything else to PNG. Callers run the
    /// type validator first, so in practice "everything else" is `png`.
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            OutputFormat::Jpeg
        } else {
            OutputFormat::Png
        }
    }

    /// MIME type for the `Content-Type` header.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

// =============================================================================
// Color Normalization
// =============================================================================

/// Whether an image must be flattened to 3-channel RGB before JPEG encoding.
///
/// JPEG has no alpha channel. Palette images are expanded by the decoder, so
/// they arrive here as RGB or RGBA and are caught by the alpha check.
#[inline]
pub fn needs_rgb_conversion(color: ColorType) -> bool {
    color.has_alpha()
}

/// Convert `img` into a color mode `format` can encode.
///
/// For JPEG: alpha is dropped and anything that is not 8-bit gray or 8-bit
/// RGB becomes 8-bit RGB (16-bit gray becomes 8-bit gray). For PNG: only the
/// float layouts, which PNG cannot store, are converted to 16-bit.
pub fn normalize_color(img: DynamicImage, format: OutputFormat) -> DynamicImage {
    match format {
        OutputFormat::Jpeg if needs_rgb_conversion(img.color()) => {
            DynamicImage::ImageRgb8(img.to_rgb8())
        }
        OutputFormat::Jpeg => match img.color() {
            ColorType::L8 | ColorType::Rgb8 => img,
            ColorType::L16 => DynamicImage::ImageLuma8(img.to_luma8()),
            _ => DynamicImage::ImageRgb8(img.to_rgb8()),
        },
        OutputFormat::Png => match img.color() {
            ColorType::Rgb32F => DynamicImage::ImageRgb16(img.to_rgb16()),
            ColorType::Rgba32F => DynamicImage::ImageRgba16(img.to_rgba16()),
            _ => img,
        },
    }
}

// =============================================================================
// Recompressor
// =============================================================================

/// Stateless encoder for processed uploads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recompressor;

impl Recompressor {
    /// Create a recompressor. JPEG output uses [`JPEG_QUALITY`].
    pub fn new() -> Self {
        Self
    }

    /// Normalize and encode a decoded image.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InternalProcessingError`] if the codec rejects
    /// the image.
    pub fn encode(&self, img: DynamicImage, format: OutputFormat) -> Result<Bytes, PipelineError> {
        let img = normalize_color(img, format);
        let mut output = Vec::new();

        match format {
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY);
                img.write_with_encoder(encoder)
                    .map_err(|e| PipelineError::internal(format!("JPEG encode failed: {}", e)))?;
            }
            OutputFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut output,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                img.write_with_encoder(encoder)
                    .map_err(|e| PipelineError::internal(format!("PNG encode failed: {}", e)))?;
            }
        }

        Ok(Bytes::from(output))
    }
}
