//! Upload pipeline.
//!
//! Orchestrates one upload from raw bytes to a recompressed image:
//!
//! ```text
//! type → size → integrity → decode → normalize color → encode → name
//! ```
//!
//! Each step short-circuits on the first failure. The cheap checks run
//! first so a bad extension or an oversized body is reported before any
//! image parsing happens.

use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use image::{DynamicImage, ImageReader};
use tracing::{debug, error};

use super::encoder::{OutputFormat, Recompressor};
use super::filename;
use super::validate::{validate_file_size, validate_file_type, validate_image};
use crate::error::{PipelineError, NO_FILE_PART, NO_FILE_SELECTED};

// =============================================================================
// Request / Response
// =============================================================================

/// A single uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Client-supplied filename, untrusted
    pub filename: String,

    /// File bytes, `None` when the request carried no file part
    pub content: Option<Bytes>,
}

impl UploadRequest {
    /// Create a request for a file part with the given name and bytes.
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: Some(content.into()),
        }
    }

    /// Create a request that carried no file part at all.
    pub fn without_file() -> Self {
        Self {
            filename: String::new(),
            content: None,
        }
    }
}

/// A recompressed image ready to be sent back.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Encoded output
    pub encoded_bytes: Bytes,

    /// `image/jpeg` or `image/png`
    pub mime_type: &'static str,

    /// Attachment filename, `compressed_<stem>.<ext>`
    pub download_filename: String,
}

impl ProcessedImage {
    /// Value for the `Content-Disposition` header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.download_filename)
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Validates, decodes and recompresses uploads.
///
/// Holds no mutable state; one instance is shared by all requests.
#[derive(Debug, Clone, Default)]
pub struct UploadPipeline {
    recompressor: Recompressor,
}

impl UploadPipeline {
    /// Create a pipeline with the default recompressor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the full pipeline for one upload.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::MissingFile`]: no file part, or an empty filename
    /// - [`PipelineError::UnsupportedType`]: extension not allowed
    /// - [`PipelineError::TooLarge`]: more than 5 MiB
    /// - [`PipelineError::CorruptImage`]: structural verification failed
    /// - [`PipelineError::InternalProcessingError`]: decode/encode failure or
    ///   a panic inside a codec
    pub fn process(&self, request: UploadRequest) -> Result<ProcessedImage, PipelineError> {
        let content = request
            .content
            .ok_or(PipelineError::MissingFile(NO_FILE_PART))?;

        if request.filename.is_empty() {
            return Err(PipelineError::MissingFile(NO_FILE_SELECTED));
        }

        if !validate_file_type(&request.filename).is_valid() {
            return Err(PipelineError::UnsupportedType);
        }

        let input_len = content.len();
        let mut cursor = Cursor::new(content);

        if !validate_file_size(&mut cursor)
            .map_err(PipelineError::internal)?
            .is_valid()
        {
            return Err(PipelineError::TooLarge);
        }

        if !validate_image(&mut cursor).is_valid() {
            return Err(PipelineError::CorruptImage);
        }

        // A codec panic is reported like any other processing failure.
        let name = request.filename;
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.transform(cursor, &name)))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                error!(filename = %name, "Codec panicked: {}", message);
                Err(PipelineError::internal(format!("codec panicked: {}", message)))
            });

        if let Ok(ref processed) = result {
            debug!(
                input_bytes = input_len,
                output_bytes = processed.encoded_bytes.len(),
                mime_type = processed.mime_type,
                "Recompressed upload"
            );
        }

        result
    }

    /// Decode, normalize, encode and name. Runs after all validators passed.
    fn transform(&self, cursor: Cursor<Bytes>, name: &str) -> Result<ProcessedImage, PipelineError> {
        let img = decode(cursor)?;

        let ext = filename::extension(name).unwrap_or_default();
        let format = OutputFormat::from_extension(&ext);

        let encoded_bytes = self.recompressor.encode(img, format)?;

        Ok(ProcessedImage {
            encoded_bytes,
            mime_type: format.mime_type(),
            download_filename: filename::download_filename(name),
        })
    }
}

/// Fully decode an image, sniffing the container from its magic bytes.
fn decode(cursor: Cursor<Bytes>) -> Result<DynamicImage, PipelineError> {
    ImageReader::new(cursor)
        .with_guessed_format()
        .map_err(|e| PipelineError::internal(format!("failed to read upload: {}", e)))?
        .decode()
        .map_err(|e| PipelineError::internal(format!("failed to decode image: {}", e)))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
