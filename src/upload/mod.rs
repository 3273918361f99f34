//! Upload processing layer.
//!
//! Everything between "bytes arrived" and "bytes go back", independent of
//! HTTP:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ UploadRequest
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             UploadPipeline              │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  validators  │  │   Recompressor  │  │
//! │  │ (type, size, │  │ (decode →       │  │
//! │  │  integrity)  │  │  normalize →    │  │
//! │  │              │  │  encode)        │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │ ProcessedImage
//!                      ▼
//! ```
//!
//! # Components
//!
//! - [`UploadPipeline`]: runs the checks and the recompression in order
//! - [`validate`]: type, size and structural integrity validators
//! - [`Recompressor`]: color normalization and JPEG/PNG encoding
//! - [`filename`]: extension parsing and download-name derivation
//! - [`Rewind`]: position save/restore guard used by the validators
//!
//! # Example
//!
//! ```
//! use fileforge::upload::{UploadPipeline, UploadRequest};
//! use fileforge::PipelineError;
//!
//! let pipeline = UploadPipeline::new();
//! let err = pipeline
//!     .process(UploadRequest::new("notes.txt", b"plain text".to_vec()))
//!     .unwrap_err();
//!
//! assert!(matches!(err, PipelineError::UnsupportedType));
//! ```

mod encoder;
pub mod filename;
mod pipeline;
mod rewind;
pub mod validate;

pub use encoder::{
    needs_rgb_conversion, normalize_color, OutputFormat, Recompressor, JPEG_QUALITY,
};
pub use pipeline::{ProcessedImage, UploadPipeline, UploadRequest};
pub use rewind::Rewind;
pub use validate::{
    validate_file_size, validate_file_type, validate_image, ImageInfo, ValidationResult,
    ALLOWED_EXTENSIONS, MAX_UPLOAD_SIZE,
};
