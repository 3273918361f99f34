//! HTTP request handlers for the FileForge upload API.
//!
//! This module contains the Axum handlers for image uploads and health checks.
//!
//! # Endpoints
//!
//! - `POST /upload` - Recompress an uploaded JPEG or PNG
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::{Bytes, BytesMut};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::{PipelineError, NO_FILE_PART};
use crate::upload::{UploadPipeline, UploadRequest, MAX_UPLOAD_SIZE};

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Message sent to clients for any 500.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred while processing the image.";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the upload pipeline.
///
/// This is passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// The pipeline that validates and recompresses uploads
    pub pipeline: Arc<UploadPipeline>,
}

impl AppState {
    /// Create a new application state with the given pipeline.
    pub fn new(pipeline: UploadPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

impl PipelineError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::MissingFile(_) | PipelineError::CorruptImage => {
                StatusCode::BAD_REQUEST
            }
            PipelineError::UnsupportedType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PipelineError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            PipelineError::InternalProcessingError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short identifier used in structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            PipelineError::MissingFile(_) => "missing_file",
            PipelineError::UnsupportedType => "unsupported_type",
            PipelineError::TooLarge => "too_large",
            PipelineError::CorruptImage => "corrupt_image",
            PipelineError::InternalProcessingError { .. } => "internal_error",
        }
    }
}

/// Convert PipelineError to HTTP response.
///
/// - 4xx errors are logged at WARN level (client errors)
/// - 5xx errors are logged at ERROR level with the internal detail, while
///   the client only sees [`INTERNAL_ERROR_MESSAGE`]
impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        let message = if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                self
            );
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                self
            );
            self.to_string()
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Map a multipart stream failure.
///
/// A body over the router's limit is reported as too large; anything else
/// means the request did not carry a readable file part.
///
/// The body limit is enforced while the stream is read, so a request that
/// overflows it before the `file` part's headers arrive (for example through
/// large preceding form fields) gets 413 without its filename ever reaching
/// the type check. With a body limit of at least
/// [`MIN_BODY_LIMIT`](crate::config::MIN_BODY_LIMIT) a single `file` part
/// never hits this path for uploads within the size limit.
fn multipart_error(err: MultipartError) -> PipelineError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PipelineError::TooLarge
    } else {
        warn!("Malformed multipart body: {}", err.body_text());
        PipelineError::MissingFile(NO_FILE_PART)
    }
}

// =============================================================================
// Multipart Extraction
// =============================================================================

/// Pull the first `file` part out of a multipart body.
///
/// Parts without a filename are plain form fields, not files, and are
/// skipped. At most `MAX_UPLOAD_SIZE + 1` bytes are buffered; anything past
/// that is never read, and the size validator rejects the result.
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadRequest, PipelineError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let content = read_bounded(field, MAX_UPLOAD_SIZE as usize + 1)
            .await
            .map_err(multipart_error)?;

        return Ok(UploadRequest::new(filename, content));
    }

    Ok(UploadRequest::without_file())
}

/// Read a field into memory, stopping once `limit` bytes are buffered.
async fn read_bounded(mut field: Field<'_>, limit: usize) -> Result<Bytes, MultipartError> {
    let mut buf = BytesMut::new();

    while let Some(chunk) = field.chunk().await? {
        let remaining = limit - buf.len();
        if chunk.len() >= remaining {
            buf.extend_from_slice(&chunk[..remaining]);
            break;
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf.freeze())
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle image uploads.
///
/// # Endpoint
///
/// `POST /upload` with a `multipart/form-data` body
///
/// # Form Fields
///
/// - `file`: the image to recompress (`.jpg`, `.jpeg` or `.png`, at most 5 MiB)
///
/// # Response
///
/// - `200 OK`: recompressed image, `Content-Type: image/jpeg|image/png`,
///   `Content-Disposition: attachment; filename="compressed_<name>"`
/// - `400 Bad Request`: no file part, empty filename, or not a valid image
/// - `413 Payload Too Large`: file exceeds 5 MiB
/// - `415 Unsupported Media Type`: extension not allowed
/// - `500 Internal Server Error`: decode or encode failure
///
/// Error bodies are `{"error": "<message>"}`.
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, PipelineError> {
    let request = match multipart {
        Ok(multipart) => read_upload(multipart).await?,
        Err(rejection) => {
            warn!("Upload without multipart body: {}", rejection.body_text());
            UploadRequest::without_file()
        }
    };

    // Decoding and encoding are CPU-bound; keep them off the async workers.
    let pipeline = Arc::clone(&state.pipeline);
    let processed = tokio::task::spawn_blocking(move || pipeline.process(request))
        .await
        .map_err(|e| PipelineError::internal(format!("processing task failed: {}", e)))??;

    let disposition = processed.content_disposition();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, processed.mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        processed.encoded_bytes,
    )
        .into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// Returns `200 OK` with JSON body containing service status and version.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
