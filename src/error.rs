use thiserror::Error;

/// Message returned when the multipart body has no `file` part.
pub const NO_FILE_PART: &str = "No file part in the request";

/// Message returned when the `file` part carries an empty filename.
pub const NO_FILE_SELECTED: &str = "No file selected";

/// Errors that can occur while processing an uploaded image.
///
/// Variants are listed in the order the pipeline checks for them.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// No file part was sent, or the filename was empty (HTTP 400)
    #[error("{0}")]
    MissingFile(&'static str),

    /// Extension is not one of .jpg, .jpeg, .png (HTTP 415)
    #[error("Invalid file type. Only JPG, JPEG, and PNG files are allowed.")]
    UnsupportedType,

    /// Upload exceeds the size limit (HTTP 413)
    #[error("File size exceeds 5 MB limit.")]
    TooLarge,

    /// Bytes are not a structurally valid image (HTTP 400)
    #[error("Invalid image file. The file is corrupted or not an image.")]
    CorruptImage,

    /// Decode, encode or any other unexpected failure after validation (HTTP 500)
    ///
    /// The message is for logs only and is never sent to the client.
    #[error("Internal processing error: {message}")]
    InternalProcessingError { message: String },
}

impl PipelineError {
    /// Create an internal processing error from anything displayable.
    pub fn internal(message: impl ToString) -> Self {
        PipelineError::InternalProcessingError {
            message: message.to_string(),
        }
    }
}

/// Reasons an upload fails structural image verification.
///
/// All of these surface to the client as [`PipelineError::CorruptImage`];
/// the distinction only matters for logs.
#[derive(Debug, Clone, Error)]
pub enum IntegrityError {
    /// Magic bytes match no known image container
    #[error("Unrecognized image container")]
    UnknownFormat,

    /// Container ended early or could not be read
    #[error("Truncated or unreadable image: {0}")]
    Truncated(String),

    /// Header or metadata is syntactically invalid
    #[error("Malformed image header: {0}")]
    Malformed(String),
}

impl From<image::ImageError> for IntegrityError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => IntegrityError::Truncated(e.to_string()),
            other => IntegrityError::Malformed(other.to_string()),
        }
    }
}
