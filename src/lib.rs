//! # FileForge
//!
//! An in-memory image compression service.
//!
//! A client uploads one JPEG or PNG; the service validates it, recompresses
//! it and streams the result straight back. Nothing touches the disk and no
//! state survives the request.
//!
//! ## Features
//!
//! - **Ordered validation**: extension, size (5 MiB) and structural integrity
//!   are checked before any pixel is decoded
//! - **Format preserving**: JPEG stays JPEG (quality 60), PNG stays PNG
//!   (lossless, maximum compression, alpha kept)
//! - **Stateless**: the pipeline holds no mutable state and is shared freely
//!   across requests
//!
//! ## Architecture
//!
//! - [`upload`] - Validators, recompressor and the upload pipeline
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error taxonomy
//!
//! ## Example
//!
//! ```rust,no_run
//! use fileforge::{create_router, RouterConfig, UploadPipeline};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = create_router(UploadPipeline::new(), RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod upload;

// Re-export commonly used types
pub use config::Config;
pub use error::{IntegrityError, PipelineError};
pub use server::{
    create_default_router, create_router, health_handler, upload_handler, AppState,
    ErrorResponse, HealthResponse, RouterConfig,
};
pub use upload::{
    validate_file_size, validate_file_type, validate_image, OutputFormat, ProcessedImage,
    Recompressor, UploadPipeline, UploadRequest, ValidationResult, MAX_UPLOAD_SIZE,
};
