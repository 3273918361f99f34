//! Router configuration for FileForge.
//!
//! This module defines the HTTP routes and applies middleware for CORS,
//! request tracing, body size limits and panic recovery.
//!
//! # Route Structure
//!
//! ```text
//! /health    - Health check
//! /upload    - Image recompression (POST, multipart)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fileforge::server::routes::{create_router, RouterConfig};
//! use fileforge::upload::UploadPipeline;
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(UploadPipeline::new(), config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, upload_handler, AppState};
use crate::upload::{UploadPipeline, MAX_UPLOAD_SIZE};

/// Default cap on the whole request body (10 MiB).
///
/// Uploads stop being buffered at 5 MiB + 1 byte regardless; the body limit
/// only has to leave room for that plus multipart framing so oversized files
/// get the JSON 413 from the pipeline.
pub const DEFAULT_BODY_LIMIT: usize = 2 * MAX_UPLOAD_SIZE as usize;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Maximum request body size in bytes
    pub body_limit: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Body limit is [`DEFAULT_BODY_LIMIT`]
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            body_limit: DEFAULT_BODY_LIMIT,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the maximum request body size in bytes.
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - `POST /upload` and `GET /health`
/// - Request body limit
/// - CORS configuration
/// - Panic recovery (a panicking handler yields a 500)
/// - Request tracing (optional)
pub fn create_router(pipeline: UploadPipeline, config: RouterConfig) -> Router {
    let app_state = AppState::new(pipeline);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/upload", post(upload_handler))
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(CatchPanicLayer::new())
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => {
            // No origins allowed - this effectively disables CORS
            cors
        }
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

/// Create a router with default configuration.
pub fn create_default_router() -> Router {
    create_router(UploadPipeline::new(), RouterConfig::new())
}

// =============================================================================
// Tests
// =============================================================================
