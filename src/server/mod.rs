//! HTTP server layer for FileForge.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                  POST /upload   GET /health                     │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │          routes             │  │
//! │  │ (multipart, error → JSON)│  │ (CORS, limits, tracing)     │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, read_upload, upload_handler, AppState, ErrorResponse, HealthResponse,
    FILE_FIELD, INTERNAL_ERROR_MESSAGE,
};
pub use routes::{create_default_router, create_router, RouterConfig, DEFAULT_BODY_LIMIT};
