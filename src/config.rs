//! Configuration management for FileForge.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `FILEFORGE_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use fileforge::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `FILEFORGE_HOST` - Server bind address (default: 0.0.0.0)
//! - `FILEFORGE_PORT` - Server port (default: 5000)
//! - `FILEFORGE_BODY_LIMIT` - Maximum request body in bytes (default: 10 MiB)
//! - `FILEFORGE_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use clap::Parser;

use crate::server::routes::DEFAULT_BODY_LIMIT;
use crate::upload::MAX_UPLOAD_SIZE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Room above the upload limit for multipart boundaries and part headers.
pub const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Smallest body limit that still admits a maximum-size upload.
pub const MIN_BODY_LIMIT: u64 = MAX_UPLOAD_SIZE + MULTIPART_OVERHEAD;

// =============================================================================
// CLI Arguments
// =============================================================================

/// FileForge - compress JPEG and PNG images in memory.
///
/// Accepts a single image per request on `POST /upload` and streams the
/// recompressed file back. Nothing is written to disk.
#[derive(Parser, Debug, Clone)]
#[command(name = "fileforge")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "FILEFORGE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "FILEFORGE_PORT")]
    pub port: u16,

    /// Maximum request body size in bytes.
    ///
    /// Must be at least the 5 MiB upload limit plus 64 KiB of multipart
    /// framing, otherwise a maximum-size upload is cut off by the router.
    #[arg(long, default_value_t = DEFAULT_BODY_LIMIT, env = "FILEFORGE_BODY_LIMIT")]
    pub body_limit: usize,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "FILEFORGE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host must not be empty. Set --host or FILEFORGE_HOST".to_string());
        }

        if self.port == 0 {
            return Err("port must be greater than 0".to_string());
        }

        if (self.body_limit as u64) < MIN_BODY_LIMIT {
            return Err(format!(
                "body_limit must be at least {} bytes ({} byte upload limit plus {} bytes of multipart framing)",
                MIN_BODY_LIMIT, MAX_UPLOAD_SIZE, MULTIPART_OVERHEAD
            ));
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
