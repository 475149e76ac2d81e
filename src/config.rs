//! Server configuration loaded from environment variables.
//!
//! Every setting has a default so the server starts with zero configuration
//! against the in-memory backend.

use crate::upload::DEFAULT_MAX_FILE_SIZE;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Env: `BIND_ADDR`. Default: `0.0.0.0:5000`
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection string. When unset the in-memory backend is used.
    /// Env: `DATABASE_URL`
    pub database_url: Option<String>,

    /// Env: `PORTFOLIO_SCHEMA`. Default: `portfolio`
    pub schema: String,

    /// Env: `DATABASE_MAX_CONNECTIONS`. Default: `5`
    pub max_connections: u32,

    /// Directory holding uploaded images, served at `/uploads`.
    /// Env: `UPLOAD_DIR`. Default: `./uploads`
    pub upload_dir: PathBuf,

    /// Per-file upload limit in bytes.
    /// Env: `MAX_UPLOAD_BYTES`. Default: 50 MiB
    pub max_upload_bytes: usize,
}

/// Cap on files per multipart request, used to bound the whole body.
pub const MAX_FILES_PER_REQUEST: usize = 10;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 5000).into(),
            database_url: None,
            schema: "portfolio".to_string(),
            max_connections: 5,
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.bind_addr = parsed,
                Err(_) => tracing::warn!(value = %addr, "invalid BIND_ADDR, using default"),
            }
        }

        config.database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());

        if let Ok(schema) = std::env::var("PORTFOLIO_SCHEMA") {
            if !schema.is_empty() {
                config.schema = schema;
            }
        }

        if let Ok(val) = std::env::var("DATABASE_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse::<u32>() {
                config.max_connections = n.max(1);
            }
        }

        if let Ok(dir) = std::env::var("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }

        if let Ok(val) = std::env::var("MAX_UPLOAD_BYTES") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_upload_bytes = n,
                _ => tracing::warn!(value = %val, "invalid MAX_UPLOAD_BYTES, using default"),
            }
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.
        config
    }

    /// Limit for a whole request body: a full batch of maximum-size files plus form overhead.
    pub fn request_body_limit(&self) -> usize {
        self.max_upload_bytes
            .saturating_mul(MAX_FILES_PER_REQUEST)
            .saturating_add(1024 * 1024)
    }
}
