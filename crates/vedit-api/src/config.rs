//! API configuration.

use std::net::SocketAddr;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address
    pub listen_addr: SocketAddr,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// Upload size cap in bytes
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".parse().unwrap(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_upload_bytes: 2 * 1024 * 1024 * 1024, // 2 GiB
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: std::env::var("API_LISTEN_ADDR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.listen_addr),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }
}
