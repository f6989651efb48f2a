//! Configuration for the revtag HTTP API server.

use crate::{ApiError, ApiResult};
use revtag_core::constants::{DEFAULT_HTTP_PORT, DEFAULT_MAX_BODY_SIZE};
use revtag_core::RevtagConfig;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Socket address to bind to.
    pub bind_addr: SocketAddr,

    /// Enable CORS.
    pub enable_cors: bool,

    /// Allowed CORS origins. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Enable request logging.
    pub enable_request_logging: bool,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_HTTP_PORT)),
            enable_cors: true,
            cors_allowed_origins: Vec::new(),
            request_timeout_seconds: 30,
            enable_request_logging: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ApiConfig {
    /// Create API configuration from the core revtag configuration.
    pub fn from_core_config(core_config: &RevtagConfig) -> ApiResult<Self> {
        let http = &core_config.http;
        let bind_addr = (http.host.as_str(), http.port)
            .to_socket_addrs()
            .map_err(|e| {
                ApiError::Http(format!(
                    "cannot resolve bind address {}:{}: {}",
                    http.host, http.port, e
                ))
            })?
            .next()
            .ok_or_else(|| {
                ApiError::Http(format!(
                    "bind address {}:{} resolved to nothing",
                    http.host, http.port
                ))
            })?;

        Ok(Self {
            bind_addr,
            enable_cors: http.enable_cors,
            cors_allowed_origins: http.cors_allowed_origins.clone(),
            request_timeout_seconds: http.request_timeout,
            enable_request_logging: http.enable_request_logging,
            max_body_size: http.max_body_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_http_section_is_carried_over() {
        let mut core = RevtagConfig::default();
        core.http.host = "0.0.0.0".to_string();
        core.http.port = 8123;
        core.http.enable_cors = false;
        core.http.request_timeout = 5;

        let config = ApiConfig::from_core_config(&core).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8123".parse().unwrap());
        assert!(!config.enable_cors);
        assert_eq!(config.request_timeout_seconds, 5);
    }

    #[test]
    fn default_binds_loopback_on_default_port() {
        assert_eq!(ApiConfig::default().bind_addr.port(), DEFAULT_HTTP_PORT);
        assert!(ApiConfig::default().bind_addr.ip().is_loopback());
    }
}
