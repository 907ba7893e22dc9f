//! Configuration for the Reserva client.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration.
    pub api: ApiConfig,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the reservation backend.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig {
                base_url: env::var("RESERVA_API_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string()),
                timeout: env::var("RESERVA_API_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            },
            log_level: env::var("RESERVA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
