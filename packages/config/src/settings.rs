use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid HTTP timeout: {0}")]
    InvalidTimeout(String),
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Origin allow-list for the status-mutation function.
///
/// Allowed origins are echoed back; anything else gets the default origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    pub allowed_origins: Vec<String>,
    pub default_origin: String,
}

impl CorsPolicy {
    pub fn resolve_origin<'a>(&'a self, origin: Option<&'a str>) -> &'a str {
        match origin {
            Some(origin) if self.allowed_origins.iter().any(|o| o == origin) => origin,
            _ => &self.default_origin,
        }
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            default_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub cors: CorsPolicy,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(FLOWCRAFT_API_PORT) {
            Some(raw) => raw.trim().parse::<u16>()?,
            None => DEFAULT_API_PORT,
        };

        // Validate port is in valid range
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let host = lookup(FLOWCRAFT_API_HOST).unwrap_or_else(|| DEFAULT_API_HOST.to_string());

        let database_path = lookup(FLOWCRAFT_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(flowcraft_core::database_file);

        let mut cors = CorsPolicy::default();
        if let Some(origins) = lookup(FLOWCRAFT_CORS_ORIGINS) {
            cors.allowed_origins = split_list(&origins);
        }
        if let Some(default_origin) = lookup(FLOWCRAFT_CORS_DEFAULT_ORIGIN) {
            cors.default_origin = default_origin.trim().to_string();
        }

        debug!(host = %host, port, "Loaded server configuration");

        Ok(ServerConfig {
            host,
            port,
            database_path,
            cors,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub http_timeout: Duration,
    pub events_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(FLOWCRAFT_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let parsed = url::Url::parse(&api_url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let http_timeout = match lookup(FLOWCRAFT_HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
                if secs == 0 {
                    return Err(ConfigError::InvalidTimeout(raw));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let token = lookup(FLOWCRAFT_TOKEN).filter(|t| !t.trim().is_empty());

        let events_path = lookup(FLOWCRAFT_EVENTS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(flowcraft_core::events_file);

        Ok(ClientConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            http_timeout,
            events_path,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
