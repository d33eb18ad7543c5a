//! Server configuration read from the environment.

use axum::http::HeaderValue;
use tracing::warn;

use papyr_db::PoolConfig;

use papyr_core::defaults::{
    CORS_ORIGIN, DATABASE_URL, ENV_CORS_ORIGINS, ENV_DATABASE_URL, ENV_HOST, ENV_MAX_UPLOAD_BYTES,
    ENV_PORT, MAX_UPLOAD_BYTES, SERVER_HOST, SERVER_PORT,
};

/// Environment variable for the externally visible base URL.
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// The single externally visible base URL of the API.
    pub base_url: String,
    pub cors_origins: Vec<HeaderValue>,
    pub max_upload_bytes: usize,
    /// Postgres pool sizing, from the `DB_*` variables.
    pub pool: PoolConfig,
}

impl ApiConfig {
    /// Read configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let database_url =
            std::env::var(ENV_DATABASE_URL).unwrap_or_else(|_| DATABASE_URL.to_string());
        let host = std::env::var(ENV_HOST).unwrap_or_else(|_| SERVER_HOST.to_string());
        let port = std::env::var(ENV_PORT)
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(SERVER_PORT);
        let base_url = std::env::var(ENV_API_BASE_URL)
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));
        let cors_origins =
            parse_allowed_origins(&std::env::var(ENV_CORS_ORIGINS).unwrap_or_default());
        let max_upload_bytes = std::env::var(ENV_MAX_UPLOAD_BYTES)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(MAX_UPLOAD_BYTES);

        Self {
            database_url,
            host,
            port,
            base_url,
            cors_origins,
            max_upload_bytes,
            pool: PoolConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            database_url: DATABASE_URL.to_string(),
            host: SERVER_HOST.to_string(),
            port: SERVER_PORT,
            base_url: format!("http://{}:{}", SERVER_HOST, SERVER_PORT),
            cors_origins: parse_allowed_origins(""),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            pool: PoolConfig::default(),
        }
    }
}

/// Parse a comma separated origin list.
///
/// Entries that are not `http(s)://` URLs are dropped. An empty result falls
/// back to the local development client.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|origin| {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                warn!(origin, "Ignoring invalid CORS origin");
                return None;
            }
            origin.parse::<HeaderValue>().ok()
        })
        .collect();

    if origins.is_empty() {
        return vec![HeaderValue::from_static(CORS_ORIGIN)];
    }
    origins
}
