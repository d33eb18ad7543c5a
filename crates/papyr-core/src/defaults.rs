//! Centralized default constants for papyr.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Environment variables override the runtime-tunable ones.

// =============================================================================
// LABELS
// =============================================================================

/// Maximum label name length in characters.
pub const LABEL_NAME_MAX_CHARS: usize = 255;

/// Shortest normalized term matched as a substring; shorter terms must match
/// a whole word.
pub const SUGGEST_MIN_PARTIAL_CHARS: usize = 3;

// =============================================================================
// PAPERS
// =============================================================================

/// Maximum paper title length in characters.
pub const TITLE_MAX_CHARS: usize = 500;

/// Maximum accepted upload size (50 MiB).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Title used when an upload has no usable filename.
pub const UNTITLED_PAPER: &str = "Untitled paper";

/// Characters of extracted text sent to the generation model.
pub const DIGEST_INPUT_MAX_CHARS: usize = 12_000;

/// Keywords kept from one generation run.
pub const DIGEST_MAX_KEYWORDS: usize = 12;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP bind address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Default allowed CORS origin (the web frontend's dev server).
pub const CORS_ORIGIN: &str = "http://localhost:3000";

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/papyr";

// =============================================================================
// DATABASE POOL
// =============================================================================

pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Idle connections kept open between requests.
pub const DB_MIN_CONNECTIONS: u32 = 1;

/// Seconds a request waits for a free connection.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

/// Seconds before a connection is recycled.
pub const DB_MAX_LIFETIME_SECS: u64 = 1800;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model.
pub const GEN_MODEL: &str = "llama3.2:3b";

/// Generation request timeout in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Timeout for external extraction commands (pdftotext).
pub const EXTRACTION_CMD_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_CORS_ORIGINS: &str = "CORS_ORIGINS";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
pub const ENV_DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const ENV_DB_MIN_CONNECTIONS: &str = "DB_MIN_CONNECTIONS";
pub const ENV_DB_CONNECT_TIMEOUT_SECS: &str = "DB_CONNECT_TIMEOUT_SECS";
pub const ENV_DB_IDLE_TIMEOUT_SECS: &str = "DB_IDLE_TIMEOUT_SECS";
pub const ENV_DB_MAX_LIFETIME_SECS: &str = "DB_MAX_LIFETIME_SECS";
pub const ENV_OLLAMA_BASE: &str = "OLLAMA_BASE";
pub const ENV_OLLAMA_GEN_MODEL: &str = "OLLAMA_GEN_MODEL";
pub const ENV_GEN_TIMEOUT_SECS: &str = "PAPYR_GEN_TIMEOUT_SECS";
pub const ENV_EXTRACT_TIMEOUT_SECS: &str = "PAPYR_EXTRACT_TIMEOUT_SECS";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_threshold_below_label_limit() {
        assert!(SUGGEST_MIN_PARTIAL_CHARS < LABEL_NAME_MAX_CHARS);
    }

    #[test]
    fn test_timeouts_are_positive() {
        assert!(GEN_TIMEOUT_SECS > 0);
        assert!(EXTRACTION_CMD_TIMEOUT_SECS > 0);
        assert!(DB_CONNECT_TIMEOUT_SECS > 0);
    }

    #[test]
    fn test_pool_minimum_within_maximum() {
        assert!(DB_MIN_CONNECTIONS <= DB_MAX_CONNECTIONS);
    }
}
