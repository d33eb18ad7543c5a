//! Postgres pool sizing and connection.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use papyr_core::defaults::{
    DB_CONNECT_TIMEOUT_SECS, DB_IDLE_TIMEOUT_SECS, DB_MAX_CONNECTIONS, DB_MAX_LIFETIME_SECS,
    DB_MIN_CONNECTIONS, ENV_DB_CONNECT_TIMEOUT_SECS, ENV_DB_IDLE_TIMEOUT_SECS,
    ENV_DB_MAX_CONNECTIONS, ENV_DB_MAX_LIFETIME_SECS, ENV_DB_MIN_CONNECTIONS,
};
use papyr_core::{Error, Result};

/// Pool sizing and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a request waits for a free connection.
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    /// `None` keeps connections open until they fail.
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DB_MAX_CONNECTIONS,
            min_connections: DB_MIN_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DB_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DB_IDLE_TIMEOUT_SECS),
            max_lifetime: Some(Duration::from_secs(DB_MAX_LIFETIME_SECS)),
        }
    }
}

impl PoolConfig {
    /// Read `DB_*` overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a key lookup, falling back to defaults for
    /// missing or unparsable values.
    ///
    /// A zero max connection count is ignored, `min_connections` is clamped
    /// to `max_connections`, and a max lifetime of `0` disables recycling.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| -> Option<u64> {
            let raw = lookup(key)?;
            match raw.trim().parse::<u64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(key, value = %raw, "Ignoring invalid pool setting");
                    None
                }
            }
        };
        let defaults = Self::default();

        let max_connections = number(ENV_DB_MAX_CONNECTIONS)
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.max_connections);
        let min_connections = number(ENV_DB_MIN_CONNECTIONS)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(defaults.min_connections)
            .min(max_connections);
        let acquire_timeout = number(ENV_DB_CONNECT_TIMEOUT_SECS)
            .filter(|v| *v > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.acquire_timeout);
        let idle_timeout = number(ENV_DB_IDLE_TIMEOUT_SECS)
            .map(Duration::from_secs)
            .unwrap_or(defaults.idle_timeout);
        let max_lifetime = match number(ENV_DB_MAX_LIFETIME_SECS) {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.max_lifetime,
        };

        Self {
            max_connections,
            min_connections,
            acquire_timeout,
            idle_timeout,
            max_lifetime,
        }
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
    }
}

pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    debug!(
        subsystem = "db",
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "Connecting to Postgres"
    );

    let pool = config
        .options()
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database pool ready"
    );
    Ok(pool)
}

/// Warn when every pooled connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();
    debug!(subsystem = "db", pool_size = size, pool_idle = idle, "Pool status");
    if idle == 0 && size > 0 {
        warn!(subsystem = "db", pool_size = size, "Connection pool exhausted");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        assert_eq!(PoolConfig::from_lookup(lookup(&[])), PoolConfig::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = PoolConfig::from_lookup(lookup(&[
            (ENV_DB_MAX_CONNECTIONS, "25"),
            (ENV_DB_MIN_CONNECTIONS, "4"),
            (ENV_DB_CONNECT_TIMEOUT_SECS, "5"),
            (ENV_DB_IDLE_TIMEOUT_SECS, "60"),
            (ENV_DB_MAX_LIFETIME_SECS, "0"),
        ]));

        assert_eq!(config.max_connections, 25);
        assert_eq!(config.min_connections, 4);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert!(config.max_lifetime.is_none());
    }

    #[test]
    fn test_min_connections_clamped_to_max() {
        let config = PoolConfig::from_lookup(lookup(&[
            (ENV_DB_MAX_CONNECTIONS, "3"),
            (ENV_DB_MIN_CONNECTIONS, "8"),
        ]));
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.min_connections, 3);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = PoolConfig::from_lookup(lookup(&[
            (ENV_DB_MAX_CONNECTIONS, "0"),
            (ENV_DB_CONNECT_TIMEOUT_SECS, "soon"),
            (ENV_DB_MAX_LIFETIME_SECS, "-1"),
        ]));
        let defaults = PoolConfig::default();
        assert_eq!(config.max_connections, defaults.max_connections);
        assert_eq!(config.acquire_timeout, defaults.acquire_timeout);
        assert_eq!(config.max_lifetime, defaults.max_lifetime);
    }
}
