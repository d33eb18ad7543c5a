//! # papyr-db
//!
//! PostgreSQL database layer for papyr.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for papers, labels and paper-label associations
//! - Embedded schema migrations
//! - An in-memory store implementing the same traits
//!
//! ## Example
//!
//! ```rust,ignore
//! use papyr_db::{Database, LabelRepository, PaperLabelRepository, PoolConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect_with_config("postgres://localhost/papyr", PoolConfig::from_env()).await?;
//!     db.migrate().await?;
//!
//!     let label = db.labels.create("Transformer").await?;
//!     db.paper_labels.attach(paper_id, label.id).await?;
//!     Ok(())
//! }
//! ```
pub mod labels;
pub mod memory;
pub mod paper_labels;
pub mod papers;
pub mod pool;

// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use papyr_core::*;

pub use labels::PgLabelRepository;
pub use memory::MemoryStore;
pub use paper_labels::PgPaperLabelRepository;
pub use papers::PgPaperRepository;
pub use pool::{create_pool_with_config, log_pool_metrics, PoolConfig};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub papers: std::sync::Arc<PgPaperRepository>,
    pub labels: std::sync::Arc<PgLabelRepository>,
    pub paper_labels: std::sync::Arc<PgPaperLabelRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            papers: std::sync::Arc::new(PgPaperRepository::new(pool.clone())),
            labels: std::sync::Arc::new(PgLabelRepository::new(pool.clone())),
            paper_labels: std::sync::Arc::new(PgPaperLabelRepository::new(pool.clone())),
            pool,
        }
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Round-trip a trivial query; used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        log_pool_metrics(&self.pool);
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
