//! Label repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use papyr_core::{
    label_name_key, normalize_label_name, Error, Label, LabelRepository, Result,
};

/// PostgreSQL implementation of LabelRepository.
///
/// Names are unique on their lowercased key (`label.name_key`). Creating a
/// label whose key already exists returns the stored label unchanged.
pub struct PgLabelRepository {
    pool: Pool<Postgres>,
}

impl PgLabelRepository {
    /// Create a new PgLabelRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_by_key(&self, key: &str) -> Result<Option<Label>> {
        let row = sqlx::query("SELECT id, name FROM label WHERE name_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Label {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }
}

#[async_trait]
impl LabelRepository for PgLabelRepository {
    async fn create(&self, name: &str) -> Result<Label> {
        let name = normalize_label_name(name)?;
        let key = label_name_key(&name);
        let id = Uuid::now_v7();

        let inserted = sqlx::query(
            "INSERT INTO label (id, name, name_key, created_at_utc) VALUES ($1, $2, $3, $4)
             ON CONFLICT (name_key) DO NOTHING
             RETURNING id, name",
        )
        .bind(id)
        .bind(&name)
        .bind(&key)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            info!(
                subsystem = "db",
                component = "labels",
                op = "create",
                label_id = %id,
                "Label created"
            );
            return Ok(Label {
                id: row.get("id"),
                name: row.get("name"),
            });
        }

        // Lost the race or the name already existed: read the winner.
        debug!(
            subsystem = "db",
            component = "labels",
            op = "create",
            name_key = %key,
            "Label exists, returning stored label"
        );
        self.fetch_by_key(&key)
            .await?
            .ok_or_else(|| Error::Internal(format!("Label '{}' vanished after conflict", key)))
    }

    async fn list(&self) -> Result<Vec<Label>> {
        let rows = sqlx::query("SELECT id, name FROM label ORDER BY name_key, id")
            .fetch_all(&self.pool)
            .await?;

        let labels = rows
            .into_iter()
            .map(|row| Label {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect();

        Ok(labels)
    }

    async fn get(&self, id: Uuid) -> Result<Label> {
        let row = sqlx::query("SELECT id, name FROM label WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::LabelNotFound(id))?;

        Ok(Label {
            id: row.get("id"),
            name: row.get("name"),
        })
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Label>> {
        let key = label_name_key(name);
        if key.is_empty() {
            return Ok(None);
        }
        self.fetch_by_key(&key).await
    }
}
