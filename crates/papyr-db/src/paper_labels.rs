//! Paper-label association repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use papyr_core::{Error, Label, PaperLabelRepository, Result};

/// PostgreSQL implementation of PaperLabelRepository.
///
/// `(paper_id, label_id)` is the primary key of `paper_label`; attach is an
/// upsert and detach a delete-if-exists, so concurrent callers converge
/// without client-side check-then-act.
pub struct PgPaperLabelRepository {
    pool: Pool<Postgres>,
}

impl PgPaperLabelRepository {
    /// Create a new PgPaperLabelRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaperLabelRepository for PgPaperLabelRepository {
    async fn attach(&self, paper_id: Uuid, label_id: Uuid) -> Result<bool> {
        let row = sqlx::query(
            r#"
            WITH ins AS (
                INSERT INTO paper_label (paper_id, label_id, created_at_utc)
                SELECT $1, $2, $3
                WHERE EXISTS (SELECT 1 FROM paper WHERE id = $1)
                  AND EXISTS (SELECT 1 FROM label WHERE id = $2)
                ON CONFLICT (paper_id, label_id) DO NOTHING
                RETURNING 1
            )
            SELECT
                EXISTS (SELECT 1 FROM ins) AS inserted,
                EXISTS (SELECT 1 FROM paper WHERE id = $1) AS paper_exists,
                EXISTS (SELECT 1 FROM label WHERE id = $2) AS label_exists
            "#,
        )
        .bind(paper_id)
        .bind(label_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        if !row.get::<bool, _>("paper_exists") {
            return Err(Error::PaperNotFound(paper_id));
        }
        if !row.get::<bool, _>("label_exists") {
            return Err(Error::LabelNotFound(label_id));
        }

        let inserted: bool = row.get("inserted");
        if inserted {
            info!(
                subsystem = "db",
                component = "paper_labels",
                op = "attach",
                paper_id = %paper_id,
                label_id = %label_id,
                "Label attached"
            );
        }
        Ok(inserted)
    }

    async fn detach(&self, paper_id: Uuid, label_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM paper_label WHERE paper_id = $1 AND label_id = $2")
            .bind(paper_id)
            .bind(label_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(
                subsystem = "db",
                component = "paper_labels",
                op = "detach",
                paper_id = %paper_id,
                label_id = %label_id,
                "Label detached"
            );
        }
        Ok(removed)
    }

    async fn labels_for_paper(&self, paper_id: Uuid) -> Result<Vec<Label>> {
        let rows = sqlx::query(
            "SELECT l.id, l.name FROM paper_label pl
             JOIN label l ON l.id = pl.label_id
             WHERE pl.paper_id = $1
             ORDER BY l.name_key, l.id",
        )
        .bind(paper_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Label {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn labels_for_papers(&self, paper_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Label>>> {
        if paper_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            "SELECT pl.paper_id, l.id, l.name FROM paper_label pl
             JOIN label l ON l.id = pl.label_id
             WHERE pl.paper_id = ANY($1)
             ORDER BY pl.paper_id, l.name_key, l.id",
        )
        .bind(paper_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_paper: HashMap<Uuid, Vec<Label>> = HashMap::new();
        for row in rows {
            by_paper
                .entry(row.get("paper_id"))
                .or_default()
                .push(Label {
                    id: row.get("id"),
                    name: row.get("name"),
                });
        }
        Ok(by_paper)
    }
}
