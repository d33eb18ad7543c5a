//! Paper repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use papyr_core::{
    Error, FinalizePaper, NewPaper, Paper, PaperRepository, PaperStatus, Result,
};

const PAPER_COLUMNS: &str = "id, title, raw_text, summary, keywords, status, \
                             created_at_utc, updated_at_utc, finalized_at_utc";

/// PostgreSQL implementation of PaperRepository.
pub struct PgPaperRepository {
    pool: Pool<Postgres>,
}

impl PgPaperRepository {
    /// Create a new PgPaperRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn paper_from_row(row: &PgRow) -> Result<Paper> {
        let status: String = row.try_get("status")?;
        Ok(Paper {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            raw_text: row.try_get("raw_text")?,
            summary: row.try_get("summary")?,
            keywords: row.try_get("keywords")?,
            status: status.parse::<PaperStatus>().map_err(Error::Internal)?,
            created_at_utc: row.try_get("created_at_utc")?,
            updated_at_utc: row.try_get("updated_at_utc")?,
            finalized_at_utc: row.try_get("finalized_at_utc")?,
        })
    }
}

#[async_trait]
impl PaperRepository for PgPaperRepository {
    async fn insert(&self, paper: NewPaper) -> Result<Paper> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "INSERT INTO paper (id, title, raw_text, status, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {PAPER_COLUMNS}"
        ))
        .bind(id)
        .bind(&paper.title)
        .bind(&paper.raw_text)
        .bind(PaperStatus::Uploaded.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(
            subsystem = "db",
            component = "papers",
            op = "insert",
            paper_id = %id,
            "Paper inserted"
        );
        Self::paper_from_row(&row)
    }

    async fn fetch(&self, id: Uuid) -> Result<Paper> {
        let row = sqlx::query(&format!("SELECT {PAPER_COLUMNS} FROM paper WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::PaperNotFound(id))?;
        Self::paper_from_row(&row)
    }

    async fn list(&self) -> Result<Vec<Paper>> {
        let rows = sqlx::query(&format!(
            "SELECT {PAPER_COLUMNS} FROM paper ORDER BY created_at_utc DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::paper_from_row).collect()
    }

    async fn finalize(&self, id: Uuid, input: FinalizePaper) -> Result<Paper> {
        let now = Utc::now();

        // Status guard and write in one statement; a concurrent finalize
        // matches zero rows.
        let row = sqlx::query(&format!(
            "UPDATE paper
             SET title = $2, summary = $3, keywords = $4, status = $5,
                 updated_at_utc = $6, finalized_at_utc = $6
             WHERE id = $1 AND status = $7
             RETURNING {PAPER_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.keywords)
        .bind(PaperStatus::Finalized.as_str())
        .bind(now)
        .bind(PaperStatus::Uploaded.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                info!(
                    subsystem = "db",
                    component = "papers",
                    op = "finalize",
                    paper_id = %id,
                    keyword_count = input.keywords.len(),
                    "Paper finalized"
                );
                Self::paper_from_row(&row)
            }
            None if self.exists(id).await? => Err(Error::Conflict(format!(
                "Paper {} is already finalized",
                id
            ))),
            None => Err(Error::PaperNotFound(id)),
        }
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM paper WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
