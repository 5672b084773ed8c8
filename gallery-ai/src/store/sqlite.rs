//! SQLite content store
//!
//! Records are kept as JSON payloads, one row per artwork:
//! - `cultural_contexts (artwork_id PK, payload, expert_validated, updated_at)`
//! - `educational_contents (artwork_id PK, content_id, payload, updated_at)`

use super::{select_content, stamp_content, stamp_context, CulturalContentStore, StoreError};
use crate::models::{CulturalContext, EducationalContent};
use crate::types::{EducationLevel, Language};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

/// Store backed by a SQLite database
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and ensure the schema
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        info!(url, "SQLite content store ready");
        Ok(store)
    }

    /// Private in-memory database
    ///
    /// Limited to one connection; each connection would otherwise see its
    /// own empty database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cultural_contexts (
                artwork_id TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                expert_validated INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS educational_contents (
                artwork_id TEXT PRIMARY KEY,
                content_id TEXT NOT NULL,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("Content store schema ensured");
        Ok(())
    }

    async fn load_content(
        &self,
        artwork_id: &str,
    ) -> Result<Option<EducationalContent>, StoreError> {
        let row = sqlx::query("SELECT payload FROM educational_contents WHERE artwork_id = ?")
            .bind(artwork_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let payload: String = row.try_get("payload")?;
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CulturalContentStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_cultural_context(
        &self,
        artwork_id: &str,
    ) -> Result<Option<CulturalContext>, StoreError> {
        let row = sqlx::query("SELECT payload FROM cultural_contexts WHERE artwork_id = ?")
            .bind(artwork_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let payload: String = row.try_get("payload")?;
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }

    async fn store_cultural_context(
        &self,
        context: &CulturalContext,
    ) -> Result<CulturalContext, StoreError> {
        let existing = self
            .fetch_cultural_context(&context.artwork_id)
            .await?
            .map(|c| c.created_at);
        let stamped = stamp_context(context, existing);
        let payload = serde_json::to_string(&stamped)?;

        sqlx::query(
            r#"
            INSERT INTO cultural_contexts (artwork_id, payload, expert_validated, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(artwork_id) DO UPDATE SET
                payload = excluded.payload,
                expert_validated = excluded.expert_validated,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&stamped.artwork_id)
        .bind(payload)
        .bind(stamped.expert_validated)
        .bind(stamped.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(artwork_id = %stamped.artwork_id, "Stored cultural context");
        Ok(stamped)
    }

    async fn list_cultural_contexts(&self) -> Result<Vec<CulturalContext>, StoreError> {
        let rows = sqlx::query("SELECT payload FROM cultural_contexts ORDER BY artwork_id")
            .fetch_all(&self.pool)
            .await?;

        let mut contexts = Vec::with_capacity(rows.len());
        for row in rows {
            let payload: String = row.try_get("payload")?;
            contexts.push(serde_json::from_str(&payload)?);
        }
        Ok(contexts)
    }

    async fn fetch_educational_content(
        &self,
        artwork_id: &str,
        level: Option<EducationLevel>,
        language: Option<Language>,
    ) -> Result<Option<EducationalContent>, StoreError> {
        Ok(self
            .load_content(artwork_id)
            .await?
            .and_then(|c| select_content(c, level, language)))
    }

    async fn store_educational_content(
        &self,
        content: &EducationalContent,
    ) -> Result<EducationalContent, StoreError> {
        let existing = self
            .load_content(&content.artwork_id)
            .await?
            .map(|c| c.created_at);
        let stamped = stamp_content(content, existing);
        let payload = serde_json::to_string(&stamped)?;

        sqlx::query(
            r#"
            INSERT INTO educational_contents (artwork_id, content_id, payload, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(artwork_id) DO UPDATE SET
                content_id = excluded.content_id,
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&stamped.artwork_id)
        .bind(stamped.id.to_string())
        .bind(payload)
        .bind(stamped.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(
            artwork_id = %stamped.artwork_id,
            content_id = %stamped.id,
            "Stored educational content"
        );
        Ok(stamped)
    }
}
