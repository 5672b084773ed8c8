//! Cultural content persistence
//!
//! The external CMS is reached through `CulturalContentStore`. Three
//! implementations ship:
//! - `AirtableStore`: the production CMS over its REST API
//! - `SqliteStore`: local persistence for offline runs
//! - `MemoryStore`: in-process maps for tests and demos
//!
//! Every store stamps `updated_at` with the current time on write and keeps
//! the original `created_at` of a record it overwrites.

pub mod airtable;
pub mod memory;
pub mod sqlite;

pub use airtable::{AirtableConfig, AirtableStore};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::models::{CulturalContext, EducationalContent};
use crate::types::{EducationLevel, Language};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store not configured: {0}")]
    NotConfigured(String),
}

impl From<StoreError> for gallery_common::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Serialization(e) => {
                gallery_common::Error::Internal(format!("store payload: {}", e))
            }
            StoreError::NotConfigured(msg) => gallery_common::Error::Config(msg),
            other => gallery_common::Error::Upstream(other.to_string()),
        }
    }
}

/// Persistence collaborator for analyses and educational content
#[async_trait]
pub trait CulturalContentStore: Send + Sync {
    /// Store name (for logging)
    fn name(&self) -> &'static str;

    async fn fetch_cultural_context(
        &self,
        artwork_id: &str,
    ) -> Result<Option<CulturalContext>, StoreError>;

    /// Insert or replace the context of an artwork, returning the stamped record
    async fn store_cultural_context(
        &self,
        context: &CulturalContext,
    ) -> Result<CulturalContext, StoreError>;

    async fn list_cultural_contexts(&self) -> Result<Vec<CulturalContext>, StoreError>;

    /// Latest content of an artwork, restricted to `level` and `language` when given
    async fn fetch_educational_content(
        &self,
        artwork_id: &str,
        level: Option<EducationLevel>,
        language: Option<Language>,
    ) -> Result<Option<EducationalContent>, StoreError>;

    /// Insert or replace the content of an artwork, returning the stamped record
    async fn store_educational_content(
        &self,
        content: &EducationalContent,
    ) -> Result<EducationalContent, StoreError>;
}

/// Apply level and language restrictions to stored content
///
/// Korean and english are always available, other languages only when the
/// content was generated for them.
pub fn select_content(
    content: EducationalContent,
    level: Option<EducationLevel>,
    language: Option<Language>,
) -> Option<EducationalContent> {
    if let Some(language) = language {
        let always = matches!(language, Language::Korean | Language::English);
        if !always && !content.languages.contains(&language) {
            return None;
        }
    }
    match level {
        Some(level) => content.restricted_to(level),
        None => Some(content),
    }
}

pub(crate) fn stamp_context(
    context: &CulturalContext,
    existing_created: Option<DateTime<Utc>>,
) -> CulturalContext {
    let now = Utc::now();
    let mut stamped = context.clone();
    stamped.created_at = existing_created.unwrap_or(now);
    stamped.updated_at = now;
    stamped
}

pub(crate) fn stamp_content(
    content: &EducationalContent,
    existing_created: Option<DateTime<Utc>>,
) -> EducationalContent {
    let now = Utc::now();
    let mut stamped = content.clone();
    stamped.created_at = existing_created.unwrap_or(now);
    stamped.updated_at = now;
    stamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::education::{ContentQualityMetrics, LevelContent};
    use crate::types::MultiLanguageText;
    use uuid::Uuid;

    fn content() -> EducationalContent {
        let level = |level| LevelContent {
            level,
            introduction: MultiLanguageText::single(Language::Korean, "소개"),
            key_terms: vec![],
            sections: vec![],
            cultural_context: vec![],
            practical_exercises: None,
            quiz: vec![],
            estimated_minutes: level.study_minutes(),
        };
        let now = Utc::now();
        EducationalContent {
            id: Uuid::new_v4(),
            artwork_id: "a1".into(),
            languages: vec![Language::Japanese],
            learning_objectives: vec![],
            level_content: vec![level(EducationLevel::Beginner), level(EducationLevel::Expert)],
            assessment_criteria: vec![],
            interactive_elements: vec![],
            visual_aids: vec![],
            progression_path: vec![],
            quality_metrics: ContentQualityMetrics {
                effectiveness: 0.85,
                cultural_accuracy: 0.9,
                engagement: 0.8,
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_select_content_by_level() {
        let selected = select_content(content(), Some(EducationLevel::Expert), None).unwrap();
        assert_eq!(selected.level_content.len(), 1);
        assert!(select_content(content(), Some(EducationLevel::Advanced), None).is_none());
    }

    #[test]
    fn test_select_content_by_language() {
        assert!(select_content(content(), None, Some(Language::English)).is_some());
        assert!(select_content(content(), None, Some(Language::Japanese)).is_some());
        assert!(select_content(content(), None, Some(Language::Chinese)).is_none());
    }

    #[test]
    fn test_store_error_kinds() {
        let err: gallery_common::Error = StoreError::Status {
            status: 503,
            body: "busy".into(),
        }
        .into();
        assert_eq!(err.code(), "UPSTREAM_ERROR");

        let err: gallery_common::Error = StoreError::NotConfigured("airtable base".into()).into();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
