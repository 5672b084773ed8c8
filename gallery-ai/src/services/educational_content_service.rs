//! Educational Content Service
//!
//! Read path: memo cache, then the content store. Stale content (too old or
//! below the effectiveness floor) is never served. A miss returns `None`;
//! generation only happens on an explicit `generate_educational_content`.
//!
//! Concurrent generations for the same (artwork, levels, languages) share a
//! single run of the generator.

use super::inflight::InflightRequests;
use crate::cache::MemoCache;
use crate::education::EducationalContentGenerator;
use crate::models::{EducationRequest, EducationalContent};
use crate::store::CulturalContentStore;
use crate::types::{EducationLevel, FailureContract, FailurePolicy, Language};
use chrono::{DateTime, Duration, Utc};
use futures::FutureExt;
use gallery_common::{Error, EventBus, GalleryEvent, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Default age after which stored content is regenerated
pub const DEFAULT_STALENESS_DAYS: i64 = 30;
/// Default effectiveness below which stored content is regenerated
pub const DEFAULT_MIN_EFFECTIVENESS: f64 = 0.7;

/// Optional restrictions on a content lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentQuery {
    pub level: Option<EducationLevel>,
    pub language: Option<Language>,
}

impl ContentQuery {
    fn cache_key(&self, artwork_id: &str) -> String {
        format!(
            "{}:{}:{}",
            artwork_id,
            self.level.map_or("all", |l| l.as_str()),
            self.language.map_or("all", |l| l.as_str())
        )
    }
}

pub struct EducationalContentService {
    generator: Arc<EducationalContentGenerator>,
    store: Arc<dyn CulturalContentStore>,
    cache: Arc<MemoCache<String, EducationalContent>>,
    inflight: InflightRequests<EducationalContent>,
    events: EventBus,
    staleness: Duration,
    min_effectiveness: f64,
}

impl EducationalContentService {
    pub fn new(
        generator: Arc<EducationalContentGenerator>,
        store: Arc<dyn CulturalContentStore>,
        cache: Arc<MemoCache<String, EducationalContent>>,
        events: EventBus,
    ) -> Self {
        Self {
            generator,
            store,
            cache,
            inflight: InflightRequests::new(),
            events,
            staleness: Duration::days(DEFAULT_STALENESS_DAYS),
            min_effectiveness: DEFAULT_MIN_EFFECTIVENESS,
        }
    }

    pub fn with_staleness(mut self, staleness: Duration, min_effectiveness: f64) -> Self {
        self.staleness = staleness;
        self.min_effectiveness = min_effectiveness;
        self
    }

    /// Cached or persisted content for an artwork, `None` when there is none
    pub async fn get_educational_content(
        &self,
        artwork_id: &str,
        query: &ContentQuery,
    ) -> Result<Option<EducationalContent>> {
        let key = query.cache_key(artwork_id);
        if let Some(content) = self.cache.get(&key).await {
            if !self.is_stale(&content) {
                debug!(artwork_id, "Educational content cache hit");
                return Ok(Some(content));
            }
            self.cache.remove(&key).await;
        }

        let stored = self
            .store
            .fetch_educational_content(artwork_id, query.level, query.language)
            .await
            .map_err(|e| {
                error!(
                    artwork_id,
                    store = self.store.name(),
                    error = %e,
                    "Fetch educational content failed"
                );
                Error::from(e)
            })?;

        match stored {
            Some(content) if self.is_stale(&content) => {
                debug!(artwork_id, content_id = %content.id, "Stored educational content is stale");
                Ok(None)
            }
            Some(content) => {
                self.cache.insert(key, content.clone()).await;
                Ok(Some(content))
            }
            None => Ok(None),
        }
    }

    /// Generate, persist and cache content for a request
    pub async fn generate_educational_content(
        &self,
        request: EducationRequest,
    ) -> Result<EducationalContent> {
        let key = request.dedup_key();
        let artwork_id = request.artwork.id.clone();
        let generator = self.generator.clone();
        let store = self.store.clone();
        let events = self.events.clone();

        let result = self
            .inflight
            .run(&key, move || {
                async move {
                    let content = generator.generate_educational_content(&request).await?;
                    let stored = store.store_educational_content(&content).await?;
                    events.emit_lossy(GalleryEvent::EducationalContentGenerated {
                        artwork_id: stored.artwork_id.clone(),
                        content_id: stored.id,
                        timestamp: Utc::now(),
                    });
                    Ok::<_, Error>(stored)
                }
                .boxed()
            })
            .await;

        match result {
            Ok(content) => {
                self.cache
                    .insert(ContentQuery::default().cache_key(&artwork_id), content.clone())
                    .await;
                info!(artwork_id, content_id = %content.id, "Educational content ready");
                Ok(content)
            }
            Err(e) => {
                error!(
                    artwork_id,
                    code = e.code(),
                    error = %e,
                    "Educational content generation failed"
                );
                Err(e)
            }
        }
    }

    /// True when content should be regenerated rather than served
    pub fn is_stale(&self, content: &EducationalContent) -> bool {
        self.is_stale_at(content, Utc::now())
    }

    pub fn is_stale_at(&self, content: &EducationalContent, now: DateTime<Utc>) -> bool {
        now - content.updated_at > self.staleness
            || content.quality_metrics.effectiveness < self.min_effectiveness
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

impl FailureContract for EducationalContentService {
    fn name(&self) -> &'static str {
        "educational-content-service"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::FailsRequest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::MultilingualContentAdapter;
    use crate::knowledge::CulturalKnowledgeBase;
    use crate::models::{Artwork, CulturalAnalysisResult};
    use crate::store::MemoryStore;
    use uuid::Uuid;

    fn service(store: Arc<MemoryStore>) -> EducationalContentService {
        let knowledge = Arc::new(CulturalKnowledgeBase::new());
        let adapter = Arc::new(MultilingualContentAdapter::new(
            knowledge.clone(),
            Arc::new(MemoCache::new(256)),
        ));
        let generator = Arc::new(EducationalContentGenerator::new(adapter, knowledge));
        EducationalContentService::new(
            generator,
            store,
            Arc::new(MemoCache::new(16)),
            EventBus::new(16),
        )
    }

    fn request() -> EducationRequest {
        EducationRequest {
            artwork: Artwork::new("a1", "Scroll", "img://a1"),
            analysis: CulturalAnalysisResult::new(Uuid::new_v4(), "a1"),
            levels: vec![EducationLevel::Beginner],
            languages: vec![Language::Korean, Language::English],
        }
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let service = service(Arc::new(MemoryStore::new()));
        let content = service
            .get_educational_content("missing", &ContentQuery::default())
            .await
            .unwrap();
        assert!(content.is_none());
    }

    #[tokio::test]
    async fn test_generated_content_is_served() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());
        let generated = service.generate_educational_content(request()).await.unwrap();

        service.clear_cache().await;
        let fetched = service
            .get_educational_content("a1", &ContentQuery::default())
            .await
            .unwrap()
            .unwrap();
        assert!(fetched.same_content(&generated));
    }

    #[tokio::test]
    async fn test_staleness() {
        let service = service(Arc::new(MemoryStore::new()));
        let mut content = service.generate_educational_content(request()).await.unwrap();
        let now = Utc::now();

        assert!(!service.is_stale_at(&content, now));
        assert!(service.is_stale_at(&content, now + Duration::days(31)));

        content.quality_metrics.effectiveness = 0.5;
        assert!(service.is_stale_at(&content, now));
    }

    #[tokio::test]
    async fn test_generation_error_propagates() {
        let service = service(Arc::new(MemoryStore::new()));
        let mut bad = request();
        bad.levels.clear();
        let err = service.generate_educational_content(bad).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
