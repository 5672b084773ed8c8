//! In-process content store

use super::{select_content, stamp_content, stamp_context, CulturalContentStore, StoreError};
use crate::models::{CulturalContext, EducationalContent};
use crate::types::{EducationLevel, Language};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Store backed by in-memory maps keyed by artwork id
#[derive(Default)]
pub struct MemoryStore {
    contexts: RwLock<HashMap<String, CulturalContext>>,
    contents: RwLock<HashMap<String, EducationalContent>>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`, to mimic a remote CMS
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CulturalContentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_cultural_context(
        &self,
        artwork_id: &str,
    ) -> Result<Option<CulturalContext>, StoreError> {
        self.simulate_latency().await;
        Ok(self.contexts.read().await.get(artwork_id).cloned())
    }

    async fn store_cultural_context(
        &self,
        context: &CulturalContext,
    ) -> Result<CulturalContext, StoreError> {
        self.simulate_latency().await;
        let mut contexts = self.contexts.write().await;
        let existing = contexts.get(&context.artwork_id).map(|c| c.created_at);
        let stamped = stamp_context(context, existing);
        contexts.insert(stamped.artwork_id.clone(), stamped.clone());
        Ok(stamped)
    }

    async fn list_cultural_contexts(&self) -> Result<Vec<CulturalContext>, StoreError> {
        self.simulate_latency().await;
        let mut contexts: Vec<CulturalContext> =
            self.contexts.read().await.values().cloned().collect();
        contexts.sort_by(|a, b| a.artwork_id.cmp(&b.artwork_id));
        Ok(contexts)
    }

    async fn fetch_educational_content(
        &self,
        artwork_id: &str,
        level: Option<EducationLevel>,
        language: Option<Language>,
    ) -> Result<Option<EducationalContent>, StoreError> {
        self.simulate_latency().await;
        let content = self.contents.read().await.get(artwork_id).cloned();
        Ok(content.and_then(|c| select_content(c, level, language)))
    }

    async fn store_educational_content(
        &self,
        content: &EducationalContent,
    ) -> Result<EducationalContent, StoreError> {
        self.simulate_latency().await;
        let mut contents = self.contents.write().await;
        let existing = contents.get(&content.artwork_id).map(|c| c.created_at);
        let stamped = stamp_content(content, existing);
        contents.insert(stamped.artwork_id.clone(), stamped.clone());
        Ok(stamped)
    }
}
