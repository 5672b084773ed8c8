//! gallery-ai library interface
//!
//! Cultural analysis pipeline for calligraphy artworks: style
//! classification, text recognition, knowledge-base context, quality
//! validation, multilingual educational content, and the services that
//! cache and persist the results.
//!
//! `GalleryPipeline` wires every component once from an `AiConfig`; each
//! cache is created here and injected into the component that owns it.

pub mod adaptation;
pub mod cache;
pub mod config;
pub mod education;
pub mod error;
pub mod extractors;
pub mod knowledge;
pub mod models;
pub mod services;
pub mod store;
pub mod types;
pub mod validators;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use crate::adaptation::MultilingualContentAdapter;
use crate::cache::MemoCache;
use crate::config::{AiConfig, StoreSelection};
use crate::education::EducationalContentGenerator;
use crate::extractors::{
    HeuristicFeatureExtractor, PhrasePoolOcr, StyleClassifier, TextRecognitionEngine,
};
use crate::knowledge::CulturalKnowledgeBase;
use crate::services::{CulturalMetadataService, EducationalContentService};
use crate::store::{AirtableStore, CulturalContentStore, MemoryStore, SqliteStore};
use crate::types::{OcrProvider, VisualFeatureExtractor};
use crate::validators::QualityValidator;
use crate::workflow::CulturalAnalysisEngine;
use gallery_common::events::EventBus;
use gallery_common::Result;
use std::sync::Arc;
use tracing::info;

/// Event bus capacity for analysis progress
pub const EVENT_CAPACITY: usize = 100;

/// Fully wired pipeline
#[derive(Clone)]
pub struct GalleryPipeline {
    pub knowledge: Arc<CulturalKnowledgeBase>,
    pub classifier: Arc<StyleClassifier>,
    pub recognizer: Arc<TextRecognitionEngine>,
    pub adapter: Arc<MultilingualContentAdapter>,
    pub validator: Arc<QualityValidator>,
    pub engine: Arc<CulturalAnalysisEngine>,
    pub generator: Arc<EducationalContentGenerator>,
    pub metadata: Arc<CulturalMetadataService>,
    pub content: Arc<EducationalContentService>,
    pub store: Arc<dyn CulturalContentStore>,
    pub events: EventBus,
}

impl GalleryPipeline {
    /// Wire the pipeline with the shipped heuristic extractors
    pub fn build(config: &AiConfig, store: Arc<dyn CulturalContentStore>) -> Self {
        Self::build_with(
            config,
            store,
            Arc::new(HeuristicFeatureExtractor::new()),
            Arc::new(PhrasePoolOcr::new()),
        )
    }

    /// Wire the pipeline around caller-supplied image capabilities
    pub fn build_with(
        config: &AiConfig,
        store: Arc<dyn CulturalContentStore>,
        extractor: Arc<dyn VisualFeatureExtractor>,
        ocr: Arc<dyn OcrProvider>,
    ) -> Self {
        let caches = &config.cache;
        let events = EventBus::new(EVENT_CAPACITY);
        let knowledge = Arc::new(CulturalKnowledgeBase::new());

        let classifier = Arc::new(StyleClassifier::new(
            extractor,
            &knowledge,
            Arc::new(MemoCache::new(caches.classifier_capacity)),
        ));
        let recognizer = Arc::new(TextRecognitionEngine::new(
            ocr,
            Arc::new(MemoCache::new(caches.recognizer_capacity)),
        ));
        let adapter = Arc::new(MultilingualContentAdapter::new(
            knowledge.clone(),
            Arc::new(MemoCache::new(caches.adapter_capacity)),
        ));
        let validator = Arc::new(
            QualityValidator::new(
                knowledge.clone(),
                Arc::new(MemoCache::new(caches.validator_capacity)),
            )
            .with_thresholds(config.thresholds)
            .with_weights(config.weights),
        );
        let engine = Arc::new(
            CulturalAnalysisEngine::new(
                classifier.clone(),
                recognizer.clone(),
                knowledge.clone(),
                validator.clone(),
                events.clone(),
            )
            .with_status_retention(config.status_retention()),
        );
        let generator = Arc::new(EducationalContentGenerator::new(
            adapter.clone(),
            knowledge.clone(),
        ));

        let metadata = Arc::new(
            CulturalMetadataService::new(
                engine.clone(),
                store.clone(),
                Arc::new(MemoCache::with_ttl(caches.metadata_capacity, config.metadata_ttl())),
            )
            .with_batching(config.batch_size, config.batch_delay),
        );
        let content = Arc::new(
            EducationalContentService::new(
                generator.clone(),
                store.clone(),
                Arc::new(MemoCache::with_ttl(caches.content_capacity, config.content_ttl())),
                events.clone(),
            )
            .with_staleness(config.staleness, config.min_effectiveness),
        );

        info!(store = store.name(), "Gallery pipeline ready");

        Self {
            knowledge,
            classifier,
            recognizer,
            adapter,
            validator,
            engine,
            generator,
            metadata,
            content,
            store,
            events,
        }
    }

    /// Drop every memoised result
    pub async fn clear_caches(&self) {
        self.classifier.clear_cache().await;
        self.recognizer.clear_cache().await;
        self.adapter.clear_cache().await;
        self.validator.clear_cache().await;
        self.metadata.clear_cache().await;
        self.content.clear_cache().await;
    }
}

/// Open the content store named by the configuration
pub async fn open_store(selection: &StoreSelection) -> Result<Arc<dyn CulturalContentStore>> {
    let store: Arc<dyn CulturalContentStore> = match selection {
        StoreSelection::Airtable(config) => Arc::new(AirtableStore::new(config.clone())?),
        StoreSelection::Sqlite(url) => Arc::new(SqliteStore::connect(url).await?),
        StoreSelection::Memory => Arc::new(MemoryStore::new()),
    };
    info!(store = store.name(), "Content store opened");
    Ok(store)
}
