//! Shared test doubles and pipeline builders
#![allow(dead_code)]

use async_trait::async_trait;
use gallery_ai::config::AiConfig;
use gallery_ai::knowledge::CulturalKnowledgeBase;
use gallery_ai::models::Artwork;
use gallery_ai::store::{CulturalContentStore, MemoryStore};
use gallery_ai::types::{
    ExtractionError, OcrOutput, OcrProvider, VisualFeatureExtractor, VisualFeatures,
};
use gallery_ai::GalleryPipeline;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Feature extractor returning a fixed vector and counting calls
pub struct CountingExtractor {
    features: VisualFeatures,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn new(features: VisualFeatures) -> Self {
        Self {
            features,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Extractor matching a knowledge-base style exactly
    pub fn for_style(style: &str) -> Self {
        let knowledge = CulturalKnowledgeBase::new();
        let info = knowledge
            .get_style_information(style)
            .unwrap_or_else(|| panic!("unknown style {}", style));
        Self::new(info.expected_features.representative())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisualFeatureExtractor for CountingExtractor {
    fn name(&self) -> &'static str {
        "CountingExtractor"
    }

    async fn extract_features(&self, _image_ref: &str) -> Result<VisualFeatures, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.features)
    }
}

/// Extractor that always fails
pub struct FailingExtractor;

#[async_trait]
impl VisualFeatureExtractor for FailingExtractor {
    fn name(&self) -> &'static str {
        "FailingExtractor"
    }

    async fn extract_features(&self, _image_ref: &str) -> Result<VisualFeatures, ExtractionError> {
        Err(ExtractionError::NotAvailable("vision backend offline".to_string()))
    }
}

/// OCR returning fixed text and counting calls
pub struct FixedOcr {
    text: String,
    calls: AtomicUsize,
}

impl FixedOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrProvider for FixedOcr {
    fn name(&self) -> &'static str {
        "FixedOcr"
    }

    async fn extract_text(&self, _image_ref: &str) -> Result<OcrOutput, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OcrOutput {
            text: self.text.clone(),
            character_confidences: None,
        })
    }
}

/// Default config without the bulk batch delay
pub fn test_config() -> AiConfig {
    let mut config = AiConfig::default();
    config.batch_delay = Duration::ZERO;
    config
}

/// Pipeline over an in-memory store with the given doubles
pub fn pipeline_with(
    store: Arc<dyn CulturalContentStore>,
    extractor: Arc<dyn VisualFeatureExtractor>,
    ocr: Arc<dyn OcrProvider>,
) -> GalleryPipeline {
    GalleryPipeline::build_with(&test_config(), store, extractor, ocr)
}

/// Kaishu pipeline built from a caller-adjusted config
pub fn kaishu_pipeline_with_config(config: &AiConfig) -> GalleryPipeline {
    GalleryPipeline::build_with(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(CountingExtractor::for_style("kaishu")),
        Arc::new(FixedOcr::new("和氣致祥")),
    )
}

/// Kaishu pipeline reading "和氣致祥" over a fresh memory store
pub fn kaishu_pipeline() -> GalleryPipeline {
    pipeline_with(
        Arc::new(MemoryStore::new()),
        Arc::new(CountingExtractor::for_style("kaishu")),
        Arc::new(FixedOcr::new("和氣致祥")),
    )
}

pub fn artwork(id: &str) -> Artwork {
    Artwork::new(id, format!("Artwork {}", id), format!("img://{}", id)).with_year(1600)
}
