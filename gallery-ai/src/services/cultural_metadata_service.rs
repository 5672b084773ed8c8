//! Cultural Metadata Service
//!
//! Resolves the cultural context of an artwork from the memo cache, then the
//! content store, and only then by running a full analysis. New analyses are
//! persisted before they are returned. Concurrent requests for the same
//! artwork share one analysis.
//!
//! Bulk generation runs fixed-size batches, concurrent within a batch, with
//! a delay between batches to spare the external CMS.

use super::inflight::InflightRequests;
use crate::cache::MemoCache;
use crate::models::{AnalysisRequest, AnalysisStage, Artwork, CulturalContext};
use crate::store::CulturalContentStore;
use crate::types::{EducationLevel, FailureContract, FailurePolicy};
use crate::workflow::CulturalAnalysisEngine;
use futures::future::join_all;
use futures::FutureExt;
use gallery_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1000);

/// Options for a metadata lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataOptions {
    /// Skip cache and store, always run a new analysis
    pub force_refresh: bool,
    /// Stages to run when analysing; all stages when `None`
    pub stages: Option<Vec<AnalysisStage>>,
}

/// Search filter over stored cultural contexts
///
/// Every set criterion must match. String comparisons ignore case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CulturalSearchCriteria {
    pub style: Option<String>,
    pub period: Option<String>,
    pub concept: Option<String>,
    pub tag: Option<String>,
    pub min_significance: Option<f64>,
    pub recommended_level: Option<EducationLevel>,
}

impl CulturalSearchCriteria {
    pub fn matches(&self, context: &CulturalContext) -> bool {
        let metadata = &context.metadata;
        let same = |want: &Option<String>, have: Option<&str>| match want {
            Some(want) => have.is_some_and(|h| h.eq_ignore_ascii_case(want)),
            None => true,
        };
        let any = |want: &Option<String>, have: &[String]| match want {
            Some(want) => have.iter().any(|h| h.eq_ignore_ascii_case(want)),
            None => true,
        };

        same(&self.style, metadata.primary_style.as_deref())
            && same(&self.period, metadata.period.as_deref())
            && any(&self.concept, &metadata.concepts)
            && any(&self.tag, &metadata.tags)
            && self
                .min_significance
                .map_or(true, |min| metadata.cultural_significance >= min)
            && self
                .recommended_level
                .map_or(true, |level| metadata.recommended_level == level)
    }
}

/// Artwork that could not be processed in a bulk run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub artwork_id: String,
    pub code: String,
    pub message: String,
}

/// Outcome of a bulk run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkGenerationReport {
    pub succeeded: Vec<CulturalContext>,
    pub failed: Vec<BulkFailure>,
    pub batches: usize,
}

pub struct CulturalMetadataService {
    engine: Arc<CulturalAnalysisEngine>,
    store: Arc<dyn CulturalContentStore>,
    cache: Arc<MemoCache<String, CulturalContext>>,
    inflight: InflightRequests<CulturalContext>,
    batch_size: usize,
    batch_delay: Duration,
}

impl CulturalMetadataService {
    pub fn new(
        engine: Arc<CulturalAnalysisEngine>,
        store: Arc<dyn CulturalContentStore>,
        cache: Arc<MemoCache<String, CulturalContext>>,
    ) -> Self {
        Self {
            engine,
            store,
            cache,
            inflight: InflightRequests::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    /// Batch size (minimum 1) and delay for bulk runs
    pub fn with_batching(mut self, batch_size: usize, batch_delay: Duration) -> Self {
        self.batch_size = batch_size.max(1);
        self.batch_delay = batch_delay;
        self
    }

    /// Cultural context of an artwork, analysing it if nothing is known yet
    pub async fn get_cultural_metadata(
        &self,
        artwork: &Artwork,
        options: &MetadataOptions,
    ) -> Result<CulturalContext> {
        if !options.force_refresh {
            if let Some(context) = self.cache.get(&artwork.id).await {
                debug!(artwork_id = %artwork.id, "Cultural metadata cache hit");
                return Ok(context);
            }

            let stored = self
                .store
                .fetch_cultural_context(&artwork.id)
                .await
                .map_err(|e| {
                    error!(
                        artwork_id = %artwork.id,
                        store = self.store.name(),
                        error = %e,
                        "Fetch cultural context failed"
                    );
                    Error::from(e)
                })?;
            if let Some(context) = stored {
                self.cache.insert(artwork.id.clone(), context.clone()).await;
                return Ok(context);
            }
        }

        let mut request = AnalysisRequest::new(artwork.clone());
        if let Some(stages) = &options.stages {
            request = request.with_stages(stages.clone());
        }
        let key = analysis_key(&request);
        let engine = self.engine.clone();
        let store = self.store.clone();

        let result = self
            .inflight
            .run(&key, move || {
                async move {
                    let analysis = engine.perform_cultural_analysis(request).await?;
                    let context = CulturalContext::from_analysis(analysis);
                    let stored = store.store_cultural_context(&context).await?;
                    Ok::<_, Error>(stored)
                }
                .boxed()
            })
            .await;

        match result {
            Ok(context) => {
                self.cache.insert(artwork.id.clone(), context.clone()).await;
                info!(
                    artwork_id = %artwork.id,
                    significance = context.metadata.cultural_significance,
                    level = %context.metadata.recommended_level,
                    "Cultural metadata generated"
                );
                Ok(context)
            }
            Err(e) => {
                error!(
                    artwork_id = %artwork.id,
                    code = e.code(),
                    error = %e,
                    "Cultural metadata generation failed"
                );
                Err(e)
            }
        }
    }

    /// Resolve metadata for many artworks, reporting failures per artwork
    pub async fn bulk_generate_cultural_metadata(
        &self,
        artworks: &[Artwork],
    ) -> BulkGenerationReport {
        let options = MetadataOptions::default();
        let mut report = BulkGenerationReport::default();

        for (index, batch) in artworks.chunks(self.batch_size).enumerate() {
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            let results =
                join_all(batch.iter().map(|a| self.get_cultural_metadata(a, &options))).await;
            for (artwork, result) in batch.iter().zip(results) {
                match result {
                    Ok(context) => report.succeeded.push(context),
                    Err(e) => {
                        warn!(artwork_id = %artwork.id, error = %e, "Bulk metadata item failed");
                        report.failed.push(BulkFailure {
                            artwork_id: artwork.id.clone(),
                            code: e.code().to_string(),
                            message: e.message().to_string(),
                        });
                    }
                }
            }
            report.batches += 1;
            debug!(batch = index + 1, size = batch.len(), "Bulk metadata batch finished");
        }

        info!(
            total = artworks.len(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            batches = report.batches,
            "Bulk metadata generation finished"
        );
        report
    }

    /// Stored contexts matching `criteria`, most significant first
    pub async fn search_artworks_by_cultural_criteria(
        &self,
        criteria: &CulturalSearchCriteria,
    ) -> Result<Vec<CulturalContext>> {
        let contexts = self.store.list_cultural_contexts().await.map_err(|e| {
            error!(store = self.store.name(), error = %e, "List cultural contexts failed");
            Error::from(e)
        })?;

        let mut matches: Vec<CulturalContext> =
            contexts.into_iter().filter(|c| criteria.matches(c)).collect();
        matches.sort_by(|a, b| {
            b.metadata
                .cultural_significance
                .total_cmp(&a.metadata.cultural_significance)
                .then_with(|| a.artwork_id.cmp(&b.artwork_id))
        });
        Ok(matches)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

impl FailureContract for CulturalMetadataService {
    fn name(&self) -> &'static str {
        "cultural-metadata-service"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::FailsRequest
    }
}

fn analysis_key(request: &AnalysisRequest) -> String {
    let mut stages: Vec<&str> = request.included_analysis.iter().map(|s| s.algorithm()).collect();
    stages.sort_unstable();
    stages.dedup();
    format!("{}:{}", request.artwork.id, stages.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CulturalAnalysisResult, CulturalMetadata};
    use chrono::Utc;
    use uuid::Uuid;

    fn context(id: &str, style: &str, significance: f64) -> CulturalContext {
        let now = Utc::now();
        CulturalContext {
            artwork_id: id.to_string(),
            analysis: CulturalAnalysisResult::new(Uuid::new_v4(), id),
            metadata: CulturalMetadata {
                tags: vec![style.to_string(), "harmony".to_string()],
                recommended_level: EducationLevel::for_significance(significance),
                cultural_significance: significance,
                primary_style: Some(style.to_string()),
                period: Some("joseon".to_string()),
                concepts: vec!["harmony".to_string()],
                primary_language: None,
            },
            expert_validated: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        assert!(CulturalSearchCriteria::default().matches(&context("a1", "kaishu", 2.0)));
    }

    #[test]
    fn test_criteria_combine() {
        let criteria = CulturalSearchCriteria {
            style: Some("KAISHU".into()),
            concept: Some("harmony".into()),
            min_significance: Some(6.0),
            ..Default::default()
        };
        assert!(criteria.matches(&context("a1", "kaishu", 7.0)));
        assert!(!criteria.matches(&context("a2", "kaishu", 5.0)));
        assert!(!criteria.matches(&context("a3", "xingshu", 7.0)));
    }

    #[test]
    fn test_recommended_level_criterion() {
        let criteria = CulturalSearchCriteria {
            recommended_level: Some(EducationLevel::Expert),
            ..Default::default()
        };
        assert!(criteria.matches(&context("a1", "kaishu", 8.5)));
        assert!(!criteria.matches(&context("a2", "kaishu", 7.5)));
    }

    #[test]
    fn test_analysis_key_ignores_stage_order() {
        let artwork = Artwork::new("a1", "Scroll", "img://a1");
        let a = AnalysisRequest::new(artwork.clone())
            .with_stages(vec![AnalysisStage::Visual, AnalysisStage::Textual]);
        let b = AnalysisRequest::new(artwork)
            .with_stages(vec![AnalysisStage::Textual, AnalysisStage::Visual]);
        assert_eq!(analysis_key(&a), analysis_key(&b));
    }
}
