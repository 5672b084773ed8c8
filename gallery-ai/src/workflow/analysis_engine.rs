//! Cultural Analysis Engine
//!
//! Orchestrates the per-artwork analysis pipeline.
//!
//! # Stages
//! - **Visual** (15%): style classification
//! - **Textual** (30%): text recognition, phrase and concept lookup
//! - **Cultural** (50%): knowledge-base context and significance
//! - **Historical** (70%): period attribution
//! - **Philosophical** (85%): concept interpretation
//! - **Validation** (95%): quality scores fill confidence, accuracy and depth
//!
//! Only stages named in the request run; each successful stage records its
//! algorithm identifier.
//!
//! # Error Handling
//! Fails the request: any stage error marks the status failed with the error
//! message, publishes `AnalysisFailed` and is returned to the caller.
//! Cancellation is checked at stage boundaries; a running stage is never
//! interrupted. A cancel that lands after the last boundary still wins: the
//! run returns the cancellation error instead of its result.
//!
//! Finished status records are pruned when a new run starts, once they are
//! older than the configured retention.

use super::status::StatusTracker;
use crate::extractors::{StyleClassifier, TextRecognitionEngine};
use crate::knowledge::CulturalKnowledgeBase;
use crate::models::analysis::{
    ConceptSummary, CulturalAnalysis, HistoricalAnalysis, PhilosophicalAnalysis, TextualAnalysis,
    VisualAnalysis,
};
use crate::models::{AnalysisRequest, AnalysisStage, AnalysisStatus, CulturalAnalysisResult};
use crate::types::{FailureContract, FailurePolicy, Language};
use crate::validators::QualityValidator;
use chrono::{Datelike, Duration, Utc};
use gallery_common::{Error, EventBus, GalleryEvent, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Progress reported while quality validation runs
pub const VALIDATION_PROGRESS: u8 = 95;
const VALIDATION_STAGE: &str = "Quality validation";

const BASE_SIGNIFICANCE: f64 = 5.0;
const SIGNIFICANCE_PER_CONCEPT: f64 = 0.5;
const HIGH_STYLE_CONFIDENCE: u8 = 80;
const DEFAULT_STATUS_RETENTION_MINUTES: i64 = 60;

/// Cultural analysis engine
pub struct CulturalAnalysisEngine {
    classifier: Arc<StyleClassifier>,
    recognizer: Arc<TextRecognitionEngine>,
    knowledge: Arc<CulturalKnowledgeBase>,
    validator: Arc<QualityValidator>,
    status: StatusTracker,
    events: EventBus,
    /// Expected duration of one stage, for completion estimates
    stage_estimate: Duration,
    /// Finished status records older than this are pruned when a run starts
    status_retention: Duration,
}

impl CulturalAnalysisEngine {
    pub fn new(
        classifier: Arc<StyleClassifier>,
        recognizer: Arc<TextRecognitionEngine>,
        knowledge: Arc<CulturalKnowledgeBase>,
        validator: Arc<QualityValidator>,
        events: EventBus,
    ) -> Self {
        Self {
            classifier,
            recognizer,
            knowledge,
            validator,
            status: StatusTracker::new(),
            events,
            stage_estimate: Duration::milliseconds(500),
            status_retention: Duration::minutes(DEFAULT_STATUS_RETENTION_MINUTES),
        }
    }

    pub fn with_stage_estimate(mut self, stage_estimate: Duration) -> Self {
        self.stage_estimate = stage_estimate;
        self
    }

    pub fn with_status_retention(mut self, status_retention: Duration) -> Self {
        self.status_retention = status_retention;
        self
    }

    /// Run the requested stages under a fresh analysis id
    pub async fn perform_cultural_analysis(
        &self,
        request: AnalysisRequest,
    ) -> Result<CulturalAnalysisResult> {
        self.perform_cultural_analysis_with_id(Uuid::new_v4(), request)
            .await
    }

    /// Run the requested stages under a caller-chosen analysis id
    ///
    /// Lets the caller follow or cancel the run before it returns.
    pub async fn perform_cultural_analysis_with_id(
        &self,
        id: Uuid,
        request: AnalysisRequest,
    ) -> Result<CulturalAnalysisResult> {
        if let Err(e) = validate_request(&request) {
            error!(artwork_id = %request.artwork.id, error = %e, "Rejected analysis request");
            return Err(e);
        }

        self.status.prune(self.status_retention).await;

        let artwork_id = request.artwork.id.clone();
        let cancel_token = self.status.start(id, &artwork_id).await;
        self.events.emit_lossy(GalleryEvent::AnalysisStarted {
            analysis_id: id,
            artwork_id: artwork_id.clone(),
            timestamp: Utc::now(),
        });
        info!(
            analysis_id = %id,
            artwork_id = %artwork_id,
            stages = request.included_analysis.len(),
            "Analysis started"
        );

        let started = Instant::now();
        let mut outcome = self.run(id, &request, &cancel_token, started).await;
        // A cancel after the last stage boundary wins over completion
        if outcome.is_ok() && !self.status.complete(id).await {
            outcome = Err(cancelled());
        }

        match outcome {
            Ok(result) => {
                self.events.emit_lossy(GalleryEvent::AnalysisCompleted {
                    analysis_id: id,
                    artwork_id,
                    confidence: result.confidence,
                    processing_time_ms: result.processing_time_ms,
                    timestamp: Utc::now(),
                });
                info!(
                    analysis_id = %id,
                    confidence = result.confidence,
                    processing_time_ms = result.processing_time_ms,
                    "Analysis completed"
                );
                Ok(result)
            }
            Err(e) => {
                error!(analysis_id = %id, artwork_id = %artwork_id, error = %e, "Analysis failed");
                self.status.fail(id, e.message()).await;
                self.events.emit_lossy(GalleryEvent::AnalysisFailed {
                    analysis_id: id,
                    artwork_id,
                    message: e.message().to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    pub async fn get_analysis_status(&self, id: Uuid) -> Option<AnalysisStatus> {
        self.status.get(id).await
    }

    /// Cancel a processing analysis; `false` if unknown or already finished
    pub async fn cancel_analysis(&self, id: Uuid) -> bool {
        self.status.cancel(id).await
    }

    /// Drop finished status records older than `retention`
    pub async fn prune_statuses(&self, retention: Duration) -> usize {
        self.status.prune(retention).await
    }

    async fn run(
        &self,
        id: Uuid,
        request: &AnalysisRequest,
        cancel_token: &CancellationToken,
        started: Instant,
    ) -> Result<CulturalAnalysisResult> {
        let mut result = CulturalAnalysisResult::new(id, &request.artwork.id);
        let stages: Vec<AnalysisStage> = AnalysisStage::ALL
            .into_iter()
            .filter(|s| request.includes(*s))
            .collect();

        for (index, stage) in stages.iter().enumerate() {
            check_cancelled(cancel_token)?;
            let remaining = (stages.len() - index) as i32;
            self.report_progress(id, stage.progress(), stage.label(), remaining)
                .await;

            self.run_stage(*stage, request, &mut result).await?;
            result.algorithms.push(stage.algorithm().to_string());
            debug!(analysis_id = %id, stage = stage.label(), "Stage complete");
        }

        check_cancelled(cancel_token)?;
        self.report_progress(id, VALIDATION_PROGRESS, VALIDATION_STAGE, 1)
            .await;
        let scores = self.validator.validate_analysis(&result).await;
        result.confidence = scores.overall;
        result.cultural_accuracy = scores.cultural_accuracy;
        result.analysis_depth = scores.depth;

        check_cancelled(cancel_token)?;
        result.processing_time_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn report_progress(&self, id: Uuid, progress: u8, stage: &str, remaining_stages: i32) {
        let estimate = Utc::now() + self.stage_estimate * remaining_stages;
        self.status.update(id, progress, stage, Some(estimate)).await;
        self.events.emit_lossy(GalleryEvent::AnalysisProgress {
            analysis_id: id,
            progress,
            stage: stage.to_string(),
            timestamp: Utc::now(),
        });
    }

    async fn run_stage(
        &self,
        stage: AnalysisStage,
        request: &AnalysisRequest,
        result: &mut CulturalAnalysisResult,
    ) -> Result<()> {
        match stage {
            AnalysisStage::Visual => {
                result.visual_analysis = Some(self.visual(&request.artwork.image_url).await);
            }
            AnalysisStage::Textual => {
                result.textual_analysis = Some(self.textual(&request.artwork.image_url).await);
            }
            AnalysisStage::Cultural => {
                result.cultural_analysis = Some(self.cultural(result));
            }
            AnalysisStage::Historical => {
                result.historical_analysis = Some(self.historical(request.artwork.year, result)?);
            }
            AnalysisStage::Philosophical => {
                result.philosophical_analysis = Some(self.philosophical(result));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Stages
    // ========================================================================

    async fn visual(&self, image_ref: &str) -> VisualAnalysis {
        let classification = self.classifier.classify_style(image_ref).await;
        let style = self
            .knowledge
            .get_style_information(&classification.primary_style);

        VisualAnalysis {
            style_name: style
                .and_then(|s| s.name.get(Language::English))
                .unwrap_or(classification.primary_style.as_str())
                .to_string(),
            style_description: style.map(|s| s.description.clone()).unwrap_or_default(),
            classification,
        }
    }

    async fn textual(&self, image_ref: &str) -> TextualAnalysis {
        let recognition = self.recognizer.recognize_text(image_ref).await;
        let phrase = self.knowledge.phrase_meaning(&recognition.extracted_text);
        let detected_concepts = self
            .knowledge
            .detect_concepts(&recognition.extracted_text)
            .into_iter()
            .map(|c| c.id.clone())
            .collect();

        TextualAnalysis {
            meaning: phrase.map(|p| p.meaning.clone()),
            reading: phrase.map(|p| p.reading.clone()),
            detected_concepts,
            recognition,
        }
    }

    fn cultural(&self, result: &CulturalAnalysisResult) -> CulturalAnalysis {
        let text = result
            .textual_analysis
            .as_ref()
            .map(|t| t.recognition.extracted_text.as_str())
            .filter(|t| !t.is_empty());
        let knowledge = self
            .knowledge
            .get_cultural_context_for_artwork(result.primary_style(), None, text);

        let confident_style = result.visual_analysis.as_ref().is_some_and(|v| {
            !v.classification.fallback && v.classification.confidence >= HIGH_STYLE_CONFIDENCE
        });

        let mut significance =
            BASE_SIGNIFICANCE + SIGNIFICANCE_PER_CONCEPT * knowledge.concepts.len() as f64;
        if knowledge.phrase.is_some() {
            significance += 1.0;
        }
        if confident_style {
            significance += 1.0;
        }

        let mut symbolism: Vec<String> = knowledge
            .concepts
            .iter()
            .map(|c| english(&c.name, &c.id))
            .collect();
        if let Some(phrase) = &knowledge.phrase {
            symbolism.push(phrase.meaning.clone());
        }

        let style_name = knowledge
            .style
            .as_ref()
            .map(|s| english(&s.name, &s.id))
            .unwrap_or_else(|| "Unclassified script".to_string());
        let context_summary = if symbolism.is_empty() {
            format!("{} work without recognized cultural concepts", style_name)
        } else {
            format!("{} work expressing {}", style_name, symbolism.join(", "))
        };

        CulturalAnalysis {
            cultural_significance: significance.min(10.0),
            concepts: knowledge.concepts.into_iter().map(|c| c.id).collect(),
            symbolism,
            context_summary,
        }
    }

    fn historical(
        &self,
        year: Option<i32>,
        result: &CulturalAnalysisResult,
    ) -> Result<HistoricalAnalysis> {
        if let Some(year) = year {
            if year > Utc::now().year() {
                return Err(Error::Validation(format!(
                    "artwork year {} is in the future",
                    year
                )));
            }
        }

        let from_year = year.and_then(|y| self.knowledge.period_for_year(y));
        let from_style = || {
            result
                .primary_style()
                .and_then(|s| self.knowledge.get_style_information(s))
                .and_then(|s| s.historical_periods.first())
                .and_then(|p| self.knowledge.get_historical_period_info(p))
        };

        let Some(period) = from_year.or_else(from_style) else {
            return Ok(HistoricalAnalysis {
                period: "unknown".to_string(),
                period_name: "Unknown period".to_string(),
                date_range: String::new(),
                characteristics: Vec::new(),
                notable_artists: Vec::new(),
            });
        };

        Ok(HistoricalAnalysis {
            period: period.id.clone(),
            period_name: english(&period.name, &period.id),
            date_range: period.date_range(),
            characteristics: period.characteristics.clone(),
            notable_artists: period.notable_artists.clone(),
        })
    }

    fn philosophical(&self, result: &CulturalAnalysisResult) -> PhilosophicalAnalysis {
        let ids: Vec<String> = match (&result.cultural_analysis, &result.textual_analysis) {
            (Some(cultural), _) => cultural.concepts.clone(),
            (None, Some(textual)) => textual.detected_concepts.clone(),
            (None, None) => result
                .primary_style()
                .and_then(|s| self.knowledge.get_style_information(s))
                .map(|s| s.related_concepts.clone())
                .unwrap_or_default(),
        };

        let concepts: Vec<ConceptSummary> = ids
            .iter()
            .filter_map(|id| self.knowledge.get_philosophical_concept(id))
            .map(|c| ConceptSummary {
                id: c.id.clone(),
                name: english(&c.name, &c.id),
                description: c.description.clone(),
            })
            .collect();

        let interpretation = match concepts.as_slice() {
            [] => "No philosophical concepts identified".to_string(),
            [only] => format!("The work reflects {}: {}", only.name, only.description),
            many => format!(
                "The work draws together {}",
                many.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
            ),
        };

        PhilosophicalAnalysis {
            concepts,
            interpretation,
        }
    }
}

impl FailureContract for CulturalAnalysisEngine {
    fn name(&self) -> &'static str {
        "CulturalAnalysisEngine"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::FailsRequest
    }
}

fn validate_request(request: &AnalysisRequest) -> Result<()> {
    if request.artwork.id.trim().is_empty() {
        return Err(Error::Validation("artwork id is required".to_string()));
    }
    if request.artwork.image_url.trim().is_empty() {
        return Err(Error::Validation(format!(
            "artwork {} has no image",
            request.artwork.id
        )));
    }
    if request.included_analysis.is_empty() {
        return Err(Error::Validation(
            "at least one analysis stage is required".to_string(),
        ));
    }
    Ok(())
}

fn cancelled() -> Error {
    Error::Validation("analysis cancelled".to_string())
}

fn check_cancelled(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(cancelled())
    } else {
        Ok(())
    }
}

fn english(name: &crate::types::MultiLanguageText, fallback: &str) -> String {
    name.get(Language::English).unwrap_or(fallback).to_string()
}
