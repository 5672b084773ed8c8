//! Quality Validator
//!
//! Rubric-based scoring of analyses and educational content.
//!
//! # Quality Dimensions (0-10 each)
//! - **Cultural accuracy** (weight 0.25)
//! - **Depth** (weight 0.20)
//! - **Completeness** (weight 0.20): `10 × present sub-records / 5` for analyses
//! - **Consistency** (weight 0.15): 10 minus 2 per detected contradiction
//! - **Linguistic quality** (weight 0.10)
//! - **Educational value** (weight 0.10)
//!
//! Overall score is the weighted average over dimensions with a positive
//! score. Each dimension is compared with the thresholds: below minimum is a
//! critical issue, below good an improvement, at or above excellent a
//! strength.
//!
//! # Status Determination
//! - Pass: overall ≥ good
//! - Warning: overall ≥ minimum
//! - Fail: overall < minimum
//!
//! # Failure Policy
//! Degrades gracefully: non-finite or out-of-range inputs produce a fallback
//! report (6.0 on every dimension, manual review recommended). Reports are
//! cached per (target type, id, validator version); fallbacks are not.

use super::rubric::{DimensionWeights, QualityDimension, QualityThresholds};
use crate::cache::MemoCache;
use crate::knowledge::CulturalKnowledgeBase;
use crate::models::{AnalysisStage, CulturalAnalysisResult, EducationalContent};
use crate::types::{FailureContract, FailurePolicy, Language, MultiLanguageText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const VALIDATOR_VERSION: &str = "1.0.0";
/// Score assigned to every dimension when validation cannot run
pub const FALLBACK_SCORE: f64 = 6.0;
pub const MANUAL_REVIEW_RECOMMENDED: &str = "Manual review recommended";

const CONTRADICTION_PENALTY: f64 = 2.0;

/// Dimension scores (0-10)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub completeness: f64,
    pub cultural_accuracy: f64,
    pub depth: f64,
    pub consistency: f64,
    pub linguistic_quality: f64,
    pub educational_value: f64,
    /// Weighted average over positive dimensions
    pub overall: f64,
}

impl QualityScores {
    pub fn uniform(score: f64) -> Self {
        Self {
            completeness: score,
            cultural_accuracy: score,
            depth: score,
            consistency: score,
            linguistic_quality: score,
            educational_value: score,
            overall: score,
        }
    }

    pub fn get(&self, dimension: QualityDimension) -> f64 {
        match dimension {
            QualityDimension::CulturalAccuracy => self.cultural_accuracy,
            QualityDimension::Depth => self.depth,
            QualityDimension::Completeness => self.completeness,
            QualityDimension::Consistency => self.consistency,
            QualityDimension::Linguistic => self.linguistic_quality,
            QualityDimension::Educational => self.educational_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationTarget {
    Analysis,
    EducationalContent,
}

impl ValidationTarget {
    fn key_prefix(&self) -> &'static str {
        match self {
            ValidationTarget::Analysis => "analysis",
            ValidationTarget::EducationalContent => "educational",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    Pass,
    Warning,
    Fail,
}

/// Validation report with free-text findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub target: ValidationTarget,
    pub target_id: String,
    pub scores: QualityScores,
    pub status: ValidationStatus,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub critical_issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub validator_version: String,
    pub validated_at: DateTime<Utc>,
    pub fallback: bool,
    /// Dimension/weight/threshold breakdown
    pub details: serde_json::Value,
}

/// Reasons validation cannot score its input
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Non-finite value for {0}")]
    NonFinite(&'static str),

    #[error("Value for {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Quality validator
pub struct QualityValidator {
    knowledge: Arc<CulturalKnowledgeBase>,
    weights: DimensionWeights,
    thresholds: QualityThresholds,
    version: String,
    cache: Arc<MemoCache<String, ValidationReport>>,
}

impl QualityValidator {
    /// Create validator with default weights and thresholds
    pub fn new(
        knowledge: Arc<CulturalKnowledgeBase>,
        cache: Arc<MemoCache<String, ValidationReport>>,
    ) -> Self {
        Self {
            knowledge,
            weights: DimensionWeights::default(),
            thresholds: QualityThresholds::default(),
            version: VALIDATOR_VERSION.to_string(),
            cache,
        }
    }

    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_weights(mut self, weights: DimensionWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Dimension scores of an analysis
    pub async fn validate_analysis(&self, result: &CulturalAnalysisResult) -> QualityScores {
        self.analysis_report(result).await.scores
    }

    /// Full validation report of an analysis
    pub async fn analysis_report(&self, result: &CulturalAnalysisResult) -> ValidationReport {
        let target = ValidationTarget::Analysis;
        let key = self.cache_key(target, &result.id.to_string());
        if let Some(cached) = self.cache.get(&key).await {
            return cached;
        }

        match self.score_analysis(result) {
            Ok(report) => {
                self.cache.insert(key, report.clone()).await;
                report
            }
            Err(e) => {
                warn!(
                    analysis_id = %result.id,
                    error = %e,
                    "Analysis validation failed, using fallback scores"
                );
                self.fallback_report(target, result.id.to_string(), &e)
            }
        }
    }

    /// Validation report of generated educational content
    pub async fn validate_educational_content(
        &self,
        content: &EducationalContent,
    ) -> ValidationReport {
        let target = ValidationTarget::EducationalContent;
        let key = self.cache_key(target, &content.id.to_string());
        if let Some(cached) = self.cache.get(&key).await {
            return cached;
        }

        match self.score_content(content) {
            Ok(report) => {
                self.cache.insert(key, report.clone()).await;
                report
            }
            Err(e) => {
                warn!(
                    content_id = %content.id,
                    error = %e,
                    "Content validation failed, using fallback scores"
                );
                self.fallback_report(target, content.id.to_string(), &e)
            }
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    fn cache_key(&self, target: ValidationTarget, id: &str) -> String {
        format!("{}:{}:{}", target.key_prefix(), id, self.version)
    }

    // ========================================================================
    // Analysis rubric
    // ========================================================================

    fn score_analysis(
        &self,
        r: &CulturalAnalysisResult,
    ) -> Result<ValidationReport, ValidationError> {
        check_finite("confidence", r.confidence)?;
        check_finite("cultural_accuracy", r.cultural_accuracy)?;
        check_finite("analysis_depth", r.analysis_depth)?;
        if let Some(cultural) = &r.cultural_analysis {
            check_range("cultural_significance", cultural.cultural_significance, 0.0, 10.0)?;
        }
        if let Some(textual) = &r.textual_analysis {
            check_range("readability_score", textual.recognition.readability_score, 0.0, 1.0)?;
        }

        let present = r.present_records();
        let completeness = 10.0 * present as f64 / AnalysisStage::ALL.len() as f64;

        let cultural_accuracy = match &r.cultural_analysis {
            None => 0.0,
            Some(cultural) => {
                let mut score = 6.0;
                if !cultural.concepts.is_empty() {
                    score += 2.0;
                }
                if r.period().is_some() {
                    score += 1.0;
                }
                if r
                    .visual_analysis
                    .as_ref()
                    .is_some_and(|v| {
                        !v.classification.fallback && v.classification.confidence >= 80
                    })
                {
                    score += 1.0;
                }
                f64::min(score, 10.0)
            }
        };

        let philosophical_concepts = r
            .philosophical_analysis
            .as_ref()
            .map_or(0, |p| p.concepts.len().min(2));
        let depth = f64::min(present as f64 * 1.6 + philosophical_concepts as f64, 10.0);

        let contradictions = self.contradictions(r);
        let consistency = if present == 0 {
            0.0
        } else {
            f64::max(10.0 - CONTRADICTION_PENALTY * contradictions.len() as f64, 0.0)
        };

        let linguistic_quality = match &r.textual_analysis {
            Some(textual) if !textual.recognition.characters.is_empty() => {
                textual.recognition.readability_score * 10.0
            }
            _ => 0.0,
        };

        let educational_value = match &r.cultural_analysis {
            None => 0.0,
            Some(cultural) => {
                let mut score = 4.0 + cultural.concepts.len() as f64 * 1.5;
                if r.period().is_some() {
                    score += 1.5;
                }
                if r.textual_analysis.as_ref().is_some_and(|t| t.meaning.is_some()) {
                    score += 1.0;
                }
                f64::min(score, 10.0)
            }
        };

        let scores = self.with_overall(QualityScores {
            completeness,
            cultural_accuracy,
            depth,
            consistency,
            linguistic_quality,
            educational_value,
            overall: 0.0,
        });

        let mut recommendations: Vec<String> = Vec::new();
        let missing = [
            (AnalysisStage::Visual, r.visual_analysis.is_none()),
            (AnalysisStage::Textual, r.textual_analysis.is_none()),
            (AnalysisStage::Cultural, r.cultural_analysis.is_none()),
            (AnalysisStage::Historical, r.historical_analysis.is_none()),
            (AnalysisStage::Philosophical, r.philosophical_analysis.is_none()),
        ];
        for (stage, is_missing) in missing {
            if is_missing {
                recommendations.push(format!("Add {}", stage.label().to_lowercase()));
            }
        }
        recommendations.extend(contradictions);

        Ok(self.build_report(
            ValidationTarget::Analysis,
            r.id.to_string(),
            scores,
            recommendations,
        ))
    }

    fn contradictions(&self, r: &CulturalAnalysisResult) -> Vec<String> {
        let mut found = Vec::new();
        let style = r.primary_style();

        if let (Some(style), Some(period)) = (style, r.period()) {
            if let Some(info) = self.knowledge.get_style_information(style) {
                if !info.historical_periods.is_empty()
                    && !info.historical_periods.iter().any(|p| p == period)
                {
                    found.push(format!(
                        "Style {} is not documented for the {} period",
                        style, period
                    ));
                }
            }
        }

        if let (Some(style), Some(textual)) = (style, &r.textual_analysis) {
            let detection = &textual.recognition.language_detection;
            let hangeul_style = style.starts_with("hangeul");
            if hangeul_style && detection.primary_language == Language::Chinese {
                found.push(format!("Hanja text attributed to Hangeul style {}", style));
            }
            if !hangeul_style
                && style != "mixed-script"
                && detection.hangul_count > 0
                && detection.cjk_count == 0
            {
                found.push(format!("Hangeul text attributed to Hanja style {}", style));
            }
        }

        if r.algorithms.len() != r.present_records() {
            found.push(format!(
                "{} algorithms recorded for {} analysis records",
                r.algorithms.len(),
                r.present_records()
            ));
        }

        found
    }

    // ========================================================================
    // Educational content rubric
    // ========================================================================

    fn score_content(&self, c: &EducationalContent) -> Result<ValidationReport, ValidationError> {
        check_range("effectiveness", c.quality_metrics.effectiveness, 0.0, 1.0)?;
        check_range("cultural_accuracy", c.quality_metrics.cultural_accuracy, 0.0, 1.0)?;
        check_range("engagement", c.quality_metrics.engagement, 0.0, 1.0)?;

        let parts = [
            !c.learning_objectives.is_empty(),
            !c.level_content.is_empty(),
            !c.assessment_criteria.is_empty(),
            !c.interactive_elements.is_empty(),
            !c.visual_aids.is_empty(),
            !c.progression_path.is_empty(),
        ];
        let present = parts.iter().filter(|p| **p).count();
        let completeness = 10.0 * present as f64 / parts.len() as f64;

        let levels: BTreeSet<_> = c.level_content.iter().map(|l| l.level).collect();
        let depth = f64::min(levels.len() as f64 * 2.5, 10.0);

        let mut recommendations = Vec::new();
        let incomplete_levels: Vec<_> = c
            .level_content
            .iter()
            .filter(|l| !covers(&l.introduction, &c.languages))
            .map(|l| l.level)
            .collect();
        for level in &incomplete_levels {
            recommendations.push(format!("Complete {} introduction in every language", level));
        }
        let consistency = if c.level_content.is_empty() {
            0.0
        } else {
            f64::max(10.0 - CONTRADICTION_PENALTY * incomplete_levels.len() as f64, 0.0)
        };

        let texts: Vec<&MultiLanguageText> = c
            .level_content
            .iter()
            .flat_map(|l| {
                std::iter::once(&l.introduction)
                    .chain(l.sections.iter().flat_map(|s| [&s.title, &s.body]))
                    .chain(l.cultural_context.iter().flat_map(|s| [&s.title, &s.body]))
            })
            .collect();
        let linguistic_quality = if texts.is_empty() {
            0.0
        } else {
            let covered = texts.iter().filter(|t| covers(t, &c.languages)).count();
            10.0 * covered as f64 / texts.len() as f64
        };

        let scores = self.with_overall(QualityScores {
            completeness,
            cultural_accuracy: c.quality_metrics.cultural_accuracy * 10.0,
            depth,
            consistency,
            linguistic_quality,
            educational_value: c.quality_metrics.effectiveness * 10.0,
            overall: 0.0,
        });

        Ok(self.build_report(
            ValidationTarget::EducationalContent,
            c.id.to_string(),
            scores,
            recommendations,
        ))
    }

    // ========================================================================
    // Shared scoring
    // ========================================================================

    fn with_overall(&self, mut scores: QualityScores) -> QualityScores {
        let (weighted, weight) = QualityDimension::ALL
            .iter()
            .map(|d| (scores.get(*d), self.weights.weight(*d)))
            .filter(|(score, _)| *score > 0.0)
            .fold((0.0, 0.0), |(sum, total), (score, weight)| {
                (sum + score * weight, total + weight)
            });

        scores.overall = if weight > 0.0 { weighted / weight } else { 0.0 };
        scores
    }

    fn build_report(
        &self,
        target: ValidationTarget,
        target_id: String,
        scores: QualityScores,
        mut recommendations: Vec<String>,
    ) -> ValidationReport {
        let t = &self.thresholds;
        let mut strengths = Vec::new();
        let mut improvements = Vec::new();
        let mut critical_issues = Vec::new();

        for dimension in QualityDimension::ALL {
            let score = scores.get(dimension);
            if score < t.minimum {
                critical_issues.push(format!(
                    "{} below minimum ({:.1} < {:.1})",
                    dimension.label(),
                    score,
                    t.minimum
                ));
            } else if score < t.good {
                improvements.push(format!(
                    "{} could be improved ({:.1} < {:.1})",
                    dimension.label(),
                    score,
                    t.good
                ));
            } else if score >= t.excellent {
                strengths.push(format!("{} is excellent ({:.1})", dimension.label(), score));
            }
        }

        let status = if scores.overall >= t.good {
            ValidationStatus::Pass
        } else if scores.overall >= t.minimum {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Fail
        };

        if status == ValidationStatus::Fail {
            recommendations.push(MANUAL_REVIEW_RECOMMENDED.to_string());
        }

        debug!(
            target = ?target,
            target_id = %target_id,
            status = ?status,
            overall = scores.overall,
            "Quality validation complete"
        );

        ValidationReport {
            details: self.details(&scores, status),
            target,
            target_id,
            scores,
            status,
            strengths,
            improvements,
            critical_issues,
            recommendations,
            validator_version: self.version.clone(),
            validated_at: Utc::now(),
            fallback: false,
        }
    }

    fn fallback_report(
        &self,
        target: ValidationTarget,
        target_id: String,
        error: &ValidationError,
    ) -> ValidationReport {
        let scores = QualityScores::uniform(FALLBACK_SCORE);
        ValidationReport {
            details: self.details(&scores, ValidationStatus::Warning),
            target,
            target_id,
            scores,
            status: ValidationStatus::Warning,
            strengths: Vec::new(),
            improvements: Vec::new(),
            critical_issues: vec![format!("Automated validation failed: {}", error)],
            recommendations: vec![MANUAL_REVIEW_RECOMMENDED.to_string()],
            validator_version: self.version.clone(),
            validated_at: Utc::now(),
            fallback: true,
        }
    }

    fn details(&self, scores: &QualityScores, status: ValidationStatus) -> serde_json::Value {
        let dimensions: serde_json::Map<String, serde_json::Value> = QualityDimension::ALL
            .iter()
            .map(|d| {
                let name = serde_json::to_value(d)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_else(|| d.label().to_string());
                (
                    name,
                    json!({
                        "score": scores.get(*d),
                        "weight": self.weights.weight(*d),
                    }),
                )
            })
            .collect();

        json!({
            "validator": "QualityValidator",
            "overall_score": scores.overall,
            "status": format!("{:?}", status),
            "dimensions": dimensions,
            "thresholds": {
                "minimum": self.thresholds.minimum,
                "good": self.thresholds.good,
                "excellent": self.thresholds.excellent,
            }
        })
    }
}

impl FailureContract for QualityValidator {
    fn name(&self) -> &'static str {
        "QualityValidator"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DegradesGracefully
    }
}

fn covers(text: &MultiLanguageText, languages: &[Language]) -> bool {
    languages.iter().all(|l| text.has(*l))
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite(field))
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    check_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::style_classifier::StyleClassificationResult;
    use crate::extractors::text_recognition::analyze_text;
    use crate::models::analysis::{
        ConceptSummary, CulturalAnalysis, HistoricalAnalysis, PhilosophicalAnalysis,
        TextualAnalysis, VisualAnalysis,
    };
    use uuid::Uuid;

    fn validator() -> QualityValidator {
        QualityValidator::new(
            Arc::new(CulturalKnowledgeBase::new()),
            Arc::new(MemoCache::new(32)),
        )
    }

    fn complete_analysis() -> CulturalAnalysisResult {
        let mut r = CulturalAnalysisResult::new(Uuid::new_v4(), "a1");
        let mut classification = StyleClassificationResult::fallback();
        classification.primary_style = "kaishu".into();
        classification.confidence = 92;
        classification.fallback = false;
        r.visual_analysis = Some(VisualAnalysis {
            classification,
            style_name: "Regular Script".into(),
            style_description: String::new(),
        });
        r.textual_analysis = Some(TextualAnalysis {
            recognition: analyze_text("和氣致祥", None),
            meaning: Some("Harmony brings auspiciousness".into()),
            reading: Some("화기치상".into()),
            detected_concepts: vec!["harmony".into()],
        });
        r.cultural_analysis = Some(CulturalAnalysis {
            cultural_significance: 7.0,
            concepts: vec!["harmony".into(), "qi".into()],
            symbolism: vec![],
            context_summary: String::new(),
        });
        r.historical_analysis = Some(HistoricalAnalysis {
            period: "joseon".into(),
            period_name: "Joseon Dynasty".into(),
            date_range: "1392-1897".into(),
            characteristics: vec![],
            notable_artists: vec![],
        });
        r.philosophical_analysis = Some(PhilosophicalAnalysis {
            concepts: vec![ConceptSummary {
                id: "harmony".into(),
                name: "Harmony".into(),
                description: String::new(),
            }],
            interpretation: String::new(),
        });
        r.algorithms = AnalysisStage::ALL.iter().map(|s| s.algorithm().to_string()).collect();
        r
    }

    #[tokio::test]
    async fn test_complete_analysis_scores_high() {
        let report = validator().analysis_report(&complete_analysis()).await;
        assert_eq!(report.scores.completeness, 10.0);
        assert_eq!(report.scores.consistency, 10.0);
        assert_eq!(report.status, ValidationStatus::Pass);
        assert!(!report.fallback);
        assert!(report.strengths.iter().any(|s| s.starts_with("Completeness")));
    }

    #[tokio::test]
    async fn test_missing_record_lowers_completeness() {
        let validator = validator();
        let complete = complete_analysis();
        let mut partial = complete.clone();
        partial.id = Uuid::new_v4();
        partial.philosophical_analysis = None;
        partial.algorithms.pop();

        let full = validator.validate_analysis(&complete).await;
        let reduced = validator.validate_analysis(&partial).await;
        assert!(reduced.completeness < full.completeness);
    }

    #[tokio::test]
    async fn test_overall_ignores_zero_dimensions() {
        let validator = validator();
        let mut r = CulturalAnalysisResult::new(Uuid::new_v4(), "a1");
        r.cultural_analysis = Some(CulturalAnalysis {
            cultural_significance: 5.0,
            concepts: vec![],
            symbolism: vec![],
            context_summary: String::new(),
        });
        r.algorithms = vec![AnalysisStage::Cultural.algorithm().to_string()];

        let scores = validator.validate_analysis(&r).await;
        assert_eq!(scores.linguistic_quality, 0.0);

        let weights = DimensionWeights::default();
        let expected = (scores.completeness * weights.completeness
            + scores.cultural_accuracy * weights.cultural_accuracy
            + scores.depth * weights.depth
            + scores.consistency * weights.consistency
            + scores.educational_value * weights.educational)
            / (weights.completeness
                + weights.cultural_accuracy
                + weights.depth
                + weights.consistency
                + weights.educational);
        assert!((scores.overall - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_non_finite_input_uses_fallback() {
        let mut r = complete_analysis();
        r.confidence = f64::NAN;

        let report = validator().analysis_report(&r).await;
        assert!(report.fallback);
        assert_eq!(report.scores, QualityScores::uniform(FALLBACK_SCORE));
        assert_eq!(report.recommendations, vec![MANUAL_REVIEW_RECOMMENDED.to_string()]);
    }

    #[tokio::test]
    async fn test_reports_are_cached_by_id() {
        let validator = validator();
        let r = complete_analysis();
        let first = validator.analysis_report(&r).await;
        let second = validator.analysis_report(&r).await;
        assert_eq!(first.validated_at, second.validated_at);

        validator.clear_cache().await;
        let third = validator.analysis_report(&r).await;
        assert!(third.validated_at >= first.validated_at);
    }

    #[tokio::test]
    async fn test_style_period_contradiction() {
        let mut r = complete_analysis();
        if let Some(h) = r.historical_analysis.as_mut() {
            h.period = "song".into();
        }
        let scores = validator().validate_analysis(&r).await;
        assert_eq!(scores.consistency, 8.0);
    }

    #[tokio::test]
    async fn test_custom_thresholds() {
        let strict = QualityThresholds {
            minimum: 9.9,
            good: 9.95,
            excellent: 10.0,
        };
        let validator = validator().with_thresholds(strict);
        let report = validator.analysis_report(&complete_analysis()).await;
        assert_eq!(report.status, ValidationStatus::Fail);
        assert!(report
            .recommendations
            .contains(&MANUAL_REVIEW_RECOMMENDED.to_string()));
    }
}
