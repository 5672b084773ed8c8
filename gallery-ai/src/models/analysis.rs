//! Cultural analysis result and status models

use super::artwork::Artwork;
use crate::extractors::{StyleClassificationResult, TextRecognitionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unit of the analysis pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStage {
    Visual,
    Textual,
    Cultural,
    Historical,
    Philosophical,
}

impl AnalysisStage {
    pub const ALL: [AnalysisStage; 5] = [
        AnalysisStage::Visual,
        AnalysisStage::Textual,
        AnalysisStage::Cultural,
        AnalysisStage::Historical,
        AnalysisStage::Philosophical,
    ];

    /// Progress percent reported when the stage starts
    pub fn progress(&self) -> u8 {
        match self {
            AnalysisStage::Visual => 15,
            AnalysisStage::Textual => 30,
            AnalysisStage::Cultural => 50,
            AnalysisStage::Historical => 70,
            AnalysisStage::Philosophical => 85,
        }
    }

    /// Algorithm identifier recorded when the stage succeeds
    pub fn algorithm(&self) -> &'static str {
        match self {
            AnalysisStage::Visual => "style-pattern-matching",
            AnalysisStage::Textual => "script-range-recognition",
            AnalysisStage::Cultural => "knowledge-base-context",
            AnalysisStage::Historical => "period-attribution",
            AnalysisStage::Philosophical => "concept-interpretation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStage::Visual => "Visual analysis",
            AnalysisStage::Textual => "Text recognition",
            AnalysisStage::Cultural => "Cultural context analysis",
            AnalysisStage::Historical => "Historical analysis",
            AnalysisStage::Philosophical => "Philosophical analysis",
        }
    }
}

impl std::str::FromStr for AnalysisStage {
    type Err = gallery_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "visual" => Ok(AnalysisStage::Visual),
            "textual" => Ok(AnalysisStage::Textual),
            "cultural" => Ok(AnalysisStage::Cultural),
            "historical" => Ok(AnalysisStage::Historical),
            "philosophical" => Ok(AnalysisStage::Philosophical),
            other => Err(gallery_common::Error::Validation(format!(
                "Unknown analysis stage: {}",
                other
            ))),
        }
    }
}

/// Request to analyze one artwork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub artwork: Artwork,
    pub included_analysis: Vec<AnalysisStage>,
}

impl AnalysisRequest {
    /// Request running every stage
    pub fn new(artwork: Artwork) -> Self {
        Self {
            artwork,
            included_analysis: AnalysisStage::ALL.to_vec(),
        }
    }

    pub fn with_stages(mut self, stages: Vec<AnalysisStage>) -> Self {
        self.included_analysis = stages;
        self
    }

    pub fn includes(&self, stage: AnalysisStage) -> bool {
        self.included_analysis.contains(&stage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualAnalysis {
    pub classification: StyleClassificationResult,
    /// English style name from the knowledge base
    pub style_name: String,
    pub style_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextualAnalysis {
    pub recognition: TextRecognitionResult,
    /// Meaning of a known phrase, when recognized
    pub meaning: Option<String>,
    pub reading: Option<String>,
    pub detected_concepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalAnalysis {
    /// 0-10
    pub cultural_significance: f64,
    /// Concept ids
    pub concepts: Vec<String>,
    pub symbolism: Vec<String>,
    pub context_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalAnalysis {
    /// Period id, `unknown` when no period could be attributed
    pub period: String,
    pub period_name: String,
    pub date_range: String,
    pub characteristics: Vec<String>,
    pub notable_artists: Vec<String>,
}

impl HistoricalAnalysis {
    pub fn is_attributed(&self) -> bool {
        self.period != "unknown"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhilosophicalAnalysis {
    pub concepts: Vec<ConceptSummary>,
    pub interpretation: String,
}

/// Structured cultural analysis of one artwork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalAnalysisResult {
    pub id: Uuid,
    pub artwork_id: String,
    pub visual_analysis: Option<VisualAnalysis>,
    pub textual_analysis: Option<TextualAnalysis>,
    pub cultural_analysis: Option<CulturalAnalysis>,
    pub historical_analysis: Option<HistoricalAnalysis>,
    pub philosophical_analysis: Option<PhilosophicalAnalysis>,
    /// Overall validated confidence (0-10)
    pub confidence: f64,
    /// 0-10
    pub cultural_accuracy: f64,
    /// 0-10
    pub analysis_depth: f64,
    /// Algorithm identifiers of the stages that ran
    pub algorithms: Vec<String>,
    pub processing_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl CulturalAnalysisResult {
    /// Result with no sub-records, to be filled by the pipeline
    pub fn new(id: Uuid, artwork_id: impl Into<String>) -> Self {
        Self {
            id,
            artwork_id: artwork_id.into(),
            visual_analysis: None,
            textual_analysis: None,
            cultural_analysis: None,
            historical_analysis: None,
            philosophical_analysis: None,
            confidence: 0.0,
            cultural_accuracy: 0.0,
            analysis_depth: 0.0,
            algorithms: Vec::new(),
            processing_time_ms: 0,
            created_at: Utc::now(),
        }
    }

    /// Number of populated sub-records (0-5)
    pub fn present_records(&self) -> usize {
        [
            self.visual_analysis.is_some(),
            self.textual_analysis.is_some(),
            self.cultural_analysis.is_some(),
            self.historical_analysis.is_some(),
            self.philosophical_analysis.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    pub fn primary_style(&self) -> Option<&str> {
        self.visual_analysis
            .as_ref()
            .map(|v| v.classification.primary_style.as_str())
    }

    pub fn period(&self) -> Option<&str> {
        self.historical_analysis
            .as_ref()
            .filter(|h| h.is_attributed())
            .map(|h| h.period.as_str())
    }

    pub fn cultural_significance(&self) -> f64 {
        self.cultural_analysis
            .as_ref()
            .map_or(0.0, |c| c.cultural_significance)
    }
}

/// Lifecycle state of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AnalysisState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisState::Completed | AnalysisState::Failed)
    }
}

/// In-memory progress record of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStatus {
    pub id: Uuid,
    pub artwork_id: String,
    pub state: AnalysisState,
    /// Percent complete (0-100)
    pub progress: u8,
    pub current_stage: String,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisStatus {
    pub fn new(id: Uuid, artwork_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            artwork_id: artwork_id.into(),
            state: AnalysisState::Pending,
            progress: 0,
            current_stage: "Pending".to_string(),
            estimated_completion: None,
            started_at: now,
            updated_at: now,
        }
    }
}
