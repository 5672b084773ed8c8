//! Core Types and Trait Definitions for gallery-ai
//!
//! Defines the shared vocabulary of the cultural analysis pipeline:
//! - **Languages:** `Language`, `MultiLanguageText`
//! - **Education levels:** `EducationLevel`
//! - **Capabilities:** `VisualFeatureExtractor`, `OcrProvider`
//! - **Failure contracts:** `FailurePolicy`, `FailureContract`
//!
//! # Architecture
//! Image understanding is delegated to capability traits so that a real
//! computer-vision or OCR backend can replace the shipped heuristic stubs
//! without touching the classifier or recognition engine.

use gallery_common::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Languages
// ============================================================================

/// Supported content language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Korean,
    English,
    Japanese,
    Chinese,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Korean,
        Language::English,
        Language::Japanese,
        Language::Chinese,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Korean => "korean",
            Language::English => "english",
            Language::Japanese => "japanese",
            Language::Chinese => "chinese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "korean" | "ko" => Ok(Language::Korean),
            "english" | "en" => Ok(Language::English),
            "japanese" | "ja" => Ok(Language::Japanese),
            "chinese" | "zh" => Ok(Language::Chinese),
            other => Err(Error::Validation(format!("Unsupported language: {}", other))),
        }
    }
}

/// Fixed-key mapping from language to text
///
/// After `ensure_complete()` the korean and english entries are always
/// populated. A back-filled entry is a copy of the other language, not a
/// translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiLanguageText(BTreeMap<Language, String>);

impl MultiLanguageText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text with a single language entry
    pub fn single(language: Language, text: impl Into<String>) -> Self {
        let mut mlt = Self::new();
        mlt.set(language, text);
        mlt
    }

    pub fn get(&self, language: Language) -> Option<&str> {
        self.0.get(&language).map(String::as_str)
    }

    pub fn set(&mut self, language: Language, text: impl Into<String>) {
        self.0.insert(language, text.into());
    }

    /// True when the language has a non-empty entry
    pub fn has(&self, language: Language) -> bool {
        self.get(language).is_some_and(|t| !t.trim().is_empty())
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|t| t.trim().is_empty())
    }

    /// Back-fill korean and english from each other (or any other entry)
    pub fn ensure_complete(&mut self) {
        let korean = self.has(Language::Korean);
        let english = self.has(Language::English);

        match (korean, english) {
            (true, true) => {}
            (true, false) => {
                let text = self.0[&Language::Korean].clone();
                self.set(Language::English, text);
            }
            (false, true) => {
                let text = self.0[&Language::English].clone();
                self.set(Language::Korean, text);
            }
            (false, false) => {
                let Some(text) = self.0.values().find(|t| !t.trim().is_empty()).cloned() else {
                    return;
                };
                self.set(Language::Korean, text.clone());
                self.set(Language::English, text);
            }
        }
    }
}

// ============================================================================
// Education levels
// ============================================================================

/// Depth of educational content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 4] = [
        EducationLevel::Beginner,
        EducationLevel::Intermediate,
        EducationLevel::Advanced,
        EducationLevel::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::Beginner => "beginner",
            EducationLevel::Intermediate => "intermediate",
            EducationLevel::Advanced => "advanced",
            EducationLevel::Expert => "expert",
        }
    }

    /// Estimated study duration in minutes
    pub fn study_minutes(&self) -> u32 {
        match self {
            EducationLevel::Beginner => 15,
            EducationLevel::Intermediate => 30,
            EducationLevel::Advanced => 45,
            EducationLevel::Expert => 60,
        }
    }

    /// Level preceding this one in a progression path
    pub fn previous(&self) -> Option<EducationLevel> {
        match self {
            EducationLevel::Beginner => None,
            EducationLevel::Intermediate => Some(EducationLevel::Beginner),
            EducationLevel::Advanced => Some(EducationLevel::Intermediate),
            EducationLevel::Expert => Some(EducationLevel::Advanced),
        }
    }

    /// Recommended level for a cultural significance score (0-10)
    pub fn for_significance(significance: f64) -> EducationLevel {
        if significance < 4.0 {
            EducationLevel::Beginner
        } else if significance < 6.0 {
            EducationLevel::Intermediate
        } else if significance < 8.0 {
            EducationLevel::Advanced
        } else {
            EducationLevel::Expert
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EducationLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(EducationLevel::Beginner),
            "intermediate" => Ok(EducationLevel::Intermediate),
            "advanced" => Ok(EducationLevel::Advanced),
            "expert" => Ok(EducationLevel::Expert),
            other => Err(Error::Validation(format!("Unknown education level: {}", other))),
        }
    }
}

// ============================================================================
// Failure contracts
// ============================================================================

/// How a component reacts to internal failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Internal failures are logged and replaced by a documented fallback value
    DegradesGracefully,
    /// Internal failures are logged and returned to the caller as `Err`
    FailsRequest,
}

/// Declares the failure policy of a pipeline component
pub trait FailureContract {
    /// Component name for logs and diagnostics
    fn name(&self) -> &'static str;

    fn failure_policy(&self) -> FailurePolicy;
}

// ============================================================================
// Visual features
// ============================================================================

/// Column/grid alignment of characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Grid,
    Columnar,
    Flowing,
    Free,
}

/// Ink flow pattern across strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkFlow {
    Deliberate,
    Steady,
    Continuous,
    Rapid,
}

/// Visual feature vector extracted from an artwork image
///
/// Scalar features are normalized to 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualFeatures {
    pub stroke_thickness: f64,
    pub ink_density: f64,
    pub spacing: f64,
    pub alignment: Alignment,
    pub ink_flow: InkFlow,
    pub pressure_variation: f64,
}

/// Image text as produced by an OCR backend
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    /// Extracted text, whitespace preserved
    pub text: String,
    /// Per-character confidence (0.0-1.0) for each non-whitespace character
    ///
    /// `None` when the backend does not report confidences.
    pub character_confidences: Option<Vec<f64>>,
}

// ============================================================================
// Capability traits
// ============================================================================

/// Extracts a visual feature vector from an artwork image
#[async_trait::async_trait]
pub trait VisualFeatureExtractor: Send + Sync {
    /// Extractor name for provenance tracking
    fn name(&self) -> &'static str;

    /// Extract features for the image at `image_ref`
    ///
    /// # Errors
    /// Returns `ExtractionError` if the image cannot be read or analyzed
    async fn extract_features(&self, image_ref: &str) -> Result<VisualFeatures, ExtractionError>;
}

/// Extracts text from an artwork image
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    /// Provider name for provenance tracking
    fn name(&self) -> &'static str;

    async fn extract_text(&self, image_ref: &str) -> Result<OcrOutput, ExtractionError>;
}

/// Extraction error
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Image reference missing or malformed
    #[error("Invalid image reference: {0}")]
    InvalidInput(String),

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Failed to parse backend output
    #[error("Parse error: {0}")]
    Parse(String),

    /// Backend not available
    #[error("Extractor not available: {0}")]
    NotAvailable(String),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse_and_display() {
        assert_eq!("Korean".parse::<Language>().unwrap(), Language::Korean);
        assert_eq!("ja".parse::<Language>().unwrap(), Language::Japanese);
        assert_eq!(Language::Chinese.to_string(), "chinese");
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_ensure_complete_backfills_english() {
        let mut text = MultiLanguageText::single(Language::Korean, "서예");
        text.ensure_complete();
        assert_eq!(text.get(Language::English), Some("서예"));
        assert_eq!(text.get(Language::Korean), Some("서예"));
    }

    #[test]
    fn test_ensure_complete_from_other_language() {
        let mut text = MultiLanguageText::single(Language::Japanese, "書道");
        text.ensure_complete();
        assert!(text.has(Language::Korean));
        assert!(text.has(Language::English));
    }

    #[test]
    fn test_multi_language_text_serializes_as_map() {
        let mut text = MultiLanguageText::new();
        text.set(Language::English, "calligraphy");
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["english"], "calligraphy");
    }

    #[test]
    fn test_level_for_significance() {
        assert_eq!(EducationLevel::for_significance(3.9), EducationLevel::Beginner);
        assert_eq!(EducationLevel::for_significance(4.0), EducationLevel::Intermediate);
        assert_eq!(EducationLevel::for_significance(7.99), EducationLevel::Advanced);
        assert_eq!(EducationLevel::for_significance(8.0), EducationLevel::Expert);
    }

    #[test]
    fn test_study_minutes() {
        let minutes: Vec<u32> = EducationLevel::ALL.iter().map(|l| l.study_minutes()).collect();
        assert_eq!(minutes, vec![15, 30, 45, 60]);
    }
}
