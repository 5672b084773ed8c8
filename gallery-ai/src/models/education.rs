//! Educational content models

use super::analysis::CulturalAnalysisResult;
use super::artwork::Artwork;
use crate::types::{EducationLevel, Language, MultiLanguageText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to generate educational content for an artwork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRequest {
    pub artwork: Artwork,
    pub analysis: CulturalAnalysisResult,
    pub levels: Vec<EducationLevel>,
    pub languages: Vec<Language>,
}

impl EducationRequest {
    /// De-duplication key: artwork, sorted levels and sorted languages
    pub fn dedup_key(&self) -> String {
        let mut levels: Vec<&str> = self.levels.iter().map(|l| l.as_str()).collect();
        levels.sort_unstable();
        levels.dedup();
        let mut languages: Vec<&str> = self.languages.iter().map(|l| l.as_str()).collect();
        languages.sort_unstable();
        languages.dedup();
        format!("{}:{}:{}", self.artwork.id, levels.join(","), languages.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyTerm {
    /// Korean term
    pub term: String,
    pub translations: MultiLanguageText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub title: MultiLanguageText,
    pub body: MultiLanguageText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub title: MultiLanguageText,
    pub instructions: MultiLanguageText,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: MultiLanguageText,
    pub options: Vec<MultiLanguageText>,
    pub correct_index: usize,
}

/// Content for one education level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelContent {
    pub level: EducationLevel,
    pub introduction: MultiLanguageText,
    pub key_terms: Vec<KeyTerm>,
    pub sections: Vec<ContentSection>,
    /// Present only when the analysis carries a historical record
    pub cultural_context: Vec<ContentSection>,
    /// `None` for beginner content
    pub practical_exercises: Option<Vec<Exercise>>,
    pub quiz: Vec<QuizQuestion>,
    pub estimated_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentCriterion {
    pub level: EducationLevel,
    pub description: MultiLanguageText,
    /// Percent required to pass
    pub passing_score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractiveKind {
    Quiz,
    ZoomExploration,
    StrokeTracing,
    Timeline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveElement {
    pub kind: InteractiveKind,
    pub title: MultiLanguageText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualAidKind {
    StrokeOrderDiagram,
    StyleComparison,
    PeriodTimeline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualAid {
    pub kind: VisualAidKind,
    pub description: MultiLanguageText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionStep {
    pub level: EducationLevel,
    pub prerequisite: Option<EducationLevel>,
    pub description: MultiLanguageText,
}

/// Content quality metrics (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentQualityMetrics {
    pub effectiveness: f64,
    pub cultural_accuracy: f64,
    pub engagement: f64,
}

/// Leveled multi-language learning material for one artwork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationalContent {
    pub id: Uuid,
    pub artwork_id: String,
    pub languages: Vec<Language>,
    pub learning_objectives: Vec<MultiLanguageText>,
    pub level_content: Vec<LevelContent>,
    pub assessment_criteria: Vec<AssessmentCriterion>,
    pub interactive_elements: Vec<InteractiveElement>,
    pub visual_aids: Vec<VisualAid>,
    pub progression_path: Vec<ProgressionStep>,
    pub quality_metrics: ContentQualityMetrics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EducationalContent {
    pub fn level(&self, level: EducationLevel) -> Option<&LevelContent> {
        self.level_content.iter().find(|c| c.level == level)
    }

    /// Copy restricted to one level, `None` when the level is absent
    pub fn restricted_to(&self, level: EducationLevel) -> Option<EducationalContent> {
        let content = self.level(level)?.clone();
        let mut restricted = self.clone();
        restricted.level_content = vec![content];
        restricted.assessment_criteria.retain(|c| c.level == level);
        restricted.progression_path.retain(|s| s.level == level);
        Some(restricted)
    }

    /// True when every non-timestamp field matches
    pub fn same_content(&self, other: &EducationalContent) -> bool {
        let mut a = self.clone();
        a.created_at = other.created_at;
        a.updated_at = other.updated_at;
        &a == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_dedup_key_ignores_order() {
        let artwork = Artwork::new("a1", "Scroll", "img://a1");
        let analysis = CulturalAnalysisResult::new(Uuid::new_v4(), "a1");
        let a = EducationRequest {
            artwork: artwork.clone(),
            analysis: analysis.clone(),
            levels: vec![EducationLevel::Expert, EducationLevel::Beginner],
            languages: vec![Language::English, Language::Korean],
        };
        let b = EducationRequest {
            artwork,
            analysis,
            levels: vec![EducationLevel::Beginner, EducationLevel::Expert],
            languages: vec![Language::Korean, Language::English],
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_eq!(a.dedup_key(), "a1:beginner,expert:english,korean");
    }
}
