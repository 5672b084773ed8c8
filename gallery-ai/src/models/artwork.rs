//! Artwork input and externally persisted cultural context

use super::analysis::CulturalAnalysisResult;
use crate::types::{EducationLevel, Language};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Artwork record as supplied by the artwork provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub featured: bool,
}

impl Artwork {
    /// Minimal artwork with a slug derived from the id
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            slug: id.to_lowercase().replace(' ', "-"),
            id,
            title: title.into(),
            year: None,
            medium: None,
            dimensions: None,
            description: None,
            image_url: image_url.into(),
            featured: false,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Search-facing metadata derived from an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CulturalMetadata {
    pub tags: Vec<String>,
    pub recommended_level: EducationLevel,
    /// 0-10
    pub cultural_significance: f64,
    pub primary_style: Option<String>,
    pub period: Option<String>,
    pub concepts: Vec<String>,
    pub primary_language: Option<Language>,
}

impl Default for CulturalMetadata {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            recommended_level: EducationLevel::Beginner,
            cultural_significance: 0.0,
            primary_style: None,
            period: None,
            concepts: Vec::new(),
            primary_language: None,
        }
    }
}

impl CulturalMetadata {
    /// Derive metadata from a finished analysis
    ///
    /// Tags are style, period, concepts and primary language, without
    /// duplicates.
    pub fn from_analysis(analysis: &CulturalAnalysisResult) -> Self {
        let significance = analysis.cultural_significance();
        let primary_style = analysis.primary_style().map(str::to_string);
        let period = analysis.period().map(str::to_string);
        let concepts = analysis
            .cultural_analysis
            .as_ref()
            .map(|c| c.concepts.clone())
            .unwrap_or_default();
        let primary_language = analysis
            .textual_analysis
            .as_ref()
            .filter(|t| !t.recognition.characters.is_empty())
            .map(|t| t.recognition.language_detection.primary_language);

        let mut tags: Vec<String> = Vec::new();
        let candidates = primary_style
            .iter()
            .chain(period.iter())
            .chain(concepts.iter())
            .cloned()
            .chain(primary_language.map(|l| l.to_string()));
        for tag in candidates {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Self {
            tags,
            recommended_level: EducationLevel::for_significance(significance),
            cultural_significance: significance,
            primary_style,
            period,
            concepts,
            primary_language,
        }
    }
}

/// Cultural analysis as stored in the external content store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalContext {
    pub artwork_id: String,
    pub analysis: CulturalAnalysisResult,
    pub metadata: CulturalMetadata,
    pub expert_validated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CulturalContext {
    pub fn from_analysis(analysis: CulturalAnalysisResult) -> Self {
        let now = Utc::now();
        Self {
            artwork_id: analysis.artwork_id.clone(),
            metadata: CulturalMetadata::from_analysis(&analysis),
            analysis,
            expert_validated: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when every non-timestamp field matches
    pub fn same_content(&self, other: &CulturalContext) -> bool {
        self.artwork_id == other.artwork_id
            && self.analysis == other.analysis
            && self.metadata == other.metadata
            && self.expert_validated == other.expert_validated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{CulturalAnalysis, HistoricalAnalysis};
    use uuid::Uuid;

    fn analysis(significance: f64) -> CulturalAnalysisResult {
        let mut result = CulturalAnalysisResult::new(Uuid::new_v4(), "a1");
        result.cultural_analysis = Some(CulturalAnalysis {
            cultural_significance: significance,
            concepts: vec!["harmony".into(), "qi".into()],
            symbolism: vec![],
            context_summary: String::new(),
        });
        result.historical_analysis = Some(HistoricalAnalysis {
            period: "joseon".into(),
            period_name: "Joseon Dynasty".into(),
            date_range: "1392-1897".into(),
            characteristics: vec![],
            notable_artists: vec![],
        });
        result
    }

    #[test]
    fn test_metadata_tags_and_level() {
        let metadata = CulturalMetadata::from_analysis(&analysis(6.2));
        assert_eq!(metadata.tags, vec!["joseon", "harmony", "qi"]);
        assert_eq!(metadata.recommended_level, EducationLevel::Advanced);
        assert_eq!(metadata.period.as_deref(), Some("joseon"));
    }

    #[test]
    fn test_artwork_json_is_camel_case() {
        let artwork = Artwork::new("A1", "Scroll", "https://img/a1.jpg").with_year(1750);
        let json = serde_json::to_value(&artwork).unwrap();
        assert_eq!(json["imageUrl"], "https://img/a1.jpg");
        assert_eq!(json["year"], 1750);
        assert_eq!(artwork.slug, "a1");
    }
}
