//! Quality rubric: dimension weights and score thresholds

use serde::{Deserialize, Serialize};

/// Quality dimension scored 0-10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityDimension {
    CulturalAccuracy,
    Depth,
    Completeness,
    Consistency,
    Linguistic,
    Educational,
}

impl QualityDimension {
    pub const ALL: [QualityDimension; 6] = [
        QualityDimension::CulturalAccuracy,
        QualityDimension::Depth,
        QualityDimension::Completeness,
        QualityDimension::Consistency,
        QualityDimension::Linguistic,
        QualityDimension::Educational,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QualityDimension::CulturalAccuracy => "Cultural accuracy",
            QualityDimension::Depth => "Analysis depth",
            QualityDimension::Completeness => "Completeness",
            QualityDimension::Consistency => "Consistency",
            QualityDimension::Linguistic => "Linguistic quality",
            QualityDimension::Educational => "Educational value",
        }
    }
}

/// Weight of each dimension in the overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionWeights {
    pub cultural_accuracy: f64,
    pub depth: f64,
    pub completeness: f64,
    pub consistency: f64,
    pub linguistic: f64,
    pub educational: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            cultural_accuracy: 0.25,
            depth: 0.20,
            completeness: 0.20,
            consistency: 0.15,
            linguistic: 0.10,
            educational: 0.10,
        }
    }
}

impl DimensionWeights {
    pub fn weight(&self, dimension: QualityDimension) -> f64 {
        match dimension {
            QualityDimension::CulturalAccuracy => self.cultural_accuracy,
            QualityDimension::Depth => self.depth,
            QualityDimension::Completeness => self.completeness,
            QualityDimension::Consistency => self.consistency,
            QualityDimension::Linguistic => self.linguistic,
            QualityDimension::Educational => self.educational,
        }
    }
}

/// Score thresholds (0-10)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Below this a dimension is a critical issue
    pub minimum: f64,
    /// Below this a dimension needs improvement
    pub good: f64,
    /// At or above this a dimension is a strength
    pub excellent: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            minimum: 6.0,
            good: 7.5,
            excellent: 9.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = DimensionWeights::default();
        let total: f64 = QualityDimension::ALL.iter().map(|d| weights.weight(*d)).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let thresholds: QualityThresholds = toml::from_str("minimum = 5.0").unwrap();
        assert_eq!(thresholds.minimum, 5.0);
        assert_eq!(thresholds.good, 7.5);
    }
}
