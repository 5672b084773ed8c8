//! Heuristic Visual Feature Extractor
//!
//! Stub implementation of `VisualFeatureExtractor`. It does not look at
//! pixels: the feature vector is derived from a digest of the image
//! reference, so the same reference always yields the same features. Replace
//! with a computer-vision backend for real classification.

use super::image_digest;
use crate::types::{Alignment, ExtractionError, InkFlow, VisualFeatureExtractor, VisualFeatures};
use async_trait::async_trait;
use tracing::debug;

const ALIGNMENTS: [Alignment; 4] = [
    Alignment::Grid,
    Alignment::Columnar,
    Alignment::Flowing,
    Alignment::Free,
];

const INK_FLOWS: [InkFlow; 4] = [
    InkFlow::Deliberate,
    InkFlow::Steady,
    InkFlow::Continuous,
    InkFlow::Rapid,
];

/// Deterministic stand-in for a visual feature extractor
#[derive(Debug, Default, Clone)]
pub struct HeuristicFeatureExtractor;

impl HeuristicFeatureExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn unit(byte: u8) -> f64 {
    (f64::from(byte) / 255.0 * 100.0).round() / 100.0
}

#[async_trait]
impl VisualFeatureExtractor for HeuristicFeatureExtractor {
    fn name(&self) -> &'static str {
        "HeuristicFeatureExtractor"
    }

    async fn extract_features(&self, image_ref: &str) -> Result<VisualFeatures, ExtractionError> {
        if image_ref.trim().is_empty() {
            return Err(ExtractionError::InvalidInput("empty image reference".to_string()));
        }

        let digest = image_digest(image_ref);
        let features = VisualFeatures {
            stroke_thickness: unit(digest[0]),
            ink_density: unit(digest[1]),
            spacing: unit(digest[2]),
            alignment: ALIGNMENTS[usize::from(digest[3]) % ALIGNMENTS.len()],
            ink_flow: INK_FLOWS[usize::from(digest[4]) % INK_FLOWS.len()],
            pressure_variation: unit(digest[5]),
        };

        debug!(image_ref, ?features, "Heuristic features extracted");
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() {
        let extractor = HeuristicFeatureExtractor::new();
        let a = extractor.extract_features("https://img/1.jpg").await.unwrap();
        let b = extractor.extract_features("https://img/1.jpg").await.unwrap();
        assert_eq!(a, b);
        assert!((0.0..=1.0).contains(&a.stroke_thickness));
        assert!((0.0..=1.0).contains(&a.pressure_variation));
    }

    #[tokio::test]
    async fn test_empty_reference_rejected() {
        let extractor = HeuristicFeatureExtractor::new();
        let result = extractor.extract_features("  ").await;
        assert!(matches!(result, Err(ExtractionError::InvalidInput(_))));
    }
}
