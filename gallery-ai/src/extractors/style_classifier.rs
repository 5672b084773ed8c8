//! Style Classifier
//!
//! Scores a visual feature vector against every known calligraphy style
//! pattern and returns a ranked classification.
//!
//! # Scoring Algorithm
//! Each feature either matches the pattern's expected value (range or enum)
//! and contributes its weight, or contributes nothing:
//!
//! `score = matched weight / total weight`, `confidence = round(score × 100)`
//!
//! Styles are ranked by score descending. Ties keep pattern registration
//! order. The top entry is the primary style, the next three are alternatives.
//!
//! # Failure Policy
//! Degrades gracefully: an extraction failure yields the fixed
//! `mixed-script` / 60% fallback. Only successful classifications are cached.

use crate::cache::MemoCache;
use crate::knowledge::{CulturalKnowledgeBase, ExpectedFeatures};
use crate::types::{FailureContract, FailurePolicy, VisualFeatureExtractor, VisualFeatures};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Style reported when classification cannot run
pub const FALLBACK_STYLE: &str = "mixed-script";
/// Confidence of the fallback classification
pub const FALLBACK_CONFIDENCE: u8 = 60;
/// Number of alternatives reported after the primary style
pub const MAX_ALTERNATIVES: usize = 3;

/// Per-feature weights used when matching a style pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeights {
    pub stroke_thickness: f64,
    pub ink_density: f64,
    pub spacing: f64,
    pub alignment: f64,
    pub ink_flow: f64,
    pub pressure_variation: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            stroke_thickness: 0.20,
            ink_density: 0.15,
            spacing: 0.15,
            alignment: 0.20,
            ink_flow: 0.15,
            pressure_variation: 0.15,
        }
    }
}

impl FeatureWeights {
    pub fn total(&self) -> f64 {
        self.stroke_thickness
            + self.ink_density
            + self.spacing
            + self.alignment
            + self.ink_flow
            + self.pressure_variation
    }

    /// Fraction of total weight matched by `features` (0.0-1.0)
    pub fn match_score(&self, features: &VisualFeatures, expected: &ExpectedFeatures) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }

        let mut matched = 0.0;
        if expected.stroke_thickness.contains(features.stroke_thickness) {
            matched += self.stroke_thickness;
        }
        if expected.ink_density.contains(features.ink_density) {
            matched += self.ink_density;
        }
        if expected.spacing.contains(features.spacing) {
            matched += self.spacing;
        }
        if expected.alignment == features.alignment {
            matched += self.alignment;
        }
        if expected.ink_flow == features.ink_flow {
            matched += self.ink_flow;
        }
        if expected.pressure_variation.contains(features.pressure_variation) {
            matched += self.pressure_variation;
        }

        matched / total
    }
}

/// Known style with its expected visual features
#[derive(Debug, Clone, PartialEq)]
pub struct StylePattern {
    pub style: String,
    pub expected: ExpectedFeatures,
    pub characteristics: Vec<String>,
}

/// Ranked style candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleCandidate {
    pub style: String,
    /// Percent (0-100)
    pub confidence: u8,
}

/// Style classification for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleClassificationResult {
    pub primary_style: String,
    pub alternatives: Vec<StyleCandidate>,
    /// Percent (0-100)
    pub confidence: u8,
    pub characteristics: Vec<String>,
    /// Raw feature vector (absent for the fallback classification)
    pub features: Option<VisualFeatures>,
    pub fallback: bool,
}

impl StyleClassificationResult {
    pub fn fallback() -> Self {
        Self {
            primary_style: FALLBACK_STYLE.to_string(),
            alternatives: Vec::new(),
            confidence: FALLBACK_CONFIDENCE,
            characteristics: vec!["Mixed script composition".to_string()],
            features: None,
            fallback: true,
        }
    }
}

/// Calligraphy style classifier
pub struct StyleClassifier {
    extractor: Arc<dyn VisualFeatureExtractor>,
    patterns: Vec<StylePattern>,
    weights: FeatureWeights,
    cache: Arc<MemoCache<String, StyleClassificationResult>>,
}

impl StyleClassifier {
    /// Create classifier with one pattern per knowledge-base style
    pub fn new(
        extractor: Arc<dyn VisualFeatureExtractor>,
        knowledge: &CulturalKnowledgeBase,
        cache: Arc<MemoCache<String, StyleClassificationResult>>,
    ) -> Self {
        let patterns = knowledge
            .styles()
            .iter()
            .map(|style| StylePattern {
                style: style.id.clone(),
                expected: style.expected_features,
                characteristics: style.characteristics.clone(),
            })
            .collect();

        Self {
            extractor,
            patterns,
            weights: FeatureWeights::default(),
            cache,
        }
    }

    pub fn with_weights(mut self, weights: FeatureWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn patterns(&self) -> &[StylePattern] {
        &self.patterns
    }

    /// Classify the style of the image at `image_ref`
    ///
    /// Never fails; see module docs for the fallback.
    pub async fn classify_style(&self, image_ref: &str) -> StyleClassificationResult {
        let key = image_ref.to_string();
        if let Some(cached) = self.cache.get(&key).await {
            debug!(image_ref, "Style classification cache hit");
            return cached;
        }

        match self.extractor.extract_features(image_ref).await {
            Ok(features) => {
                let result = self.classify_features(&features);
                self.cache.insert(key, result.clone()).await;
                result
            }
            Err(e) => {
                warn!(
                    image_ref,
                    extractor = self.extractor.name(),
                    error = %e,
                    "Feature extraction failed, using fallback classification"
                );
                StyleClassificationResult::fallback()
            }
        }
    }

    /// Rank all patterns against a feature vector
    pub fn classify_features(&self, features: &VisualFeatures) -> StyleClassificationResult {
        let mut ranked: Vec<(&StylePattern, f64)> = self
            .patterns
            .iter()
            .map(|pattern| (pattern, self.weights.match_score(features, &pattern.expected)))
            .collect();

        // sort_by is stable: ties keep registration order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let Some((primary, score)) = ranked.first() else {
            warn!("No style patterns registered, using fallback classification");
            return StyleClassificationResult::fallback();
        };

        let alternatives = ranked
            .iter()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .map(|(pattern, score)| StyleCandidate {
                style: pattern.style.clone(),
                confidence: to_percent(*score),
            })
            .collect();

        let result = StyleClassificationResult {
            primary_style: primary.style.clone(),
            alternatives,
            confidence: to_percent(*score),
            characteristics: primary.characteristics.clone(),
            features: Some(*features),
            fallback: false,
        };

        debug!(
            primary = %result.primary_style,
            confidence = result.confidence,
            "Style classified"
        );
        result
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

impl FailureContract for StyleClassifier {
    fn name(&self) -> &'static str {
        "StyleClassifier"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DegradesGracefully
    }
}

fn to_percent(score: f64) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::HeuristicFeatureExtractor;
    use crate::types::ExtractionError;
    use async_trait::async_trait;

    struct FailingExtractor;

    #[async_trait]
    impl VisualFeatureExtractor for FailingExtractor {
        fn name(&self) -> &'static str {
            "Failing"
        }

        async fn extract_features(&self, _: &str) -> Result<VisualFeatures, ExtractionError> {
            Err(ExtractionError::NotAvailable("offline".to_string()))
        }
    }

    fn classifier(extractor: Arc<dyn VisualFeatureExtractor>) -> StyleClassifier {
        StyleClassifier::new(
            extractor,
            &CulturalKnowledgeBase::new(),
            Arc::new(MemoCache::new(16)),
        )
    }

    #[test]
    fn test_each_style_matches_its_own_pattern() {
        let classifier = classifier(Arc::new(HeuristicFeatureExtractor::new()));
        for pattern in classifier.patterns() {
            let features = pattern.expected.representative();
            let score = classifier.weights.match_score(&features, &pattern.expected);
            assert!((score - 1.0).abs() < f64::EPSILON, "{}", pattern.style);
        }
    }

    #[test]
    fn test_alternatives_ranked_descending() {
        let classifier = classifier(Arc::new(HeuristicFeatureExtractor::new()));
        let features = classifier.patterns()[1].expected.representative();
        let result = classifier.classify_features(&features);

        assert_eq!(result.primary_style, "xingshu");
        assert_eq!(result.alternatives.len(), MAX_ALTERNATIVES);
        assert!(result
            .alternatives
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
        assert!(result.alternatives[0].confidence <= result.confidence);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let zero = FeatureWeights {
            stroke_thickness: 0.0,
            ink_density: 0.0,
            spacing: 0.0,
            alignment: 0.0,
            ink_flow: 0.0,
            pressure_variation: 0.0,
        };
        let classifier = classifier(Arc::new(HeuristicFeatureExtractor::new())).with_weights(zero);
        let features = classifier.patterns()[3].expected.representative();
        let result = classifier.classify_features(&features);

        assert_eq!(result.primary_style, "kaishu");
        assert_eq!(result.alternatives[0].style, "xingshu");
        assert_eq!(result.confidence, 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_uses_fallback_without_caching() {
        let cache = Arc::new(MemoCache::new(16));
        let classifier = StyleClassifier::new(
            Arc::new(FailingExtractor),
            &CulturalKnowledgeBase::new(),
            cache.clone(),
        );

        let result = classifier.classify_style("img://broken").await;
        assert_eq!(result.primary_style, FALLBACK_STYLE);
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
        assert!(result.fallback);
        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_failure_policy() {
        let classifier = classifier(Arc::new(HeuristicFeatureExtractor::new()));
        assert_eq!(classifier.failure_policy(), FailurePolicy::DegradesGracefully);
    }
}
