//! Image understanding components
//!
//! - `feature_extractor` / `ocr`: capability implementations (heuristic stubs)
//! - `style_classifier`: ranks calligraphy styles from a visual feature vector
//! - `text_recognition`: per-character script analysis of extracted text
//!
//! Both classifier and recognizer degrade gracefully: extraction failures
//! produce a documented fallback result, never an error.

pub mod feature_extractor;
pub mod ocr;
pub mod style_classifier;
pub mod text_recognition;

pub use feature_extractor::HeuristicFeatureExtractor;
pub use ocr::PhrasePoolOcr;
pub use style_classifier::{FeatureWeights, StyleClassificationResult, StyleClassifier};
pub use text_recognition::{TextRecognitionEngine, TextRecognitionResult};

use sha2::{Digest, Sha256};

/// Stable digest of an image reference, shared by the heuristic stubs
pub(crate) fn image_digest(image_ref: &str) -> [u8; 32] {
    Sha256::digest(image_ref.as_bytes()).into()
}
