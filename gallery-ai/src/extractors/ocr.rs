//! Phrase Pool OCR
//!
//! Stub implementation of `OcrProvider`. Picks one of a fixed pool of
//! calligraphy phrases from a digest of the image reference and reports
//! per-character confidences in the 0.75-0.99 range. Replace with a real OCR
//! backend for production use.

use super::image_digest;
use crate::types::{ExtractionError, OcrOutput, OcrProvider};
use async_trait::async_trait;

const PHRASE_POOL: [&str; 7] = [
    "和氣致祥",
    "心正筆正",
    "寧靜致遠",
    "天地人",
    "一期一會",
    "마음의 평화",
    "정 깊은 사람",
];

/// Deterministic stand-in for an OCR backend
#[derive(Debug, Default, Clone)]
pub struct PhrasePoolOcr;

impl PhrasePoolOcr {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OcrProvider for PhrasePoolOcr {
    fn name(&self) -> &'static str {
        "PhrasePoolOcr"
    }

    async fn extract_text(&self, image_ref: &str) -> Result<OcrOutput, ExtractionError> {
        if image_ref.trim().is_empty() {
            return Err(ExtractionError::InvalidInput("empty image reference".to_string()));
        }

        let digest = image_digest(image_ref);
        let text = PHRASE_POOL[usize::from(digest[0]) % PHRASE_POOL.len()];

        let confidences = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .enumerate()
            .map(|(i, _)| {
                let byte = digest[(i + 1) % digest.len()];
                0.75 + f64::from(byte % 25) / 100.0
            })
            .collect();

        Ok(OcrOutput {
            text: text.to_string(),
            character_confidences: Some(confidences),
        })
    }
}
