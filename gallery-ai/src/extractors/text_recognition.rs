//! Text Recognition Engine
//!
//! Runs the OCR provider on an artwork image and analyzes every extracted
//! character:
//! - Script family by Unicode range (Hangul syllables, CJK ideographs,
//!   punctuation set, symbol set, else unknown)
//! - Stroke count from a lookup table with a default fallback
//! - Plausible OCR confusion alternatives for known characters
//!
//! # Language Detection
//! Counts Hangul and CJK characters. Primary language is chinese only when
//! CJK characters exceed 70% of the Hangul+CJK total, otherwise korean.
//!
//! # Readability
//! `mean confidence × fraction of characters above 0.8 confidence`
//!
//! # Failure Policy
//! Degrades gracefully: OCR failure yields an empty result. Only successful
//! recognitions are cached.

use crate::cache::MemoCache;
use crate::types::{FailureContract, FailurePolicy, Language, OcrProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

const CHINESE_THRESHOLD: f64 = 0.70;
const HIGH_CONFIDENCE_FLOOR: f64 = 0.80;
const DEFAULT_CONFIDENCE: f64 = 0.90;
const DEFAULT_STROKE_COUNT: u32 = 8;
/// Side length of the layout cell assigned to each character
const CELL_SIZE: u32 = 64;

const PUNCTUATION: &[char] = &[
    '。', '，', '、', '！', '？', '：', '；', '「', '」', '『', '』', '（', '）', '《', '》', '·',
    '.', ',', '!', '?', ':', ';', '(', ')', '"', '\'',
];

const SYMBOLS: &[char] = &['○', '●', '◎', '□', '■', '△', '▲', '☆', '★', '※', '〇', '卍'];

const STROKE_COUNTS: &[(char, u32)] = &[
    ('一', 1),
    ('人', 2),
    ('心', 4),
    ('天', 4),
    ('正', 5),
    ('地', 6),
    ('和', 8),
    ('致', 10),
    ('氣', 10),
    ('祥', 11),
    ('筆', 12),
    ('期', 12),
    ('會', 13),
    ('寧', 14),
    ('遠', 14),
    ('靜', 16),
    ('정', 5),
    ('한', 6),
    ('마', 4),
    ('음', 5),
];

const CONFUSIONS: &[(char, &[char])] = &[
    ('和', &['禾', '知']),
    ('氣', &['気', '气']),
    ('致', &['到']),
    ('祥', &['詳', '样']),
    ('正', &['止']),
    ('天', &['夫', '夭']),
    ('人', &['入', '八']),
    ('一', &['ー']),
    ('心', &['必']),
    ('筆', &['笔']),
    ('靜', &['静']),
    ('遠', &['远']),
    ('정', &['점', '청']),
    ('한', &['할', '현']),
];

/// Script family of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    Hangul,
    Cjk,
    Punctuation,
    Symbol,
    Unknown,
}

pub fn classify_script(c: char) -> ScriptType {
    match c {
        '\u{AC00}'..='\u{D7A3}' => ScriptType::Hangul,
        '\u{4E00}'..='\u{9FFF}' => ScriptType::Cjk,
        c if PUNCTUATION.contains(&c) => ScriptType::Punctuation,
        c if SYMBOLS.contains(&c) => ScriptType::Symbol,
        _ => ScriptType::Unknown,
    }
}

pub fn stroke_count(c: char) -> u32 {
    STROKE_COUNTS
        .iter()
        .find(|(ch, _)| *ch == c)
        .map_or(DEFAULT_STROKE_COUNT, |(_, count)| *count)
}

pub fn confusion_alternatives(c: char) -> Vec<char> {
    CONFUSIONS
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, alts)| alts.to_vec())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Recognition record for one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecognition {
    pub character: char,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    pub alternatives: Vec<char>,
    pub script: ScriptType,
    pub stroke_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingDirection {
    TopToBottom,
    LeftToRight,
}

/// Text layout of the artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLayout {
    pub orientation: Orientation,
    pub reading_direction: ReadingDirection,
    pub columns: u32,
}

impl Default for TextLayout {
    /// Fixed layout policy: one vertical column read top to bottom
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            reading_direction: ReadingDirection::TopToBottom,
            columns: 1,
        }
    }
}

/// Language composition estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetection {
    pub primary_language: Language,
    pub hangul_count: usize,
    pub cjk_count: usize,
    /// Percent of Hangul+CJK characters that are Hangul
    pub korean_percentage: f64,
    /// Percent of Hangul+CJK characters that are CJK
    pub chinese_percentage: f64,
}

impl LanguageDetection {
    pub fn from_counts(hangul_count: usize, cjk_count: usize) -> Self {
        let total = hangul_count + cjk_count;
        let (korean_percentage, chinese_percentage) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                hangul_count as f64 / total as f64 * 100.0,
                cjk_count as f64 / total as f64 * 100.0,
            )
        };

        let primary_language = if total > 0 && cjk_count as f64 / total as f64 > CHINESE_THRESHOLD {
            Language::Chinese
        } else {
            Language::Korean
        };

        Self {
            primary_language,
            hangul_count,
            cjk_count,
            korean_percentage,
            chinese_percentage,
        }
    }
}

/// Text recognition for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecognitionResult {
    pub extracted_text: String,
    pub characters: Vec<CharacterRecognition>,
    pub layout: TextLayout,
    pub language_detection: LanguageDetection,
    /// 0.0-1.0
    pub readability_score: f64,
    pub fallback: bool,
}

impl TextRecognitionResult {
    /// All-empty result used when recognition cannot run
    pub fn empty() -> Self {
        Self {
            extracted_text: String::new(),
            characters: Vec::new(),
            layout: TextLayout::default(),
            language_detection: LanguageDetection::from_counts(0, 0),
            readability_score: 0.0,
            fallback: true,
        }
    }
}

/// Text recognition engine
pub struct TextRecognitionEngine {
    ocr: Arc<dyn OcrProvider>,
    cache: Arc<MemoCache<String, TextRecognitionResult>>,
}

impl TextRecognitionEngine {
    pub fn new(
        ocr: Arc<dyn OcrProvider>,
        cache: Arc<MemoCache<String, TextRecognitionResult>>,
    ) -> Self {
        Self { ocr, cache }
    }

    /// Recognize text in the image at `image_ref`
    ///
    /// Never fails; see module docs for the fallback.
    pub async fn recognize_text(&self, image_ref: &str) -> TextRecognitionResult {
        let key = image_ref.to_string();
        if let Some(cached) = self.cache.get(&key).await {
            debug!(image_ref, "Text recognition cache hit");
            return cached;
        }

        match self.ocr.extract_text(image_ref).await {
            Ok(output) => {
                let result = analyze_text(&output.text, output.character_confidences.as_deref());
                self.cache.insert(key, result.clone()).await;
                result
            }
            Err(e) => {
                warn!(
                    image_ref,
                    provider = self.ocr.name(),
                    error = %e,
                    "OCR failed, using empty recognition result"
                );
                TextRecognitionResult::empty()
            }
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

impl FailureContract for TextRecognitionEngine {
    fn name(&self) -> &'static str {
        "TextRecognitionEngine"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DegradesGracefully
    }
}

/// Vertical offset of the cell at `index`, saturating for very long text
fn cell_offset(index: usize) -> u32 {
    u32::try_from(index)
        .unwrap_or(u32::MAX)
        .saturating_mul(CELL_SIZE)
}

/// Analyze extracted text
///
/// `confidences` holds one entry per non-whitespace character; missing
/// entries default to 0.9.
pub fn analyze_text(text: &str, confidences: Option<&[f64]>) -> TextRecognitionResult {
    let mut characters = Vec::new();
    let mut hangul_count = 0;
    let mut cjk_count = 0;

    for (index, character) in text.chars().filter(|c| !c.is_whitespace()).enumerate() {
        let script = classify_script(character);
        match script {
            ScriptType::Hangul => hangul_count += 1,
            ScriptType::Cjk => cjk_count += 1,
            _ => {}
        }

        let confidence = confidences
            .and_then(|c| c.get(index))
            .copied()
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0);

        characters.push(CharacterRecognition {
            character,
            confidence,
            bounding_box: BoundingBox {
                x: 0,
                y: cell_offset(index),
                width: CELL_SIZE,
                height: CELL_SIZE,
            },
            alternatives: confusion_alternatives(character),
            script,
            stroke_count: stroke_count(character),
        });
    }

    let readability_score = readability(&characters);
    let language_detection = LanguageDetection::from_counts(hangul_count, cjk_count);

    debug!(
        characters = characters.len(),
        primary = %language_detection.primary_language,
        readability = readability_score,
        "Text analyzed"
    );

    TextRecognitionResult {
        extracted_text: text.to_string(),
        characters,
        layout: TextLayout::default(),
        language_detection,
        readability_score,
        fallback: false,
    }
}

fn readability(characters: &[CharacterRecognition]) -> f64 {
    if characters.is_empty() {
        return 0.0;
    }
    let count = characters.len() as f64;
    let mean = characters.iter().map(|c| c.confidence).sum::<f64>() / count;
    let confident = characters
        .iter()
        .filter(|c| c.confidence > HIGH_CONFIDENCE_FLOOR)
        .count() as f64;
    mean * (confident / count)
}
