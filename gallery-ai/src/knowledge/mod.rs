//! Cultural Knowledge Base
//!
//! Static lookup tables of calligraphy styles, philosophical concepts,
//! historical periods, term translations and known phrases. All data is
//! seeded at construction and never mutated afterwards, so a single instance
//! is shared across the pipeline behind `Arc`.
//!
//! # Search Relevance
//! - Title match: +10
//! - Description match: +5
//! - Related concept match: +3
//!
//! Results are sorted by relevance descending; equal scores keep table order.

mod seed;

use crate::types::{Alignment, InkFlow, Language, MultiLanguageText, VisualFeatures};
use serde::{Deserialize, Serialize};

const TITLE_MATCH_WEIGHT: u32 = 10;
const DESCRIPTION_MATCH_WEIGHT: u32 = 5;
const RELATED_CONCEPT_MATCH_WEIGHT: u32 = 3;

// ============================================================================
// Table entries
// ============================================================================

/// Inclusive numeric range for an expected feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Visual features characteristic of a calligraphy style
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedFeatures {
    pub stroke_thickness: FeatureRange,
    pub ink_density: FeatureRange,
    pub spacing: FeatureRange,
    pub alignment: Alignment,
    pub ink_flow: InkFlow,
    pub pressure_variation: FeatureRange,
}

impl ExpectedFeatures {
    /// A feature vector lying at the center of every expected range
    pub fn representative(&self) -> VisualFeatures {
        VisualFeatures {
            stroke_thickness: self.stroke_thickness.midpoint(),
            ink_density: self.ink_density.midpoint(),
            spacing: self.spacing.midpoint(),
            alignment: self.alignment,
            ink_flow: self.ink_flow,
            pressure_variation: self.pressure_variation.midpoint(),
        }
    }
}

/// Calligraphy style entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleInfo {
    pub id: String,
    pub name: MultiLanguageText,
    pub description: String,
    pub characteristics: Vec<String>,
    pub expected_features: ExpectedFeatures,
    pub historical_periods: Vec<String>,
    pub notable_artists: Vec<String>,
    pub related_concepts: Vec<String>,
}

/// Philosophical concept entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhilosophicalConcept {
    pub id: String,
    pub name: MultiLanguageText,
    pub description: String,
    pub origin: String,
    /// Surface forms that signal the concept in artwork text
    pub keywords: Vec<String>,
    pub related_concepts: Vec<String>,
}

/// Historical period entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPeriod {
    pub id: String,
    pub name: MultiLanguageText,
    pub start_year: i32,
    /// `None` for the ongoing period
    pub end_year: Option<i32>,
    pub description: String,
    pub characteristics: Vec<String>,
    pub notable_artists: Vec<String>,
    pub dominant_styles: Vec<String>,
    pub related_concepts: Vec<String>,
}

impl HistoricalPeriod {
    pub fn date_range(&self) -> String {
        match self.end_year {
            Some(end) => format!("{}-{}", self.start_year, end),
            None => format!("{}-present", self.start_year),
        }
    }

    pub fn contains_year(&self, year: i32) -> bool {
        year >= self.start_year && self.end_year.map_or(true, |end| year <= end)
    }
}

/// Korean term with its target-language equivalents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    pub korean: String,
    pub english: String,
    pub japanese: String,
    pub chinese: String,
    /// Single-syllable terms only match whole words (optionally with a particle)
    pub whole_word: bool,
}

impl TermEntry {
    pub fn translation(&self, language: Language) -> &str {
        match language {
            Language::Korean => &self.korean,
            Language::English => &self.english,
            Language::Japanese => &self.japanese,
            Language::Chinese => &self.chinese,
        }
    }
}

/// Known calligraphy phrase with its meaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseEntry {
    pub text: String,
    pub reading: String,
    pub meaning: String,
}

// ============================================================================
// Query results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeKind {
    Style,
    Concept,
    Period,
}

/// Ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSearchHit {
    pub kind: KnowledgeKind,
    pub id: String,
    /// Title in the requested language (english when missing)
    pub title: String,
    pub relevance: u32,
}

/// Knowledge relevant to one artwork
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtworkKnowledge {
    pub style: Option<StyleInfo>,
    pub period: Option<HistoricalPeriod>,
    pub concepts: Vec<PhilosophicalConcept>,
    pub phrase: Option<PhraseEntry>,
}

// ============================================================================
// Knowledge base
// ============================================================================

/// Read-only cultural knowledge tables
#[derive(Debug, Clone)]
pub struct CulturalKnowledgeBase {
    styles: Vec<StyleInfo>,
    concepts: Vec<PhilosophicalConcept>,
    periods: Vec<HistoricalPeriod>,
    terms: Vec<TermEntry>,
    phrases: Vec<PhraseEntry>,
}

impl Default for CulturalKnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl CulturalKnowledgeBase {
    pub fn new() -> Self {
        Self {
            styles: seed::styles(),
            concepts: seed::concepts(),
            periods: seed::periods(),
            terms: seed::terms(),
            phrases: seed::phrases(),
        }
    }

    /// Styles in registration order
    pub fn styles(&self) -> &[StyleInfo] {
        &self.styles
    }

    pub fn concepts(&self) -> &[PhilosophicalConcept] {
        &self.concepts
    }

    pub fn periods(&self) -> &[HistoricalPeriod] {
        &self.periods
    }

    pub fn terms(&self) -> &[TermEntry] {
        &self.terms
    }

    pub fn get_style_information(&self, style: &str) -> Option<&StyleInfo> {
        self.styles.iter().find(|s| s.id.eq_ignore_ascii_case(style))
    }

    pub fn get_philosophical_concept(&self, id: &str) -> Option<&PhilosophicalConcept> {
        self.concepts.iter().find(|c| c.id.eq_ignore_ascii_case(id))
    }

    pub fn get_historical_period_info(&self, period: &str) -> Option<&HistoricalPeriod> {
        self.periods.iter().find(|p| p.id.eq_ignore_ascii_case(period))
    }

    /// First period (in table order) covering `year`
    pub fn period_for_year(&self, year: i32) -> Option<&HistoricalPeriod> {
        self.periods.iter().find(|p| p.contains_year(year))
    }

    /// Target-language equivalent of a Korean term
    pub fn translate_term(&self, korean: &str, language: Language) -> Option<&str> {
        self.terms
            .iter()
            .find(|t| t.korean == korean)
            .map(|t| t.translation(language))
    }

    /// Meaning of a known phrase appearing in `text`
    pub fn phrase_meaning(&self, text: &str) -> Option<&PhraseEntry> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.phrases
            .iter()
            .find(|p| p.text == text)
            .or_else(|| self.phrases.iter().find(|p| text.contains(p.text.as_str())))
    }

    /// Concepts whose keywords occur in `text`, in table order
    pub fn detect_concepts(&self, text: &str) -> Vec<&PhilosophicalConcept> {
        self.concepts
            .iter()
            .filter(|c| c.keywords.iter().any(|kw| contains_keyword(text, kw)))
            .collect()
    }

    /// Ranked search across styles, concepts and periods
    pub fn search_knowledge(&self, query: &str, language: Language) -> Vec<KnowledgeSearchHit> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();

        for style in &self.styles {
            let relevance = score_entry(
                &query,
                &style.id,
                &style.name,
                &style.description,
                &style.related_concepts,
            );
            if relevance > 0 {
                hits.push(hit(KnowledgeKind::Style, &style.id, &style.name, language, relevance));
            }
        }

        for concept in &self.concepts {
            let relevance = score_entry(
                &query,
                &concept.id,
                &concept.name,
                &concept.description,
                &concept.related_concepts,
            );
            if relevance > 0 {
                hits.push(hit(
                    KnowledgeKind::Concept,
                    &concept.id,
                    &concept.name,
                    language,
                    relevance,
                ));
            }
        }

        for period in &self.periods {
            let relevance = score_entry(
                &query,
                &period.id,
                &period.name,
                &period.description,
                &period.related_concepts,
            );
            if relevance > 0 {
                hits.push(hit(
                    KnowledgeKind::Period,
                    &period.id,
                    &period.name,
                    language,
                    relevance,
                ));
            }
        }

        // sort_by is stable: ties keep table order
        hits.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        hits
    }

    /// Style, period, concepts and phrase relevant to an artwork
    ///
    /// Concepts come from the style's related concepts followed by concepts
    /// detected in the text, without duplicates.
    pub fn get_cultural_context_for_artwork(
        &self,
        style: Option<&str>,
        period: Option<&str>,
        text: Option<&str>,
    ) -> ArtworkKnowledge {
        let style_info = style.and_then(|s| self.get_style_information(s));
        let period_info = period.and_then(|p| self.get_historical_period_info(p));

        let mut concepts: Vec<PhilosophicalConcept> = Vec::new();
        let related = style_info
            .map(|s| s.related_concepts.as_slice())
            .unwrap_or_default();
        for id in related {
            if let Some(concept) = self.get_philosophical_concept(id) {
                if !concepts.iter().any(|c| c.id == concept.id) {
                    concepts.push(concept.clone());
                }
            }
        }
        if let Some(text) = text {
            for concept in self.detect_concepts(text) {
                if !concepts.iter().any(|c| c.id == concept.id) {
                    concepts.push(concept.clone());
                }
            }
        }

        ArtworkKnowledge {
            style: style_info.cloned(),
            period: period_info.cloned(),
            concepts,
            phrase: text.and_then(|t| self.phrase_meaning(t)).cloned(),
        }
    }
}

fn score_entry(
    query: &str,
    id: &str,
    name: &MultiLanguageText,
    description: &str,
    related: &[String],
) -> u32 {
    let mut relevance = 0;

    let title_match = id.to_lowercase().contains(query)
        || Language::ALL
            .iter()
            .filter_map(|l| name.get(*l))
            .any(|title| title.to_lowercase().contains(query));
    if title_match {
        relevance += TITLE_MATCH_WEIGHT;
    }
    if description.to_lowercase().contains(query) {
        relevance += DESCRIPTION_MATCH_WEIGHT;
    }
    if related.iter().any(|r| r.to_lowercase().contains(query)) {
        relevance += RELATED_CONCEPT_MATCH_WEIGHT;
    }

    relevance
}

fn hit(
    kind: KnowledgeKind,
    id: &str,
    name: &MultiLanguageText,
    language: Language,
    relevance: u32,
) -> KnowledgeSearchHit {
    let title = name
        .get(language)
        .or_else(|| name.get(Language::English))
        .unwrap_or(id)
        .to_string();
    KnowledgeSearchHit {
        kind,
        id: id.to_string(),
        title,
        relevance,
    }
}

/// Keyword test: ASCII keywords match whole words, others match substrings
pub(crate) fn contains_keyword(text: &str, keyword: &str) -> bool {
    if keyword.is_ascii() {
        let keyword = keyword.to_lowercase();
        text.split(|c: char| !c.is_ascii_alphanumeric() && c != '-')
            .any(|word| word.to_lowercase() == keyword)
    } else {
        text.contains(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_lookup() {
        let kb = CulturalKnowledgeBase::new();
        let kaishu = kb.get_style_information("kaishu").unwrap();
        assert_eq!(kaishu.name.get(Language::English), Some("Regular Script"));
        assert!(kb.get_style_information("unknown-style").is_none());
    }

    #[test]
    fn test_styles_registration_order() {
        let kb = CulturalKnowledgeBase::new();
        assert_eq!(kb.styles()[0].id, "kaishu");
        assert_eq!(kb.styles().last().unwrap().id, "mixed-script");
    }

    #[test]
    fn test_search_ranks_title_above_description() {
        let kb = CulturalKnowledgeBase::new();
        let hits = kb.search_knowledge("harmony", Language::English);
        assert!(!hits.is_empty());
        assert_eq!(hits[0].id, "harmony");
        assert!(hits[0].relevance >= TITLE_MATCH_WEIGHT);
        assert!(hits.windows(2).all(|w| w[0].relevance >= w[1].relevance));
    }

    #[test]
    fn test_search_ties_keep_table_order() {
        let kb = CulturalKnowledgeBase::new();
        let hits = kb.search_knowledge("qi", Language::English);
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["qi", "xingshu", "caoshu", "yin-yang", "mind-cultivation", "tang", "song"]
        );
        assert_eq!(hits[0].relevance, TITLE_MATCH_WEIGHT);
        assert!(hits[1..]
            .iter()
            .all(|h| h.relevance == RELATED_CONCEPT_MATCH_WEIGHT));
        assert_eq!(hits[1].kind, KnowledgeKind::Style);
        assert_eq!(hits[3].kind, KnowledgeKind::Concept);
        assert_eq!(hits[5].kind, KnowledgeKind::Period);
    }

    #[test]
    fn test_search_returns_title_in_language() {
        let kb = CulturalKnowledgeBase::new();
        let hits = kb.search_knowledge("kaishu", Language::Korean);
        assert_eq!(hits[0].title, "해서");
    }

    #[test]
    fn test_search_empty_query() {
        let kb = CulturalKnowledgeBase::new();
        assert!(kb.search_knowledge("   ", Language::English).is_empty());
    }

    #[test]
    fn test_translate_term() {
        let kb = CulturalKnowledgeBase::new();
        assert_eq!(kb.translate_term("서예", Language::English), Some("calligraphy"));
        assert_eq!(kb.translate_term("서예", Language::Japanese), Some("書道"));
        assert_eq!(kb.translate_term("없는말", Language::English), None);
    }

    #[test]
    fn test_phrase_meaning() {
        let kb = CulturalKnowledgeBase::new();
        let phrase = kb.phrase_meaning("和氣致祥").unwrap();
        assert_eq!(phrase.reading, "화기치상");
        assert!(kb.phrase_meaning("").is_none());
    }

    #[test]
    fn test_detect_concepts() {
        let kb = CulturalKnowledgeBase::new();
        let ids: Vec<&str> = kb
            .detect_concepts("和氣致祥")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert!(ids.contains(&"harmony"));
        assert!(ids.contains(&"qi"));
    }

    #[test]
    fn test_ascii_keyword_matches_whole_word() {
        assert!(contains_keyword("the han of a people", "han"));
        assert!(!contains_keyword("a steady hand", "han"));
    }

    #[test]
    fn test_period_for_year() {
        let kb = CulturalKnowledgeBase::new();
        assert_eq!(kb.period_for_year(1600).unwrap().id, "joseon");
        assert_eq!(kb.period_for_year(2020).unwrap().id, "modern");
        assert_eq!(kb.get_historical_period_info("joseon").unwrap().date_range(), "1392-1897");
    }

    #[test]
    fn test_cultural_context_dedupes_concepts() {
        let kb = CulturalKnowledgeBase::new();
        let context = kb.get_cultural_context_for_artwork(
            Some("kaishu"),
            Some("joseon"),
            Some("和氣致祥"),
        );
        assert!(context.style.is_some());
        assert!(context.period.is_some());
        assert!(context.phrase.is_some());

        let ids: std::collections::HashSet<&str> =
            context.concepts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), context.concepts.len());
        assert!(ids.contains("mind-cultivation"));
        assert!(ids.contains("fortune"));
    }
}
