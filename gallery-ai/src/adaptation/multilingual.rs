//! Multilingual Content Adapter
//!
//! Adapts source text into a set of target languages. For each target the
//! adapter applies, in order:
//! 1. Term substitution from the knowledge-base term table (Korean source only,
//!    longest terms first)
//! 2. Explanatory footnotes for recognized Korean concepts (jeong, han)
//! 3. Formality transform selected by per-language rules
//! 4. Punctuation and whitespace normalization
//!
//! This is adaptation, not machine translation. After all targets are
//! produced the korean and english entries are guaranteed present; a
//! back-filled entry is a copy of the other language.
//!
//! Adapted text is cached per (content hash, source, target, context).

use crate::cache::MemoCache;
use crate::knowledge::{contains_keyword, CulturalKnowledgeBase, TermEntry};
use crate::types::{EducationLevel, FailureContract, FailurePolicy, Language, MultiLanguageText};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

/// Korean particles that may follow a whole-word term
const PARTICLES: &[&str] = &[
    "이", "가", "은", "는", "을", "를", "의", "과", "와", "에", "도", "으로", "로",
];

/// Register of the adapted text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Casual,
    #[default]
    Polite,
    Formal,
}

/// Context that changes how text is adapted (part of the cache key)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdaptationContext {
    pub audience: Option<EducationLevel>,
    pub formality: Formality,
    pub domain: Option<String>,
}

impl AdaptationContext {
    pub fn for_level(level: EducationLevel) -> Self {
        let formality = match level {
            EducationLevel::Beginner => Formality::Polite,
            _ => Formality::Formal,
        };
        Self {
            audience: Some(level),
            formality,
            domain: Some("calligraphy".to_string()),
        }
    }
}

/// Multilingual content adapter
pub struct MultilingualContentAdapter {
    knowledge: Arc<CulturalKnowledgeBase>,
    cache: Arc<MemoCache<String, String>>,
}

impl MultilingualContentAdapter {
    pub fn new(
        knowledge: Arc<CulturalKnowledgeBase>,
        cache: Arc<MemoCache<String, String>>,
    ) -> Self {
        Self { knowledge, cache }
    }

    /// Adapt `text` from `source` into every language of `targets`
    ///
    /// The result always contains the source text, every target, and
    /// non-empty korean and english entries when `text` is non-empty.
    pub async fn adapt_content(
        &self,
        text: &str,
        source: Language,
        targets: &[Language],
        context: Option<&AdaptationContext>,
    ) -> MultiLanguageText {
        let default_context = AdaptationContext::default();
        let context = context.unwrap_or(&default_context);

        let mut result = MultiLanguageText::single(source, text);

        for &target in targets {
            if target == source || result.has(target) {
                continue;
            }

            let key = cache_key(text, source, target, context);
            let adapted = match self.cache.get(&key).await {
                Some(hit) => hit,
                None => {
                    let adapted = self.adapt_single(text, source, target, context);
                    self.cache.insert(key, adapted.clone()).await;
                    adapted
                }
            };
            result.set(target, adapted);
        }

        result.ensure_complete();
        result
    }

    /// Adapt into one target language, uncached
    pub fn adapt_single(
        &self,
        text: &str,
        source: Language,
        target: Language,
        context: &AdaptationContext,
    ) -> String {
        let substituted = if source == Language::Korean {
            self.substitute_terms(text, target)
        } else {
            text.to_string()
        };
        let explained = add_explanations(&substituted, target);
        let formal = apply_formality(&explained, target, context.formality);
        let normalized = normalize_punctuation(&formal, target);

        debug!(%source, %target, chars = normalized.chars().count(), "Content adapted");
        normalized
    }

    fn substitute_terms(&self, text: &str, target: Language) -> String {
        let mut terms: Vec<&TermEntry> = self.knowledge.terms().iter().collect();
        // stable: equal lengths keep table order
        terms.sort_by(|a, b| b.korean.chars().count().cmp(&a.korean.chars().count()));

        let mut output = text.to_string();
        for term in terms.iter().filter(|t| !t.whole_word) {
            output = output.replace(term.korean.as_str(), term.translation(target));
        }

        let whole_words: Vec<&&TermEntry> = terms.iter().filter(|t| t.whole_word).collect();
        output
            .split(' ')
            .map(|token| {
                whole_words
                    .iter()
                    .find_map(|term| replace_whole_word(token, term, target))
                    .unwrap_or_else(|| token.to_string())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }
}

impl FailureContract for MultilingualContentAdapter {
    fn name(&self) -> &'static str {
        "MultilingualContentAdapter"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DegradesGracefully
    }
}

fn cache_key(
    text: &str,
    source: Language,
    target: Language,
    context: &AdaptationContext,
) -> String {
    let context_json = serde_json::to_string(context).unwrap_or_default();
    format!(
        "{:x}:{}:{}:{}",
        Sha256::digest(text.as_bytes()),
        source,
        target,
        context_json
    )
}

/// Replace a token that is the term, optionally followed by a particle
fn replace_whole_word(token: &str, term: &TermEntry, target: Language) -> Option<String> {
    let rest = token.strip_prefix(term.korean.as_str())?;
    let (suffix, tail) = split_particle(rest);
    if suffix.is_empty() || PARTICLES.contains(&suffix) {
        Some(format!("{}{}{}", term.translation(target), suffix, tail))
    } else {
        None
    }
}

/// Split `rest` into a leading alphanumeric run and trailing punctuation
fn split_particle(rest: &str) -> (&str, &str) {
    let end = rest
        .char_indices()
        .find(|(_, c)| !c.is_alphanumeric())
        .map_or(rest.len(), |(i, _)| i);
    rest.split_at(end)
}

fn add_explanations(text: &str, target: Language) -> String {
    let notes: &[(&str, &str)] = match target {
        Language::English => &[
            ("jeong", "* Jeong: a Korean sense of deep, lasting affection between people."),
            ("han", "* Han: a Korean sense of collective sorrow, longing and resilience."),
        ],
        Language::Japanese => &[
            ("情(ジョン)", "※ ジョン(情): 人と人との深く長く続く愛着を表す韓国の概念。"),
            ("恨(ハン)", "※ ハン(恨): 集団的な悲しみと回復力を表す韓国の概念。"),
        ],
        Language::Chinese => &[
            ("情", "注：情（정）指韩国人之间深厚持久的情感纽带。"),
            ("恨", "注：恨（한）指韩国文化中集体的哀伤与坚韧。"),
        ],
        Language::Korean => &[],
    };

    let mut output = text.to_string();
    for (marker, note) in notes {
        if contains_keyword(text, marker) && !output.contains(note) {
            output.push_str("\n\n");
            output.push_str(note);
        }
    }
    output
}

fn formality_rules(
    target: Language,
    formality: Formality,
) -> &'static [(&'static str, &'static str)] {
    match (target, formality) {
        (_, Formality::Casual) => &[],
        (Language::Japanese, Formality::Polite) => &[
            ("である。", "です。"),
            ("だ。", "です。"),
            ("する。", "します。"),
        ],
        (Language::Japanese, Formality::Formal) => &[
            ("である。", "であります。"),
            ("だ。", "でございます。"),
            ("です。", "でございます。"),
            ("する。", "いたします。"),
        ],
        (Language::English, _) => &[
            ("don't", "do not"),
            ("can't", "cannot"),
            ("won't", "will not"),
            ("isn't", "is not"),
            ("it's", "it is"),
            ("we're", "we are"),
            ("you're", "you are"),
            ("let's", "let us"),
        ],
        (Language::Chinese, _) => &[("你", "您")],
        (Language::Korean, Formality::Formal) => &[
            ("이에요.", "입니다."),
            ("예요.", "입니다."),
            ("해요.", "합니다."),
        ],
        (Language::Korean, Formality::Polite) => &[],
    }
}

fn apply_formality(text: &str, target: Language, formality: Formality) -> String {
    let mut output = text.to_string();
    for (from, to) in formality_rules(target, formality) {
        output = output.replace(from, to);
        if target == Language::English {
            output = output.replace(&capitalize(from), &capitalize(to));
        }
    }
    output
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn normalize_punctuation(text: &str, target: Language) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| match target {
            Language::Japanese | Language::Chinese => full_width_punctuation(line, target),
            Language::English | Language::Korean => collapse_spaces(line),
        })
        .collect();
    lines.join("\n").trim().to_string()
}

fn full_width_punctuation(line: &str, target: Language) -> String {
    let comma = if target == Language::Japanese { '、' } else { '，' };
    let mut output = String::with_capacity(line.len());
    let mut previous: Option<char> = None;

    for c in line.chars() {
        let after_wide = previous.is_some_and(|p| !p.is_ascii());
        let mapped = match c {
            ',' if after_wide => comma,
            '.' if after_wide => '。',
            '!' if after_wide => '！',
            '?' if after_wide => '？',
            ' ' if previous.is_some_and(|p| matches!(p, '、' | '，' | '。' | '！' | '？')) => {
                continue;
            }
            other => other,
        };
        output.push(mapped);
        previous = Some(mapped);
    }
    output.trim_end().to_string()
}

fn collapse_spaces(line: &str) -> String {
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .replace(" .", ".")
        .replace(" ,", ",")
        .replace(" !", "!")
        .replace(" ?", "?")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> MultilingualContentAdapter {
        MultilingualContentAdapter::new(
            Arc::new(CulturalKnowledgeBase::new()),
            Arc::new(MemoCache::new(64)),
        )
    }

    #[tokio::test]
    async fn test_term_substitution_longest_first() {
        let adapter = adapter();
        let result = adapter
            .adapt_content("한지 위의 서예", Language::Korean, &[Language::English], None)
            .await;
        assert_eq!(
            result.get(Language::English),
            Some("hanji (Korean mulberry paper) 위의 calligraphy")
        );
    }

    #[tokio::test]
    async fn test_whole_word_terms_keep_particles() {
        let adapter = adapter();
        let result = adapter
            .adapt_content("정이 깊은 한국의 붓", Language::Korean, &[Language::English], None)
            .await;
        let english = result.get(Language::English).unwrap();
        assert!(english.starts_with("jeong이 깊은 한국의 brush"));
        assert!(english.contains("* Jeong:"));
        assert!(!english.contains("* Han:"));
    }

    #[tokio::test]
    async fn test_korean_and_english_always_present() {
        let adapter = adapter();
        let result = adapter
            .adapt_content("서예 작품", Language::Korean, &[Language::Japanese], None)
            .await;
        assert!(result.has(Language::Korean));
        assert!(result.has(Language::English));
        assert_eq!(result.get(Language::Japanese), Some("書道 작품"));
    }

    #[tokio::test]
    async fn test_results_are_cached() {
        let adapter = adapter();
        let targets = [Language::English, Language::Chinese];
        adapter.adapt_content("붓과 먹", Language::Korean, &targets, None).await;
        assert_eq!(adapter.cache_len().await, 2);

        adapter.adapt_content("붓과 먹", Language::Korean, &targets, None).await;
        assert_eq!(adapter.cache_len().await, 2);

        let formal = AdaptationContext {
            formality: Formality::Formal,
            ..AdaptationContext::default()
        };
        adapter
            .adapt_content("붓과 먹", Language::Korean, &targets, Some(&formal))
            .await;
        assert_eq!(adapter.cache_len().await, 4);

        adapter.clear_cache().await;
        assert_eq!(adapter.cache_len().await, 0);
    }

    #[test]
    fn test_formality_rules() {
        assert_eq!(
            apply_formality("It's simple. Don't rush.", Language::English, Formality::Polite),
            "It is simple. Do not rush."
        );
        assert_eq!(
            apply_formality("これは書道だ。", Language::Japanese, Formality::Polite),
            "これは書道です。"
        );
        assert_eq!(apply_formality("你好", Language::Chinese, Formality::Formal), "您好");
        assert_eq!(
            apply_formality("It's simple.", Language::English, Formality::Casual),
            "It's simple."
        );
    }

    #[test]
    fn test_punctuation_normalization() {
        assert_eq!(
            normalize_punctuation("書道, 墨.", Language::Chinese),
            "書道，墨。"
        );
        assert_eq!(
            normalize_punctuation("brush  and   ink .", Language::English),
            "brush and ink."
        );
    }
}
