//! Educational Content Generator
//!
//! Builds leveled learning material from a finished cultural analysis.
//!
//! # Generation
//! For each requested level:
//! - Introduction, key terms and main sections from the level's template
//!   (beginner 3 sections, expert 4 scholarly sections)
//! - Cultural context sections, only when the analysis has a historical record
//! - Practical exercises for every level except beginner
//! - Study duration fixed per level (15/30/45/60 minutes)
//!
//! All text is written in Korean first and passed through the
//! `MultilingualContentAdapter` for each requested language.
//!
//! # Quality Metrics
//! `PLACEHOLDER_QUALITY_METRICS` is attached to every bundle. No scoring
//! model exists for generated content yet; the values are fixed.

use super::templates::{self, TemplateContext};
use crate::adaptation::{AdaptationContext, MultilingualContentAdapter};
use crate::knowledge::{CulturalKnowledgeBase, TermEntry};
use crate::models::education::{
    AssessmentCriterion, ContentQualityMetrics, ContentSection, Exercise, InteractiveElement,
    InteractiveKind, KeyTerm, ProgressionStep, QuizQuestion, VisualAid, VisualAidKind,
};
use crate::models::{CulturalAnalysisResult, EducationRequest, EducationalContent, LevelContent};
use crate::types::{EducationLevel, FailureContract, FailurePolicy, Language, MultiLanguageText};
use chrono::Utc;
use gallery_common::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Fixed quality metrics pending a content scoring model
pub const PLACEHOLDER_QUALITY_METRICS: ContentQualityMetrics = ContentQualityMetrics {
    effectiveness: 0.85,
    cultural_accuracy: 0.9,
    engagement: 0.8,
};

/// Educational content generator
pub struct EducationalContentGenerator {
    adapter: Arc<MultilingualContentAdapter>,
    knowledge: Arc<CulturalKnowledgeBase>,
    generations: AtomicU64,
}

impl EducationalContentGenerator {
    pub fn new(
        adapter: Arc<MultilingualContentAdapter>,
        knowledge: Arc<CulturalKnowledgeBase>,
    ) -> Self {
        Self {
            adapter,
            knowledge,
            generations: AtomicU64::new(0),
        }
    }

    /// Number of generations started since construction
    pub fn generations(&self) -> u64 {
        self.generations.load(Ordering::SeqCst)
    }

    /// Generate content for every requested level and language
    pub async fn generate_educational_content(
        &self,
        request: &EducationRequest,
    ) -> Result<EducationalContent> {
        let levels = sorted_unique(&request.levels);
        let languages = sorted_unique(&request.languages);
        if levels.is_empty() {
            return Err(Error::Validation("at least one education level is required".to_string()));
        }
        if languages.is_empty() {
            return Err(Error::Validation("at least one language is required".to_string()));
        }
        if request.analysis.artwork_id != request.artwork.id {
            return Err(Error::Validation(format!(
                "analysis {} belongs to artwork {}, not {}",
                request.analysis.id, request.analysis.artwork_id, request.artwork.id
            )));
        }

        self.generations.fetch_add(1, Ordering::SeqCst);
        let ctx =
            TemplateContext::from_analysis(&self.knowledge, &request.artwork, &request.analysis);

        let mut level_content = Vec::with_capacity(levels.len());
        for level in &levels {
            level_content.push(
                self.generate_level_content(*level, &ctx, &request.analysis, &languages)
                    .await,
            );
        }

        let first_level = levels[0];
        let mut learning_objectives = Vec::new();
        for objective in templates::learning_objectives(&ctx) {
            learning_objectives.push(self.adapt(&objective, first_level, &languages).await);
        }

        let mut assessment_criteria = Vec::new();
        let mut progression_path = Vec::new();
        for level in &levels {
            assessment_criteria.push(AssessmentCriterion {
                level: *level,
                description: self
                    .adapt(templates::assessment_description(*level), *level, &languages)
                    .await,
                passing_score: templates::passing_score(*level),
            });
            progression_path.push(ProgressionStep {
                level: *level,
                prerequisite: level.previous(),
                description: self
                    .adapt(templates::progression_description(*level), *level, &languages)
                    .await,
            });
        }

        let interactive_elements = self
            .interactive_elements(&request.analysis, first_level, &languages)
            .await;
        let visual_aids = self
            .visual_aids(&request.analysis, first_level, &languages)
            .await;

        let now = Utc::now();
        let content = EducationalContent {
            id: Uuid::new_v4(),
            artwork_id: request.artwork.id.clone(),
            languages,
            learning_objectives,
            level_content,
            assessment_criteria,
            interactive_elements,
            visual_aids,
            progression_path,
            quality_metrics: PLACEHOLDER_QUALITY_METRICS,
            created_at: now,
            updated_at: now,
        };

        info!(
            artwork_id = %content.artwork_id,
            content_id = %content.id,
            levels = content.level_content.len(),
            "Educational content generated"
        );
        Ok(content)
    }

    /// Content for a single level
    pub async fn generate_level_content(
        &self,
        level: EducationLevel,
        ctx: &TemplateContext,
        analysis: &CulturalAnalysisResult,
        languages: &[Language],
    ) -> LevelContent {
        let introduction = self
            .adapt(&templates::introduction(level, ctx), level, languages)
            .await;

        let mut sections = Vec::new();
        for kind in templates::sections_for(level) {
            sections.push(ContentSection {
                title: self.adapt(templates::section_title(*kind), level, languages).await,
                body: self
                    .adapt(&templates::section_body(*kind, ctx), level, languages)
                    .await,
            });
        }

        let mut cultural_context = Vec::new();
        if analysis.historical_analysis.is_some() {
            for (title, body) in templates::cultural_context_sections(ctx) {
                cultural_context.push(ContentSection {
                    title: self.adapt(&title, level, languages).await,
                    body: self.adapt(&body, level, languages).await,
                });
            }
        }

        let practical_exercises = if level == EducationLevel::Beginner {
            None
        } else {
            let mut exercises = Vec::new();
            for (title, instructions, minutes) in templates::exercises(level, ctx) {
                exercises.push(Exercise {
                    title: self.adapt(&title, level, languages).await,
                    instructions: self.adapt(&instructions, level, languages).await,
                    minutes,
                });
            }
            Some(exercises)
        };

        debug!(level = %level, sections = sections.len(), "Level content generated");

        LevelContent {
            level,
            introduction,
            key_terms: self.key_terms(level, ctx, languages),
            sections,
            cultural_context,
            practical_exercises,
            quiz: self.quiz(level, analysis, languages).await,
            estimated_minutes: level.study_minutes(),
        }
    }

    async fn adapt(
        &self,
        korean: &str,
        level: EducationLevel,
        languages: &[Language],
    ) -> MultiLanguageText {
        let context = AdaptationContext::for_level(level);
        self.adapter
            .adapt_content(korean, Language::Korean, languages, Some(&context))
            .await
    }

    /// Terms found in the base text first, then the rest of the table
    fn key_terms(
        &self,
        level: EducationLevel,
        ctx: &TemplateContext,
        languages: &[Language],
    ) -> Vec<KeyTerm> {
        let corpus = ctx.corpus();
        let (relevant, rest): (Vec<&TermEntry>, Vec<&TermEntry>) = self
            .knowledge
            .terms()
            .iter()
            .partition(|t| corpus.contains(t.korean.as_str()));

        relevant
            .into_iter()
            .chain(rest)
            .take(templates::key_term_count(level))
            .map(|term| {
                let mut translations = MultiLanguageText::new();
                let always = [Language::Korean, Language::English];
                for language in languages.iter().chain(always.iter()) {
                    translations.set(*language, term.translation(*language));
                }
                KeyTerm {
                    term: term.korean.clone(),
                    translations,
                }
            })
            .collect()
    }

    async fn quiz(
        &self,
        level: EducationLevel,
        analysis: &CulturalAnalysisResult,
        languages: &[Language],
    ) -> Vec<QuizQuestion> {
        let mut questions = Vec::new();

        if let Some(visual) = &analysis.visual_analysis {
            let correct = visual.classification.primary_style.clone();
            let mut options: Vec<String> = std::iter::once(correct.clone())
                .chain(visual.classification.alternatives.iter().map(|a| a.style.clone()))
                .filter_map(|id| self.knowledge.get_style_information(&id))
                .map(|s| s.name.get(Language::Korean).unwrap_or(s.id.as_str()).to_string())
                .collect();
            let correct_name = options.first().cloned();
            options.sort();
            options.dedup();

            let correct_index =
                correct_name.and_then(|c| options.iter().position(|o| *o == c));
            if let Some(correct_index) = correct_index {
                questions.push(
                    self.question("이 작품의 서체는 무엇입니까?", &options, correct_index, level, languages)
                        .await,
                );
            }
        }

        if level != EducationLevel::Beginner {
            if let Some(period) = analysis.period() {
                let mut options: Vec<String> = self
                    .knowledge
                    .periods()
                    .iter()
                    .take(4)
                    .map(|p| p.name.get(Language::Korean).unwrap_or(p.id.as_str()).to_string())
                    .collect();
                let correct = self
                    .knowledge
                    .get_historical_period_info(period)
                    .map(|p| p.name.get(Language::Korean).unwrap_or(p.id.as_str()).to_string());
                if let Some(correct) = correct {
                    if !options.contains(&correct) {
                        options.push(correct.clone());
                    }
                    options.sort();
                    if let Some(index) = options.iter().position(|o| *o == correct) {
                        questions.push(
                            self.question(
                                "이 작품은 어느 시대의 서예 전통에 속합니까?",
                                &options,
                                index,
                                level,
                                languages,
                            )
                                .await,
                        );
                    }
                }
            }
        }

        questions
    }

    async fn question(
        &self,
        question: &str,
        options: &[String],
        correct_index: usize,
        level: EducationLevel,
        languages: &[Language],
    ) -> QuizQuestion {
        let mut adapted_options = Vec::with_capacity(options.len());
        for option in options {
            adapted_options.push(self.adapt(option, level, languages).await);
        }
        QuizQuestion {
            question: self.adapt(question, level, languages).await,
            options: adapted_options,
            correct_index,
        }
    }

    async fn interactive_elements(
        &self,
        analysis: &CulturalAnalysisResult,
        level: EducationLevel,
        languages: &[Language],
    ) -> Vec<InteractiveElement> {
        let mut kinds = vec![
            (InteractiveKind::Quiz, "이해도 확인 퀴즈"),
            (InteractiveKind::ZoomExploration, "획 확대 탐색"),
        ];
        if analysis
            .textual_analysis
            .as_ref()
            .is_some_and(|t| !t.recognition.characters.is_empty())
        {
            kinds.push((InteractiveKind::StrokeTracing, "획순 따라 쓰기"));
        }
        if analysis.period().is_some() {
            kinds.push((InteractiveKind::Timeline, "서예사 연표"));
        }

        let mut elements = Vec::with_capacity(kinds.len());
        for (kind, title) in kinds {
            elements.push(InteractiveElement {
                kind,
                title: self.adapt(title, level, languages).await,
            });
        }
        elements
    }

    async fn visual_aids(
        &self,
        analysis: &CulturalAnalysisResult,
        level: EducationLevel,
        languages: &[Language],
    ) -> Vec<VisualAid> {
        let mut kinds = Vec::new();
        if analysis
            .textual_analysis
            .as_ref()
            .is_some_and(|t| !t.recognition.characters.is_empty())
        {
            kinds.push((VisualAidKind::StrokeOrderDiagram, "주요 글자의 획순 도해"));
        }
        if analysis.visual_analysis.is_some() {
            kinds.push((VisualAidKind::StyleComparison, "서체 비교표"));
        }
        if analysis.period().is_some() {
            kinds.push((VisualAidKind::PeriodTimeline, "시대별 서체 변천 연표"));
        }

        let mut aids = Vec::with_capacity(kinds.len());
        for (kind, description) in kinds {
            aids.push(VisualAid {
                kind,
                description: self.adapt(description, level, languages).await,
            });
        }
        aids
    }
}

impl FailureContract for EducationalContentGenerator {
    fn name(&self) -> &'static str {
        "EducationalContentGenerator"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::FailsRequest
    }
}

fn sorted_unique<T: Ord + Copy>(items: &[T]) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort();
    items.dedup();
    items
}
