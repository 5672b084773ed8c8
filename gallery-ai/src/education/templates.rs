//! Korean base templates for educational content
//!
//! Every template produces Korean text; the generator adapts it into the
//! requested languages afterwards.

use crate::knowledge::CulturalKnowledgeBase;
use crate::models::{Artwork, CulturalAnalysisResult};
use crate::types::{EducationLevel, Language, MultiLanguageText};

/// Section of the main content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    ArtworkOverview,
    StyleFeatures,
    TextMeaning,
    BrushTechnique,
    Composition,
    StyleLineage,
    PhilosophicalReading,
    ComparativeStudy,
    ScholarlyDebate,
}

const BEGINNER_SECTIONS: &[SectionKind] = &[
    SectionKind::ArtworkOverview,
    SectionKind::StyleFeatures,
    SectionKind::TextMeaning,
];

const INTERMEDIATE_SECTIONS: &[SectionKind] = &[
    SectionKind::StyleFeatures,
    SectionKind::TextMeaning,
    SectionKind::BrushTechnique,
];

const ADVANCED_SECTIONS: &[SectionKind] = &[
    SectionKind::StyleLineage,
    SectionKind::BrushTechnique,
    SectionKind::Composition,
    SectionKind::PhilosophicalReading,
];

const EXPERT_SECTIONS: &[SectionKind] = &[
    SectionKind::StyleLineage,
    SectionKind::PhilosophicalReading,
    SectionKind::ComparativeStudy,
    SectionKind::ScholarlyDebate,
];

pub fn sections_for(level: EducationLevel) -> &'static [SectionKind] {
    match level {
        EducationLevel::Beginner => BEGINNER_SECTIONS,
        EducationLevel::Intermediate => INTERMEDIATE_SECTIONS,
        EducationLevel::Advanced => ADVANCED_SECTIONS,
        EducationLevel::Expert => EXPERT_SECTIONS,
    }
}

pub fn key_term_count(level: EducationLevel) -> usize {
    match level {
        EducationLevel::Beginner => 3,
        EducationLevel::Intermediate => 5,
        EducationLevel::Advanced => 7,
        EducationLevel::Expert => 10,
    }
}

/// Percent required to pass the level assessment
pub fn passing_score(level: EducationLevel) -> u8 {
    match level {
        EducationLevel::Beginner => 60,
        EducationLevel::Intermediate => 70,
        EducationLevel::Advanced => 75,
        EducationLevel::Expert => 80,
    }
}

/// Analysis facts the templates draw on, in Korean where available
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub title: String,
    pub style: Option<String>,
    pub style_characteristics: Vec<String>,
    pub style_artists: Vec<String>,
    pub period: Option<String>,
    pub date_range: Option<String>,
    pub concepts: Vec<String>,
    pub concept_descriptions: Vec<String>,
    pub text: Option<String>,
    pub reading: Option<String>,
    pub meaning: Option<String>,
    pub significance: f64,
}

impl TemplateContext {
    pub fn from_analysis(
        knowledge: &CulturalKnowledgeBase,
        artwork: &Artwork,
        analysis: &CulturalAnalysisResult,
    ) -> Self {
        let style = analysis
            .primary_style()
            .and_then(|s| knowledge.get_style_information(s));
        let period = analysis
            .period()
            .and_then(|p| knowledge.get_historical_period_info(p));
        let concepts: Vec<_> = analysis
            .cultural_analysis
            .as_ref()
            .map(|c| c.concepts.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| knowledge.get_philosophical_concept(id))
            .collect();
        let textual = analysis
            .textual_analysis
            .as_ref()
            .filter(|t| !t.recognition.extracted_text.trim().is_empty());

        Self {
            title: artwork.title.clone(),
            style: style.map(|s| korean(&s.name, &s.id)),
            style_characteristics: style.map(|s| s.characteristics.clone()).unwrap_or_default(),
            style_artists: style.map(|s| s.notable_artists.clone()).unwrap_or_default(),
            period: period.map(|p| korean(&p.name, &p.id)),
            date_range: period.map(|p| p.date_range()),
            concepts: concepts.iter().map(|c| korean(&c.name, &c.id)).collect(),
            concept_descriptions: concepts.iter().map(|c| c.description.clone()).collect(),
            text: textual.map(|t| t.recognition.extracted_text.clone()),
            reading: textual.and_then(|t| t.reading.clone()),
            meaning: textual.and_then(|t| t.meaning.clone()),
            significance: analysis.cultural_significance(),
        }
    }

    fn style_or_default(&self) -> &str {
        self.style.as_deref().unwrap_or("서예")
    }

    /// All base text, for picking relevant key terms
    pub fn corpus(&self) -> String {
        let mut parts = vec![self.title.clone(), self.style_or_default().to_string()];
        parts.extend(self.period.iter().cloned());
        parts.extend(self.concepts.iter().cloned());
        parts.extend(self.text.iter().cloned());
        parts.join(" ")
    }
}

fn korean(name: &MultiLanguageText, fallback: &str) -> String {
    name.get(Language::Korean).unwrap_or(fallback).to_string()
}

pub fn introduction(level: EducationLevel, ctx: &TemplateContext) -> String {
    let style = ctx.style_or_default();
    match level {
        EducationLevel::Beginner => format!(
            "「{}」은 {} 서예 작품입니다. 붓과 먹으로 쓴 글씨를 함께 살펴봅시다.",
            ctx.title, style
        ),
        EducationLevel::Intermediate => format!(
            "「{}」을 통해 {}의 획과 구성을 읽는 방법을 배웁니다.",
            ctx.title, style
        ),
        EducationLevel::Advanced => format!(
            "「{}」을 {}의 계보와 {} 맥락 속에서 분석합니다.",
            ctx.title,
            style,
            ctx.period.as_deref().unwrap_or("시대적")
        ),
        EducationLevel::Expert => format!(
            "「{}」에 대한 서체사적 위치와 사상적 해석을 학술적으로 검토합니다. 문화적 중요도 {:.1}/10.",
            ctx.title, ctx.significance
        ),
    }
}

pub fn section_title(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::ArtworkOverview => "작품 소개",
        SectionKind::StyleFeatures => "서체의 특징",
        SectionKind::TextMeaning => "글귀의 의미",
        SectionKind::BrushTechnique => "필법과 획",
        SectionKind::Composition => "구성과 여백",
        SectionKind::StyleLineage => "서체의 계보",
        SectionKind::PhilosophicalReading => "사상적 해석",
        SectionKind::ComparativeStudy => "비교 연구",
        SectionKind::ScholarlyDebate => "학술적 쟁점",
    }
}

pub fn section_body(kind: SectionKind, ctx: &TemplateContext) -> String {
    let style = ctx.style_or_default();
    match kind {
        SectionKind::ArtworkOverview => format!(
            "이 작품은 {}로 쓰였으며 한지 위에 먹의 농담이 드러납니다.",
            style
        ),
        SectionKind::StyleFeatures => {
            if ctx.style_characteristics.is_empty() {
                format!("{}의 특징은 획의 굵기와 간격에서 드러납니다.", style)
            } else {
                format!("{}의 특징: {}.", style, ctx.style_characteristics.join("; "))
            }
        }
        SectionKind::TextMeaning => match (&ctx.text, &ctx.meaning) {
            (Some(text), Some(meaning)) => format!(
                "글귀 {}({})는 \"{}\"라는 뜻입니다.",
                text,
                ctx.reading.as_deref().unwrap_or(text),
                meaning
            ),
            (Some(text), None) => format!("글귀 {}의 뜻을 사전에서 찾아봅시다.", text),
            _ => "이 작품에서는 읽을 수 있는 글귀가 확인되지 않았습니다.".to_string(),
        },
        SectionKind::BrushTechnique => format!(
            "{}에서는 붓을 세우는 각도와 누르는 힘의 변화가 획의 성격을 결정합니다.",
            style
        ),
        SectionKind::Composition => {
            "글자 사이의 여백과 낙관의 위치가 화면 전체의 균형을 이룹니다.".to_string()
        }
        SectionKind::StyleLineage => {
            if ctx.style_artists.is_empty() {
                format!("{}의 전승 계보는 아직 정리되지 않았습니다.", style)
            } else {
                format!("{}의 대표 서예가: {}.", style, ctx.style_artists.join(", "))
            }
        }
        SectionKind::PhilosophicalReading => {
            if ctx.concepts.is_empty() {
                "작품에서 뚜렷한 사상적 개념은 확인되지 않았습니다.".to_string()
            } else {
                format!(
                    "이 작품은 {}의 개념과 연결됩니다. {}",
                    ctx.concepts.join(", "),
                    ctx.concept_descriptions.join(" ")
                )
            }
        }
        SectionKind::ComparativeStudy => format!(
            "같은 시기 다른 {} 작품과 비교하여 획의 속도와 구성의 차이를 논합니다.",
            style
        ),
        SectionKind::ScholarlyDebate => match (&ctx.period, &ctx.date_range) {
            (Some(period), Some(range)) => format!(
                "{}({}) 귀속의 근거와 한계를 검토합니다.",
                period, range
            ),
            _ => "제작 시기 귀속에 대한 근거가 부족하여 추가 연구가 필요합니다.".to_string(),
        },
    }
}

/// Cultural context sections, for analyses with a historical record
pub fn cultural_context_sections(ctx: &TemplateContext) -> Vec<(String, String)> {
    let mut sections = Vec::new();
    let background = match (&ctx.period, &ctx.date_range) {
        (Some(period), Some(range)) => format!("이 작품은 {}({})의 서예 전통에 속합니다.", period, range),
        _ => "제작 시대는 확인되지 않았습니다.".to_string(),
    };
    sections.push(("시대적 배경".to_string(), background));

    if !ctx.concepts.is_empty() {
        sections.push((
            "문화적 의미".to_string(),
            format!("{}의 가치가 작품에 담겨 있습니다.", ctx.concepts.join(", ")),
        ));
    }
    sections
}

/// (title, instructions, minutes) of the practical exercises for a level
pub fn exercises(level: EducationLevel, ctx: &TemplateContext) -> Vec<(String, String, u32)> {
    let style = ctx.style_or_default();
    let copy = (
        "임서 연습".to_string(),
        format!("{}의 기본 획을 따라 쓰며 붓의 움직임을 익혀 봅시다.", style),
        10,
    );
    let composition = (
        "구성 분석".to_string(),
        "작품의 여백과 글자 배치를 스케치하고 균형을 설명해 봅시다.".to_string(),
        15,
    );
    let essay = (
        "비평문 작성".to_string(),
        "작품의 사상적 배경을 근거로 한 짧은 비평문을 작성해 봅시다.".to_string(),
        20,
    );

    match level {
        EducationLevel::Beginner => Vec::new(),
        EducationLevel::Intermediate => vec![copy],
        EducationLevel::Advanced => vec![copy, composition],
        EducationLevel::Expert => vec![copy, composition, essay],
    }
}

pub fn learning_objectives(ctx: &TemplateContext) -> Vec<String> {
    let mut objectives = vec![format!("{}의 형태적 특징을 설명할 수 있다.", ctx.style_or_default())];
    if ctx.text.is_some() {
        objectives.push("작품 글귀의 뜻과 읽는 법을 이해한다.".to_string());
    }
    if let Some(period) = &ctx.period {
        objectives.push(format!("{} 서예 문화의 특징을 이해한다.", period));
    }
    if !ctx.concepts.is_empty() {
        objectives.push(format!("{}의 개념을 작품과 연결하여 설명할 수 있다.", ctx.concepts.join(", ")));
    }
    objectives
}

pub fn assessment_description(level: EducationLevel) -> &'static str {
    match level {
        EducationLevel::Beginner => "서체 이름과 글귀의 뜻을 말할 수 있다.",
        EducationLevel::Intermediate => "획과 구성의 특징을 작품에서 찾아 설명할 수 있다.",
        EducationLevel::Advanced => "서체의 계보와 시대적 맥락을 근거로 작품을 분석할 수 있다.",
        EducationLevel::Expert => "작품의 귀속과 해석에 대한 학술적 논증을 전개할 수 있다.",
    }
}

pub fn progression_description(level: EducationLevel) -> &'static str {
    match level {
        EducationLevel::Beginner => "작품 감상과 기본 용어 익히기",
        EducationLevel::Intermediate => "획과 구성 읽기",
        EducationLevel::Advanced => "계보와 맥락 분석",
        EducationLevel::Expert => "학술적 해석과 비평",
    }
}
