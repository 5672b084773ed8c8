//! Data models for the cultural analysis pipeline

pub mod analysis;
pub mod artwork;
pub mod education;

pub use analysis::{
    AnalysisRequest, AnalysisStage, AnalysisState, AnalysisStatus, CulturalAnalysis,
    CulturalAnalysisResult, HistoricalAnalysis, PhilosophicalAnalysis, TextualAnalysis,
    VisualAnalysis,
};
pub use artwork::{Artwork, CulturalContext, CulturalMetadata};
pub use education::{EducationRequest, EducationalContent, LevelContent};
