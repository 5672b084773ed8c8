//! Quality validation
//!
//! - `rubric`: dimension weights and thresholds
//! - `quality_validator`: scoring of analyses and educational content

pub mod quality_validator;
pub mod rubric;

pub use quality_validator::{
    QualityScores, QualityValidator, ValidationReport, ValidationStatus, ValidationTarget,
};
pub use rubric::{DimensionWeights, QualityDimension, QualityThresholds};
