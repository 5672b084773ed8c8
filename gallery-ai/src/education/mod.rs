//! Educational content generation
//!
//! - `templates`: Korean base text per level
//! - `generator`: assembles leveled multi-language content bundles

pub mod generator;
pub mod templates;

pub use generator::{EducationalContentGenerator, PLACEHOLDER_QUALITY_METRICS};
