//! Analysis workflow
//!
//! - `analysis_engine`: staged per-artwork cultural analysis
//! - `status`: in-memory progress records and cooperative cancellation

pub mod analysis_engine;
pub mod status;

pub use analysis_engine::CulturalAnalysisEngine;
pub use status::{StatusTracker, CANCELLED_STAGE};
