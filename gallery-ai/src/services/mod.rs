//! Caller-facing services over the analysis pipeline
//!
//! - `cultural_metadata_service`: cached, persisted cultural context per artwork
//! - `educational_content_service`: cached, persisted educational content
//! - `inflight`: at-most-one concurrent generation per request key

pub mod cultural_metadata_service;
pub mod educational_content_service;
pub mod inflight;

pub use cultural_metadata_service::{
    BulkFailure, BulkGenerationReport, CulturalMetadataService, CulturalSearchCriteria,
    MetadataOptions,
};
pub use educational_content_service::{ContentQuery, EducationalContentService};
pub use inflight::InflightRequests;
