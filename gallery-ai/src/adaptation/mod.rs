//! Multilingual content adaptation

pub mod multilingual;

pub use multilingual::{AdaptationContext, Formality, MultilingualContentAdapter};
