//! # Gallery Common Library
//!
//! Shared code for the gallery services including:
//! - Error kinds with machine-readable codes
//! - Configuration file resolution and TOML loading
//! - Event types and the in-process event bus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{EventBus, GalleryEvent};
