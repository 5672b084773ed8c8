//! Configuration for gallery-ai
//!
//! `TomlConfig` mirrors the bootstrap file; every section and field has a
//! compiled default, so a partial file only overrides what it names.
//! `AiConfig` is the typed runtime view built from it, with secrets resolved
//! (environment first, then TOML).

use crate::services::cultural_metadata_service::DEFAULT_BATCH_SIZE;
use crate::services::educational_content_service::{
    DEFAULT_MIN_EFFECTIVENESS, DEFAULT_STALENESS_DAYS,
};
use crate::store::AirtableConfig;
use crate::types::{EducationLevel, Language};
use crate::validators::{DimensionWeights, QualityThresholds};
use gallery_common::config::{
    load_toml_or_default, resolve_secret, write_toml_config, ConfigPathResolver, LoggingConfig,
};
use gallery_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Module name used for the per-user config file (`gallery/gallery-ai.toml`)
pub const MODULE_NAME: &str = "gallery-ai";

const MAX_STALENESS_DAYS: i64 = 36_500;
const MAX_RETENTION_SECS: u64 = 36_500 * 86_400;

/// Environment variable holding the Airtable API key
pub const AIRTABLE_API_KEY_ENV: &str = "GALLERY_AIRTABLE_API_KEY";

/// Cache capacities (entries) and lifetimes (seconds, 0 = no expiry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub classifier_capacity: usize,
    pub recognizer_capacity: usize,
    pub adapter_capacity: usize,
    pub validator_capacity: usize,
    pub metadata_capacity: usize,
    pub metadata_ttl_secs: u64,
    pub content_capacity: usize,
    pub content_ttl_secs: u64,
    /// Finished analysis status records older than this are pruned
    pub status_retention_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            classifier_capacity: 1024,
            recognizer_capacity: 1024,
            adapter_capacity: 4096,
            validator_capacity: 1024,
            metadata_capacity: 512,
            metadata_ttl_secs: 3600,
            content_capacity: 512,
            content_ttl_secs: 3600,
            status_retention_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSection {
    pub thresholds: QualityThresholds,
    pub weights: DimensionWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationSection {
    /// Content older than this is regenerated
    pub staleness_days: i64,
    /// Content less effective than this is regenerated
    pub min_effectiveness: f64,
    pub default_levels: Vec<EducationLevel>,
    pub default_languages: Vec<Language>,
}

impl Default for EducationSection {
    fn default() -> Self {
        Self {
            staleness_days: DEFAULT_STALENESS_DAYS,
            min_effectiveness: DEFAULT_MIN_EFFECTIVENESS,
            default_levels: EducationLevel::ALL.to_vec(),
            default_languages: vec![Language::Korean, Language::English],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkSection {
    pub batch_size: usize,
    pub delay_ms: u64,
}

impl Default for BulkSection {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteSection {
    /// e.g. `sqlite://gallery.db`; the SQLite store is used when set and
    /// Airtable is not configured
    pub url: Option<String>,
}

/// Bootstrap configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub cache: CacheSection,
    pub validator: ValidatorSection,
    pub education: EducationSection,
    pub bulk: BulkSection,
    pub airtable: AirtableConfig,
    pub sqlite: SqliteSection,
}

impl TomlConfig {
    /// Resolve and load the config file (CLI → env → user file → defaults)
    ///
    /// Never fails: an unusable file logs a warning and yields defaults.
    pub fn load(cli_path: Option<&Path>) -> Self {
        let path = ConfigPathResolver::new(MODULE_NAME).resolve(cli_path);
        load_toml_or_default(path.as_deref())
    }

    /// Write this configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        write_toml_config(self, path)?;
        info!(path = %path.display(), "Configuration written");
        Ok(())
    }
}

/// Content store chosen from configuration
#[derive(Debug, Clone, PartialEq)]
pub enum StoreSelection {
    Airtable(AirtableConfig),
    Sqlite(String),
    Memory,
}

/// Typed runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub logging: LoggingConfig,
    pub cache: CacheSection,
    pub thresholds: QualityThresholds,
    pub weights: DimensionWeights,
    pub staleness: chrono::Duration,
    pub min_effectiveness: f64,
    pub default_levels: Vec<EducationLevel>,
    pub default_languages: Vec<Language>,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub store: StoreSelection,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_toml_with_key(TomlConfig::default(), None)
    }
}

impl AiConfig {
    /// Build the runtime view, resolving the Airtable key from the environment
    pub fn from_toml(toml: TomlConfig) -> Result<Self> {
        let api_key = resolve_secret(AIRTABLE_API_KEY_ENV, Some(toml.airtable.api_key.as_str()));
        let config = Self::from_toml_with_key(toml, api_key);
        config.validate()?;
        Ok(config)
    }

    fn from_toml_with_key(toml: TomlConfig, api_key: Option<String>) -> Self {
        let mut airtable = toml.airtable;
        airtable.api_key = api_key.unwrap_or_default();

        let store = if airtable.is_configured() {
            StoreSelection::Airtable(airtable)
        } else if let Some(url) = toml.sqlite.url.filter(|u| !u.trim().is_empty()) {
            StoreSelection::Sqlite(url)
        } else {
            StoreSelection::Memory
        };

        Self {
            logging: toml.logging,
            cache: toml.cache,
            thresholds: toml.validator.thresholds,
            weights: toml.validator.weights,
            staleness: chrono::Duration::days(
                toml.education
                    .staleness_days
                    .clamp(-MAX_STALENESS_DAYS, MAX_STALENESS_DAYS),
            ),
            min_effectiveness: toml.education.min_effectiveness,
            default_levels: toml.education.default_levels,
            default_languages: toml.education.default_languages,
            batch_size: toml.bulk.batch_size.max(1),
            batch_delay: Duration::from_millis(toml.bulk.delay_ms),
            store,
        }
    }

    /// Reject settings that would make scoring or staleness meaningless
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if !(0.0..=10.0).contains(&t.minimum)
            || !(0.0..=10.0).contains(&t.excellent)
            || t.minimum > t.good
            || t.good > t.excellent
        {
            return Err(Error::Config(format!(
                "validator thresholds must satisfy 0 <= minimum <= good <= excellent <= 10, \
                 got {}/{}/{}",
                t.minimum, t.good, t.excellent
            )));
        }
        if self.staleness <= chrono::Duration::zero() {
            return Err(Error::Config("education.staleness_days must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_effectiveness) {
            return Err(Error::Config(format!(
                "education.min_effectiveness must be within 0-1, got {}",
                self.min_effectiveness
            )));
        }
        Ok(())
    }

    pub fn metadata_ttl(&self) -> Option<Duration> {
        ttl(self.cache.metadata_ttl_secs)
    }

    pub fn content_ttl(&self) -> Option<Duration> {
        ttl(self.cache.content_ttl_secs)
    }

    /// How long finished analysis status records stay queryable
    pub fn status_retention(&self) -> chrono::Duration {
        let secs = self.cache.status_retention_secs.min(MAX_RETENTION_SECS);
        chrono::Duration::seconds(secs as i64)
    }
}

fn ttl(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml: TomlConfig = toml::from_str(
            r#"
            [bulk]
            batch_size = 2

            [validator.thresholds]
            minimum = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(toml.bulk.batch_size, 2);
        assert_eq!(toml.bulk.delay_ms, 1000);
        assert_eq!(toml.validator.thresholds.minimum, 5.0);
        assert_eq!(toml.validator.thresholds.good, 7.5);
        assert_eq!(toml.education.staleness_days, 30);
        assert_eq!(toml.logging.level, "info");
    }

    #[test]
    fn test_store_selection() {
        let mut toml = TomlConfig::default();
        assert_eq!(AiConfig::from_toml_with_key(toml.clone(), None).store, StoreSelection::Memory);

        toml.sqlite.url = Some("sqlite://gallery.db".into());
        assert_eq!(
            AiConfig::from_toml_with_key(toml.clone(), None).store,
            StoreSelection::Sqlite("sqlite://gallery.db".into())
        );

        toml.airtable.base_id = "appXYZ".into();
        let config = AiConfig::from_toml_with_key(toml, Some("key".into()));
        assert!(matches!(config.store, StoreSelection::Airtable(ref a) if a.api_key == "key"));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = AiConfig::default();
        config.thresholds.minimum = 8.0;
        config.thresholds.good = 7.0;
        assert_eq!(config.validate().unwrap_err().code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_zero_ttl_disables_expiry() {
        let mut config = AiConfig::default();
        config.cache.metadata_ttl_secs = 0;
        assert_eq!(config.metadata_ttl(), None);
        assert_eq!(config.content_ttl(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_status_retention_is_clamped() {
        let mut config = AiConfig::default();
        assert_eq!(config.status_retention(), chrono::Duration::hours(1));

        config.cache.status_retention_secs = u64::MAX;
        assert_eq!(config.status_retention(), chrono::Duration::days(36_500));
    }
}
