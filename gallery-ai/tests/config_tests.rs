//! Configuration loading and secret resolution
//!
//! Tests touching GALLERY_CONFIG or GALLERY_AIRTABLE_API_KEY are #[serial]
//! since they mutate the process environment.

use gallery_ai::config::{AiConfig, StoreSelection, TomlConfig, AIRTABLE_API_KEY_ENV};
use gallery_common::config::CONFIG_ENV_VAR;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

const SAMPLE: &str = r#"
[logging]
level = "debug"

[bulk]
batch_size = 3
delay_ms = 0

[education]
staleness_days = 7
default_languages = ["korean", "japanese"]

[airtable]
base_id = "appGallery"
api_key = "toml-key"
"#;

#[test]
#[serial]
fn test_load_from_cli_path() {
    std::env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gallery-ai.toml");
    fs::write(&path, SAMPLE).unwrap();

    let toml = TomlConfig::load(Some(&path));
    assert_eq!(toml.logging.level, "debug");
    assert_eq!(toml.bulk.batch_size, 3);
    assert_eq!(toml.education.staleness_days, 7);
    assert_eq!(toml.cache.metadata_capacity, 512);
}

#[test]
#[serial]
fn test_env_var_names_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("from-env.toml");
    fs::write(&path, "[bulk]\nbatch_size = 9\n").unwrap();

    std::env::set_var(CONFIG_ENV_VAR, &path);
    let toml = TomlConfig::load(None);
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(toml.bulk.batch_size, 9);
}

#[test]
#[serial]
fn test_malformed_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[bulk\nbatch_size = ").unwrap();

    assert_eq!(TomlConfig::load(Some(&path)), TomlConfig::default());
    assert_eq!(TomlConfig::load(Some(&dir.path().join("missing.toml"))), TomlConfig::default());
}

#[test]
#[serial]
fn test_environment_key_wins_over_toml() {
    let toml: TomlConfig = toml::from_str(SAMPLE).unwrap();

    std::env::set_var(AIRTABLE_API_KEY_ENV, "env-key");
    let config = AiConfig::from_toml(toml.clone()).unwrap();
    std::env::remove_var(AIRTABLE_API_KEY_ENV);

    match config.store {
        StoreSelection::Airtable(airtable) => assert_eq!(airtable.api_key, "env-key"),
        other => panic!("expected airtable store, got {:?}", other),
    }

    let config = AiConfig::from_toml(toml).unwrap();
    match config.store {
        StoreSelection::Airtable(airtable) => assert_eq!(airtable.api_key, "toml-key"),
        other => panic!("expected airtable store, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_runtime_view() {
    std::env::remove_var(AIRTABLE_API_KEY_ENV);
    let mut toml: TomlConfig = toml::from_str(SAMPLE).unwrap();
    toml.airtable.api_key.clear();

    let config = AiConfig::from_toml(toml).unwrap();
    assert_eq!(config.store, StoreSelection::Memory);
    assert_eq!(config.staleness, chrono::Duration::days(7));
    assert_eq!(config.batch_size, 3);
    assert!(config.batch_delay.is_zero());
    assert_eq!(
        config.default_languages,
        vec![gallery_ai::types::Language::Korean, gallery_ai::types::Language::Japanese]
    );
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("gallery-ai.toml");

    let mut toml = TomlConfig::default();
    toml.sqlite.url = Some("sqlite://gallery.db".to_string());
    toml.save(&path).unwrap();

    assert_eq!(TomlConfig::load(Some(&path)), toml);
}

#[test]
fn test_invalid_effectiveness_rejected() {
    let toml: TomlConfig = toml::from_str("[education]\nmin_effectiveness = 1.5\n").unwrap();
    let err = AiConfig::from_toml(toml).unwrap_err();
    assert_eq!(err.code(), "CONFIG_ERROR");
}
