//! gallery-ai - cultural analysis command-line tool
//!
//! Subcommands:
//! - `analyze`: resolve (and persist) the cultural metadata of an artwork,
//!   optionally generating educational content for it
//! - `search`: ranked knowledge-base search
//! - `init-config`: write a config file holding the compiled defaults
//!
//! Results are printed to stdout as JSON; logs go to stderr. A pipeline
//! failure prints the error envelope and exits with status 1.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gallery_ai::config::{AiConfig, TomlConfig};
use gallery_ai::models::{AnalysisStage, Artwork, EducationRequest};
use gallery_ai::services::MetadataOptions;
use gallery_ai::types::{EducationLevel, Language};
use gallery_ai::{open_store, ApiError, GalleryPipeline};
use gallery_common::config::LoggingConfig;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "gallery-ai",
    version,
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_HASH"),
        ", built ",
        env!("BUILD_TIMESTAMP"),
        ")"
    ),
    about = "Cultural analysis of calligraphy artworks"
)]
struct Cli {
    /// Config file (overrides GALLERY_CONFIG and the per-user file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze an artwork and print its cultural context
    Analyze {
        #[arg(long)]
        artwork_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        image_url: String,
        #[arg(long, allow_hyphen_values = true)]
        year: Option<i32>,
        /// Stages to run (default: all)
        #[arg(long, value_delimiter = ',')]
        stages: Vec<AnalysisStage>,
        /// Ignore cached and stored results
        #[arg(long)]
        force_refresh: bool,
        /// Also generate educational content
        #[arg(long)]
        educational: bool,
        /// Education levels (default from config)
        #[arg(long, value_delimiter = ',')]
        levels: Vec<EducationLevel>,
        /// Content languages (default from config)
        #[arg(long, value_delimiter = ',')]
        languages: Vec<Language>,
    },

    /// Search styles, concepts and periods
    Search {
        query: String,
        #[arg(long, default_value = "english")]
        language: Language,
    },

    /// Write the default configuration to a file
    InitConfig {
        path: PathBuf,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let toml = TomlConfig::load(cli.config.as_deref());
    init_tracing(&toml.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        "Starting gallery-ai"
    );

    match cli.command {
        Command::InitConfig { path, force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to replace it)", path.display());
            }
            TomlConfig::default()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{}", json!({ "written": path.display().to_string() }));
            Ok(())
        }

        Command::Search { query, language } => {
            let config = AiConfig::from_toml(toml)?;
            let pipeline = GalleryPipeline::build(&config, open_store(&config.store).await?);
            let hits = pipeline.knowledge.search_knowledge(&query, language);
            println!("{}", serde_json::to_string_pretty(&hits)?);
            Ok(())
        }

        Command::Analyze {
            artwork_id,
            title,
            image_url,
            year,
            stages,
            force_refresh,
            educational,
            levels,
            languages,
        } => {
            let config = AiConfig::from_toml(toml)?;
            let pipeline = GalleryPipeline::build(&config, open_store(&config.store).await?);

            let mut artwork = Artwork::new(artwork_id, title, image_url);
            if let Some(year) = year {
                artwork = artwork.with_year(year);
            }
            let options = MetadataOptions {
                force_refresh,
                stages: (!stages.is_empty()).then_some(stages),
            };

            let outcome = analyze(
                &pipeline,
                &config,
                artwork,
                &options,
                educational,
                levels,
                languages,
            )
            .await;
            match outcome {
                Ok(output) => {
                    println!("{}", serde_json::to_string_pretty(&output)?);
                    Ok(())
                }
                Err(e) => {
                    warn!(code = e.code(), "Analysis command failed");
                    println!("{}", serde_json::to_string_pretty(&e.envelope())?);
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn analyze(
    pipeline: &GalleryPipeline,
    config: &AiConfig,
    artwork: Artwork,
    options: &MetadataOptions,
    educational: bool,
    levels: Vec<EducationLevel>,
    languages: Vec<Language>,
) -> Result<serde_json::Value, ApiError> {
    let context = pipeline.metadata.get_cultural_metadata(&artwork, options).await?;

    let content = if educational {
        let request = EducationRequest {
            artwork,
            analysis: context.analysis.clone(),
            levels: if levels.is_empty() { config.default_levels.clone() } else { levels },
            languages: if languages.is_empty() {
                config.default_languages.clone()
            } else {
                languages
            },
        };
        Some(pipeline.content.generate_educational_content(request).await?)
    } else {
        None
    };

    Ok(json!({
        "success": true,
        "culturalContext": context,
        "educationalContent": content,
    }))
}
