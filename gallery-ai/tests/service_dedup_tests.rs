//! Integration tests for service-level de-duplication and bulk generation

mod helpers;

use gallery_ai::models::{AnalysisRequest, EducationRequest};
use gallery_ai::services::{CulturalSearchCriteria, MetadataOptions};
use gallery_ai::store::MemoryStore;
use gallery_ai::types::{EducationLevel, Language};
use helpers::{artwork, kaishu_pipeline, pipeline_with, CountingExtractor, FixedOcr};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_concurrent_identical_generation_runs_once() {
    let pipeline = kaishu_pipeline();
    let artwork = artwork("a1");
    let analysis = pipeline
        .engine
        .perform_cultural_analysis(AnalysisRequest::new(artwork.clone()))
        .await
        .unwrap();

    let request = EducationRequest {
        artwork,
        analysis,
        levels: vec![EducationLevel::Beginner, EducationLevel::Advanced],
        languages: vec![Language::Korean, Language::English, Language::Japanese],
    };
    // Same key with a different order
    let mut reordered = request.clone();
    reordered.levels.reverse();
    reordered.languages.reverse();

    let (a, b) = tokio::join!(
        pipeline.content.generate_educational_content(request),
        pipeline.content.generate_educational_content(reordered),
    );

    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(pipeline.generator.generations(), 1);
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_concurrent_metadata_requests_share_one_analysis() {
    let extractor = Arc::new(
        CountingExtractor::for_style("kaishu").with_delay(Duration::from_millis(30)),
    );
    let pipeline = pipeline_with(
        Arc::new(MemoryStore::new().with_latency(Duration::from_millis(5))),
        extractor.clone(),
        Arc::new(FixedOcr::new("和氣致祥")),
    );
    let artwork = artwork("a1");
    let options = MetadataOptions::default();

    let (a, b) = tokio::join!(
        pipeline.metadata.get_cultural_metadata(&artwork, &options),
        pipeline.metadata.get_cultural_metadata(&artwork, &options),
    );

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(extractor.calls(), 1);
}

#[tokio::test]
async fn test_metadata_served_from_store_after_cache_clear() {
    let extractor = Arc::new(CountingExtractor::for_style("kaishu"));
    let pipeline = pipeline_with(
        Arc::new(MemoryStore::new()),
        extractor.clone(),
        Arc::new(FixedOcr::new("和氣致祥")),
    );
    let artwork = artwork("a1");

    let first = pipeline
        .metadata
        .get_cultural_metadata(&artwork, &MetadataOptions::default())
        .await
        .unwrap();
    pipeline.clear_caches().await;
    let second = pipeline
        .metadata
        .get_cultural_metadata(&artwork, &MetadataOptions::default())
        .await
        .unwrap();

    assert!(first.same_content(&second));
    assert_eq!(extractor.calls(), 1);

    let refreshed = pipeline
        .metadata
        .get_cultural_metadata(
            &artwork,
            &MetadataOptions {
                force_refresh: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_ne!(refreshed.analysis.id, first.analysis.id);
}

#[tokio::test]
async fn test_bulk_generation_reports_each_artwork() {
    let pipeline = kaishu_pipeline();
    let mut artworks: Vec<_> = (1..=7).map(|i| artwork(&format!("a{}", i))).collect();
    artworks.push(artwork("future").with_year(3000));

    let report = pipeline.metadata.bulk_generate_cultural_metadata(&artworks).await;

    assert_eq!(report.batches, 2);
    assert_eq!(report.succeeded.len(), 7);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].artwork_id, "future");
    assert_eq!(report.failed[0].code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_search_over_generated_metadata() {
    let pipeline = kaishu_pipeline();
    let artworks: Vec<_> = (1..=3).map(|i| artwork(&format!("a{}", i))).collect();
    let report = pipeline.metadata.bulk_generate_cultural_metadata(&artworks).await;
    assert!(report.failed.is_empty());

    let hits = pipeline
        .metadata
        .search_artworks_by_cultural_criteria(&CulturalSearchCriteria {
            style: Some("kaishu".into()),
            period: Some("joseon".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);

    let none = pipeline
        .metadata
        .search_artworks_by_cultural_criteria(&CulturalSearchCriteria {
            style: Some("caoshu".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(none.is_empty());
}
