//! Cultural analysis engine lifecycle tests

mod helpers;

use gallery_ai::models::{AnalysisRequest, AnalysisStage, AnalysisState};
use gallery_ai::store::MemoryStore;
use gallery_ai::workflow::CANCELLED_STAGE;
use gallery_common::GalleryEvent;
use helpers::{
    artwork, kaishu_pipeline, kaishu_pipeline_with_config, pipeline_with, test_config,
    CountingExtractor, FailingExtractor, FixedOcr,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn test_progress_events_in_stage_order() {
    let pipeline = kaishu_pipeline();
    let mut rx = pipeline.events.subscribe();

    let result = pipeline
        .engine
        .perform_cultural_analysis(AnalysisRequest::new(artwork("a1")))
        .await
        .unwrap();

    let mut progress = Vec::new();
    let mut completed = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            GalleryEvent::AnalysisStarted { artwork_id, .. } => assert_eq!(artwork_id, "a1"),
            GalleryEvent::AnalysisProgress { analysis_id, progress: p, .. } => {
                assert_eq!(analysis_id, result.id);
                progress.push(p);
            }
            GalleryEvent::AnalysisCompleted { analysis_id, .. } => {
                assert_eq!(analysis_id, result.id);
                completed = true;
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    assert_eq!(progress, vec![15, 30, 50, 70, 85, 95]);
    assert!(completed);
    assert_eq!(result.algorithms.len(), 5);
    assert_eq!(result.present_records(), 5);

    let status = pipeline.engine.get_analysis_status(result.id).await.unwrap();
    assert_eq!(status.state, AnalysisState::Completed);
    assert_eq!(status.progress, 100);
}

#[tokio::test]
async fn test_only_requested_stages_run() {
    let pipeline = kaishu_pipeline();
    let request = AnalysisRequest::new(artwork("a1"))
        .with_stages(vec![AnalysisStage::Historical, AnalysisStage::Visual]);

    let result = pipeline.engine.perform_cultural_analysis(request).await.unwrap();

    assert_eq!(result.algorithms, vec!["style-pattern-matching", "period-attribution"]);
    assert!(result.visual_analysis.is_some());
    assert!(result.historical_analysis.is_some());
    assert!(result.textual_analysis.is_none());
    assert!(result.cultural_analysis.is_none());
}

#[tokio::test]
async fn test_future_year_fails_analysis() {
    let pipeline = kaishu_pipeline();
    let id = Uuid::new_v4();
    let err = pipeline
        .engine
        .perform_cultural_analysis_with_id(id, AnalysisRequest::new(artwork("a1").with_year(3000)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "VALIDATION_ERROR");
    let status = pipeline.engine.get_analysis_status(id).await.unwrap();
    assert_eq!(status.state, AnalysisState::Failed);
    assert!(status.current_stage.contains("3000"));
}

#[tokio::test]
async fn test_rejected_request_leaves_no_status() {
    let pipeline = kaishu_pipeline();
    let id = Uuid::new_v4();
    let request = AnalysisRequest::new(artwork("a1")).with_stages(vec![]);

    let err = pipeline
        .engine
        .perform_cultural_analysis_with_id(id, request)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert!(pipeline.engine.get_analysis_status(id).await.is_none());
}

#[tokio::test]
async fn test_cancel_stops_at_next_stage_boundary() {
    let pipeline = pipeline_with(
        Arc::new(MemoryStore::new()),
        Arc::new(CountingExtractor::for_style("kaishu").with_delay(Duration::from_millis(100))),
        Arc::new(FixedOcr::new("和氣致祥")),
    );
    let id = Uuid::new_v4();
    let engine = pipeline.engine.clone();
    let run = tokio::spawn(async move {
        engine
            .perform_cultural_analysis_with_id(id, AnalysisRequest::new(artwork("a1")))
            .await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(pipeline.engine.cancel_analysis(id).await);
    assert!(!pipeline.engine.cancel_analysis(id).await);

    let err = run.await.unwrap().unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let status = pipeline.engine.get_analysis_status(id).await.unwrap();
    assert_eq!(status.state, AnalysisState::Failed);
    assert_eq!(status.current_stage, CANCELLED_STAGE);
}

#[tokio::test]
async fn test_extractor_failure_degrades_to_fallback_style() {
    let pipeline = pipeline_with(
        Arc::new(MemoryStore::new()),
        Arc::new(FailingExtractor),
        Arc::new(FixedOcr::new("마음의 평화")),
    );

    let result = pipeline
        .engine
        .perform_cultural_analysis(AnalysisRequest::new(artwork("a1")))
        .await
        .unwrap();

    let visual = result.visual_analysis.unwrap();
    assert!(visual.classification.fallback);
    assert_eq!(visual.classification.confidence, 60);
}

#[tokio::test]
async fn test_prune_drops_finished_records() {
    let pipeline = kaishu_pipeline();
    let result = pipeline
        .engine
        .perform_cultural_analysis(AnalysisRequest::new(artwork("a1")))
        .await
        .unwrap();

    assert_eq!(pipeline.engine.prune_statuses(chrono::Duration::hours(1)).await, 0);
    assert_eq!(pipeline.engine.prune_statuses(chrono::Duration::seconds(-1)).await, 1);
    assert!(pipeline.engine.get_analysis_status(result.id).await.is_none());
}

#[tokio::test]
async fn test_new_run_prunes_expired_statuses() {
    let mut config = test_config();
    config.cache.status_retention_secs = 0;
    let pipeline = kaishu_pipeline_with_config(&config);

    let first = pipeline
        .engine
        .perform_cultural_analysis(AnalysisRequest::new(artwork("a1")))
        .await
        .unwrap();
    assert!(pipeline.engine.get_analysis_status(first.id).await.is_some());

    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = pipeline
        .engine
        .perform_cultural_analysis(AnalysisRequest::new(artwork("a2")))
        .await
        .unwrap();

    assert!(pipeline.engine.get_analysis_status(first.id).await.is_none());
    let status = pipeline.engine.get_analysis_status(second.id).await.unwrap();
    assert_eq!(status.state, AnalysisState::Completed);
}

#[tokio::test]
async fn test_default_retention_keeps_recent_statuses() {
    let pipeline = kaishu_pipeline();
    let first = pipeline
        .engine
        .perform_cultural_analysis(AnalysisRequest::new(artwork("a1")))
        .await
        .unwrap();
    pipeline
        .engine
        .perform_cultural_analysis(AnalysisRequest::new(artwork("a2")))
        .await
        .unwrap();

    assert!(pipeline.engine.get_analysis_status(first.id).await.is_some());
}
