//! In-memory analysis status tracking
//!
//! Status records live only in process memory and are lost on restart.
//! Cancellation is cooperative: `cancel` marks the record failed and trips
//! the run's token, and the engine observes the token at the next stage
//! boundary.

use crate::models::{AnalysisState, AnalysisStatus};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Stage description written when a run is cancelled
pub const CANCELLED_STAGE: &str = "Cancelled";

struct TrackedAnalysis {
    status: AnalysisStatus,
    cancel_token: CancellationToken,
}

/// Status map shared by all analysis runs
#[derive(Default)]
pub struct StatusTracker {
    entries: RwLock<HashMap<Uuid, TrackedAnalysis>>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run and move it straight to processing
    pub async fn start(&self, id: Uuid, artwork_id: &str) -> CancellationToken {
        let mut status = AnalysisStatus::new(id, artwork_id);
        status.state = AnalysisState::Processing;
        status.current_stage = "Starting".to_string();

        let cancel_token = CancellationToken::new();
        self.entries.write().await.insert(
            id,
            TrackedAnalysis {
                status,
                cancel_token: cancel_token.clone(),
            },
        );
        cancel_token
    }

    /// Record progress of a processing run; terminal records are left as is
    pub async fn update(
        &self,
        id: Uuid,
        progress: u8,
        stage: &str,
        estimated_completion: Option<DateTime<Utc>>,
    ) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&id) {
            if entry.status.state.is_terminal() {
                return;
            }
            entry.status.progress = progress.min(100);
            entry.status.current_stage = stage.to_string();
            entry.status.estimated_completion = estimated_completion;
            entry.status.updated_at = Utc::now();
        }
    }

    /// Mark a processing run completed
    ///
    /// Returns `false` when the record is unknown or already terminal, which
    /// is how a cancel landing after the last stage boundary is detected.
    pub async fn complete(&self, id: Uuid) -> bool {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(&id) else {
            return false;
        };
        if entry.status.state.is_terminal() {
            return false;
        }
        entry.status.state = AnalysisState::Completed;
        entry.status.progress = 100;
        entry.status.current_stage = "Completed".to_string();
        entry.status.estimated_completion = None;
        entry.status.updated_at = Utc::now();
        true
    }

    /// Mark a run failed with `message` as its stage description
    ///
    /// A run already cancelled keeps its cancellation record.
    pub async fn fail(&self, id: Uuid, message: &str) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&id) {
            if entry.status.state.is_terminal() {
                return;
            }
            entry.status.state = AnalysisState::Failed;
            entry.status.current_stage = message.to_string();
            entry.status.estimated_completion = None;
            entry.status.updated_at = Utc::now();
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<AnalysisStatus> {
        self.entries.read().await.get(&id).map(|e| e.status.clone())
    }

    /// Cancel a processing run
    ///
    /// Returns `false` when the run is unknown or already terminal.
    pub async fn cancel(&self, id: Uuid) -> bool {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(&id) else {
            return false;
        };
        if entry.status.state != AnalysisState::Processing {
            return false;
        }

        entry.status.state = AnalysisState::Failed;
        entry.status.current_stage = CANCELLED_STAGE.to_string();
        entry.status.estimated_completion = None;
        entry.status.updated_at = Utc::now();
        entry.cancel_token.cancel();

        info!(analysis_id = %id, "Analysis cancelled");
        true
    }

    /// Drop terminal records last updated before `now - retention`
    pub async fn prune(&self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !(e.status.state.is_terminal() && e.status.updated_at < cutoff));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Pruned analysis status records");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle() {
        let tracker = StatusTracker::new();
        let id = Uuid::new_v4();
        tracker.start(id, "a1").await;

        let status = tracker.get(id).await.unwrap();
        assert_eq!(status.state, AnalysisState::Processing);

        tracker.update(id, 50, "Cultural context analysis", None).await;
        assert_eq!(tracker.get(id).await.unwrap().progress, 50);

        assert!(tracker.complete(id).await);
        let status = tracker.get(id).await.unwrap();
        assert_eq!(status.state, AnalysisState::Completed);
        assert_eq!(status.progress, 100);

        // Terminal records ignore later updates
        tracker.fail(id, "late failure").await;
        assert_eq!(tracker.get(id).await.unwrap().state, AnalysisState::Completed);
    }

    #[tokio::test]
    async fn test_cancel_only_while_processing() {
        let tracker = StatusTracker::new();
        let id = Uuid::new_v4();
        let token = tracker.start(id, "a1").await;

        assert!(tracker.cancel(id).await);
        assert!(token.is_cancelled());
        let status = tracker.get(id).await.unwrap();
        assert_eq!(status.state, AnalysisState::Failed);
        assert_eq!(status.current_stage, CANCELLED_STAGE);

        assert!(!tracker.cancel(id).await);
        assert!(!tracker.cancel(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_complete_after_cancel_keeps_cancellation() {
        let tracker = StatusTracker::new();
        let id = Uuid::new_v4();
        tracker.start(id, "a1").await;

        assert!(tracker.cancel(id).await);
        assert!(!tracker.complete(id).await);

        let status = tracker.get(id).await.unwrap();
        assert_eq!(status.state, AnalysisState::Failed);
        assert_eq!(status.current_stage, CANCELLED_STAGE);
        assert!(!tracker.complete(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_prune_keeps_running_records() {
        let tracker = StatusTracker::new();
        let done = Uuid::new_v4();
        let running = Uuid::new_v4();
        tracker.start(done, "a1").await;
        tracker.start(running, "a2").await;
        tracker.complete(done).await;

        assert_eq!(tracker.prune(Duration::seconds(-1)).await, 1);
        assert!(tracker.get(done).await.is_none());
        assert!(tracker.get(running).await.is_some());
    }
}
