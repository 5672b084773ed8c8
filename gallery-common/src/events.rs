//! Event types and in-process event bus for the gallery services
//!
//! Analysis progress is published here so that any number of observers
//! (CLI progress output, a future SSE endpoint, tests) can follow a run
//! without the engine knowing about them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Gallery event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GalleryEvent {
    /// Cultural analysis accepted and processing
    AnalysisStarted {
        analysis_id: Uuid,
        artwork_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Cultural analysis advanced to a new stage
    AnalysisProgress {
        analysis_id: Uuid,
        /// Percent complete (0-100)
        progress: u8,
        /// Stage description
        stage: String,
        timestamp: DateTime<Utc>,
    },

    /// Cultural analysis finished successfully
    AnalysisCompleted {
        analysis_id: Uuid,
        artwork_id: String,
        /// Overall confidence from quality validation (0-10)
        confidence: f64,
        processing_time_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Cultural analysis failed or was cancelled
    AnalysisFailed {
        analysis_id: Uuid,
        artwork_id: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Educational content generated for an artwork
    EducationalContentGenerated {
        artwork_id: String,
        content_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast event bus
///
/// Cloning shares the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GalleryEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: GalleryEvent,
    ) -> Result<usize, broadcast::error::SendError<GalleryEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: GalleryEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
