//! Processing status records for structuring runs.
//!
//! The orchestrator reports every stage transition to a caller-supplied
//! [`ProgressReporter`]. [`StatusBoard`] keeps the latest status per media for
//! callers that want to poll.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;

/// Stage of a structuring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Waiting for another run on the same media to finish.
    Queued,
    Segmenting,
    Persisting,
    Completed,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Queued => "queued",
            Stage::Segmenting => "segmenting",
            Stage::Persisting => "persisting",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The latest known state of one media's run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingStatus {
    pub media_id: String,
    pub stage: Stage,
    /// Human-readable detail (counts on completion, the error on failure).
    pub message: String,
    pub updated_at: DateTime<Utc>,
}

impl ProcessingStatus {
    pub fn new(media_id: impl Into<String>, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            stage,
            message: message.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Receives stage transitions.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, status: &ProcessingStatus);
}

/// Ignores all transitions.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _status: &ProcessingStatus) {}
}

/// Latest status per media id.
#[derive(Default)]
pub struct StatusBoard {
    statuses: RwLock<HashMap<String, ProcessingStatus>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, media_id: &str) -> Option<ProcessingStatus> {
        self.statuses
            .read()
            .ok()
            .and_then(|statuses| statuses.get(media_id).cloned())
    }

    /// All statuses, sorted by media id.
    pub fn all(&self) -> Vec<ProcessingStatus> {
        let mut all: Vec<ProcessingStatus> = self
            .statuses
            .read()
            .map(|statuses| statuses.values().cloned().collect())
            .unwrap_or_default();
        all.sort_by(|a, b| a.media_id.cmp(&b.media_id));
        all
    }
}

impl ProgressReporter for StatusBoard {
    fn report(&self, status: &ProcessingStatus) {
        let mut statuses = match self.statuses.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        statuses.insert(status.media_id.clone(), status.clone());
    }
}
