//! Structuring orchestrator for Chapterize.
//!
//! Coordinates a run from transcript to persisted hierarchy: serialize per
//! media, segment off the async runtime, replace the stored tree, and report
//! each stage.

use crate::analysis::AudioInput;
use crate::config::Settings;
use crate::error::{ChapterizeError, Result};
use crate::hierarchy::{HierarchyStore, RebuildSummary, SqliteHierarchyStore};
use crate::segmentation::{Segmentation, Template, TemplateSelector};
use crate::status::{ProcessingStatus, ProgressReporter, Stage};
use crate::transcript::Transcript;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;
use tracing::{info, instrument, warn};

/// One async mutex per media id.
///
/// Runs for the same media queue behind each other; different media proceed
/// in parallel.
#[derive(Default)]
pub struct MediaLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl MediaLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for a media id. Idle entries are pruned on each call.
    pub fn get(&self, media_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|id, lock| id == media_id || Arc::strong_count(lock) > 1);
        locks.entry(media_id.to_string()).or_default().clone()
    }
}

/// The main orchestrator for structuring runs.
pub struct Orchestrator {
    settings: Settings,
    selector: Arc<TemplateSelector>,
    store: Arc<dyn HierarchyStore>,
    locks: MediaLocks,
}

impl Orchestrator {
    /// Create an orchestrator backed by the configured SQLite database.
    pub fn new(settings: Settings) -> Result<Self> {
        let store = Arc::new(SqliteHierarchyStore::new(&settings.sqlite_path())?);
        Ok(Self::with_store(settings, store))
    }

    /// Create an orchestrator with a custom store.
    pub fn with_store(settings: Settings, store: Arc<dyn HierarchyStore>) -> Self {
        let selector = Arc::new(TemplateSelector::from_settings(&settings));
        Self {
            settings,
            selector,
            store,
            locks: MediaLocks::new(),
        }
    }

    /// Get the hierarchy store.
    pub fn store(&self) -> Arc<dyn HierarchyStore> {
        self.store.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build a hierarchy without persisting it.
    pub fn preview(
        &self,
        transcript: &Transcript,
        template: Template,
        audio: Option<&AudioInput>,
    ) -> Result<Segmentation> {
        self.selector
            .build(&transcript.spans, transcript.duration_seconds, template, audio)
    }

    /// Build and persist a hierarchy, replacing whatever was stored for the media.
    ///
    /// Every stage is reported. On failure the previous hierarchy stays in place.
    #[instrument(skip(self, transcript, template, audio, reporter), fields(media_id = %transcript.media_id, template = %template))]
    pub async fn rebuild(
        &self,
        transcript: &Transcript,
        template: Template,
        audio: Option<AudioInput>,
        reporter: &dyn ProgressReporter,
    ) -> Result<RebuildResult> {
        let media_id = transcript.media_id.as_str();
        let _guard = self.acquire(media_id, reporter).await;

        let result = self.rebuild_locked(transcript, template, audio, reporter).await;
        Self::finish(media_id, template, result, reporter)
    }

    /// Wait for the media's lock, reporting `Queued` if another run holds it.
    async fn acquire(&self, media_id: &str, reporter: &dyn ProgressReporter) -> OwnedMutexGuard<()> {
        let lock = self.locks.get(media_id);
        match lock.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                reporter.report(&ProcessingStatus::new(
                    media_id,
                    Stage::Queued,
                    "waiting for a running rebuild",
                ));
                lock.lock_owned().await
            }
        }
    }

    /// Report the terminal stage of a run.
    fn finish(
        media_id: &str,
        template: Template,
        result: Result<RebuildResult>,
        reporter: &dyn ProgressReporter,
    ) -> Result<RebuildResult> {
        match result {
            Ok(result) => {
                let summary = result.summary;
                reporter.report(&ProcessingStatus::new(
                    media_id,
                    Stage::Completed,
                    format!(
                        "{} chapters, {} scenes, {} sentences",
                        summary.chapter_count, summary.scene_count, summary.sentence_count
                    ),
                ));
                info!(
                    "Structured {} with {} ({} strategy)",
                    media_id, template, result.strategy
                );
                Ok(result)
            }
            Err(e) => {
                warn!("Rebuild of {} failed: {}", media_id, e);
                reporter.report(&ProcessingStatus::new(media_id, Stage::Failed, e.to_string()));
                Err(e)
            }
        }
    }

    async fn rebuild_locked(
        &self,
        transcript: &Transcript,
        template: Template,
        audio: Option<AudioInput>,
        reporter: &dyn ProgressReporter,
    ) -> Result<RebuildResult> {
        let media_id = transcript.media_id.as_str();

        reporter.report(&ProcessingStatus::new(media_id, Stage::Segmenting, template.name()));

        let selector = Arc::clone(&self.selector);
        let spans = transcript.spans.clone();
        let duration_seconds = transcript.duration_seconds;
        let segmentation = tokio::task::spawn_blocking(move || {
            selector.build(&spans, duration_seconds, template, audio.as_ref())
        })
        .await
        .map_err(|e| ChapterizeError::Analysis(format!("Segmentation task failed: {}", e)))??;

        reporter.report(&ProcessingStatus::new(
            media_id,
            Stage::Persisting,
            format!("{} chapters", segmentation.hierarchy.chapter_count()),
        ));

        let summary = self
            .store
            .replace_hierarchy(transcript, template.name(), &segmentation.hierarchy)
            .await
            .map_err(|e| match e {
                ChapterizeError::Persistence(_) => e,
                other => ChapterizeError::Persistence(other.to_string()),
            })?;

        Ok(RebuildResult {
            media_id: media_id.to_string(),
            template,
            strategy: segmentation.strategy,
            fell_back: segmentation.fell_back,
            summary,
        })
    }

    /// Rebuild a media from its stored transcript with another template.
    ///
    /// The transcript is read under the media's lock, so a rebuild that is
    /// still running is never overwritten with an older transcript. Audio is
    /// not stored, so the silence strategy divides by duration here.
    #[instrument(skip(self, template, reporter))]
    pub async fn restructure(
        &self,
        media_id: &str,
        template: Template,
        reporter: &dyn ProgressReporter,
    ) -> Result<RebuildResult> {
        let _guard = self.acquire(media_id, reporter).await;

        let transcript = match self.store.get_transcript(media_id).await {
            Ok(Some(transcript)) => transcript,
            Ok(None) => {
                let err = ChapterizeError::MediaNotFound(media_id.to_string());
                reporter.report(&ProcessingStatus::new(media_id, Stage::Failed, err.to_string()));
                return Err(err);
            }
            Err(e) => return Self::finish(media_id, template, Err(e), reporter),
        };

        info!("Restructuring '{}' from stored transcript", media_id);
        let result = self.rebuild_locked(&transcript, template, None, reporter).await;
        Self::finish(media_id, template, result, reporter)
    }
}

/// Result of a rebuild.
#[derive(Debug, Clone)]
pub struct RebuildResult {
    pub media_id: String,
    pub template: Template,
    /// Strategy whose grouping was persisted.
    pub strategy: &'static str,
    /// Whether the template's own strategy was abandoned.
    pub fell_back: bool,
    pub summary: RebuildSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{Hierarchy, MediaSummary, MemoryHierarchyStore};
    use crate::status::{NoopReporter, StatusBoard};
    use crate::transcript::SentenceSpan;
    use async_trait::async_trait;

    fn transcript(media_id: &str) -> Transcript {
        let spans = vec![
            SentenceSpan::new("Good morning.", 0.0, 2.0, 0),
            SentenceSpan::new("Today we start.", 2.5, 5.0, 0),
            SentenceSpan::new("After the break.", 20.0, 22.0, 0),
            SentenceSpan::new("One more thing.", 26.0, 28.0, 0),
        ];
        Transcript::new(media_id, spans, 30.0)
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::with_store(Settings::default(), Arc::new(MemoryHierarchyStore::new()))
    }

    #[tokio::test]
    async fn test_rebuild_persists_and_reports() {
        let orchestrator = orchestrator();
        let board = StatusBoard::new();

        let result = orchestrator
            .rebuild(&transcript("m1"), Template::Manual, None, &board)
            .await
            .unwrap();

        assert_eq!(result.strategy, "gap_threshold");
        assert_eq!(result.summary.chapter_count, 2);
        assert_eq!(result.summary.scene_count, 3);
        assert_eq!(result.summary.sentence_count, 4);

        let status = board.get("m1").unwrap();
        assert_eq!(status.stage, Stage::Completed);

        let stored = orchestrator.store().get_hierarchy("m1").await.unwrap().unwrap();
        assert_eq!(stored.chapter_count(), 2);
    }

    #[tokio::test]
    async fn test_rebuild_twice_is_identical() {
        let orchestrator = orchestrator();
        let transcript = transcript("m1");

        orchestrator
            .rebuild(&transcript, Template::Auto, None, &NoopReporter)
            .await
            .unwrap();
        let first = orchestrator.store().get_hierarchy("m1").await.unwrap();
        orchestrator
            .rebuild(&transcript, Template::Auto, None, &NoopReporter)
            .await
            .unwrap();
        let second = orchestrator.store().get_hierarchy("m1").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_restructure_uses_stored_transcript() {
        let orchestrator = orchestrator();
        orchestrator
            .rebuild(&transcript("m1"), Template::Manual, None, &NoopReporter)
            .await
            .unwrap();

        let result = orchestrator
            .restructure("m1", Template::General, &NoopReporter)
            .await
            .unwrap();
        assert_eq!(result.strategy, "ratio");
        assert_eq!(result.summary.sentence_count, 4);

        let media = orchestrator.store().get_media("m1").await.unwrap().unwrap();
        assert_eq!(media.template, "general");
    }

    #[tokio::test]
    async fn test_restructure_unknown_media() {
        let err = orchestrator()
            .restructure("missing", Template::General, &NoopReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, ChapterizeError::MediaNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_input_reports_failure() {
        let board = StatusBoard::new();
        let bad = Transcript::new("m1", vec![SentenceSpan::new("x", 3.0, 1.0, 1)], 10.0);

        let err = orchestrator()
            .rebuild(&bad, Template::Auto, None, &board)
            .await
            .unwrap_err();
        assert!(matches!(err, ChapterizeError::InvalidInput(_)));
        assert_eq!(board.get("m1").unwrap().stage, Stage::Failed);
    }

    struct BrokenStore;

    #[async_trait]
    impl HierarchyStore for BrokenStore {
        async fn replace_hierarchy(&self, _: &Transcript, _: &str, _: &Hierarchy) -> Result<RebuildSummary> {
            Err(ChapterizeError::Io(std::io::Error::other("disk full")))
        }
        async fn get_hierarchy(&self, _: &str) -> Result<Option<Hierarchy>> {
            Ok(None)
        }
        async fn get_transcript(&self, _: &str) -> Result<Option<Transcript>> {
            Ok(None)
        }
        async fn get_media(&self, _: &str) -> Result<Option<MediaSummary>> {
            Ok(None)
        }
        async fn list_media(&self) -> Result<Vec<MediaSummary>> {
            Ok(Vec::new())
        }
        async fn delete_media(&self, _: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_persistence_error() {
        let orchestrator = Orchestrator::with_store(Settings::default(), Arc::new(BrokenStore));
        let board = StatusBoard::new();

        let err = orchestrator
            .rebuild(&transcript("m1"), Template::General, None, &board)
            .await
            .unwrap_err();

        assert!(matches!(err, ChapterizeError::Persistence(_)));
        let status = board.get("m1").unwrap();
        assert_eq!(status.stage, Stage::Failed);
        assert!(status.message.contains("disk full"));
    }

    /// Delegates to a memory store, with slow writes.
    struct SlowStore {
        inner: MemoryHierarchyStore,
        delay: std::time::Duration,
    }

    #[async_trait]
    impl HierarchyStore for SlowStore {
        async fn replace_hierarchy(&self, t: &Transcript, template: &str, h: &Hierarchy) -> Result<RebuildSummary> {
            tokio::time::sleep(self.delay).await;
            self.inner.replace_hierarchy(t, template, h).await
        }
        async fn get_hierarchy(&self, id: &str) -> Result<Option<Hierarchy>> {
            self.inner.get_hierarchy(id).await
        }
        async fn get_transcript(&self, id: &str) -> Result<Option<Transcript>> {
            self.inner.get_transcript(id).await
        }
        async fn get_media(&self, id: &str) -> Result<Option<MediaSummary>> {
            self.inner.get_media(id).await
        }
        async fn list_media(&self) -> Result<Vec<MediaSummary>> {
            self.inner.list_media().await
        }
        async fn delete_media(&self, id: &str) -> Result<bool> {
            self.inner.delete_media(id).await
        }
    }

    fn numbered_transcript(media_id: &str, n: usize) -> Transcript {
        let spans = (0..n)
            .map(|i| SentenceSpan::new(format!("Sentence {}.", i + 1), i as f64 * 2.0, i as f64 * 2.0 + 1.5, 0))
            .collect();
        Transcript::from_spans(media_id, spans)
    }

    #[tokio::test]
    async fn test_restructure_waits_for_running_rebuild() {
        let store = Arc::new(SlowStore {
            inner: MemoryHierarchyStore::new(),
            delay: std::time::Duration::from_millis(300),
        });
        let orchestrator = Arc::new(Orchestrator::with_store(Settings::default(), store.clone()));

        orchestrator
            .rebuild(&numbered_transcript("m", 3), Template::General, None, &NoopReporter)
            .await
            .unwrap();

        let rebuild = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move {
                orchestrator
                    .rebuild(&numbered_transcript("m", 10), Template::General, None, &NoopReporter)
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let restructure = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move {
                orchestrator
                    .restructure("m", Template::Manual, &NoopReporter)
                    .await
            })
        };

        rebuild.await.unwrap().unwrap();
        let result = restructure.await.unwrap().unwrap();

        assert_eq!(result.summary.sentence_count, 10);
        let transcript = store.get_transcript("m").await.unwrap().unwrap();
        assert_eq!(transcript.spans.len(), 10);
        let stored = store.get_hierarchy("m").await.unwrap().unwrap();
        assert_eq!(stored.sentence_count(), 10);
        assert_eq!(store.get_media("m").await.unwrap().unwrap().template, "manual");
    }

    #[tokio::test]
    async fn test_media_locks_are_per_id() {
        let locks = MediaLocks::new();
        let a1 = locks.get("a");
        let a2 = locks.get("a");
        let b = locks.get("b");

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));

        let _held = a1.lock().await;
        assert!(a2.try_lock().is_err());
        assert!(b.try_lock().is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_rebuilds_of_same_media() {
        let orchestrator = Arc::new(orchestrator());
        let transcript = transcript("m1");

        let runs = (0..4).map(|i| {
            let orchestrator = Arc::clone(&orchestrator);
            let transcript = transcript.clone();
            let template = if i % 2 == 0 { Template::Manual } else { Template::General };
            tokio::spawn(async move {
                orchestrator
                    .rebuild(&transcript, template, None, &NoopReporter)
                    .await
            })
        });

        for run in futures::future::join_all(runs).await {
            assert!(run.unwrap().is_ok());
        }

        let stored = orchestrator.store().get_hierarchy("m1").await.unwrap().unwrap();
        assert!(stored.validate().is_ok());
        assert_eq!(stored.sentence_count(), 4);
    }
}
