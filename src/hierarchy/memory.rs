//! In-memory hierarchy store.
//!
//! Useful for testing and previews that should not touch disk.

use super::{Hierarchy, HierarchyStore, MediaSummary, RebuildSummary};
use crate::error::{ChapterizeError, Result};
use crate::transcript::Transcript;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

struct StoredMedia {
    summary: MediaSummary,
    hierarchy: Hierarchy,
    transcript: Transcript,
}

/// In-memory hierarchy store.
pub struct MemoryHierarchyStore {
    media: RwLock<HashMap<String, StoredMedia>>,
}

impl MemoryHierarchyStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            media: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryHierarchyStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<T>(e: PoisonError<T>) -> ChapterizeError {
    ChapterizeError::Persistence(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl HierarchyStore for MemoryHierarchyStore {
    async fn replace_hierarchy(
        &self,
        transcript: &Transcript,
        template: &str,
        hierarchy: &Hierarchy,
    ) -> Result<RebuildSummary> {
        hierarchy.validate_for(transcript)?;
        let counts = hierarchy.summary();

        let stored = StoredMedia {
            summary: MediaSummary {
                media_id: transcript.media_id.clone(),
                template: template.to_string(),
                chapter_count: counts.chapter_count,
                scene_count: counts.scene_count,
                sentence_count: counts.sentence_count,
                duration_seconds: transcript.duration_seconds,
                rebuilt_at: Utc::now(),
            },
            hierarchy: hierarchy.clone(),
            transcript: transcript.clone(),
        };

        let mut media = self.media.write().map_err(lock_error)?;
        media.insert(transcript.media_id.clone(), stored);
        Ok(counts)
    }

    async fn get_hierarchy(&self, media_id: &str) -> Result<Option<Hierarchy>> {
        let media = self.media.read().map_err(lock_error)?;
        Ok(media.get(media_id).map(|m| m.hierarchy.clone()))
    }

    async fn get_transcript(&self, media_id: &str) -> Result<Option<Transcript>> {
        let media = self.media.read().map_err(lock_error)?;
        Ok(media.get(media_id).map(|m| m.transcript.clone()))
    }

    async fn get_media(&self, media_id: &str) -> Result<Option<MediaSummary>> {
        let media = self.media.read().map_err(lock_error)?;
        Ok(media.get(media_id).map(|m| m.summary.clone()))
    }

    async fn list_media(&self) -> Result<Vec<MediaSummary>> {
        let media = self.media.read().map_err(lock_error)?;
        let mut summaries: Vec<MediaSummary> = media.values().map(|m| m.summary.clone()).collect();
        summaries.sort_by(|a, b| b.rebuilt_at.cmp(&a.rebuilt_at));
        Ok(summaries)
    }

    async fn delete_media(&self, media_id: &str) -> Result<bool> {
        let mut media = self.media.write().map_err(lock_error)?;
        Ok(media.remove(media_id).is_some())
    }
}
