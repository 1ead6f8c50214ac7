//! Chapter/Scene/Sentence hierarchy and its persistence.
//!
//! A candidate grouping from a segmentation strategy is assembled into a
//! [`Hierarchy`] (orders assigned, bounds derived), validated, and then
//! written through a [`HierarchyStore`] as one atomic replace.

mod memory;
mod sqlite;

pub use memory::MemoryHierarchyStore;
pub use sqlite::SqliteHierarchyStore;

use crate::error::{ChapterizeError, Result};
use crate::segmentation::Candidate;
use crate::transcript::{SentenceSpan, Transcript};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A run of sentences inside a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub title: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// 1-based position within the chapter.
    pub order: u32,
    pub sentences: Vec<SentenceSpan>,
}

/// Top-level navigation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// 1-based position within the media.
    pub order: u32,
    pub scenes: Vec<Scene>,
}

/// The structured form of one media's transcript.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    pub chapters: Vec<Chapter>,
}

impl Hierarchy {
    /// One chapter holding one scene, both covering `[0, duration]`, no sentences.
    pub fn empty(duration_seconds: f64) -> Self {
        Self {
            chapters: vec![Chapter {
                title: "Chapter 1".to_string(),
                start_seconds: 0.0,
                end_seconds: duration_seconds,
                order: 1,
                scenes: vec![Scene {
                    title: "Scene 1".to_string(),
                    start_seconds: 0.0,
                    end_seconds: duration_seconds,
                    order: 1,
                    sentences: Vec::new(),
                }],
            }],
        }
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn scene_count(&self) -> usize {
        self.chapters.iter().map(|c| c.scenes.len()).sum()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences().count()
    }

    /// All sentences in chapter, scene, sentence order.
    pub fn sentences(&self) -> impl Iterator<Item = &SentenceSpan> {
        self.chapters
            .iter()
            .flat_map(|c| c.scenes.iter())
            .flat_map(|s| s.sentences.iter())
    }

    pub fn summary(&self) -> RebuildSummary {
        RebuildSummary {
            chapter_count: self.chapter_count(),
            scene_count: self.scene_count(),
            sentence_count: self.sentence_count(),
        }
    }

    /// Check the structural invariants every stored hierarchy must satisfy.
    ///
    /// Orders are contiguous from 1 at each level, every unit has
    /// `start < end`, bounds match the contained units, and only the
    /// sentence-free tree from [`Hierarchy::empty`] may hold an empty scene.
    pub fn validate(&self) -> Result<()> {
        if self.chapters.is_empty() {
            return Err(invalid("hierarchy has no chapters"));
        }

        let has_sentences = self.sentence_count() > 0;
        if !has_sentences && self.scene_count() != 1 {
            return Err(invalid("a hierarchy without sentences must be a single empty scene"));
        }

        for (ci, chapter) in self.chapters.iter().enumerate() {
            if chapter.order as usize != ci + 1 {
                return Err(invalid(format!(
                    "chapter {:?} has order {} at position {}",
                    chapter.title,
                    chapter.order,
                    ci + 1
                )));
            }
            if chapter.scenes.is_empty() {
                return Err(invalid(format!("chapter {} has no scenes", chapter.order)));
            }
            check_bounds("chapter", chapter.order, chapter.start_seconds, chapter.end_seconds)?;

            for (si, scene) in chapter.scenes.iter().enumerate() {
                if scene.order as usize != si + 1 {
                    return Err(invalid(format!(
                        "scene {:?} in chapter {} has order {} at position {}",
                        scene.title,
                        chapter.order,
                        scene.order,
                        si + 1
                    )));
                }
                check_bounds("scene", scene.order, scene.start_seconds, scene.end_seconds)?;

                if has_sentences {
                    let (start, end) = span_bounds(&scene.sentences).ok_or_else(|| {
                        invalid(format!("scene {} in chapter {} is empty", scene.order, chapter.order))
                    })?;
                    if start != scene.start_seconds || end != scene.end_seconds {
                        return Err(invalid(format!(
                            "scene {} in chapter {} bounds do not match its sentences",
                            scene.order, chapter.order
                        )));
                    }
                }
            }

            let start = chapter.scenes.iter().map(|s| s.start_seconds).fold(f64::INFINITY, f64::min);
            let end = chapter.scenes.iter().map(|s| s.end_seconds).fold(f64::NEG_INFINITY, f64::max);
            if start != chapter.start_seconds || end != chapter.end_seconds {
                return Err(invalid(format!(
                    "chapter {} bounds do not match its scenes",
                    chapter.order
                )));
            }
        }

        Ok(())
    }
}

impl Hierarchy {
    /// Validate the tree and check that it holds every span of `transcript`.
    pub fn validate_for(&self, transcript: &Transcript) -> Result<()> {
        self.validate()?;
        if self.sentence_count() != transcript.spans.len() {
            return Err(invalid(format!(
                "hierarchy holds {} sentences but transcript {} has {} spans",
                self.sentence_count(),
                transcript.media_id,
                transcript.spans.len()
            )));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ChapterizeError {
    ChapterizeError::InvalidHierarchy(message.into())
}

fn check_bounds(unit: &str, order: u32, start: f64, end: f64) -> Result<()> {
    if !(start.is_finite() && end.is_finite() && start < end) {
        return Err(invalid(format!(
            "{} {} has invalid bounds [{}, {}]",
            unit, order, start, end
        )));
    }
    Ok(())
}

/// Earliest start and latest end over a run of spans.
fn span_bounds(spans: &[SentenceSpan]) -> Option<(f64, f64)> {
    if spans.is_empty() {
        return None;
    }
    let start = spans.iter().map(|s| s.start_seconds).fold(f64::INFINITY, f64::min);
    let end = spans.iter().map(|s| s.end_seconds).fold(f64::NEG_INFINITY, f64::max);
    Some((start, end))
}

/// Turn a candidate grouping into a validated hierarchy.
///
/// Scene ranges must be non-empty and tile `0..spans.len()` in order, so that
/// every span lands in exactly one scene. Orders are assigned by position and
/// time bounds are derived from the sentences.
pub fn assemble(spans: &[SentenceSpan], candidate: &Candidate) -> Result<Hierarchy> {
    let mut next = 0;
    let mut chapters = Vec::with_capacity(candidate.chapters.len());

    for (ci, candidate_chapter) in candidate.chapters.iter().enumerate() {
        let mut scenes = Vec::with_capacity(candidate_chapter.scenes.len());

        for (si, candidate_scene) in candidate_chapter.scenes.iter().enumerate() {
            let range = candidate_scene.spans.clone();
            if range.start != next || range.is_empty() || range.end > spans.len() {
                return Err(invalid(format!(
                    "scene {:?} covers spans {:?}, expected a non-empty range starting at {}",
                    candidate_scene.title, range, next
                )));
            }
            next = range.end;

            let sentences = spans[range].to_vec();
            let (start_seconds, end_seconds) =
                span_bounds(&sentences).ok_or_else(|| invalid("empty scene"))?;
            scenes.push(Scene {
                title: candidate_scene.title.clone(),
                start_seconds,
                end_seconds,
                order: si as u32 + 1,
                sentences,
            });
        }

        if scenes.is_empty() {
            return Err(invalid(format!(
                "chapter {:?} has no scenes",
                candidate_chapter.title
            )));
        }

        let start_seconds = scenes.iter().map(|s| s.start_seconds).fold(f64::INFINITY, f64::min);
        let end_seconds = scenes.iter().map(|s| s.end_seconds).fold(f64::NEG_INFINITY, f64::max);
        chapters.push(Chapter {
            title: candidate_chapter.title.clone(),
            start_seconds,
            end_seconds,
            order: ci as u32 + 1,
            scenes,
        });
    }

    if next != spans.len() {
        return Err(invalid(format!(
            "grouping covers {} of {} spans",
            next,
            spans.len()
        )));
    }

    let hierarchy = Hierarchy { chapters };
    hierarchy.validate()?;
    Ok(hierarchy)
}

/// Counts written by a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildSummary {
    pub chapter_count: usize,
    pub scene_count: usize,
    pub sentence_count: usize,
}

/// Summary information about a structured media.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSummary {
    pub media_id: String,
    /// Template the hierarchy was last built with.
    pub template: String,
    pub chapter_count: usize,
    pub scene_count: usize,
    pub sentence_count: usize,
    pub duration_seconds: f64,
    pub rebuilt_at: DateTime<Utc>,
}

/// Storage for per-media hierarchies.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// Atomically replace the media's hierarchy and its stored transcript.
    ///
    /// The hierarchy is validated against the transcript before anything is
    /// deleted. If any write fails, the previously stored hierarchy stays in place.
    async fn replace_hierarchy(
        &self,
        transcript: &Transcript,
        template: &str,
        hierarchy: &Hierarchy,
    ) -> Result<RebuildSummary>;

    /// Get the stored hierarchy for a media.
    async fn get_hierarchy(&self, media_id: &str) -> Result<Option<Hierarchy>>;

    /// Get the transcript the stored hierarchy was built from.
    async fn get_transcript(&self, media_id: &str) -> Result<Option<Transcript>>;

    /// Get summary information for a media.
    async fn get_media(&self, media_id: &str) -> Result<Option<MediaSummary>>;

    /// List all structured media, most recently rebuilt first.
    async fn list_media(&self) -> Result<Vec<MediaSummary>>;

    /// Delete a media's hierarchy and transcript. Returns whether anything was stored.
    async fn delete_media(&self, media_id: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::{CandidateChapter, CandidateScene};

    fn spans(n: usize) -> Vec<SentenceSpan> {
        (0..n)
            .map(|i| SentenceSpan::new(format!("s{}", i), i as f64 * 2.0, i as f64 * 2.0 + 1.5, i as u32 + 1))
            .collect()
    }

    fn candidate(groups: &[&[std::ops::Range<usize>]]) -> Candidate {
        Candidate {
            chapters: groups
                .iter()
                .enumerate()
                .map(|(ci, scenes)| CandidateChapter {
                    title: format!("Chapter {}", ci + 1),
                    scenes: scenes
                        .iter()
                        .enumerate()
                        .map(|(si, r)| CandidateScene {
                            title: format!("Scene {}", si + 1),
                            spans: r.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_assemble_derives_bounds_and_orders() {
        let spans = spans(5);
        let hierarchy = assemble(&spans, &candidate(&[&[0..2, 2..3], &[3..5]])).unwrap();

        assert_eq!(hierarchy.chapter_count(), 2);
        assert_eq!(hierarchy.scene_count(), 3);
        assert_eq!(hierarchy.sentence_count(), 5);
        assert_eq!(hierarchy.chapters[1].order, 2);
        assert_eq!(hierarchy.chapters[0].scenes[1].order, 2);
        assert_eq!(hierarchy.chapters[0].start_seconds, 0.0);
        assert_eq!(hierarchy.chapters[0].end_seconds, 5.5);
        assert_eq!(hierarchy.chapters[1].scenes[0].start_seconds, 6.0);
    }

    #[test]
    fn test_assemble_rejects_gaps_and_overlaps() {
        let spans = spans(4);
        assert!(assemble(&spans, &candidate(&[&[0..2], &[3..4]])).is_err());
        assert!(assemble(&spans, &candidate(&[&[0..3], &[2..4]])).is_err());
        assert!(assemble(&spans, &candidate(&[&[0..3]])).is_err());
        assert!(assemble(&spans, &candidate(&[&[0..4], &[]])).is_err());
    }

    #[test]
    fn test_empty_hierarchy_is_valid() {
        let hierarchy = Hierarchy::empty(42.0);
        assert!(hierarchy.validate().is_ok());
        assert_eq!(hierarchy.summary().sentence_count, 0);
        assert_eq!(hierarchy.chapters[0].end_seconds, 42.0);
    }

    #[test]
    fn test_validate_rejects_bad_order() {
        let mut hierarchy = assemble(&spans(2), &candidate(&[&[0..1], &[1..2]])).unwrap();
        hierarchy.chapters[1].order = 3;
        assert!(matches!(hierarchy.validate(), Err(ChapterizeError::InvalidHierarchy(_))));
    }
}
