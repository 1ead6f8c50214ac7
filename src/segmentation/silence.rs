//! Silence-delimited chapters.

use super::{chunk_scenes, partition_by_start, Candidate, CandidateChapter, CandidateScene, SegmentContext};
use crate::error::Result;
use crate::transcript::SentenceSpan;
use tracing::debug;

/// Chapters between silence midpoints. Long chapters are chunked into scenes.
pub(super) fn segment(spans: &[SentenceSpan], ctx: &SegmentContext<'_>) -> Result<Candidate> {
    let cuts = ctx.analyzer.silence_boundaries(ctx.audio, ctx.duration_seconds)?;
    debug!("Silence strategy: {} cut points", cuts.len());

    let split_threshold = ctx.settings.silence_split_threshold;
    let scene_size = ctx.settings.silence_scene_size;

    let chapters = partition_by_start(spans, &cuts)
        .into_iter()
        .filter(|range| !range.is_empty())
        .enumerate()
        .map(|(i, range)| {
            let scenes = if range.len() > split_threshold {
                chunk_scenes(range, scene_size, "Scene")
            } else {
                vec![CandidateScene {
                    title: "Scene 1".to_string(),
                    spans: range,
                }]
            };
            CandidateChapter {
                title: format!("Chapter {}", i + 1),
                scenes,
            }
        })
        .collect();

    Ok(Candidate { chapters })
}
