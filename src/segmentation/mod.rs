//! Segmentation strategies.
//!
//! Every strategy turns a start-ordered span list into a candidate
//! Chapter→Scene grouping of span index ranges. Titles are final; orders and
//! time bounds are left to [`crate::hierarchy::assemble`].
//!
//! Available strategies:
//! - `Silence`: chapters between silence midpoints in the audio
//! - `GapThreshold`: chapters and scenes at large inter-span gaps
//! - `Pattern`: chapters and scenes at spoken "Part N" / "Number N." markers
//! - `Ratio`: fixed or duration-weighted time slices, fixed-size scenes

mod gap;
mod pattern;
mod ratio;
mod selector;
mod silence;
mod template;

pub use ratio::{ChapterLayout, ChapterTitles, RatioConfig};
pub use selector::{build, Segmentation, TemplateSelector};
pub use template::Template;

use crate::analysis::{AudioInput, GapAnalyzer};
use crate::config::SegmentationSettings;
use crate::error::Result;
use crate::patterns::MarkerDetector;
use crate::transcript::SentenceSpan;
use std::ops::Range;

/// A titled run of spans, by index into the ordered span list.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScene {
    pub title: String,
    pub spans: Range<usize>,
}

/// A titled group of candidate scenes.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateChapter {
    pub title: String,
    pub scenes: Vec<CandidateScene>,
}

/// A strategy's proposed grouping, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub chapters: Vec<CandidateChapter>,
}

impl Candidate {
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// One chapter holding one scene with every span.
    pub fn single_group(span_count: usize) -> Self {
        Self {
            chapters: vec![CandidateChapter {
                title: "Chapter 1".to_string(),
                scenes: vec![CandidateScene {
                    title: "Scene 1".to_string(),
                    spans: 0..span_count,
                }],
            }],
        }
    }
}

/// Inputs shared by all strategies for one build.
pub struct SegmentContext<'a> {
    pub duration_seconds: f64,
    pub audio: Option<&'a AudioInput>,
    pub analyzer: &'a GapAnalyzer,
    pub detector: &'a MarkerDetector,
    pub settings: &'a SegmentationSettings,
}

/// Segmentation algorithm, selected by template.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Silence,
    GapThreshold,
    Pattern,
    Ratio(RatioConfig),
}

impl Strategy {
    /// Short name for logs and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Silence => "silence",
            Strategy::GapThreshold => "gap_threshold",
            Strategy::Pattern => "pattern",
            Strategy::Ratio(_) => "ratio",
        }
    }

    /// Propose a grouping of start-ordered, non-empty spans.
    pub fn segment(&self, spans: &[SentenceSpan], ctx: &SegmentContext<'_>) -> Result<Candidate> {
        match self {
            Strategy::Silence => silence::segment(spans, ctx),
            Strategy::GapThreshold => Ok(gap::segment(spans, ctx)),
            Strategy::Pattern => Ok(pattern::segment(spans, ctx)),
            Strategy::Ratio(config) => Ok(ratio::segment(spans, ctx.duration_seconds, config)),
        }
    }
}

/// Split start-ordered spans into `cuts.len() + 1` slots by start time.
///
/// Slot `k` holds spans starting in `[cuts[k-1], cuts[k])`, so a span starting
/// exactly on a cut opens the next slot. Cuts must be ascending.
pub(crate) fn partition_by_start(spans: &[SentenceSpan], cuts: &[f64]) -> Vec<Range<usize>> {
    let boundary = |cut: f64| spans.partition_point(|s| s.start_seconds < cut);

    let mut ranges = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts {
        let end = boundary(cut).max(start);
        ranges.push(start..end);
        start = end;
    }
    ranges.push(start..spans.len());
    ranges
}

/// Cut a span range into consecutive scenes of at most `size` spans.
pub(crate) fn chunk_scenes(range: Range<usize>, size: usize, label: &str) -> Vec<CandidateScene> {
    let size = size.max(1);
    let mut scenes = Vec::new();
    let mut start = range.start;
    while start < range.end {
        let end = (start + size).min(range.end);
        scenes.push(CandidateScene {
            title: format!("{} {}", label, scenes.len() + 1),
            spans: start..end,
        });
        start = end;
    }
    scenes
}

/// Split a range at the given span indices. Indices outside the range are ignored.
pub(crate) fn split_at_indices(range: Range<usize>, indices: &[usize]) -> Vec<Range<usize>> {
    let mut parts = Vec::new();
    let mut start = range.start;
    for &i in indices {
        if i > start && i < range.end {
            parts.push(start..i);
            start = i;
        }
    }
    if start < range.end {
        parts.push(start..range.end);
    }
    parts
}
