//! Time-sliced chapters with fixed-size scenes.
//!
//! Used by the reading-test, lecture, conversation and audiobook templates, and
//! as the universal fallback. The arithmetic never fails for a non-empty span
//! list: every span lands in some slice, and the last slice absorbs anything
//! past the nominal end.

use super::{chunk_scenes, partition_by_start, Candidate, CandidateChapter};
use crate::transcript::SentenceSpan;
use tracing::debug;

/// How the duration is sliced into chapters.
#[derive(Debug, Clone, PartialEq)]
pub enum ChapterLayout {
    /// `n` equal slices.
    EqualParts(usize),
    /// Slices proportional to the weights.
    Weighted(Vec<f64>),
    /// Equal slices, count picked by the first tier whose duration floor
    /// (exclusive) the media exceeds.
    Tiered {
        tiers: Vec<(f64, usize)>,
        otherwise: usize,
    },
    /// Windows of fixed length. Count is `max(1, floor(duration / window))`.
    FixedWindow(f64),
}

impl ChapterLayout {
    /// Interior cut points for the given duration, ascending.
    pub fn cuts(&self, duration_seconds: f64) -> Vec<f64> {
        match self {
            ChapterLayout::EqualParts(n) => equal_cuts(duration_seconds, *n),
            ChapterLayout::Weighted(weights) => {
                let total: f64 = weights.iter().sum();
                if weights.len() < 2 || total <= 0.0 {
                    return Vec::new();
                }
                let mut acc = 0.0;
                weights[..weights.len() - 1]
                    .iter()
                    .map(|w| {
                        acc += w;
                        duration_seconds * acc / total
                    })
                    .collect()
            }
            ChapterLayout::Tiered { tiers, otherwise } => {
                let n = tiers
                    .iter()
                    .find(|(floor, _)| duration_seconds > *floor)
                    .map_or(*otherwise, |(_, n)| *n);
                equal_cuts(duration_seconds, n)
            }
            ChapterLayout::FixedWindow(window) => {
                if *window <= 0.0 {
                    return Vec::new();
                }
                let count = ((duration_seconds / window).floor() as usize).max(1);
                (1..count).map(|i| i as f64 * window).collect()
            }
        }
    }
}

fn equal_cuts(duration_seconds: f64, parts: usize) -> Vec<f64> {
    let parts = parts.max(1);
    (1..parts)
        .map(|i| duration_seconds * i as f64 / parts as f64)
        .collect()
}

/// Chapter naming.
#[derive(Debug, Clone, PartialEq)]
pub enum ChapterTitles {
    /// "{prefix} {n}".
    Numbered(String),
    /// One name per slice, numbered "Part {n}" past the end of the list.
    Named(Vec<String>),
}

impl ChapterTitles {
    fn title(&self, slot: usize) -> String {
        match self {
            ChapterTitles::Numbered(prefix) => format!("{} {}", prefix, slot),
            ChapterTitles::Named(names) => names
                .get(slot - 1)
                .cloned()
                .unwrap_or_else(|| format!("Part {}", slot)),
        }
    }
}

/// A ratio strategy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioConfig {
    pub layout: ChapterLayout,
    pub titles: ChapterTitles,
    /// Spans per scene.
    pub scene_size: usize,
    pub scene_label: String,
}

impl RatioConfig {
    /// Lectures: 6 chapters past an hour, 4 past half an hour, else 2.
    pub fn general() -> Self {
        Self {
            layout: ChapterLayout::Tiered {
                tiers: vec![(3600.0, 6), (1800.0, 4)],
                otherwise: 2,
            },
            titles: ChapterTitles::Numbered("Lecture".to_string()),
            scene_size: 15,
            scene_label: "Section".to_string(),
        }
    }

    /// Reading test: three equal parts.
    pub fn toeic_rc() -> Self {
        Self {
            layout: ChapterLayout::EqualParts(3),
            titles: ChapterTitles::Named(vec![
                "Part 5 - Grammar".to_string(),
                "Part 6 - Text Completion".to_string(),
                "Part 7 - Reading Comprehension".to_string(),
            ]),
            scene_size: 10,
            scene_label: "Section".to_string(),
        }
    }

    /// Listening test approximated by part weighting.
    pub fn toeic_lc_ratio() -> Self {
        Self {
            layout: ChapterLayout::Weighted(vec![0.05, 0.25, 0.40, 0.30]),
            titles: ChapterTitles::Numbered("Part".to_string()),
            scene_size: 5,
            scene_label: "Section".to_string(),
        }
    }

    /// Five-minute conversation windows.
    pub fn conversation() -> Self {
        Self {
            layout: ChapterLayout::FixedWindow(300.0),
            titles: ChapterTitles::Numbered("Conversation".to_string()),
            scene_size: 8,
            scene_label: "Turn".to_string(),
        }
    }

    /// Fifteen-minute audiobook chapters.
    pub fn audiobook() -> Self {
        Self {
            layout: ChapterLayout::FixedWindow(900.0),
            titles: ChapterTitles::Numbered("Chapter".to_string()),
            scene_size: 20,
            scene_label: "Section".to_string(),
        }
    }
}

/// Slice by time, drop empty slices, chunk each slice into scenes.
pub(super) fn segment(spans: &[SentenceSpan], duration_seconds: f64, config: &RatioConfig) -> Candidate {
    let cuts = config.layout.cuts(duration_seconds);
    debug!("Ratio strategy: {} slices", cuts.len() + 1);

    let chapters = partition_by_start(spans, &cuts)
        .into_iter()
        .enumerate()
        .filter(|(_, range)| !range.is_empty())
        .map(|(slot, range)| CandidateChapter {
            title: config.titles.title(slot + 1),
            scenes: chunk_scenes(range, config.scene_size, &config.scene_label),
        })
        .collect();

    Candidate { chapters }
}
