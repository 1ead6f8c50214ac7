//! Marker-driven grouping for listening-test recordings.

use super::{Candidate, CandidateChapter, CandidateScene, SegmentContext};
use crate::patterns::{BoundaryMarker, MarkerKind};
use crate::transcript::SentenceSpan;
use std::ops::Range;
use tracing::{debug, info};

/// Listening tests announce this many parts.
const EXPECTED_PARTS: usize = 4;

/// Chapters at "Part N" markers, scenes at item markers.
///
/// Returns an empty candidate when no part is announced.
pub(super) fn segment(spans: &[SentenceSpan], ctx: &SegmentContext<'_>) -> Candidate {
    let markers = ctx.detector.detect(spans);

    let parts: Vec<(usize, u32)> = markers
        .iter()
        .filter_map(|m| match m.kind {
            MarkerKind::Part(n) => Some((m.position, n)),
            _ => None,
        })
        .collect();

    let Some(&(first_position, first_part)) = parts.first() else {
        debug!("Pattern strategy: no part markers");
        return Candidate::default();
    };

    if parts.len() != EXPECTED_PARTS {
        info!(
            "Pattern strategy: found {} parts, expected {}",
            parts.len(),
            EXPECTED_PARTS
        );
    }

    let mut chapters = Vec::with_capacity(parts.len() + 1);

    if first_position > 0 {
        let title = if first_part > 1 {
            format!("Part {}", first_part - 1)
        } else {
            "Introduction".to_string()
        };
        chapters.push(CandidateChapter {
            title,
            scenes: item_scenes(0..first_position, &markers, "Introduction"),
        });
    }

    for (k, &(position, number)) in parts.iter().enumerate() {
        let end = parts.get(k + 1).map_or(spans.len(), |&(next, _)| next);
        chapters.push(CandidateChapter {
            title: format!("Part {}", number),
            scenes: item_scenes(position..end, &markers, "Directions"),
        });
    }

    Candidate { chapters }
}

/// Scenes for one chapter region: the preamble before the first item, then one
/// scene per item marker.
fn item_scenes(region: Range<usize>, markers: &[BoundaryMarker], preamble_title: &str) -> Vec<CandidateScene> {
    let items: Vec<&BoundaryMarker> = markers
        .iter()
        .filter(|m| m.kind.is_item() && region.contains(&m.position))
        .collect();

    let mut scenes = Vec::with_capacity(items.len() + 1);

    let preamble_end = items.first().map_or(region.end, |m| m.position);
    if preamble_end > region.start {
        scenes.push(CandidateScene {
            title: preamble_title.to_string(),
            spans: region.start..preamble_end,
        });
    }

    for (k, item) in items.iter().enumerate() {
        let end = items.get(k + 1).map_or(region.end, |next| next.position);
        scenes.push(CandidateScene {
            title: item.kind.item_title().unwrap_or_default(),
            spans: item.position..end,
        });
    }

    scenes
}
