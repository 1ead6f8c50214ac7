//! Gap-threshold chapters and scenes.

use super::{split_at_indices, Candidate, CandidateChapter, CandidateScene, SegmentContext};
use crate::analysis::BoundaryLevel;
use crate::transcript::SentenceSpan;
use tracing::debug;

/// Chapters split at major gaps, scenes at minor gaps inside each chapter.
pub(super) fn segment(spans: &[SentenceSpan], ctx: &SegmentContext<'_>) -> Candidate {
    let boundaries = ctx.analyzer.gap_boundaries(spans);

    let indices_at = |level: BoundaryLevel| -> Vec<usize> {
        boundaries
            .iter()
            .filter(|b| b.level == level)
            .map(|b| b.index)
            .collect()
    };
    let chapter_indices = indices_at(BoundaryLevel::Chapter);
    let scene_indices = indices_at(BoundaryLevel::Scene);

    debug!(
        "Gap strategy: {} chapter breaks, {} scene breaks",
        chapter_indices.len(),
        scene_indices.len()
    );

    let chapters = split_at_indices(0..spans.len(), &chapter_indices)
        .into_iter()
        .enumerate()
        .map(|(i, chapter_range)| CandidateChapter {
            title: format!("Chapter {}", i + 1),
            scenes: split_at_indices(chapter_range, &scene_indices)
                .into_iter()
                .enumerate()
                .map(|(j, scene_range)| CandidateScene {
                    title: format!("Scene {}", j + 1),
                    spans: scene_range,
                })
                .collect(),
        })
        .collect();

    Candidate { chapters }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::analysis::GapAnalyzer;
    use crate::config::SegmentationSettings;
    use crate::patterns::MarkerDetector;

    fn run(spans: &[SentenceSpan]) -> Candidate {
        let analyzer = GapAnalyzer::default();
        let detector = MarkerDetector::new();
        let settings = SegmentationSettings::default();
        let ctx = SegmentContext {
            duration_seconds: 1000.0,
            audio: None,
            analyzer: &analyzer,
            detector: &detector,
            settings: &settings,
        };
        segment(spans, &ctx)
    }

    #[test]
    fn test_exact_major_gap_starts_chapter() {
        let spans = spans_at(&[(0.0, 2.0), (2.5, 4.0), (14.0, 15.0), (15.5, 16.0)]);
        let candidate = run(&spans);

        assert_eq!(sizes(&candidate), vec![vec![2], vec![2]]);
        assert_eq!(candidate.chapters[1].title, "Chapter 2");
    }

    #[test]
    fn test_minor_gaps_split_scenes() {
        let spans = spans_at(&[
            (0.0, 1.0),
            (4.0, 5.0),
            (5.5, 6.0),
            (20.0, 21.0),
            (24.5, 25.0),
        ]);
        let candidate = run(&spans);

        assert_eq!(sizes(&candidate), vec![vec![1, 2], vec![1, 1]]);
        assert_eq!(candidate.chapters[0].scenes[1].title, "Scene 2");
        assert_eq!(candidate.chapters[1].scenes[0].spans, 3..4);
    }

    #[test]
    fn test_no_gaps_single_group() {
        let spans = evenly_spaced(5, 1.5);
        assert_eq!(sizes(&run(&spans)), vec![vec![5]]);
    }
}
