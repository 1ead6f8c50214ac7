//! Inter-sentence gap classification.

use crate::transcript::SentenceSpan;
use serde::Serialize;

/// Gap thresholds in seconds. Both bounds are inclusive.
#[derive(Debug, Clone, Copy)]
pub struct GapThresholds {
    pub major_seconds: f64,
    pub minor_seconds: f64,
}

impl Default for GapThresholds {
    fn default() -> Self {
        Self {
            major_seconds: 10.0,
            minor_seconds: 3.0,
        }
    }
}

/// What a gap boundary opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryLevel {
    Chapter,
    Scene,
}

/// A boundary before the span at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Boundary {
    /// Index of the first span after the gap.
    pub index: usize,
    /// Start of that span.
    pub time_seconds: f64,
    /// Silence between the previous span's end and this span's start.
    pub gap_seconds: f64,
    pub level: BoundaryLevel,
}

/// Classify the gap before each span (after the first).
///
/// Spans must already be in start-time order. Overlapping spans produce a
/// negative gap and never form a boundary.
pub fn find_gap_boundaries(spans: &[SentenceSpan], thresholds: &GapThresholds) -> Vec<Boundary> {
    spans
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let gap = pair[1].start_seconds - pair[0].end_seconds;
            let level = if gap >= thresholds.major_seconds {
                BoundaryLevel::Chapter
            } else if gap >= thresholds.minor_seconds {
                BoundaryLevel::Scene
            } else {
                return None;
            };
            Some(Boundary {
                index: i + 1,
                time_seconds: pair[1].start_seconds,
                gap_seconds: gap,
                level,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(times: &[(f64, f64)]) -> Vec<SentenceSpan> {
        times
            .iter()
            .enumerate()
            .map(|(i, (s, e))| SentenceSpan::new(format!("s{}", i), *s, *e, i as u32 + 1))
            .collect()
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let spans = spans(&[(0.0, 1.0), (11.0, 12.0), (15.0, 16.0), (17.0, 18.0)]);
        let boundaries = find_gap_boundaries(&spans, &GapThresholds::default());

        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].index, 1);
        assert_eq!(boundaries[0].level, BoundaryLevel::Chapter);
        assert_eq!(boundaries[0].gap_seconds, 10.0);
        assert_eq!(boundaries[1].index, 2);
        assert_eq!(boundaries[1].level, BoundaryLevel::Scene);
    }

    #[test]
    fn test_overlap_is_ignored() {
        let spans = spans(&[(0.0, 5.0), (4.0, 6.0)]);
        assert!(find_gap_boundaries(&spans, &GapThresholds::default()).is_empty());
    }

    #[test]
    fn test_single_span_has_no_gaps() {
        let spans = spans(&[(0.0, 5.0)]);
        assert!(find_gap_boundaries(&spans, &GapThresholds::default()).is_empty());
    }
}
