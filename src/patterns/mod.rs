//! Structural marker detection in transcript text.
//!
//! Listening-test recordings announce their own structure ("Part 2",
//! "Directions: ...", "Number 7.", "Questions 32 through 34"). The detector
//! turns those announcements into typed markers that the pattern strategy
//! groups spans by.

use crate::transcript::SentenceSpan;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Kind of structural marker, with the numbers it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerKind {
    /// "Part N" opening a test section.
    Part(u32),
    /// A directions preamble inside the current part.
    Directions,
    /// "Number N." opening a single item.
    NumberedItem(u32),
    /// "Questions N through M" opening an item group.
    ItemRange(u32, u32),
}

impl MarkerKind {
    /// Whether this marker opens an item scene.
    pub fn is_item(&self) -> bool {
        matches!(self, MarkerKind::NumberedItem(_) | MarkerKind::ItemRange(_, _))
    }

    /// Scene title for item markers.
    pub fn item_title(&self) -> Option<String> {
        match self {
            MarkerKind::NumberedItem(n) => Some(format!("Number {}", n)),
            MarkerKind::ItemRange(n, m) => Some(format!("Questions {}-{}", n, m)),
            _ => None,
        }
    }
}

/// A marker and the index of the span it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundaryMarker {
    pub kind: MarkerKind,
    pub position: usize,
}

/// Compiled marker grammar.
pub struct MarkerDetector {
    part: Regex,
    directions: Regex,
    numbered: Regex,
    range: Regex,
}

impl Default for MarkerDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerDetector {
    pub fn new() -> Self {
        Self {
            part: Regex::new(r"(?i)^\s*part\s+([1-9])\b").expect("Invalid regex"),
            directions: Regex::new(r"(?i)\bdirections\b").expect("Invalid regex"),
            numbered: Regex::new(r"(?i)^\s*number\s+(\d+)\.").expect("Invalid regex"),
            range: Regex::new(r"(?i)\bquestions?\s+(\d+)\s+through\s+(\d+)").expect("Invalid regex"),
        }
    }

    /// Markers in span order. Empty when the text names no part at all.
    ///
    /// One span yields at most one marker. A directions marker is only emitted
    /// while a part is open and none of its items has started yet.
    pub fn detect(&self, spans: &[SentenceSpan]) -> Vec<BoundaryMarker> {
        let mut markers = Vec::new();
        let mut in_preamble = false;
        let mut directions_seen = false;

        for (position, span) in spans.iter().enumerate() {
            let Some(kind) = self.classify(&span.text, in_preamble && !directions_seen) else {
                continue;
            };

            match kind {
                MarkerKind::Part(_) => {
                    in_preamble = true;
                    directions_seen = false;
                }
                MarkerKind::Directions => directions_seen = true,
                MarkerKind::NumberedItem(_) | MarkerKind::ItemRange(_, _) => in_preamble = false,
            }

            markers.push(BoundaryMarker { kind, position });
        }

        if !markers.iter().any(|m| matches!(m.kind, MarkerKind::Part(_))) {
            debug!("No part markers in {} spans", spans.len());
            return Vec::new();
        }

        debug!("Detected {} markers in {} spans", markers.len(), spans.len());
        markers
    }

    fn classify(&self, text: &str, directions_allowed: bool) -> Option<MarkerKind> {
        if let Some(caps) = self.part.captures(text) {
            return caps[1].parse().ok().map(MarkerKind::Part);
        }
        if directions_allowed && self.directions.is_match(text) {
            return Some(MarkerKind::Directions);
        }
        if let Some(caps) = self.numbered.captures(text) {
            if let Ok(n) = caps[1].parse() {
                return Some(MarkerKind::NumberedItem(n));
            }
        }
        if let Some(caps) = self.range.captures(text) {
            if let (Ok(n), Ok(m)) = (caps[1].parse(), caps[2].parse()) {
                return Some(MarkerKind::ItemRange(n, m));
            }
        }
        None
    }
}

/// Detect markers with the default grammar.
pub fn detect_markers(spans: &[SentenceSpan]) -> Vec<BoundaryMarker> {
    MarkerDetector::new().detect(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(texts: &[&str]) -> Vec<SentenceSpan> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| SentenceSpan::new(*t, i as f64, i as f64 + 1.0, i as u32 + 1))
            .collect()
    }

    #[test]
    fn test_detects_all_kinds_in_order() {
        let spans = spans(&[
            "Part 1.",
            "Directions: For each question you will hear four statements.",
            "Number 1. Look at the picture.",
            "Part 3",
            "Questions 32 through 34 refer to the following conversation.",
        ]);

        let kinds: Vec<MarkerKind> = detect_markers(&spans).iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MarkerKind::Part(1),
                MarkerKind::Directions,
                MarkerKind::NumberedItem(1),
                MarkerKind::Part(3),
                MarkerKind::ItemRange(32, 34),
            ]
        );
    }

    #[test]
    fn test_no_part_means_no_markers() {
        let spans = spans(&["Number 1. Hello.", "Questions 1 through 3."]);
        assert!(detect_markers(&spans).is_empty());
    }

    #[test]
    fn test_directions_only_in_preamble() {
        let spans = spans(&[
            "Part 2",
            "Number 7. Where is the meeting?",
            "Follow the directions on the sign.",
        ]);
        let markers = detect_markers(&spans);
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|m| m.kind != MarkerKind::Directions));
    }

    #[test]
    fn test_part_takes_precedence() {
        let spans = spans(&["Part 4 directions: questions 71 through 73."]);
        let markers = detect_markers(&spans);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, MarkerKind::Part(4));
    }

    #[test]
    fn test_numbered_item_must_lead_the_span() {
        let spans = spans(&["Part 1", "Say number 5. again"]);
        assert_eq!(detect_markers(&spans).len(), 1);
    }

    #[test]
    fn test_case_insensitive() {
        let spans = spans(&["PART 2", "NUMBER 8. What time is it?"]);
        let markers = detect_markers(&spans);
        assert_eq!(markers[1].kind, MarkerKind::NumberedItem(8));
        assert_eq!(markers[1].position, 1);
    }
}
