//! Transcript file loading (JSON and SRT).

use super::{SentenceSpan, Transcript};
use crate::error::{ChapterizeError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Cues with less text than this after cleanup are dropped.
const MIN_CUE_CHARS: usize = 3;

/// JSON transcript file layout.
#[derive(Debug, Deserialize)]
struct TranscriptFile {
    #[serde(default)]
    media_id: Option<String>,
    #[serde(default)]
    duration_seconds: Option<f64>,
    spans: Vec<SentenceSpan>,
}

/// A transcript read from disk, before its duration is settled.
#[derive(Debug, Clone)]
pub struct LoadedTranscript {
    /// Media ID from the file, if it names one.
    pub media_id: Option<String>,
    /// Duration from the file, if it states one.
    pub duration_seconds: Option<f64>,
    pub spans: Vec<SentenceSpan>,
}

impl LoadedTranscript {
    /// Settle the duration and build a transcript.
    ///
    /// Precedence: explicit override, then the file's own duration, then the
    /// audio duration, then the latest span end.
    pub fn into_transcript(
        self,
        media_id: String,
        duration_override: Option<f64>,
        audio_duration: Option<f64>,
    ) -> Transcript {
        let last_end = self
            .spans
            .iter()
            .map(|s| s.end_seconds)
            .fold(0.0f64, f64::max);

        let duration = duration_override
            .or(self.duration_seconds)
            .or(audio_duration)
            .unwrap_or(last_end);

        Transcript::new(media_id, self.spans, duration)
    }
}

/// Load a transcript file. `.srt` files are parsed as SubRip, everything else as JSON.
pub fn load_transcript(path: &Path) -> Result<LoadedTranscript> {
    let content = std::fs::read_to_string(path)?;

    let is_srt = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("srt"));

    if is_srt {
        let spans = parse_srt(&content);
        if spans.is_empty() {
            return Err(ChapterizeError::InvalidInput(format!(
                "No subtitle cues found in {}",
                path.display()
            )));
        }
        Ok(LoadedTranscript {
            media_id: None,
            duration_seconds: None,
            spans,
        })
    } else {
        let file: TranscriptFile = serde_json::from_str(&content)?;
        Ok(LoadedTranscript {
            media_id: file.media_id,
            duration_seconds: file.duration_seconds,
            spans: file.spans,
        })
    }
}

/// Parse SubRip content into sentence spans.
///
/// Malformed blocks are skipped. Cue numbers become span orders.
pub fn parse_srt(content: &str) -> Vec<SentenceSpan> {
    let time_regex = Regex::new(
        r"(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})",
    )
    .expect("Invalid regex");
    let block_separator = Regex::new(r"\r?\n\s*\r?\n").expect("Invalid regex");

    let mut spans = Vec::new();

    for block in block_separator.split(content.trim()) {
        let lines: Vec<&str> = block.trim().lines().collect();
        if lines.len() < 3 {
            continue;
        }

        let Ok(number) = lines[0].trim().parse::<u32>() else {
            warn!("Skipping SRT block with invalid cue number: {:?}", lines[0]);
            continue;
        };

        let Some(caps) = time_regex.captures(lines[1]) else {
            warn!("Skipping SRT cue {} with invalid timing line", number);
            continue;
        };

        let field = |i: usize| caps[i].parse::<f64>().unwrap_or(0.0);
        let start = field(1) * 3600.0 + field(2) * 60.0 + field(3) + field(4) / 1000.0;
        let end = field(5) * 3600.0 + field(6) * 60.0 + field(7) + field(8) / 1000.0;

        let text = clean_cue_text(&lines[2..].join(" "));
        if text.chars().count() < MIN_CUE_CHARS {
            debug!("Skipping SRT cue {} with no usable text", number);
            continue;
        }

        spans.push(SentenceSpan::new(text, start, end, number));
    }

    spans
}

/// Strip markup and sound descriptions from subtitle text.
fn clean_cue_text(text: &str) -> String {
    let markup = Regex::new(r"<[^>]*>|\[[^\]]*\]").expect("Invalid regex");
    let whitespace = Regex::new(r"\s+").expect("Invalid regex");

    let stripped = markup.replace_all(text, "");
    whitespace.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:03,500\nPart 1.\n\n2\n00:00:04,000 --> 00:00:06,250\n<i>Number 1.</i> Look at the picture.\n\n3\nnot a timing line\nbroken\n\n4\n00:00:07,000 --> 00:00:08,000\n[music]\n";

    #[test]
    fn test_parse_srt() {
        let spans = parse_srt(SAMPLE_SRT);

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Part 1.");
        assert_eq!(spans[0].start_seconds, 1.0);
        assert_eq!(spans[0].end_seconds, 3.5);
        assert_eq!(spans[1].text, "Number 1. Look at the picture.");
        assert_eq!(spans[1].order, 2);
        assert!((spans[1].end_seconds - 6.25).abs() < 1e-9);
    }

    #[test]
    fn test_load_json_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson.json");
        std::fs::write(
            &path,
            r#"{"media_id": "lesson-1", "duration_seconds": 30.0,
                "spans": [{"text": "Hello", "start": 0.0, "end": 2.0}]}"#,
        )
        .unwrap();

        let loaded = load_transcript(&path).unwrap();
        assert_eq!(loaded.media_id.as_deref(), Some("lesson-1"));

        let transcript = loaded.into_transcript("lesson-1".to_string(), None, Some(99.0));
        assert_eq!(transcript.duration_seconds, 30.0);
        assert_eq!(transcript.spans[0].order, 1);
    }

    #[test]
    fn test_duration_precedence() {
        let loaded = LoadedTranscript {
            media_id: None,
            duration_seconds: None,
            spans: vec![SentenceSpan::new("a", 0.0, 4.0, 1)],
        };

        let from_audio = loaded.clone().into_transcript("m".into(), None, Some(12.0));
        assert_eq!(from_audio.duration_seconds, 12.0);

        let from_override = loaded.clone().into_transcript("m".into(), Some(20.0), Some(12.0));
        assert_eq!(from_override.duration_seconds, 20.0);

        let from_spans = loaded.into_transcript("m".into(), None, None);
        assert_eq!(from_spans.duration_seconds, 4.0);
    }
}
