//! Data models for transcript input.

use crate::error::{ChapterizeError, Result};
use serde::{Deserialize, Serialize};

/// A single transcribed utterance with timestamp information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceSpan {
    /// Transcribed text content.
    pub text: String,
    /// Start time in seconds.
    #[serde(alias = "start")]
    pub start_seconds: f64,
    /// End time in seconds.
    #[serde(alias = "end")]
    pub end_seconds: f64,
    /// Position of this span in the recognizer output (1-based).
    #[serde(default)]
    pub order: u32,
}

impl SentenceSpan {
    /// Create a new sentence span.
    pub fn new(text: impl Into<String>, start_seconds: f64, end_seconds: f64, order: u32) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            end_seconds,
            order,
        }
    }
}

/// All spans recognized for one media, plus its total duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Media ID this transcript belongs to.
    pub media_id: String,
    /// Sentence spans in recognizer order.
    pub spans: Vec<SentenceSpan>,
    /// Total media duration in seconds.
    pub duration_seconds: f64,
}

impl Transcript {
    /// Create a transcript with an explicit duration.
    ///
    /// Spans without an order (0) are numbered by position.
    pub fn new(media_id: impl Into<String>, spans: Vec<SentenceSpan>, duration_seconds: f64) -> Self {
        Self {
            media_id: media_id.into(),
            spans: number_spans(spans),
            duration_seconds,
        }
    }

    /// Create a transcript whose duration is the latest span end.
    pub fn from_spans(media_id: impl Into<String>, spans: Vec<SentenceSpan>) -> Self {
        let duration_seconds = spans
            .iter()
            .map(|s| s.end_seconds)
            .fold(0.0f64, f64::max);
        Self::new(media_id, spans, duration_seconds)
    }

    /// Validate spans and duration.
    pub fn validate(&self) -> Result<()> {
        validate_spans(&self.spans, self.duration_seconds)
    }

    /// Full text (concatenated spans).
    pub fn full_text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn number_spans(mut spans: Vec<SentenceSpan>) -> Vec<SentenceSpan> {
    if spans.iter().all(|s| s.order == 0) {
        for (i, span) in spans.iter_mut().enumerate() {
            span.order = i as u32 + 1;
        }
    }
    spans
}

/// Reject an empty or non-finite duration and spans whose times are malformed.
pub fn validate_spans(spans: &[SentenceSpan], duration_seconds: f64) -> Result<()> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return Err(ChapterizeError::InvalidInput(format!(
            "duration must be a positive number of seconds, got {}",
            duration_seconds
        )));
    }

    for (i, span) in spans.iter().enumerate() {
        if !span.start_seconds.is_finite() || !span.end_seconds.is_finite() {
            return Err(ChapterizeError::InvalidInput(format!(
                "span {} has a non-finite timestamp",
                i
            )));
        }
        if span.start_seconds < 0.0 {
            return Err(ChapterizeError::InvalidInput(format!(
                "span {} starts before zero ({})",
                i, span.start_seconds
            )));
        }
        if span.end_seconds <= span.start_seconds {
            return Err(ChapterizeError::InvalidInput(format!(
                "span {} ends at {} which is not after its start {}",
                i, span.end_seconds, span.start_seconds
            )));
        }
    }

    Ok(())
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_from_spans() {
        let spans = vec![
            SentenceSpan::new("Hello world", 0.0, 5.0, 0),
            SentenceSpan::new("This is a test", 5.0, 10.0, 0),
        ];

        let transcript = Transcript::from_spans("test_media", spans);

        assert_eq!(transcript.media_id, "test_media");
        assert_eq!(transcript.full_text(), "Hello world This is a test");
        assert_eq!(transcript.duration_seconds, 10.0);
        assert_eq!(transcript.spans[0].order, 1);
        assert_eq!(transcript.spans[1].order, 2);
    }

    #[test]
    fn test_explicit_orders_are_kept() {
        let spans = vec![
            SentenceSpan::new("a", 0.0, 1.0, 7),
            SentenceSpan::new("b", 1.0, 2.0, 9),
        ];
        let transcript = Transcript::new("m", spans, 2.0);
        assert_eq!(transcript.spans[0].order, 7);
        assert_eq!(transcript.spans[1].order, 9);
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let err = validate_spans(&[], 0.0).unwrap_err();
        assert!(matches!(err, ChapterizeError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_inverted_span() {
        let spans = vec![SentenceSpan::new("bad", 5.0, 5.0, 1)];
        assert!(matches!(
            validate_spans(&spans, 10.0),
            Err(ChapterizeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_span_json_accepts_short_field_names() {
        let span: SentenceSpan =
            serde_json::from_str(r#"{"text": "Hi", "start": 1.5, "end": 2.0}"#).unwrap();
        assert_eq!(span.start_seconds, 1.5);
        assert_eq!(span.end_seconds, 2.0);
        assert_eq!(span.order, 0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.0), "01:05");
        assert_eq!(format_timestamp(3665.0), "01:01:05");
    }
}
