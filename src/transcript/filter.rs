//! Optional span clean-up before structuring.
//!
//! Recognizers emit fragments: sub-second blips, run-on spans that cover a
//! whole paragraph, and spans that are nothing but fillers or sound tags.
//! The filter removes or splits those before any strategy sees them, so the
//! hierarchy still holds every span that survives.

use super::SentenceSpan;
use crate::config::FilterSettings;
use regex::Regex;
use tracing::debug;

/// Duration and content filter over recognizer spans.
pub struct SpanFilter {
    min_seconds: f64,
    max_seconds: f64,
    min_words: usize,
    noise: Regex,
    whitespace: Regex,
}

impl Default for SpanFilter {
    fn default() -> Self {
        Self::from_settings(&FilterSettings::default())
    }
}

impl SpanFilter {
    pub fn from_settings(settings: &FilterSettings) -> Self {
        Self {
            min_seconds: settings.min_span_seconds,
            max_seconds: settings.max_span_seconds,
            min_words: settings.min_words,
            noise: Regex::new(r"(?i)\b(?:um|uh|ah|er|mm|hmm)\b|\[.*?\]|\(.*?\)").expect("Invalid regex"),
            whitespace: Regex::new(r"\s+").expect("Invalid regex"),
        }
    }

    /// Filter spans and number the survivors from 1 in their original order.
    ///
    /// Spans shorter than the minimum are dropped. Spans longer than the
    /// maximum are split at their midpoint into two halves that share the
    /// cleaned text, tagged "(1/2)" and "(2/2)". Fillers, bracketed tags and
    /// parentheticals are stripped, and spans left with too few words are
    /// dropped.
    pub fn apply(&self, spans: Vec<SentenceSpan>) -> Vec<SentenceSpan> {
        let before = spans.len();
        let mut kept = Vec::with_capacity(spans.len());

        for span in spans {
            let length = span.end_seconds - span.start_seconds;
            if length < self.min_seconds {
                debug!(order = span.order, length, "Dropping short span");
                continue;
            }

            let text = self.clean(&span.text);
            if text.split_whitespace().count() < self.min_words {
                debug!(order = span.order, "Dropping span with too few words");
                continue;
            }

            if length > self.max_seconds {
                let mid = span.start_seconds + length / 2.0;
                kept.push(SentenceSpan::new(format!("{} (1/2)", text), span.start_seconds, mid, 0));
                kept.push(SentenceSpan::new(format!("{} (2/2)", text), mid, span.end_seconds, 0));
            } else {
                kept.push(SentenceSpan::new(text, span.start_seconds, span.end_seconds, 0));
            }
        }

        for (i, span) in kept.iter_mut().enumerate() {
            span.order = i as u32 + 1;
        }

        debug!(before, after = kept.len(), "Filtered spans");
        kept
    }

    fn clean(&self, text: &str) -> String {
        let stripped = self.noise.replace_all(text, " ");
        self.whitespace.replace_all(stripped.trim(), " ").into_owned()
    }
}
