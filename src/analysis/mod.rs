//! Gap analysis: where the media falls silent.
//!
//! Two sources of boundaries feed the segmentation strategies:
//! - silence in the audio itself, reduced to interval midpoints
//! - gaps between consecutive transcript spans, classified as chapter or scene breaks

mod audio;
mod gaps;
mod silence;

pub use audio::{wav_duration, AudioInput, DecodedAudio};
pub use gaps::{find_gap_boundaries, Boundary, BoundaryLevel, GapThresholds};
pub use silence::{detect_silence, equal_division_boundaries, SilenceConfig, SilenceInterval};

use crate::config::AnalysisSettings;
use crate::error::{ChapterizeError, Result};
use crate::transcript::SentenceSpan;
use tracing::{instrument, warn};

/// Boundary finder configured from settings.
#[derive(Debug, Clone, Default)]
pub struct GapAnalyzer {
    pub silence: SilenceConfig,
    pub gaps: GapThresholds,
}

impl GapAnalyzer {
    pub fn new(silence: SilenceConfig, gaps: GapThresholds) -> Self {
        Self { silence, gaps }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self {
            silence: SilenceConfig {
                threshold_db: settings.silence_threshold_db,
                min_silence_seconds: settings.min_silence_seconds,
                frame_millis: settings.frame_millis,
            },
            gaps: GapThresholds {
                major_seconds: settings.major_gap_seconds,
                minor_seconds: settings.minor_gap_seconds,
            },
        }
    }

    /// Chapter cut points in seconds, ascending, strictly inside (0, duration).
    ///
    /// Silence midpoints are used when audio is available and decodes. Without
    /// usable audio the duration is divided into equal parts instead.
    #[instrument(skip(self, audio))]
    pub fn silence_boundaries(&self, audio: Option<&AudioInput>, duration_seconds: f64) -> Result<Vec<f64>> {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(ChapterizeError::InvalidInput(format!(
                "duration must be positive, got {}",
                duration_seconds
            )));
        }

        let Some(audio) = audio else {
            warn!("No audio supplied for silence detection, dividing duration equally");
            return Ok(equal_division_boundaries(duration_seconds));
        };

        match audio.decode() {
            Ok(decoded) => {
                let mut cuts: Vec<f64> = detect_silence(&decoded, &self.silence)
                    .iter()
                    .map(SilenceInterval::midpoint)
                    .filter(|t| *t > 0.0 && *t < duration_seconds)
                    .collect();
                cuts.sort_by(f64::total_cmp);
                cuts.dedup();
                Ok(cuts)
            }
            Err(e) => {
                warn!("Audio unusable for silence detection ({}), dividing duration equally", e);
                Ok(equal_division_boundaries(duration_seconds))
            }
        }
    }

    /// Chapter and scene boundaries from gaps between spans.
    pub fn gap_boundaries(&self, spans: &[SentenceSpan]) -> Vec<Boundary> {
        find_gap_boundaries(spans, &self.gaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_silence_boundaries_from_samples() {
        let sample_rate = 1000;
        let samples = (0..30_000)
            .map(|i| if (10_000..13_000).contains(&i) { 0.0 } else { 0.3 })
            .collect();
        let audio = AudioInput::Samples {
            samples,
            sample_rate,
        };

        let cuts = GapAnalyzer::default()
            .silence_boundaries(Some(&audio), 30.0)
            .unwrap();
        assert_eq!(cuts.len(), 1);
        assert!((cuts[0] - 11.5).abs() < 0.02);
    }

    #[test]
    fn test_unreadable_audio_falls_back_to_equal_division() {
        let audio = AudioInput::WavFile(PathBuf::from("/nonexistent/lecture.wav"));
        let cuts = GapAnalyzer::default()
            .silence_boundaries(Some(&audio), 700.0)
            .unwrap();
        assert_eq!(cuts, vec![175.0, 350.0, 525.0]);
    }

    #[test]
    fn test_missing_audio_divides_equally() {
        let cuts = GapAnalyzer::default().silence_boundaries(None, 400.0).unwrap();
        assert_eq!(cuts, vec![200.0]);
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        assert!(GapAnalyzer::default().silence_boundaries(None, 0.0).is_err());
        assert!(GapAnalyzer::default()
            .silence_boundaries(None, f64::NAN)
            .is_err());
    }

    #[test]
    fn test_from_settings() {
        let mut settings = AnalysisSettings::default();
        settings.major_gap_seconds = 15.0;
        let analyzer = GapAnalyzer::from_settings(&settings);
        assert_eq!(analyzer.gaps.major_seconds, 15.0);
        assert_eq!(analyzer.silence.threshold_db, -40.0);
    }
}
