//! Silence detection over decoded audio.
//!
//! Audio is cut into fixed frames. A frame whose RMS level in dBFS stays below
//! the threshold is silent, and runs of silent frames at least
//! `min_silence_seconds` long become silence intervals.

use super::audio::DecodedAudio;
use tracing::debug;

/// Silence detection parameters.
#[derive(Debug, Clone)]
pub struct SilenceConfig {
    /// Level in dBFS below which a frame is silent.
    pub threshold_db: f32,
    /// Minimum silent run length in seconds.
    pub min_silence_seconds: f64,
    /// Frame length in milliseconds.
    pub frame_millis: u32,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            threshold_db: -40.0,
            min_silence_seconds: 2.0,
            frame_millis: 10,
        }
    }
}

/// A silent stretch of audio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceInterval {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl SilenceInterval {
    pub fn midpoint(&self) -> f64 {
        (self.start_seconds + self.end_seconds) / 2.0
    }
}

/// Level of a frame in dBFS. Digital silence is negative infinity.
fn frame_db(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return f32::NEG_INFINITY;
    }
    let mean_square: f64 = frame
        .iter()
        .map(|&s| (s as f64) * (s as f64))
        .sum::<f64>()
        / frame.len() as f64;
    let rms = mean_square.sqrt();
    if rms <= 0.0 {
        f32::NEG_INFINITY
    } else {
        (20.0 * rms.log10()) as f32
    }
}

/// Find silent intervals in decoded audio.
pub fn detect_silence(audio: &DecodedAudio, config: &SilenceConfig) -> Vec<SilenceInterval> {
    let frame_len = ((audio.sample_rate as u64 * config.frame_millis as u64) / 1000).max(1) as usize;
    let frame_seconds = frame_len as f64 / audio.sample_rate.max(1) as f64;
    let total_seconds = audio.duration_seconds();

    let mut intervals = Vec::new();
    let mut run_start: Option<usize> = None;

    let frame_count = audio.samples.len().div_ceil(frame_len);
    for (i, frame) in audio.samples.chunks(frame_len).enumerate() {
        let silent = frame_db(frame) < config.threshold_db;
        match (silent, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                push_run(&mut intervals, start, i, frame_seconds, total_seconds, config);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        push_run(&mut intervals, start, frame_count, frame_seconds, total_seconds, config);
    }

    debug!(
        "Found {} silent intervals in {:.2}s of audio",
        intervals.len(),
        total_seconds
    );
    intervals
}

fn push_run(
    intervals: &mut Vec<SilenceInterval>,
    start_frame: usize,
    end_frame: usize,
    frame_seconds: f64,
    total_seconds: f64,
    config: &SilenceConfig,
) {
    let start_seconds = start_frame as f64 * frame_seconds;
    let end_seconds = (end_frame as f64 * frame_seconds).min(total_seconds);
    // Frame rounding can land a hair short of the configured minimum.
    if end_seconds - start_seconds + 1e-9 >= config.min_silence_seconds {
        intervals.push(SilenceInterval {
            start_seconds,
            end_seconds,
        });
    }
}

/// Cut points used when no audio can be analyzed.
///
/// Longer media gets more parts: four above ten minutes, two above five,
/// otherwise the whole duration stays one part.
pub fn equal_division_boundaries(duration_seconds: f64) -> Vec<f64> {
    let parts = if duration_seconds > 600.0 {
        4
    } else if duration_seconds > 300.0 {
        2
    } else {
        1
    };
    (1..parts)
        .map(|i| duration_seconds * i as f64 / parts as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio_with_silence(sample_rate: u32, seconds: f64, silent: &[(f64, f64)]) -> DecodedAudio {
        let total = (seconds * sample_rate as f64) as usize;
        let samples = (0..total)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                if silent.iter().any(|(s, e)| t >= *s && t < *e) {
                    0.0
                } else {
                    0.5
                }
            })
            .collect();
        DecodedAudio {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn test_detects_long_silence_only() {
        let audio = audio_with_silence(1000, 20.0, &[(5.0, 8.0), (12.0, 13.0)]);
        let intervals = detect_silence(&audio, &SilenceConfig::default());

        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start_seconds - 5.0).abs() < 0.02);
        assert!((intervals[0].end_seconds - 8.0).abs() < 0.02);
        assert!((intervals[0].midpoint() - 6.5).abs() < 0.02);
    }

    #[test]
    fn test_trailing_silence_is_closed() {
        let audio = audio_with_silence(1000, 10.0, &[(7.0, 10.0)]);
        let intervals = detect_silence(&audio, &SilenceConfig::default());
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].end_seconds - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_loud_audio_has_no_silence() {
        let audio = audio_with_silence(1000, 10.0, &[]);
        assert!(detect_silence(&audio, &SilenceConfig::default()).is_empty());
    }

    #[test]
    fn test_frame_db() {
        assert_eq!(frame_db(&[0.0, 0.0]), f32::NEG_INFINITY);
        assert!((frame_db(&[1.0, -1.0]) - 0.0).abs() < 1e-6);
        assert!((frame_db(&[0.01, -0.01]) + 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_equal_division() {
        assert!(equal_division_boundaries(120.0).is_empty());
        assert_eq!(equal_division_boundaries(400.0), vec![200.0]);
        assert_eq!(equal_division_boundaries(800.0), vec![200.0, 400.0, 600.0]);
        assert!(equal_division_boundaries(300.0).is_empty());
    }
}
