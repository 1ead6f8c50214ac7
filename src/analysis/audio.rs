//! Audio input for silence detection.

use crate::error::{ChapterizeError, Result};
use hound::{SampleFormat, WavReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Audio handed to the gap analyzer, either already decoded or as a WAV file.
#[derive(Debug, Clone)]
pub enum AudioInput {
    /// Mono samples in [-1.0, 1.0].
    Samples { samples: Vec<f32>, sample_rate: u32 },
    /// Path to a PCM WAV file, decoded on demand.
    WavFile(PathBuf),
}

/// Mono samples normalized to [-1.0, 1.0].
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

impl AudioInput {
    /// Decode to mono samples. Multi-channel WAV data is averaged per frame.
    pub fn decode(&self) -> Result<DecodedAudio> {
        match self {
            AudioInput::Samples {
                samples,
                sample_rate,
            } => {
                if *sample_rate == 0 {
                    return Err(ChapterizeError::AudioDecode(
                        "sample rate must be positive".to_string(),
                    ));
                }
                Ok(DecodedAudio {
                    samples: samples.clone(),
                    sample_rate: *sample_rate,
                })
            }
            AudioInput::WavFile(path) => decode_wav(path),
        }
    }
}

fn decode_wav(path: &Path) -> Result<DecodedAudio> {
    let reader = WavReader::open(path).map_err(|e| {
        ChapterizeError::AudioDecode(format!("Failed to open WAV file {}: {e}", path.display()))
    })?;

    let spec = reader.spec();
    debug!(
        "Decoding {}: {} Hz, {} channels, {} bits",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample
    );

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>(),
    }
    .map_err(|e| ChapterizeError::AudioDecode(format!("Corrupt WAV data: {e}")))?;

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Duration of a WAV file in seconds, read from its header.
pub fn wav_duration(path: &Path) -> Result<f64> {
    let reader = WavReader::open(path).map_err(|e| {
        ChapterizeError::AudioDecode(format!("Failed to open WAV file {}: {e}", path.display()))
    })?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(ChapterizeError::AudioDecode(
            "WAV header has a zero sample rate".to_string(),
        ));
    }
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    /// Write a 16-bit mono WAV, loud everywhere except the given silent ranges.
    fn write_test_wav(
        path: &Path,
        sample_rate: u32,
        duration_seconds: f64,
        silent: &[(f64, f64)],
    ) {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        let total = (duration_seconds * sample_rate as f64) as usize;
        for i in 0..total {
            let t = i as f64 / sample_rate as f64;
            let quiet = silent.iter().any(|(s, e)| t >= *s && t < *e);
            let value = if quiet {
                0i16
            } else if i % 2 == 0 {
                8000
            } else {
                -8000
            };
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_wav_normalizes_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, 1000, 2.0, &[]);

        let decoded = AudioInput::WavFile(path.clone()).decode().unwrap();
        assert_eq!(decoded.sample_rate, 1000);
        assert_eq!(decoded.samples.len(), 2000);
        assert!((decoded.samples[0] - 8000.0 / 32768.0).abs() < 1e-6);
        assert!((decoded.duration_seconds() - 2.0).abs() < 1e-9);
        assert!((wav_duration(&path).unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_decode_stereo_downmix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..10 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = AudioInput::WavFile(path).decode().unwrap();
        assert_eq!(decoded.samples.len(), 10);
        assert!((decoded.samples[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = AudioInput::WavFile(PathBuf::from("/nonexistent/audio.wav"))
            .decode()
            .unwrap_err();
        assert!(matches!(err, ChapterizeError::AudioDecode(_)));
    }
}
