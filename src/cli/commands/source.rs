//! Shared transcript and audio loading for commands that take an input file.

use crate::analysis::{wav_duration, AudioInput};
use crate::cli::Output;
use crate::config::Settings;
use crate::segmentation::Template;
use crate::transcript::{load_transcript, SpanFilter, Transcript};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// A transcript ready to structure, with optional audio.
pub(super) struct Source {
    pub transcript: Transcript,
    pub audio: Option<AudioInput>,
}

/// Load a transcript file, optionally filter its spans, and settle its media ID and duration.
pub(super) fn load_source(
    input: &str,
    media_id: Option<&str>,
    audio: Option<&str>,
    duration: Option<f64>,
    filter: Option<&SpanFilter>,
) -> Result<Source> {
    let path = Path::new(input);
    let mut loaded =
        load_transcript(path).with_context(|| format!("Failed to read transcript {}", input))?;
    if let Some(filter) = filter {
        let before = loaded.spans.len();
        loaded.spans = filter.apply(loaded.spans);
        info!(before, after = loaded.spans.len(), "Filtered transcript spans");
    }

    let media_id = media_id
        .map(str::to_string)
        .or_else(|| loaded.media_id.clone())
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().to_string()))
        .unwrap_or_else(|| input.to_string());

    let audio = audio.map(|a| AudioInput::WavFile(PathBuf::from(a)));
    let audio_duration = match &audio {
        Some(AudioInput::WavFile(path)) => match wav_duration(path) {
            Ok(d) => Some(d),
            Err(e) => {
                Output::warning(&format!("Could not read audio duration: {}", e));
                None
            }
        },
        _ => None,
    };

    let transcript = loaded.into_transcript(media_id, duration, audio_duration);
    Ok(Source { transcript, audio })
}

/// The template named on the command line, or the configured default.
pub(super) fn resolve_template(name: Option<&str>, settings: &Settings) -> Template {
    Template::from_name(name.unwrap_or(&settings.segmentation.default_template))
}
