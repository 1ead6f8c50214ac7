//! Preview command implementation.

use super::source::{load_source, resolve_template};
use crate::cli::Output;
use crate::config::Settings;
use crate::segmentation::TemplateSelector;
use crate::transcript::{format_hierarchy, OutputFormat, SpanFilter};
use anyhow::Result;

/// Run the preview command.
pub fn run_preview(
    input: &str,
    template: Option<&str>,
    audio: Option<&str>,
    duration: Option<f64>,
    sentences: bool,
    json: bool,
    filter: bool,
    settings: &Settings,
) -> Result<()> {
    let filter = filter.then(|| SpanFilter::from_settings(&settings.filter));
    let source = load_source(input, None, audio, duration, filter.as_ref())?;
    let template = resolve_template(template, settings);

    let selector = TemplateSelector::from_settings(settings);
    let segmentation = selector.build(
        &source.transcript.spans,
        source.transcript.duration_seconds,
        template,
        source.audio.as_ref(),
    )?;

    if json {
        println!(
            "{}",
            format_hierarchy(&source.transcript.media_id, &segmentation.hierarchy, OutputFormat::Json)
        );
        return Ok(());
    }

    Output::header(&format!(
        "{} ({} template, {} strategy)",
        source.transcript.media_id, template, segmentation.strategy
    ));
    if segmentation.fell_back {
        Output::warning(&format!("Template {} could not be applied, fell back", template));
    }
    Output::hierarchy_tree(&segmentation.hierarchy, sentences);

    let summary = segmentation.hierarchy.summary();
    Output::kv("Chapters", &summary.chapter_count.to_string());
    Output::kv("Scenes", &summary.scene_count.to_string());
    Output::kv("Sentences", &summary.sentence_count.to_string());

    Ok(())
}
