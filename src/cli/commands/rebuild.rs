//! Rebuild command implementation.

use super::source::{load_source, resolve_template};
use crate::cli::{Output, SpinnerReporter};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcript::SpanFilter;
use anyhow::Result;

/// Run the rebuild command.
pub async fn run_rebuild(
    input: &str,
    media_id: Option<&str>,
    template: Option<&str>,
    audio: Option<&str>,
    duration: Option<f64>,
    filter: bool,
    settings: Settings,
) -> Result<()> {
    let filter = filter.then(|| SpanFilter::from_settings(&settings.filter));
    let source = load_source(input, media_id, audio, duration, filter.as_ref())?;
    let template = resolve_template(template, &settings);
    let orchestrator = Orchestrator::new(settings)?;

    Output::info(&format!(
        "Structuring '{}' with template {}",
        source.transcript.media_id, template
    ));

    let reporter = SpinnerReporter::new("Structuring...");
    match orchestrator
        .rebuild(&source.transcript, template, source.audio, &reporter)
        .await
    {
        Ok(result) => {
            if result.fell_back {
                Output::warning(&format!(
                    "Template {} could not be applied, used the {} strategy instead",
                    template, result.strategy
                ));
            }
            Output::success(&format!(
                "Saved '{}': {} chapters, {} scenes, {} sentences",
                result.media_id,
                result.summary.chapter_count,
                result.summary.scene_count,
                result.summary.sentence_count
            ));
        }
        Err(e) => {
            Output::error(&format!("Failed to rebuild: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
