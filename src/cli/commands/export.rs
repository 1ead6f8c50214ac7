//! Export command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcript::{format_hierarchy, select, ExportScope, OutputFormat};
use anyhow::Result;

/// Run the export command.
pub async fn run_export(
    media_id: &str,
    output: Option<String>,
    format: &str,
    chapter: Option<u32>,
    scene: Option<u32>,
    settings: Settings,
) -> Result<()> {
    let output_format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let scope = ExportScope::from_orders(chapter, scene)?;

    let orchestrator = Orchestrator::new(settings)?;
    let Some(hierarchy) = orchestrator.store().get_hierarchy(media_id).await? else {
        Output::error(&format!("No structured content found for media ID: {}", media_id));
        Output::info("Use 'chapterize list' to see structured media.");
        return Ok(());
    };

    let selected = select(&hierarchy, scope)?;
    let output_str = format_hierarchy(media_id, &selected, output_format);

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &output_str)?;
            Output::success(&format!(
                "Exported '{}' to {} ({} sentences)",
                media_id,
                path,
                selected.sentence_count()
            ));
        }
        _ => {
            println!("{}", output_str);
        }
    }

    Ok(())
}
