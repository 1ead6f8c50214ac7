//! Show command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the show command.
pub async fn run_show(media_id: &str, sentences: bool, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let store = orchestrator.store();

    let Some(media) = store.get_media(media_id).await? else {
        Output::error(&format!("No structured content found for media ID: {}", media_id));
        Output::info("Use 'chapterize list' to see structured media.");
        return Ok(());
    };

    let hierarchy = store.get_hierarchy(media_id).await?.unwrap_or_default();

    Output::header(&media.media_id);
    Output::kv("Template", &media.template);
    Output::kv("Rebuilt", &media.rebuilt_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    println!();
    Output::hierarchy_tree(&hierarchy, sentences);

    Ok(())
}
