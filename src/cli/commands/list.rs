//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    match orchestrator.store().list_media().await {
        Ok(media) => {
            if media.is_empty() {
                Output::info("No media structured yet. Use 'chapterize rebuild <transcript>' to add content.");
            } else {
                Output::header(&format!("Structured Media ({})", media.len()));
                println!();

                for item in &media {
                    Output::media_info(item);
                }

                let total_scenes: usize = media.iter().map(|m| m.scene_count).sum();
                println!();
                Output::kv("Total items", &media.len().to_string());
                Output::kv("Total scenes", &total_scenes.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list media: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
