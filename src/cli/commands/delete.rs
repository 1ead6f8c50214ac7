//! Delete command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the delete command.
pub async fn run_delete(media_id: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    if orchestrator.store().delete_media(media_id).await? {
        Output::success(&format!("Deleted '{}'", media_id));
    } else {
        Output::warning(&format!("No structured content found for media ID: {}", media_id));
    }

    Ok(())
}
