//! Restructure command implementation.

use super::source::resolve_template;
use crate::cli::{Output, SpinnerReporter};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::status::{ProgressReporter, Stage, StatusBoard};
use anyhow::Result;
use futures::stream::{self, StreamExt};

/// Run the restructure command.
pub async fn run_restructure(
    media_id: &str,
    template: Option<&str>,
    jobs: usize,
    settings: Settings,
) -> Result<()> {
    let template = resolve_template(template, &settings);
    let orchestrator = Orchestrator::new(settings)?;

    if media_id != "all" {
        Output::info(&format!("Restructuring '{}' with template {}", media_id, template));

        let reporter = SpinnerReporter::new("Restructuring...");
        match orchestrator.restructure(media_id, template, &reporter).await {
            Ok(result) => {
                Output::success(&format!(
                    "Restructured '{}' ({} chapters, {} scenes)",
                    result.media_id, result.summary.chapter_count, result.summary.scene_count
                ));
            }
            Err(e) => {
                Output::error(&format!("Failed to restructure: {}", e));
                return Err(e.into());
            }
        }
        return Ok(());
    }

    let media = orchestrator.store().list_media().await?;
    if media.is_empty() {
        Output::warning("No structured media found.");
        Output::info("Use 'chapterize rebuild <transcript>' to add content.");
        return Ok(());
    }

    Output::info(&format!(
        "Restructuring {} media with template {}",
        media.len(),
        template
    ));

    let board = StatusBoard::new();
    let pb = Output::progress_bar(media.len() as u64, "Restructuring");

    let orchestrator = &orchestrator;
    let board_ref = &board;
    let mut runs = stream::iter(media.iter())
        .map(|m| async move {
            let reporter: &dyn ProgressReporter = board_ref;
            let result = orchestrator.restructure(&m.media_id, template, reporter).await;
            (m.media_id.as_str(), result)
        })
        .buffer_unordered(jobs.max(1));

    while let Some((id, result)) = runs.next().await {
        pb.inc(1);
        if let Err(e) = result {
            pb.println(format!("  {} failed: {}", id, e));
        }
    }
    pb.finish_and_clear();

    let statuses = board.all();
    let failed = statuses.iter().filter(|s| s.stage == Stage::Failed).count();
    let succeeded = statuses.iter().filter(|s| s.stage == Stage::Completed).count();

    Output::info(&format!(
        "Restructuring complete: {} succeeded, {} failed",
        succeeded, failed
    ));

    if failed > 0 {
        anyhow::bail!("{} media failed to restructure", failed);
    }
    Ok(())
}
