//! CLI output formatting utilities.

use crate::hierarchy::{Hierarchy, MediaSummary};
use crate::status::{ProcessingStatus, ProgressReporter};
use crate::transcript::format_timestamp;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print one structured media.
    pub fn media_info(media: &MediaSummary) {
        println!(
            "  {} {} ({}, {} chapters, {} scenes, {} sentences, {})",
            style("*").cyan(),
            style(&media.media_id).bold(),
            style(&media.template).dim(),
            media.chapter_count,
            media.scene_count,
            media.sentence_count,
            format_duration(media.duration_seconds)
        );
    }

    /// Print a hierarchy as an indented tree. Sentences are listed when `sentences` is set.
    pub fn hierarchy_tree(hierarchy: &Hierarchy, sentences: bool) {
        for chapter in &hierarchy.chapters {
            println!(
                "\n{} {} {}",
                style(format!("{}.", chapter.order)).cyan().bold(),
                style(&chapter.title).bold(),
                style(format!(
                    "[{} - {}]",
                    format_timestamp(chapter.start_seconds),
                    format_timestamp(chapter.end_seconds)
                ))
                .dim()
            );

            for scene in &chapter.scenes {
                println!(
                    "   {} {} {} {}",
                    style(format!("{}.{}", chapter.order, scene.order)).cyan(),
                    scene.title,
                    style(format!(
                        "[{} - {}]",
                        format_timestamp(scene.start_seconds),
                        format_timestamp(scene.end_seconds)
                    ))
                    .dim(),
                    style(format!("({} sentences)", scene.sentences.len())).dim()
                );

                if sentences {
                    for sentence in &scene.sentences {
                        println!(
                            "        {} {}",
                            style(format_timestamp(sentence.start_seconds)).dim(),
                            content_preview(&sentence.text, 100)
                        );
                    }
                }
            }
        }
        println!();
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Shows rebuild stages on a spinner. Clears it on a terminal stage.
pub struct SpinnerReporter {
    spinner: ProgressBar,
}

impl SpinnerReporter {
    pub fn new(msg: &str) -> Self {
        Self {
            spinner: Output::spinner(msg),
        }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn report(&self, status: &ProcessingStatus) {
        if status.stage.is_terminal() {
            self.spinner.finish_and_clear();
        } else {
            self.spinner
                .set_message(format!("{} ({})", status.stage, status.message));
        }
    }
}

/// Format duration in seconds to a human-readable string.
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
