//! Templates command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::segmentation::Template;
use anyhow::Result;

/// List the available templates.
pub fn run_templates(settings: &Settings) -> Result<()> {
    Output::header("Templates");
    for template in Template::ALL {
        println!(
            "  {:<16} {:<14} {}",
            template.name(),
            template.strategy().name(),
            template.description()
        );
    }
    println!();
    Output::kv("Default", &settings.segmentation.default_template);
    Ok(())
}
