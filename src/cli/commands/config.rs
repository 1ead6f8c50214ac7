//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<&str>) -> Result<()> {
    let path = config_path
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str =
                toml::to_string_pretty(&settings).context("Failed to serialize config")?;
            println!("{}", toml_str);
        }

        ConfigAction::Edit => {
            if !path.exists() {
                settings.save_to(&path)?;
                Output::info(&format!("Wrote defaults to {}", path.display()));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
            let status = std::process::Command::new(&editor)
                .arg(&path)
                .status()
                .with_context(|| format!("Failed to launch {}", editor))?;

            if !status.success() {
                Output::warning("Editor exited with non-zero status.");
                return Ok(());
            }

            match Settings::load_from(Some(&path)) {
                Ok(_) => Output::success("Config saved."),
                Err(e) => Output::error(&format!("Config is invalid: {}", e)),
            }
        }

        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}
