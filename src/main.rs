//! Chapterize CLI entry point.

use anyhow::Result;
use chapterize::cli::{commands, Cli, Commands};
use chapterize::config::Settings;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("chapterize={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path)))?,
        None => Settings::load()?,
    };

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Preview {
            input,
            template,
            audio,
            duration,
            sentences,
            json,
            filter,
        } => {
            commands::run_preview(
                input,
                template.as_deref(),
                audio.as_deref(),
                *duration,
                *sentences,
                *json,
                *filter,
                &settings,
            )?;
        }

        Commands::Rebuild {
            input,
            media_id,
            template,
            audio,
            duration,
            filter,
        } => {
            commands::run_rebuild(
                input,
                media_id.as_deref(),
                template.as_deref(),
                audio.as_deref(),
                *duration,
                *filter,
                settings,
            )
            .await?;
        }

        Commands::Restructure {
            media_id,
            template,
            jobs,
        } => {
            commands::run_restructure(media_id, template.as_deref(), *jobs, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Show { media_id, sentences } => {
            commands::run_show(media_id, *sentences, settings).await?;
        }

        Commands::Export {
            media_id,
            output,
            format,
            chapter,
            scene,
        } => {
            commands::run_export(media_id, output.clone(), format, *chapter, *scene, settings)
                .await?;
        }

        Commands::Delete { media_id } => {
            commands::run_delete(media_id, settings).await?;
        }

        Commands::Templates => {
            commands::run_templates(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
