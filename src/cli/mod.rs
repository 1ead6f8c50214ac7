//! CLI module for Chapterize.

pub mod commands;
mod output;

pub use output::{Output, SpinnerReporter};

use clap::{Parser, Subcommand};

/// Chapterize - Transcript structuring
///
/// Groups timestamped transcript sentences into chapters and scenes using
/// silence, pauses, spoken section markers, or fixed time slices, and keeps
/// the result in a local database for browsing and export.
#[derive(Parser, Debug)]
#[command(name = "chapterize")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show how a transcript would be structured, without saving
    Preview {
        /// Transcript file (.json or .srt)
        input: String,

        /// Template name (see 'chapterize templates')
        #[arg(short, long)]
        template: Option<String>,

        /// WAV file for silence detection
        #[arg(short, long)]
        audio: Option<String>,

        /// Media duration in seconds (overrides file and audio)
        #[arg(short, long)]
        duration: Option<f64>,

        /// List sentences under each scene
        #[arg(long)]
        sentences: bool,

        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,

        /// Drop short or filler-only spans and split overlong ones before structuring
        #[arg(long)]
        filter: bool,
    },

    /// Structure a transcript and save it, replacing any previous structure
    Rebuild {
        /// Transcript file (.json or .srt)
        input: String,

        /// Media ID (defaults to the file's media_id or its file name)
        #[arg(short, long)]
        media_id: Option<String>,

        /// Template name (see 'chapterize templates')
        #[arg(short, long)]
        template: Option<String>,

        /// WAV file for silence detection
        #[arg(short, long)]
        audio: Option<String>,

        /// Media duration in seconds (overrides file and audio)
        #[arg(short, long)]
        duration: Option<f64>,

        /// Drop short or filler-only spans and split overlong ones before structuring
        #[arg(long)]
        filter: bool,
    },

    /// Re-structure saved media with another template
    Restructure {
        /// Media ID to restructure (use 'all' to restructure everything)
        media_id: String,

        /// Template name (see 'chapterize templates')
        #[arg(short, long)]
        template: Option<String>,

        /// Maximum concurrent rebuilds when restructuring all media
        #[arg(long, default_value = "4")]
        jobs: usize,
    },

    /// List structured media
    List,

    /// Show the chapters and scenes of a structured media
    Show {
        /// Media ID to show
        media_id: String,

        /// List sentences under each scene
        #[arg(long)]
        sentences: bool,
    },

    /// Export a structured media
    Export {
        /// Media ID to export
        media_id: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, srt, vtt)
        #[arg(long, default_value = "json")]
        format: String,

        /// Export only this chapter (1-based)
        #[arg(long)]
        chapter: Option<u32>,

        /// Export only this scene of the chapter (1-based, requires --chapter)
        #[arg(long, requires = "chapter")]
        scene: Option<u32>,
    },

    /// Delete a structured media
    Delete {
        /// Media ID to delete
        media_id: String,
    },

    /// List available templates
    Templates,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
