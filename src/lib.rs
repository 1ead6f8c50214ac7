//! Chapterize - Transcript structuring
//!
//! Turns a flat list of timestamped sentences into a three-level
//! Chapter / Scene / Sentence hierarchy for media-learning players.
//!
//! # Overview
//!
//! A named template picks one of four segmentation strategies:
//! - silence detected in the audio (or an equal split of the duration without audio)
//! - pauses between consecutive sentences
//! - spoken section markers such as "Part 3" and "Number 32."
//! - fixed ratios or time windows of the media duration
//!
//! When a strategy cannot structure a transcript the selector falls back to a
//! general ratio layout, and finally to a single chapter holding everything.
//! Every sentence lands in exactly one scene.
//!
//! # Architecture
//!
//! - `transcript` - Sentence spans, transcript loading and export formats
//! - `analysis` - Silence detection and pause thresholds
//! - `patterns` - Spoken section marker detection
//! - `segmentation` - Strategies, templates and the fallback chain
//! - `hierarchy` - Chapter/scene model and its persistent stores
//! - `orchestrator` - Per-media serialized rebuilds with progress reporting
//! - `status` - Processing stages and reporters
//! - `config` - Configuration management
//!
//! # Example
//!
//! ```rust,no_run
//! use chapterize::config::Settings;
//! use chapterize::orchestrator::Orchestrator;
//! use chapterize::segmentation::Template;
//! use chapterize::status::NoopReporter;
//! use chapterize::transcript::load_transcript;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let loaded = load_transcript(std::path::Path::new("lecture.json"))?;
//!     let transcript = loaded.into_transcript("lecture".to_string(), None, None);
//!     let result = orchestrator
//!         .rebuild(&transcript, Template::General, None, &NoopReporter)
//!         .await?;
//!     println!("{} chapters", result.summary.chapter_count);
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod orchestrator;
pub mod patterns;
pub mod segmentation;
pub mod status;
pub mod transcript;

pub use error::{ChapterizeError, Result};
