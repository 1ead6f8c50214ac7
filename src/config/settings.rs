//! Configuration settings for Chapterize.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub analysis: AnalysisSettings,
    pub segmentation: SegmentationSettings,
    pub filter: FilterSettings,
    pub storage: StorageSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.chapterize".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Gap analyzer settings (silence detection and inter-sentence gaps).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Frames whose level stays below this many dBFS count as silent.
    pub silence_threshold_db: f32,
    /// Minimum length of a silent run to become a boundary.
    pub min_silence_seconds: f64,
    /// Analysis frame length in milliseconds.
    pub frame_millis: u32,
    /// Gaps at or above this start a new chapter (manual template).
    pub major_gap_seconds: f64,
    /// Gaps at or above this (and below the major threshold) start a new scene.
    pub minor_gap_seconds: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            silence_threshold_db: -40.0,
            min_silence_seconds: 2.0,
            frame_millis: 10,
            major_gap_seconds: 10.0,
            minor_gap_seconds: 3.0,
        }
    }
}

/// Segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Template used when none is given on the command line.
    pub default_template: String,
    /// Silence-delimited chapters with more sentences than this are split into scenes.
    pub silence_split_threshold: usize,
    /// Scene size used when splitting a silence-delimited chapter.
    pub silence_scene_size: usize,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            default_template: "auto".to_string(),
            silence_split_threshold: 20,
            silence_scene_size: 10,
        }
    }
}

/// Span clean-up applied by `--filter` when loading a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Spans shorter than this are dropped.
    pub min_span_seconds: f64,
    /// Spans longer than this are split into two halves.
    pub max_span_seconds: f64,
    /// Spans with fewer words than this, after removing fillers, are dropped.
    pub min_words: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_span_seconds: 1.0,
            max_span_seconds: 15.0,
            min_words: 2,
        }
    }
}

/// Hierarchy storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Path to the SQLite database.
    pub sqlite_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.chapterize/hierarchy.db".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject threshold combinations the analyzers cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        let analysis = &self.analysis;
        if !(analysis.minor_gap_seconds > 0.0 && analysis.minor_gap_seconds <= analysis.major_gap_seconds) {
            return Err(crate::error::ChapterizeError::Config(format!(
                "analysis.minor_gap_seconds ({}) must be positive and not exceed analysis.major_gap_seconds ({})",
                analysis.minor_gap_seconds, analysis.major_gap_seconds
            )));
        }
        if analysis.min_silence_seconds <= 0.0 || analysis.frame_millis == 0 {
            return Err(crate::error::ChapterizeError::Config(
                "analysis.min_silence_seconds and analysis.frame_millis must be positive".to_string(),
            ));
        }
        let filter = &self.filter;
        if !(filter.min_span_seconds >= 0.0 && filter.max_span_seconds > filter.min_span_seconds) {
            return Err(crate::error::ChapterizeError::Config(format!(
                "filter.max_span_seconds ({}) must exceed filter.min_span_seconds ({})",
                filter.max_span_seconds, filter.min_span_seconds
            )));
        }
        if self.segmentation.silence_scene_size == 0 {
            return Err(crate::error::ChapterizeError::Config(
                "segmentation.silence_scene_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ChapterizeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chapterize")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.storage.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_thresholds() {
        let settings = Settings::default();
        assert_eq!(settings.analysis.silence_threshold_db, -40.0);
        assert_eq!(settings.analysis.min_silence_seconds, 2.0);
        assert_eq!(settings.analysis.major_gap_seconds, 10.0);
        assert_eq!(settings.analysis.minor_gap_seconds, 3.0);
        assert_eq!(settings.segmentation.default_template, "auto");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [analysis]
            major_gap_seconds = 12.5
            "#,
        )
        .unwrap();

        assert_eq!(settings.analysis.major_gap_seconds, 12.5);
        assert_eq!(settings.analysis.minor_gap_seconds, 3.0);
        assert_eq!(settings.segmentation.silence_scene_size, 10);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.segmentation.default_template = "manual".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.segmentation.default_template, "manual");
    }

    #[test]
    fn test_validate_rejects_inverted_gap_thresholds() {
        let mut settings = Settings::default();
        settings.analysis.minor_gap_seconds = 20.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_filter_window_without_room() {
        let mut settings = Settings::default();
        assert_eq!(settings.filter.min_words, 2);
        settings.filter.max_span_seconds = settings.filter.min_span_seconds;
        assert!(settings.validate().is_err());
    }
}
