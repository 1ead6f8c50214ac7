//! Configuration module for Chapterize.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    AnalysisSettings, FilterSettings, GeneralSettings, SegmentationSettings, Settings, StorageSettings,
};
