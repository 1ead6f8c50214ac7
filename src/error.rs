//! Error types for Chapterize.

use thiserror::Error;

/// Library-level error type for Chapterize operations.
#[derive(Error, Debug)]
pub enum ChapterizeError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected before any segmentation strategy runs.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Recoverable strategy failure. The template selector catches these and
    /// degrades to a simpler strategy.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Audio decode failed: {0}")]
    AudioDecode(String),

    /// A grouping or tree breaks a hierarchy invariant (coverage, order, bounds).
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// Fatal for a rebuild run. The previously persisted hierarchy is kept.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Media not found: {0}")]
    MediaNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl ChapterizeError {
    /// Whether the template selector may recover from this error by falling back.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ChapterizeError::Analysis(_)
                | ChapterizeError::AudioDecode(_)
                | ChapterizeError::InvalidHierarchy(_)
        )
    }
}

/// Result type alias for Chapterize operations.
pub type Result<T> = std::result::Result<T, ChapterizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(ChapterizeError::Analysis("no parts".into()).is_recoverable());
        assert!(ChapterizeError::AudioDecode("bad header".into()).is_recoverable());
        assert!(ChapterizeError::InvalidHierarchy("gap".into()).is_recoverable());
        assert!(!ChapterizeError::InvalidInput("negative".into()).is_recoverable());
        assert!(!ChapterizeError::Persistence("locked".into()).is_recoverable());
    }
}
