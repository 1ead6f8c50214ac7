//! Named templates and the strategy each one selects.

use super::{RatioConfig, Strategy};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::warn;

/// Structuring template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Silence-delimited chapters.
    Auto,
    /// Gap-threshold chapters and scenes.
    Manual,
    /// Listening test, grouped by spoken markers.
    ToeicLc,
    /// Listening test, grouped by part weighting.
    ToeicLcRatio,
    /// Reading test, three parts.
    ToeicRc,
    /// Lecture time slices.
    General,
    Conversation,
    Audiobook,
}

impl Template {
    pub const ALL: [Template; 8] = [
        Template::Auto,
        Template::Manual,
        Template::ToeicLc,
        Template::ToeicLcRatio,
        Template::ToeicRc,
        Template::General,
        Template::Conversation,
        Template::Audiobook,
    ];

    /// Resolve a template name. Unknown names resolve to `General`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "auto" => Template::Auto,
            "manual" => Template::Manual,
            "toeic_lc" => Template::ToeicLc,
            "toeic_lc_ratio" => Template::ToeicLcRatio,
            "toeic_rc" => Template::ToeicRc,
            "general" | "lecture" => Template::General,
            "conversation" => Template::Conversation,
            "audiobook" => Template::Audiobook,
            other => {
                warn!("Unknown template {:?}, using general", other);
                Template::General
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Template::Auto => "auto",
            Template::Manual => "manual",
            Template::ToeicLc => "toeic_lc",
            Template::ToeicLcRatio => "toeic_lc_ratio",
            Template::ToeicRc => "toeic_rc",
            Template::General => "general",
            Template::Conversation => "conversation",
            Template::Audiobook => "audiobook",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Template::Auto => "Chapters at long silences; long chapters split into scenes of 10 sentences",
            Template::Manual => "Chapters at gaps of 10s or more, scenes at gaps of 3s or more",
            Template::ToeicLc => "Listening test: chapters per spoken Part, scenes per Number or Questions item",
            Template::ToeicLcRatio => "Listening test by part weighting (5/25/40/30%), scenes of 5 sentences",
            Template::ToeicRc => "Reading test: Parts 5-7 in equal thirds, scenes of 10 sentences",
            Template::General => "Lecture: 2, 4, or 6 equal chapters by length, scenes of 15 sentences",
            Template::Conversation => "Five-minute segments, scenes of 8 sentences",
            Template::Audiobook => "Fifteen-minute chapters, scenes of 20 sentences",
        }
    }

    /// The strategy this template runs first.
    pub fn strategy(&self) -> Strategy {
        match self {
            Template::Auto => Strategy::Silence,
            Template::Manual => Strategy::GapThreshold,
            Template::ToeicLc => Strategy::Pattern,
            Template::ToeicLcRatio => Strategy::Ratio(RatioConfig::toeic_lc_ratio()),
            Template::ToeicRc => Strategy::Ratio(RatioConfig::toeic_rc()),
            Template::General => Strategy::Ratio(RatioConfig::general()),
            Template::Conversation => Strategy::Ratio(RatioConfig::conversation()),
            Template::Audiobook => Strategy::Ratio(RatioConfig::audiobook()),
        }
    }
}

impl std::str::FromStr for Template {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Template::from_name(s))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for template in Template::ALL {
            assert_eq!(Template::from_name(template.name()), template);
        }
    }

    #[test]
    fn test_unknown_and_alias() {
        assert_eq!(Template::from_name("podcast"), Template::General);
        assert_eq!(Template::from_name("Lecture"), Template::General);
        assert_eq!(Template::from_name(" TOEIC_LC "), Template::ToeicLc);
        assert_eq!("whatever".parse::<Template>().unwrap(), Template::General);
    }

    #[test]
    fn test_strategy_mapping() {
        assert_eq!(Template::Auto.strategy(), Strategy::Silence);
        assert_eq!(Template::Manual.strategy(), Strategy::GapThreshold);
        assert_eq!(Template::ToeicLc.strategy(), Strategy::Pattern);
        assert_eq!(Template::Audiobook.strategy().name(), "ratio");
    }
}
