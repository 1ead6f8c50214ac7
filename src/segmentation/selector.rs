//! Template selection with a fallback chain.
//!
//! The template's own strategy runs first. If it fails, proposes nothing, or
//! proposes a grouping that does not assemble, the general lecture slicing
//! runs instead, and as a last resort all spans go into a single scene.

use super::{Candidate, RatioConfig, SegmentContext, Strategy, Template};
use crate::analysis::{AudioInput, GapAnalyzer};
use crate::config::{SegmentationSettings, Settings};
use crate::error::{ChapterizeError, Result};
use crate::hierarchy::{assemble, Hierarchy};
use crate::patterns::MarkerDetector;
use crate::transcript::{validate_spans, SentenceSpan};
use tracing::{debug, info, instrument, warn};

/// A built hierarchy and how it was produced.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub hierarchy: Hierarchy,
    pub template: Template,
    /// Name of the strategy whose grouping was used.
    pub strategy: &'static str,
    /// Whether the template's own strategy was abandoned.
    pub fell_back: bool,
}

/// Runs templates against span lists.
pub struct TemplateSelector {
    analyzer: GapAnalyzer,
    detector: MarkerDetector,
    settings: SegmentationSettings,
}

impl TemplateSelector {
    pub fn new(analyzer: GapAnalyzer, detector: MarkerDetector, settings: SegmentationSettings) -> Self {
        Self {
            analyzer,
            detector,
            settings,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            GapAnalyzer::from_settings(&settings.analysis),
            MarkerDetector::new(),
            settings.segmentation.clone(),
        )
    }

    /// Build a hierarchy without side effects.
    ///
    /// Fails for invalid input and for errors no fallback can recover from.
    /// Spans are grouped in start-time order.
    #[instrument(skip(self, spans, template, audio), fields(spans = spans.len(), template = %template))]
    pub fn build(
        &self,
        spans: &[SentenceSpan],
        duration_seconds: f64,
        template: Template,
        audio: Option<&AudioInput>,
    ) -> Result<Segmentation> {
        validate_spans(spans, duration_seconds)?;

        if spans.is_empty() {
            debug!("No spans, returning an empty hierarchy");
            return Ok(Segmentation {
                hierarchy: Hierarchy::empty(duration_seconds),
                template,
                strategy: "empty",
                fell_back: false,
            });
        }

        let mut spans = spans.to_vec();
        spans.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));

        let ctx = SegmentContext {
            duration_seconds,
            audio,
            analyzer: &self.analyzer,
            detector: &self.detector,
            settings: &self.settings,
        };

        let primary = template.strategy();
        match self.attempt(&primary, &spans, &ctx) {
            Ok(hierarchy) => {
                return Ok(Segmentation {
                    hierarchy,
                    template,
                    strategy: primary.name(),
                    fell_back: false,
                })
            }
            Err(e) if !e.is_recoverable() => return Err(e),
            Err(e) => warn!("{} strategy failed for template {}: {}", primary.name(), template, e),
        }

        if template != Template::General {
            let fallback = Strategy::Ratio(RatioConfig::general());
            match self.attempt(&fallback, &spans, &ctx) {
                Ok(hierarchy) => {
                    info!("Fell back to general template");
                    return Ok(Segmentation {
                        hierarchy,
                        template,
                        strategy: fallback.name(),
                        fell_back: true,
                    });
                }
                Err(e) if !e.is_recoverable() => return Err(e),
                Err(e) => warn!("General fallback failed: {}", e),
            }
        }

        let hierarchy = assemble(&spans, &Candidate::single_group(spans.len()))?;
        Ok(Segmentation {
            hierarchy,
            template,
            strategy: "single",
            fell_back: true,
        })
    }

    fn attempt(&self, strategy: &Strategy, spans: &[SentenceSpan], ctx: &SegmentContext<'_>) -> Result<Hierarchy> {
        let candidate = strategy.segment(spans, ctx)?;
        if candidate.is_empty() {
            return Err(ChapterizeError::Analysis(format!(
                "{} strategy produced no chapters",
                strategy.name()
            )));
        }
        assemble(spans, &candidate)
    }
}

impl Default for TemplateSelector {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Build a hierarchy with default settings.
///
/// Unknown template names are treated as `general`.
pub fn build(
    spans: &[SentenceSpan],
    duration_seconds: f64,
    template_name: &str,
    audio: Option<&AudioInput>,
) -> Result<Hierarchy> {
    TemplateSelector::default()
        .build(spans, duration_seconds, Template::from_name(template_name), audio)
        .map(|s| s.hierarchy)
}
