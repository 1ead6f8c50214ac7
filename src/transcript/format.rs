//! Hierarchy output formatting (JSON, SRT, VTT).
//!
//! Exports a structured transcript, or one chapter or scene of it, in standard
//! formats for players and subtitle tooling.

use crate::error::{ChapterizeError, Result};
use crate::hierarchy::{Chapter, Hierarchy};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use json, srt, or vtt.", s)),
        }
    }
}

/// Which part of a hierarchy to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    All,
    /// One chapter, by its 1-based order.
    Chapter(u32),
    /// One scene, by chapter order and scene order.
    Scene(u32, u32),
}

impl ExportScope {
    pub fn from_orders(chapter: Option<u32>, scene: Option<u32>) -> Result<Self> {
        match (chapter, scene) {
            (None, None) => Ok(ExportScope::All),
            (Some(c), None) => Ok(ExportScope::Chapter(c)),
            (Some(c), Some(s)) => Ok(ExportScope::Scene(c, s)),
            (None, Some(_)) => Err(ChapterizeError::InvalidInput(
                "--scene requires --chapter".to_string(),
            )),
        }
    }
}

/// Cut a hierarchy down to the requested scope.
///
/// Orders and titles of the selected units are kept as persisted.
pub fn select(hierarchy: &Hierarchy, scope: ExportScope) -> Result<Hierarchy> {
    let find_chapter = |order: u32| -> Result<&Chapter> {
        hierarchy
            .chapters
            .iter()
            .find(|c| c.order == order)
            .ok_or_else(|| ChapterizeError::InvalidInput(format!("No chapter {}", order)))
    };

    match scope {
        ExportScope::All => Ok(hierarchy.clone()),
        ExportScope::Chapter(c) => Ok(Hierarchy {
            chapters: vec![find_chapter(c)?.clone()],
        }),
        ExportScope::Scene(c, s) => {
            let chapter = find_chapter(c)?;
            let scene = chapter
                .scenes
                .iter()
                .find(|sc| sc.order == s)
                .ok_or_else(|| {
                    ChapterizeError::InvalidInput(format!("No scene {} in chapter {}", s, c))
                })?;
            let mut chapter = chapter.clone();
            chapter.start_seconds = scene.start_seconds;
            chapter.end_seconds = scene.end_seconds;
            chapter.scenes = vec![scene.clone()];
            Ok(Hierarchy {
                chapters: vec![chapter],
            })
        }
    }
}

/// JSON-serializable hierarchy for export.
#[derive(Debug, Serialize)]
pub struct HierarchyExport<'a> {
    pub media_id: &'a str,
    pub chapter_count: usize,
    pub scene_count: usize,
    pub sentence_count: usize,
    pub chapters: &'a [Chapter],
}

/// Format a hierarchy for output.
pub fn format_hierarchy(media_id: &str, hierarchy: &Hierarchy, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(media_id, hierarchy),
        OutputFormat::Srt => format_srt(hierarchy),
        OutputFormat::Vtt => format_vtt(hierarchy),
    }
}

/// Format as JSON.
fn format_json(media_id: &str, hierarchy: &Hierarchy) -> String {
    let export = HierarchyExport {
        media_id,
        chapter_count: hierarchy.chapter_count(),
        scene_count: hierarchy.scene_count(),
        sentence_count: hierarchy.sentence_count(),
        chapters: &hierarchy.chapters,
    };
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// Format as SRT (SubRip), one cue per sentence.
fn format_srt(hierarchy: &Hierarchy) -> String {
    let mut output = String::new();

    for (i, sentence) in hierarchy.sentences().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(sentence.start_seconds),
            format_srt_timestamp(sentence.end_seconds)
        ));
        output.push_str(&sentence.text);
        output.push_str("\n\n");
    }

    output
}

/// Format as WebVTT with chapter and scene titles as NOTE blocks.
fn format_vtt(hierarchy: &Hierarchy) -> String {
    let mut output = String::from("WEBVTT\n\n");
    let mut cue = 0;

    for chapter in &hierarchy.chapters {
        output.push_str(&format!("NOTE Chapter {}: {}\n\n", chapter.order, chapter.title));

        for scene in &chapter.scenes {
            output.push_str(&format!("NOTE Scene {}: {}\n\n", scene.order, scene.title));

            for sentence in &scene.sentences {
                cue += 1;
                output.push_str(&format!("{}\n", cue));
                output.push_str(&format!(
                    "{} --> {}\n",
                    format_vtt_timestamp(sentence.start_seconds),
                    format_vtt_timestamp(sentence.end_seconds)
                ));
                output.push_str(&sentence.text);
                output.push_str("\n\n");
            }
        }
    }

    output
}

/// Format timestamp for SRT (00:00:00,000).
fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, ms)
}

/// Format timestamp for VTT (00:00:00.000).
fn format_vtt_timestamp(seconds: f64) -> String {
    format_srt_timestamp(seconds).replace(',', ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Scene;
    use crate::transcript::SentenceSpan;

    fn sample_hierarchy() -> Hierarchy {
        let scene = |order: u32, title: &str, sentences: Vec<SentenceSpan>| Scene {
            title: title.to_string(),
            start_seconds: sentences[0].start_seconds,
            end_seconds: sentences[sentences.len() - 1].end_seconds,
            order,
            sentences,
        };

        Hierarchy {
            chapters: vec![
                Chapter {
                    title: "Part 1".to_string(),
                    start_seconds: 0.0,
                    end_seconds: 5.0,
                    order: 1,
                    scenes: vec![
                        scene(1, "Directions", vec![SentenceSpan::new("Part 1.", 0.0, 2.5, 1)]),
                        scene(2, "Number 1", vec![SentenceSpan::new("Number 1.", 2.5, 5.0, 2)]),
                    ],
                },
                Chapter {
                    title: "Part 2".to_string(),
                    start_seconds: 6.0,
                    end_seconds: 8.0,
                    order: 2,
                    scenes: vec![scene(1, "Directions", vec![SentenceSpan::new("Part 2.", 6.0, 8.0, 3)])],
                },
            ],
        }
    }

    #[test]
    fn test_format_json() {
        let json = format_hierarchy("test123", &sample_hierarchy(), OutputFormat::Json);
        assert!(json.contains("\"media_id\": \"test123\""));
        assert!(json.contains("\"sentence_count\": 3"));
        assert!(json.contains("Number 1"));
    }

    #[test]
    fn test_format_srt() {
        let srt = format_hierarchy("m", &sample_hierarchy(), OutputFormat::Srt);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nPart 1."));
        assert!(srt.contains("3\n00:00:06,000 --> 00:00:08,000\nPart 2."));
    }

    #[test]
    fn test_format_vtt_notes() {
        let vtt = format_hierarchy("m", &sample_hierarchy(), OutputFormat::Vtt);
        assert!(vtt.starts_with("WEBVTT"));
        assert!(vtt.contains("NOTE Chapter 2: Part 2"));
        assert!(vtt.contains("NOTE Scene 2: Number 1"));
        assert!(vtt.contains("00:00:02.500 --> 00:00:05.000"));
    }

    #[test]
    fn test_select_scene() {
        let selected = select(&sample_hierarchy(), ExportScope::Scene(1, 2)).unwrap();
        assert_eq!(selected.chapter_count(), 1);
        assert_eq!(selected.scene_count(), 1);
        assert_eq!(selected.chapters[0].start_seconds, 2.5);
        assert_eq!(selected.chapters[0].scenes[0].title, "Number 1");
    }

    #[test]
    fn test_select_missing_chapter() {
        assert!(select(&sample_hierarchy(), ExportScope::Chapter(9)).is_err());
        assert!(ExportScope::from_orders(None, Some(1)).is_err());
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("webvtt".parse::<OutputFormat>().unwrap(), OutputFormat::Vtt);
        assert!("docx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_srt_timestamp() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(61.5), "00:01:01,500");
        assert_eq!(format_srt_timestamp(3661.123), "01:01:01,123");
    }
}
