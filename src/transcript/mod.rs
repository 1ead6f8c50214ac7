//! Transcript input and structured output.
//!
//! Sentence spans arrive from an external recognizer (as JSON or SubRip files)
//! are optionally filtered, and leave as a Chapter/Scene/Sentence export in JSON, SRT, or WebVTT.

mod filter;
mod format;
mod input;
mod models;

pub use filter::SpanFilter;
pub use format::{format_hierarchy, select, ExportScope, HierarchyExport, OutputFormat};
pub use input::{load_transcript, parse_srt, LoadedTranscript};
pub use models::{format_timestamp, validate_spans, SentenceSpan, Transcript};
