//! Result types produced by the capture pipeline.

use crate::error::OcrError;
use crate::pipeline::sources::Source;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOutput {
    /// Where the final PDF was written.
    pub path: PathBuf,
    pub metadata: DeckMetadata,
    pub stats: CaptureStats,
}

/// What we know about the captured deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckMetadata {
    /// Browser tab title at the end of capture, if any.
    pub title: Option<String>,
    pub url: String,
    pub source: Source,
    /// Slide count advertised by the page, when it shows one.
    pub advertised_slides: Option<usize>,
    /// Pixel size of each page, in capture order.
    pub page_sizes: Vec<(u32, u32)>,
}

/// Per-run counters and timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureStats {
    pub slides_captured: usize,
    /// Slides whose screenshot actually lost a black border.
    pub slides_cropped: usize,
    pub end: DeckEnd,
    pub ocr: OcrOutcome,
    pub capture_duration_ms: u64,
    pub assemble_duration_ms: u64,
    pub ocr_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Why the capture loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckEnd {
    /// Captured as many slides as the page's counter advertised.
    CounterReached,
    /// "Next" left the slide unchanged.
    NoOpAdvance,
    /// Hit `max_slides` without detecting the end.
    IterationCap,
}

impl fmt::Display for DeckEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeckEnd::CounterReached => "slide counter reached",
            DeckEnd::NoOpAdvance => "next slide unchanged",
            DeckEnd::IterationCap => "iteration cap reached",
        };
        f.write_str(s)
    }
}

/// Result of the OCR stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OcrOutcome {
    /// `skip_ocr` was set.
    Skipped,
    /// The PDF now carries a text layer.
    Applied,
    /// OCR failed; the PDF on disk is the un-OCR'd one.
    Failed(OcrError),
}

/// Metadata read back from a PDF on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
    /// Pages whose resources (or nested form XObjects) reference a font,
    /// i.e. pages with a text layer.
    pub text_layer_pages: usize,
}
