//! # slides2pdf
//!
//! Save web-hosted slide decks as PDF files.
//!
//! ## Why this crate?
//!
//! Pitch.com, Google Slides "Publish to web" and Figma Slides show decks in
//! a browser player with no download button for viewers. This crate drives
//! a real Chrome through the player, screenshots every slide at the chosen
//! resolution, trims the letterbox bars, and writes one PDF page per slide.
//! An optional `ocrmypdf` pass makes the result searchable.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL
//!  │
//!  ├─ 1. Input     validate, detect the service, optional pre-flight GET
//!  ├─ 2. Browser   launch Chrome at HD / 4K / 8K (blocking, spawn_blocking)
//!  ├─ 3. Prepare   dismiss cookie banners, hide overlays, read slide count
//!  ├─ 4. Capture   screenshot, advance, repeat until the end of the deck
//!  ├─ 5. Crop      trim black borders
//!  ├─ 6. Assemble  one page per slide, written atomically
//!  └─ 7. OCR       ocrmypdf text layer (non-fatal on failure)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slides2pdf::{download, CaptureConfig, Resolution};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CaptureConfig::builder()
//!         .resolution(Resolution::Hd)
//!         .skip_ocr(true)
//!         .build()?;
//!     let output = download("https://pitch.com/v/my-deck-abc123", &config).await?;
//!     eprintln!("{} slides → {}", output.stats.slides_captured, output.path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `slides2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! slides2pdf = { version = "0.1", default-features = false }
//! ```
//!
//! ## External tools
//!
//! A Chrome or Chromium install is required at run time; `headless_chrome`
//! finds it on `PATH` or via `CHROME`. OCR needs `ocrmypdf` (with Tesseract);
//! without it the PDF is still written, just without a text layer.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod capture;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod selectors;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use capture::{build_document, download, download_sync, download_to_file, inspect};
pub use config::{CaptureConfig, CaptureConfigBuilder, Resolution};
pub use error::{DeckError, OcrError};
pub use output::{CaptureOutput, CaptureStats, DeckEnd, DeckMetadata, DocumentMetadata, OcrOutcome};
pub use pipeline::assemble::assemble_pdf;
pub use pipeline::input::{resolve_target, Target};
pub use pipeline::ocr::run_ocr;
pub use pipeline::page::SlidePage;
pub use pipeline::postprocess::crop_black_borders;
pub use pipeline::scrape::{capture_deck, CapturedDeck, CapturedSlide};
pub use pipeline::sources::{DeckParams, Source};
pub use progress::{CaptureProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
