//! Error types for the slides2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DeckError`] (**fatal**): the deck cannot be produced at all (bad URL,
//!   browser would not start, the site's layout changed, the PDF could not be
//!   written). Returned as `Err(DeckError)` from the top-level `download*`
//!   functions.
//!
//! * [`OcrError`] (**non-fatal**): the OCR pass failed or the tool is not
//!   installed, but the assembled PDF is intact. Stored inside
//!   [`crate::output::OcrOutcome`] so callers still receive the un-OCR'd
//!   document.

use crate::pipeline::sources::Source;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the slides2pdf library.
///
/// OCR failures use [`OcrError`] and are recorded in
/// [`crate::output::CaptureStats`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DeckError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input string is not an HTTP/HTTPS URL.
    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    /// The URL is valid but not hosted by a supported presentation service.
    #[error("URL not supported: '{url}'\nSupported: pitch.com, docs.google.com/presentation/, figma.com/deck")]
    UnsupportedSite { url: String },

    /// The pre-flight request could not reach the presentation.
    #[error("Cannot reach '{url}': {reason}\nCheck your internet connection or pass --no-preflight.")]
    Unreachable { url: String, reason: String },

    /// The pre-flight request exceeded its timeout.
    #[error("Pre-flight request timed out after {secs}s for '{url}'")]
    PreflightTimeout { url: String, secs: u64 },

    // ── Browser errors ────────────────────────────────────────────────────
    /// Chrome/Chromium could not be started.
    #[error("Failed to launch browser: {detail}\nIs Chrome or Chromium installed and on PATH?")]
    BrowserLaunch { detail: String },

    /// Loading the presentation page failed.
    #[error("Failed to load '{url}': {detail}")]
    NavigationFailed { url: String, detail: String },

    /// An element the site adapter relies on was missing.
    #[error("{site} page layout not recognised: {detail}\nThe site may have changed its markup.")]
    SiteLayout { site: Source, detail: String },

    /// A browser call failed while capturing a slide.
    #[error("Capture failed on slide {slide}: {detail}")]
    CaptureFailed { slide: usize, detail: String },

    /// The capture loop ended without a single slide.
    #[error("No slides were captured from '{url}'")]
    NoSlides { url: String },

    // ── Image / PDF errors ────────────────────────────────────────────────
    /// A screenshot could not be decoded.
    #[error("Screenshot of slide {slide} could not be decoded: {detail}")]
    ImageDecode { slide: usize, detail: String },

    /// lopdf refused to serialise the document.
    #[error("PDF assembly failed: {detail}")]
    PdfAssembly { detail: String },

    /// The file to inspect does not exist.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file to inspect is not a readable PDF.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal OCR failure.
///
/// The assembled PDF is left untouched when any of these occur.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum OcrError {
    /// The OCR executable was not found.
    #[error("OCR tool '{tool}' not found; install ocrmypdf or pass --skip-ocr")]
    ToolMissing { tool: String },

    /// The OCR tool ran but exited unsuccessfully.
    #[error("OCR tool exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// Spawning the tool or moving its output failed.
    #[error("OCR I/O error: {detail}")]
    Io { detail: String },
}
