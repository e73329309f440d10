//! Progress-callback trait for capture pipeline events.
//!
//! Inject an [`Arc<dyn CaptureProgressCallback>`] via
//! [`crate::config::CaptureConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through its stages and captures slides.
//!
//! # Example
//!
//! ```rust
//! use slides2pdf::{CaptureConfig, CaptureProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     captured: AtomicUsize,
//! }
//!
//! impl CaptureProgressCallback for CountingCallback {
//!     fn on_slide_captured(&self, slide_num: usize, expected: Option<usize>) {
//!         self.captured.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("slide {slide_num} of {expected:?}");
//!     }
//! }
//!
//! let config = CaptureConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { captured: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{DeckEnd, OcrOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Pipeline stage, reported once on entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Launching,
    Loading,
    Capturing,
    Processing,
    Assembling,
    Ocr,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Launching => "Launching browser",
            Stage::Loading => "Loading deck",
            Stage::Capturing => "Capturing",
            Stage::Processing => "Processing images",
            Stage::Assembling => "Assembling PDF",
            Stage::Ocr => "Running OCR",
            Stage::Done => "Done",
        };
        f.write_str(s)
    }
}

/// Called by the capture pipeline as it runs.
///
/// Implementations must be `Send + Sync`: the browser stage runs on a
/// blocking worker thread. All methods default to no-ops.
pub trait CaptureProgressCallback: Send + Sync {
    /// Called when the pipeline enters a new stage.
    fn on_stage(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called once before the first screenshot.
    ///
    /// # Arguments
    /// * `expected`: slide count read from the page, if the site exposes one
    fn on_capture_start(&self, expected: Option<usize>) {
        let _ = expected;
    }

    /// Called after each slide screenshot (1-indexed).
    fn on_slide_captured(&self, slide_num: usize, expected: Option<usize>) {
        let _ = (slide_num, expected);
    }

    /// Called once when the capture loop stops.
    fn on_capture_complete(&self, captured: usize, end: DeckEnd) {
        let _ = (captured, end);
    }

    /// Called once after the OCR stage, including when it was skipped.
    fn on_ocr_complete(&self, outcome: &OcrOutcome) {
        let _ = outcome;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl CaptureProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CaptureConfig`].
pub type ProgressCallback = Arc<dyn CaptureProgressCallback>;
