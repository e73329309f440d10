//! Top-level entry points: URL in, PDF on disk out.
//!
//! [`download`] runs the full pipeline with a real Chrome. The part after
//! the browser closes lives in [`build_document`] so it can be driven from
//! any [`crate::pipeline::page::SlidePage`] capture, not only Chrome's.

use crate::config::CaptureConfig;
use crate::error::DeckError;
use crate::output::{CaptureOutput, CaptureStats, DeckMetadata, DocumentMetadata, OcrOutcome};
use crate::pipeline::browser::{self, SessionCapture};
use crate::pipeline::input::{self, Target};
use crate::pipeline::scrape::CapturedDeck;
use crate::pipeline::{assemble, inspect as inspect_stage, ocr, postprocess};
use crate::progress::Stage;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Capture a presentation and write it as a PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `url`: Pitch.com, Google Slides (published) or Figma deck URL
/// * `config`: Capture configuration
///
/// # Returns
/// `Ok(CaptureOutput)` once the PDF is on disk. An OCR failure still returns
/// `Ok`; check `output.stats.ocr`.
///
/// # Errors
/// Returns `Err(DeckError)` for invalid or unsupported URLs, browser launch
/// or navigation failures, site layout changes, and write failures.
pub async fn download(
    url: impl AsRef<str>,
    config: &CaptureConfig,
) -> Result<CaptureOutput, DeckError> {
    let total_start = Instant::now();
    let url = url.as_ref();
    info!("Starting capture: {}", url);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let target = input::resolve_target(url)?;
    if config.preflight {
        input::preflight(&target, config.preflight_timeout_secs).await?;
    }

    // ── Step 2: Browser session ──────────────────────────────────────────
    let capture_start = Instant::now();
    let session_target = target.clone();
    let session_config = config.clone();
    let SessionCapture { deck, title } = tokio::task::spawn_blocking(move || {
        browser::capture_with_chrome(&session_target, &session_config)
    })
    .await
    .map_err(|e| DeckError::Internal(format!("Browser task panicked: {}", e)))??;
    let capture_duration_ms = capture_start.elapsed().as_millis() as u64;

    // ── Step 3: Image, PDF and OCR stages ────────────────────────────────
    let mut output = build_document(&target, deck, title, config).await?;
    output.stats.capture_duration_ms = capture_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Turn captured screenshots into the final PDF.
///
/// Crops (unless disabled), assembles, writes atomically, then runs OCR
/// (unless disabled). Slide order is preserved throughout.
pub async fn build_document(
    target: &Target,
    deck: CapturedDeck,
    title: Option<String>,
    config: &CaptureConfig,
) -> Result<CaptureOutput, DeckError> {
    let start = Instant::now();
    let stage = |s: Stage| {
        if let Some(ref cb) = config.progress_callback {
            cb.on_stage(s);
        }
    };

    if deck.slides.is_empty() {
        return Err(DeckError::NoSlides {
            url: target.url.clone(),
        });
    }

    // ── Post-process ─────────────────────────────────────────────────────
    stage(Stage::Processing);
    let CapturedDeck {
        slides: captured,
        end,
        advertised,
    } = deck;
    let post_config = config.clone();
    let slides = tokio::task::spawn_blocking(move || {
        postprocess::prepare_slides(&captured, &post_config)
    })
    .await
    .map_err(|e| DeckError::Internal(format!("Image task panicked: {}", e)))??;
    let slides_cropped = slides.iter().filter(|s| s.cropped).count();
    debug!("{} of {} slides cropped", slides_cropped, slides.len());

    // ── Assemble ─────────────────────────────────────────────────────────
    stage(Stage::Assembling);
    let assemble_start = Instant::now();
    let path = output_path(config, title.as_deref(), &target.url);
    let page_sizes: Vec<(u32, u32)> = slides.iter().map(|s| s.image.dimensions()).collect();
    let pdf_title = title.clone();
    let dpi = config.pdf_dpi;
    let write_path = path.clone();
    tokio::task::spawn_blocking(move || {
        let bytes = assemble::assemble_pdf(slides, pdf_title.as_deref(), dpi)?;
        assemble::write_atomic(&write_path, &bytes)
    })
    .await
    .map_err(|e| DeckError::Internal(format!("Assembly task panicked: {}", e)))??;
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;
    info!("Saved deck as {}", path.display());

    // ── OCR ──────────────────────────────────────────────────────────────
    let ocr_start = Instant::now();
    let ocr_outcome = if config.skip_ocr {
        OcrOutcome::Skipped
    } else {
        stage(Stage::Ocr);
        ocr::run_ocr(&path, config).await
    };
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;
    if let Some(ref cb) = config.progress_callback {
        cb.on_ocr_complete(&ocr_outcome);
    }
    stage(Stage::Done);

    let stats = CaptureStats {
        slides_captured: page_sizes.len(),
        slides_cropped,
        end,
        ocr: ocr_outcome,
        capture_duration_ms: 0,
        assemble_duration_ms,
        ocr_duration_ms,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    Ok(CaptureOutput {
        path,
        metadata: DeckMetadata {
            title,
            url: target.url.clone(),
            source: target.source,
            advertised_slides: advertised,
            page_sizes,
        },
        stats,
    })
}

/// Capture to an explicit file path, overriding `config.output_path`.
pub async fn download_to_file(
    url: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &CaptureConfig,
) -> Result<CaptureOutput, DeckError> {
    let mut config = config.clone();
    config.output_path = Some(output_path.as_ref().to_path_buf());
    download(url, &config).await
}

/// Synchronous wrapper around [`download`].
///
/// Creates a temporary tokio runtime internally.
pub fn download_sync(
    url: impl AsRef<str>,
    config: &CaptureConfig,
) -> Result<CaptureOutput, DeckError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DeckError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(download(url, config))
}

/// Read metadata from a PDF without a browser.
pub async fn inspect(pdf_path: impl AsRef<Path>) -> Result<DocumentMetadata, DeckError> {
    inspect_stage::extract_metadata(pdf_path.as_ref()).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Explicit output path, else `output_dir` joined with the derived name.
fn output_path(config: &CaptureConfig, title: Option<&str>, url: &str) -> PathBuf {
    match config.output_path {
        Some(ref p) => p.clone(),
        None => config
            .output_dir
            .join(assemble::deck_file_name(title, url)),
    }
}
