//! Configuration types for slide capture.
//!
//! All capture behaviour is controlled through [`CaptureConfig`], built via
//! its [`CaptureConfigBuilder`]. The config is immutable once built: every
//! pipeline stage reads it, none modifies it.

use crate::error::DeckError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for capturing one deck.
///
/// Built via [`CaptureConfig::builder()`] or using
/// [`CaptureConfig::default()`].
///
/// # Example
/// ```rust
/// use slides2pdf::{CaptureConfig, Resolution};
///
/// let config = CaptureConfig::builder()
///     .resolution(Resolution::Hd)
///     .skip_ocr(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.resolution.dimensions(), (1920, 1080));
/// ```
#[derive(Clone)]
pub struct CaptureConfig {
    /// Capture tier; sets the browser window size. Default: 4K.
    pub resolution: Resolution,

    /// Run Chrome without a visible window. Default: true.
    pub headless: bool,

    /// Skip the OCR pass entirely. Default: false.
    pub skip_ocr: bool,

    /// Keep screenshots exactly as captured (no black-border cropping). Default: false.
    pub skip_border_removal: bool,

    /// Wait after the initial page load, in milliseconds. Default: 10 000.
    ///
    /// All three services render slides client-side well after the load
    /// event fires; screenshotting earlier yields blank canvases.
    pub load_wait_ms: u64,

    /// Wait after each "next" click, in milliseconds. Default: 1 500.
    pub slide_wait_ms: u64,

    /// Safety bound on capture iterations. Default: 500.
    ///
    /// The loop stops here even when the deck end was never detected.
    pub max_slides: usize,

    /// Upper bound on "next" clicks spent revealing one slide's animated
    /// builds (Pitch.com only). Default: 50.
    pub max_build_steps: usize,

    /// A pixel counts as slide content when any channel exceeds this. Default: 100.
    pub border_threshold: u8,

    /// Pixel density used to size PDF pages (points = px × 72 / dpi). Default: 100.
    pub pdf_dpi: u32,

    /// OCR executable. Default: `ocrmypdf`.
    pub ocr_binary: String,

    /// Tesseract language(s) passed as `-l`, e.g. `eng+deu`. Default: tool default.
    pub ocr_language: Option<String>,

    /// Directory for the generated PDF when `output_path` is unset. Default: `.`.
    pub output_dir: PathBuf,

    /// Explicit output file; overrides the title-derived name.
    pub output_path: Option<PathBuf>,

    /// Issue an HTTP request before launching the browser. Default: true.
    pub preflight: bool,

    /// Pre-flight request timeout in seconds. Default: 30.
    pub preflight_timeout_secs: u64,

    /// Seconds of DevTools inactivity before the browser is considered hung. Default: 300.
    pub browser_idle_timeout_secs: u64,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            headless: true,
            skip_ocr: false,
            skip_border_removal: false,
            load_wait_ms: 10_000,
            slide_wait_ms: 1_500,
            max_slides: 500,
            max_build_steps: 50,
            border_threshold: 100,
            pdf_dpi: 100,
            ocr_binary: "ocrmypdf".to_string(),
            ocr_language: None,
            output_dir: PathBuf::from("."),
            output_path: None,
            preflight: true,
            preflight_timeout_secs: 30,
            browser_idle_timeout_secs: 300,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CaptureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureConfig")
            .field("resolution", &self.resolution)
            .field("headless", &self.headless)
            .field("skip_ocr", &self.skip_ocr)
            .field("skip_border_removal", &self.skip_border_removal)
            .field("load_wait_ms", &self.load_wait_ms)
            .field("slide_wait_ms", &self.slide_wait_ms)
            .field("max_slides", &self.max_slides)
            .field("max_build_steps", &self.max_build_steps)
            .field("border_threshold", &self.border_threshold)
            .field("pdf_dpi", &self.pdf_dpi)
            .field("ocr_binary", &self.ocr_binary)
            .field("ocr_language", &self.ocr_language)
            .field("output_dir", &self.output_dir)
            .field("output_path", &self.output_path)
            .field("preflight", &self.preflight)
            .field("preflight_timeout_secs", &self.preflight_timeout_secs)
            .field("browser_idle_timeout_secs", &self.browser_idle_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn CaptureProgressCallback>"),
            )
            .finish()
    }
}

impl CaptureConfig {
    /// Create a new builder for `CaptureConfig`.
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn load_wait(&self) -> Duration {
        Duration::from_millis(self.load_wait_ms)
    }

    pub fn slide_wait(&self) -> Duration {
        Duration::from_millis(self.slide_wait_ms)
    }
}

/// Builder for [`CaptureConfig`].
#[derive(Debug)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.config.resolution = resolution;
        self
    }

    pub fn headless(mut self, v: bool) -> Self {
        self.config.headless = v;
        self
    }

    pub fn skip_ocr(mut self, v: bool) -> Self {
        self.config.skip_ocr = v;
        self
    }

    pub fn skip_border_removal(mut self, v: bool) -> Self {
        self.config.skip_border_removal = v;
        self
    }

    pub fn load_wait_ms(mut self, ms: u64) -> Self {
        self.config.load_wait_ms = ms;
        self
    }

    pub fn slide_wait_ms(mut self, ms: u64) -> Self {
        self.config.slide_wait_ms = ms;
        self
    }

    pub fn max_slides(mut self, n: usize) -> Self {
        self.config.max_slides = n.max(1);
        self
    }

    pub fn max_build_steps(mut self, n: usize) -> Self {
        self.config.max_build_steps = n;
        self
    }

    pub fn border_threshold(mut self, t: u8) -> Self {
        self.config.border_threshold = t;
        self
    }

    pub fn pdf_dpi(mut self, dpi: u32) -> Self {
        self.config.pdf_dpi = dpi.clamp(36, 600);
        self
    }

    pub fn ocr_binary(mut self, bin: impl Into<String>) -> Self {
        self.config.ocr_binary = bin.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = Some(lang.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = Some(path.into());
        self
    }

    pub fn preflight(mut self, v: bool) -> Self {
        self.config.preflight = v;
        self
    }

    pub fn preflight_timeout_secs(mut self, secs: u64) -> Self {
        self.config.preflight_timeout_secs = secs;
        self
    }

    pub fn browser_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.config.browser_idle_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CaptureConfig, DeckError> {
        let c = &self.config;
        if c.ocr_binary.trim().is_empty() && !c.skip_ocr {
            return Err(DeckError::InvalidConfig(
                "OCR binary must not be empty unless OCR is skipped".into(),
            ));
        }
        if let Some(ref path) = c.output_path {
            if path.as_os_str().is_empty() {
                return Err(DeckError::InvalidConfig("output path is empty".into()));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Capture resolution tier.
///
/// | Tier | Window size |
/// |------|-------------|
/// | HD   | 1920 × 1080 |
/// | 4K   | 3840 × 2160 (default) |
/// | 8K   | 7680 × 4320 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "HD")]
    Hd,
    #[default]
    #[serde(rename = "4K")]
    Uhd4k,
    #[serde(rename = "8K")]
    Uhd8k,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::Hd, Resolution::Uhd4k, Resolution::Uhd8k];

    /// Browser window size in pixels, `(width, height)`.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::Hd => (1920, 1080),
            Resolution::Uhd4k => (3840, 2160),
            Resolution::Uhd8k => (7680, 4320),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Resolution::Hd => "HD",
            Resolution::Uhd4k => "4K",
            Resolution::Uhd8k => "8K",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Resolution {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HD" => Ok(Resolution::Hd),
            "4K" => Ok(Resolution::Uhd4k),
            "8K" => Ok(Resolution::Uhd8k),
            other => Err(DeckError::InvalidConfig(format!(
                "Only HD, 4K and 8K resolutions allowed (got '{other}')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_mapping() {
        assert_eq!(Resolution::Hd.dimensions(), (1920, 1080));
        assert_eq!(Resolution::Uhd4k.dimensions(), (3840, 2160));
        assert_eq!(Resolution::Uhd8k.dimensions(), (7680, 4320));
    }

    #[test]
    fn resolution_parses_labels_case_insensitively() {
        for r in Resolution::ALL {
            assert_eq!(r.label().parse::<Resolution>().unwrap(), r);
            assert_eq!(r.label().to_lowercase().parse::<Resolution>().unwrap(), r);
        }
        assert!("2K".parse::<Resolution>().is_err());
    }

    #[test]
    fn resolution_serialises_as_label() {
        let json = serde_json::to_string(&Resolution::Uhd8k).unwrap();
        assert_eq!(json, "\"8K\"");
    }

    #[test]
    fn defaults_match_cli_defaults() {
        let c = CaptureConfig::default();
        assert_eq!(c.resolution, Resolution::Uhd4k);
        assert!(c.headless);
        assert!(!c.skip_ocr);
        assert!(!c.skip_border_removal);
        assert_eq!(c.max_slides, 500);
    }

    #[test]
    fn builder_clamps() {
        let c = CaptureConfig::builder()
            .max_slides(0)
            .pdf_dpi(5000)
            .build()
            .unwrap();
        assert_eq!(c.max_slides, 1);
        assert_eq!(c.pdf_dpi, 600);
    }

    #[test]
    fn debug_lists_settings_but_not_the_callback() {
        struct Silent;
        impl crate::progress::CaptureProgressCallback for Silent {}

        let c = CaptureConfig::builder()
            .max_build_steps(7)
            .preflight(false)
            .progress_callback(std::sync::Arc::new(Silent))
            .build()
            .unwrap();
        let debug = format!("{c:?}");
        for field in [
            "max_build_steps: 7",
            "preflight: false",
            "preflight_timeout_secs: 30",
            "browser_idle_timeout_secs: 300",
            "<dyn CaptureProgressCallback>",
        ] {
            assert!(debug.contains(field), "{field} missing from {debug}");
        }
    }

    #[test]
    fn builder_rejects_empty_ocr_binary() {
        assert!(CaptureConfig::builder().ocr_binary("  ").build().is_err());
        assert!(CaptureConfig::builder()
            .ocr_binary("")
            .skip_ocr(true)
            .build()
            .is_ok());
    }
}
