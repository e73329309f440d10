//! CLI binary for slides2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `CaptureConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use slides2pdf::{
    download, inspect, CaptureConfig, CaptureOutput, CaptureProgressCallback, DeckEnd,
    OcrOutcome, ProgressCallback, Resolution, Stage,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner per stage, switching to a bar while slides
/// are captured if the deck advertises its length.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(Self::spinner_style());
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS)
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(progress_style);
        self.bar.reset_eta();
    }
}

impl CaptureProgressCallback for CliProgressCallback {
    fn on_stage(&self, stage: Stage) {
        if stage == Stage::Done {
            self.bar.finish_and_clear();
            return;
        }
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message("");
    }

    fn on_capture_start(&self, expected: Option<usize>) {
        match expected {
            Some(total) => {
                self.activate_bar(total);
                self.bar.println(format!(
                    "{} {}",
                    cyan("◆"),
                    bold(&format!("Deck has {total} slides"))
                ));
            }
            None => self.bar.set_message("slide count not shown; capturing until the end"),
        }
    }

    fn on_slide_captured(&self, slide_num: usize, expected: Option<usize>) {
        match expected {
            Some(_) => self.bar.inc(1),
            None => self.bar.set_message(format!("slide {slide_num}")),
        }
    }

    fn on_capture_complete(&self, captured: usize, end: DeckEnd) {
        self.bar.set_style(Self::spinner_style());
        let mark = if end == DeckEnd::IterationCap {
            yellow("⚠")
        } else {
            green("✓")
        };
        self.bar.println(format!(
            "  {} {} slides captured  {}",
            mark,
            bold(&captured.to_string()),
            dim(&format!("({end})"))
        ));
    }

    fn on_ocr_complete(&self, outcome: &OcrOutcome) {
        match outcome {
            OcrOutcome::Skipped => {}
            OcrOutcome::Applied => {
                self.bar
                    .println(format!("  {} text layer added", green("✓")));
            }
            OcrOutcome::Failed(e) => {
                let msg = e.to_string();
                let msg = if msg.chars().count() > 80 {
                    format!("{}\u{2026}", msg.chars().take(79).collect::<String>())
                } else {
                    msg
                };
                self.bar
                    .println(format!("  {} OCR skipped: {}", yellow("⚠"), red(&msg)));
            }
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Pitch deck at 4K (default), OCR'd, saved under its title
  slides2pdf https://pitch.com/v/my-deck-abc123

  # Published Google Slides deck at HD, no OCR
  slides2pdf -r HD --skip-ocr "https://docs.google.com/presentation/d/e/2PACX-.../pub"

  # Figma Slides with a visible browser, explicit file name
  slides2pdf --disable-headless -o review.pdf https://www.figma.com/deck/abc/Review

  # Keep the raw screenshots (no border cropping) and write into decks/
  slides2pdf --skip-border-removal --output-dir decks https://pitch.com/v/my-deck

  # OCR in German and English
  slides2pdf --ocr-language deu+eng https://pitch.com/v/my-deck

  # Inspect a PDF produced earlier (no browser needed)
  slides2pdf --inspect-only decks/MyDeck.pdf

  # JSON summary for scripts
  slides2pdf --json --no-progress https://pitch.com/v/my-deck > run.json

SUPPORTED SITES:
  pitch.com              Pitch presentations (including animated builds)
  docs.google.com        Google Slides "Publish to web" links
  figma.com              Figma Slides decks

REQUIREMENTS:
  Chrome or Chromium     found on PATH, or set CHROME=/path/to/chrome
  ocrmypdf (optional)    for the searchable text layer; skipped with a warning if absent

ENVIRONMENT VARIABLES:
  SLIDES2PDF_RESOLUTION  Default resolution (HD, 4K, 8K)
  SLIDES2PDF_OUTPUT_DIR  Default output directory
  SLIDES2PDF_OCRMYPDF    Path to the ocrmypdf executable
  SLIDES2PDF_OCR_LANGUAGE  Tesseract language(s), e.g. eng+deu
  RUST_LOG               Override log filtering (e.g. slides2pdf=debug)
"#;

/// Save Pitch, Google Slides and Figma decks as PDF.
#[derive(Parser, Debug)]
#[command(
    name = "slides2pdf",
    version,
    about = "Save Pitch, Google Slides and Figma presentations as PDF",
    long_about = "Open a presentation in Chrome, screenshot every slide at HD, 4K or 8K, \
trim black borders and save the slides as a PDF. An optional ocrmypdf pass adds a \
searchable text layer.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Presentation URL (or a PDF path with --inspect-only).
    input: String,

    /// Browser window resolution: HD, 4K or 8K.
    #[arg(short, long, env = "SLIDES2PDF_RESOLUTION", value_enum,
          ignore_case = true, default_value = "4K")]
    resolution: ResolutionArg,

    /// Do not add an OCR text layer.
    #[arg(long, env = "SLIDES2PDF_SKIP_OCR")]
    skip_ocr: bool,

    /// Keep screenshots exactly as captured (no black-border cropping).
    #[arg(long, env = "SLIDES2PDF_SKIP_BORDER_REMOVAL")]
    skip_border_removal: bool,

    /// Show the browser window.
    #[arg(long, env = "SLIDES2PDF_DISABLE_HEADLESS")]
    disable_headless: bool,

    /// Write the PDF to this file instead of a name derived from the deck title.
    #[arg(short, long, env = "SLIDES2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Directory for derived file names.
    #[arg(long, env = "SLIDES2PDF_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Tesseract language(s) passed to ocrmypdf, e.g. eng+deu.
    #[arg(long, env = "SLIDES2PDF_OCR_LANGUAGE")]
    ocr_language: Option<String>,

    /// ocrmypdf executable.
    #[arg(long, env = "SLIDES2PDF_OCRMYPDF", default_value = "ocrmypdf")]
    ocrmypdf: String,

    /// Stop after this many slides if the end is not detected.
    #[arg(long, env = "SLIDES2PDF_MAX_SLIDES", default_value_t = 500,
          value_parser = clap::value_parser!(u64).range(1..))]
    max_slides: u64,

    /// Wait after page load before touching the player (ms).
    #[arg(long, env = "SLIDES2PDF_LOAD_WAIT", default_value_t = 10_000)]
    load_wait: u64,

    /// Wait after each advance before the next screenshot (ms).
    #[arg(long, env = "SLIDES2PDF_SLIDE_WAIT", default_value_t = 1_500)]
    slide_wait: u64,

    /// Skip the HTTP reachability check before launching the browser.
    #[arg(long, env = "SLIDES2PDF_NO_PREFLIGHT")]
    no_preflight: bool,

    /// Print metadata of an existing PDF, no capture.
    #[arg(long)]
    inspect_only: bool,

    /// Output a JSON summary (CaptureOutput) on stdout.
    #[arg(long, env = "SLIDES2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SLIDES2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SLIDES2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SLIDES2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ResolutionArg {
    #[value(name = "HD")]
    Hd,
    #[value(name = "4K")]
    Uhd4k,
    #[value(name = "8K")]
    Uhd8k,
}

impl From<ResolutionArg> for Resolution {
    fn from(v: ResolutionArg) -> Self {
        match v {
            ResolutionArg::Hd => Resolution::Hd,
            ResolutionArg::Uhd4k => Resolution::Uhd4k,
            ResolutionArg::Uhd8k => Resolution::Uhd8k,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would fight with the progress bar, so they are only shown
    // when the bar is off.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            println!("Text layer:   {}/{} pages", meta.text_layer_pages, meta.page_count);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn CaptureProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run capture ──────────────────────────────────────────────────────
    let output = download(&cli.input, &config)
        .await
        .context("Capture failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&output);
    }

    Ok(())
}

/// Map CLI args to `CaptureConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<CaptureConfig> {
    let mut builder = CaptureConfig::builder()
        .resolution(cli.resolution.clone().into())
        .headless(!cli.disable_headless)
        .skip_ocr(cli.skip_ocr)
        .skip_border_removal(cli.skip_border_removal)
        .load_wait_ms(cli.load_wait)
        .slide_wait_ms(cli.slide_wait)
        .max_slides(usize::try_from(cli.max_slides).unwrap_or(usize::MAX))
        .ocr_binary(cli.ocrmypdf.clone())
        .output_dir(cli.output_dir.clone())
        .preflight(!cli.no_preflight);

    if let Some(ref lang) = cli.ocr_language {
        builder = builder.ocr_language(lang.clone());
    }
    if let Some(ref path) = cli.output {
        builder = builder.output_path(path.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(output: &CaptureOutput) {
    let stats = &output.stats;
    let mark = match (&stats.ocr, stats.end) {
        (OcrOutcome::Failed(_), _) | (_, DeckEnd::IterationCap) => cyan("⚠"),
        _ => green("✔"),
    };
    eprintln!(
        "{}  {} slides  {}ms  →  {}",
        mark,
        stats.slides_captured,
        stats.total_duration_ms,
        bold(&output.path.display().to_string()),
    );
    eprintln!(
        "   {}  {}",
        dim(&format!("{} cropped", stats.slides_cropped)),
        dim(&match stats.ocr {
            OcrOutcome::Skipped => "no OCR".to_string(),
            OcrOutcome::Applied => "searchable".to_string(),
            OcrOutcome::Failed(ref e) => format!("OCR failed: {e}"),
        }),
    );
    if stats.end == DeckEnd::IterationCap {
        eprintln!(
            "   {}",
            yellow("stopped at --max-slides; the deck may have more slides")
        );
    }
}
