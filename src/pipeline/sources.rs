//! Site adapters: recognise the hosting service and prepare its page.
//!
//! Each adapter tidies the DOM (cookie banners, overlays, headers) and
//! returns [`DeckParams`]: how many slides the page advertises, which control
//! advances the deck, and which element to screenshot.

use crate::error::DeckError;
use crate::pipeline::page::SlidePage;
use crate::selectors::{figma, gslides, pitch};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Supported presentation services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    Pitch,
    GoogleSlides,
    Figma,
}

impl Source {
    /// Identify the service from a URL. Matching ignores case.
    pub fn detect(url: &str) -> Option<Source> {
        let url = url.to_ascii_lowercase();
        if url.contains("pitch.com") {
            Some(Source::Pitch)
        } else if url.contains("docs.google.com/presentation/") {
            Some(Source::GoogleSlides)
        } else if url.contains("figma.com/deck") {
            Some(Source::Figma)
        } else {
            None
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::Pitch => "Pitch",
            Source::GoogleSlides => "Google Slides",
            Source::Figma => "Figma",
        };
        f.write_str(s)
    }
}

/// The element that advances the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextControl {
    pub selector: String,
    /// Which match of `selector` to click.
    pub index: usize,
}

/// Where to read a slide's build progress (Pitch reveals elements one
/// "next" click at a time before moving to the following slide).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProgress {
    pub selector: String,
    pub attribute: String,
    pub complete_value: String,
}

/// Everything the capture loop needs to walk a prepared page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckParams {
    /// Slide count read from the page; `None` when the page shows none.
    pub slide_count: Option<usize>,
    pub next: NextControl,
    pub slide_selector: String,
    pub builds: Option<BuildProgress>,
}

/// Pause between cookie-dialog clicks.
const DIALOG_WAIT: Duration = Duration::from_secs(1);

/// Run the adapter for `source` against a loaded page.
pub fn prepare<P: SlidePage + ?Sized>(source: Source, page: &P) -> Result<DeckParams, DeckError> {
    let params = match source {
        Source::Pitch => prepare_pitch(page)?,
        Source::GoogleSlides => prepare_gslides(page)?,
        Source::Figma => prepare_figma(page)?,
    };
    info!(
        "{} deck prepared: {} slides advertised",
        source,
        params
            .slide_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "no".to_string())
    );
    Ok(params)
}

fn prepare_pitch<P: SlidePage + ?Sized>(page: &P) -> Result<DeckParams, DeckError> {
    // Cookie dialog: open settings, untick engagement tracking, confirm.
    if page.count(pitch::COOKIE_SETTINGS)? > 0 {
        debug!("Declining Pitch tracking cookies");
        page.click(pitch::COOKIE_SETTINGS, 0)?;
        page.settle(DIALOG_WAIT);
        if page.click(pitch::COOKIE_ENGAGEMENT, 0)? {
            page.settle(DIALOG_WAIT);
        }
        if page.click(pitch::COOKIE_CONFIRM, 0)? {
            page.settle(DIALOG_WAIT);
        }
    }

    if !page.remove(pitch::BRANDING_POPOVER)? {
        warn!("Could not remove Pitch branding popover");
    }

    let dashes = page.count(pitch::PROGRESS_DASH)?;

    let mut next = None;
    for selector in pitch::PLAYER_BUTTONS {
        if page.count(selector)? > pitch::NEXT_BUTTON_INDEX {
            next = Some(NextControl {
                selector: selector.to_string(),
                index: pitch::NEXT_BUTTON_INDEX,
            });
            break;
        }
    }
    let next = next.ok_or_else(|| DeckError::SiteLayout {
        site: Source::Pitch,
        detail: "player navigation buttons not found".into(),
    })?;

    Ok(DeckParams {
        slide_count: (dashes > 0).then_some(dashes),
        next,
        slide_selector: pitch::SLIDE.to_string(),
        builds: Some(BuildProgress {
            selector: pitch::CURRENT_DASH_PROGRESS.to_string(),
            attribute: pitch::PROGRESS_ATTRIBUTE.to_string(),
            complete_value: pitch::PROGRESS_COMPLETE.to_string(),
        }),
    })
}

fn prepare_gslides<P: SlidePage + ?Sized>(page: &P) -> Result<DeckParams, DeckError> {
    if page.count(gslides::VIEWER)? == 0 {
        return Err(DeckError::SiteLayout {
            site: Source::GoogleSlides,
            detail: "viewer container not found (is the deck published to the web?)".into(),
        });
    }

    let slide_count = page
        .attribute(gslides::SLIDE_COUNT, gslides::SLIDE_COUNT_ATTRIBUTE)?
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0);

    Ok(DeckParams {
        slide_count,
        next: NextControl {
            selector: gslides::VIEWER.to_string(),
            index: 0,
        },
        slide_selector: gslides::SLIDE.to_string(),
        builds: None,
    })
}

fn prepare_figma<P: SlidePage + ?Sized>(page: &P) -> Result<DeckParams, DeckError> {
    if page.remove(figma::HEADER)? {
        debug!("Removed Figma prototype header");
    }

    if page.count(figma::NEXT)? == 0 {
        return Err(DeckError::SiteLayout {
            site: Source::Figma,
            detail: "\"Next frame\" button not found".into(),
        });
    }

    let status = page.inner_text(figma::STATUS)?;
    debug!("Figma status text: {:?}", status);
    let slide_count = status.as_deref().and_then(parse_slide_counter);

    Ok(DeckParams {
        slide_count,
        next: NextControl {
            selector: figma::NEXT.to_string(),
            index: 0,
        },
        slide_selector: figma::SLIDE.to_string(),
        builds: None,
    })
}

static RE_SLIDE_COUNTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").unwrap());

/// Total from a counter like `3 / 12`.
pub fn parse_slide_counter(text: &str) -> Option<usize> {
    RE_SLIDE_COUNTER
        .captures(text)
        .and_then(|caps| caps[2].parse::<usize>().ok())
        .filter(|&n| n > 0)
}
