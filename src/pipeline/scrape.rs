//! The capture loop: screenshot every slide in presentation order.
//!
//! ## End-of-deck detection
//!
//! 1. When the page advertises a slide count, capture exactly that many and
//!    never click "next" after the last one.
//! 2. Without a count, a screenshot byte-identical to the previous one means
//!    "next" did nothing: the deck is over and the duplicate is dropped.
//! 3. Either way `max_slides` bounds the loop.
//!
//! Duplicate detection is only used without a count: decks legitimately
//! contain identical consecutive slides, and a trusted counter must win.

use crate::config::CaptureConfig;
use crate::error::DeckError;
use crate::output::DeckEnd;
use crate::pipeline::page::SlidePage;
use crate::pipeline::sources::{BuildProgress, DeckParams};
use tracing::{debug, info, warn};

/// One raw screenshot, 1-indexed in capture order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedSlide {
    pub index: usize,
    pub png: Vec<u8>,
}

/// The capture loop's result.
#[derive(Debug, Clone)]
pub struct CapturedDeck {
    pub slides: Vec<CapturedSlide>,
    pub end: DeckEnd,
    pub advertised: Option<usize>,
}

/// Walk the deck from the current slide to the end.
///
/// On `Ok` the deck holds at least one slide: a failed screenshot is an
/// error, and the duplicate check needs a previous slide to compare against.
pub fn capture_deck<P: SlidePage + ?Sized>(
    page: &P,
    params: &DeckParams,
    config: &CaptureConfig,
) -> Result<CapturedDeck, DeckError> {
    let cap = config.max_slides.max(1);
    let limit = params.slide_count.map_or(cap, |n| n.min(cap));
    if let Some(n) = params.slide_count {
        if n > cap {
            warn!("Deck advertises {n} slides; capturing only the first {cap}");
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_capture_start(params.slide_count);
    }

    let mut slides: Vec<CapturedSlide> = Vec::with_capacity(limit);
    let mut end = None;

    for n in 0..limit {
        let slide_num = n + 1;

        if let Some(ref builds) = params.builds {
            finish_builds(page, params, builds, config, slide_num)?;
        }

        let png = page
            .screenshot(&params.slide_selector)
            .map_err(|e| DeckError::CaptureFailed {
                slide: slide_num,
                detail: e.to_string(),
            })?;

        if params.slide_count.is_none() {
            if let Some(prev) = slides.last() {
                if prev.png == png {
                    info!("Slide {slide_num} identical to slide {}: end of deck", prev.index);
                    end = Some(DeckEnd::NoOpAdvance);
                    break;
                }
            }
        }

        debug!("Captured slide {slide_num} ({} bytes)", png.len());
        slides.push(CapturedSlide {
            index: slide_num,
            png,
        });
        if let Some(ref cb) = config.progress_callback {
            cb.on_slide_captured(slide_num, params.slide_count);
        }

        if slide_num < limit {
            advance(page, params, slide_num)?;
            page.settle(config.slide_wait());
        }
    }

    let end = end.unwrap_or_else(|| match params.slide_count {
        Some(n) if n <= cap => DeckEnd::CounterReached,
        _ => {
            warn!("Stopped after {cap} slides without detecting the end of the deck");
            DeckEnd::IterationCap
        }
    });

    info!("Captured {} slides ({end})", slides.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_capture_complete(slides.len(), end);
    }

    Ok(CapturedDeck {
        slides,
        end,
        advertised: params.slide_count,
    })
}

fn advance<P: SlidePage + ?Sized>(
    page: &P,
    params: &DeckParams,
    slide_num: usize,
) -> Result<(), DeckError> {
    let clicked = page
        .click(&params.next.selector, params.next.index)
        .map_err(|e| DeckError::CaptureFailed {
            slide: slide_num,
            detail: format!("advancing failed: {e}"),
        })?;
    if !clicked {
        return Err(DeckError::CaptureFailed {
            slide: slide_num,
            detail: format!("next control '{}' disappeared", params.next.selector),
        });
    }
    Ok(())
}

/// Click "next" until the current slide's builds are fully revealed.
///
/// A missing progress attribute counts as complete. After `max_build_steps`
/// clicks the slide is captured unfinished; each of those clicks may have
/// been an advance the counter never saw, so later slides can be lost.
fn finish_builds<P: SlidePage + ?Sized>(
    page: &P,
    params: &DeckParams,
    builds: &BuildProgress,
    config: &CaptureConfig,
    slide_num: usize,
) -> Result<(), DeckError> {
    let max_steps = config.max_build_steps;
    for step in 0..=max_steps {
        let progress = page
            .attribute(&builds.selector, &builds.attribute)
            .map_err(|e| DeckError::CaptureFailed {
                slide: slide_num,
                detail: e.to_string(),
            })?;
        match progress {
            None => return Ok(()),
            Some(ref v) if *v == builds.complete_value => return Ok(()),
            Some(v) if step < max_steps => {
                debug!("Slide {slide_num}: build progress {v}, revealing next step");
                advance(page, params, slide_num)?;
                page.settle(config.slide_wait());
            }
            Some(v) => {
                warn!(
                    "Slide {slide_num}: builds still at {v} after {max_steps} steps; \
                     capturing it as is, so the next slide may be missed"
                );
            }
        }
    }
    Ok(())
}
