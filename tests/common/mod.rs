//! Shared helpers for the integration tests: a scripted [`SlidePage`] and
//! synthetic slide screenshots.

#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage};
use slides2pdf::{DeckError, SlidePage};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::time::Duration;

/// A fake presentation page.
///
/// It holds a fixed DOM (element counts, attributes, texts) plus a deck
/// whose current slide moves when the configured "next" control is clicked.
/// Clicking "next" on the last slide leaves it in place, like a real player.
#[derive(Default)]
pub struct FakePage {
    slides: Vec<Vec<u8>>,
    elements: HashMap<String, usize>,
    attributes: HashMap<(String, String), String>,
    texts: HashMap<String, String>,
    next: Option<(String, usize)>,
    slide_selector: String,
    /// `(selector, attribute)` reporting build progress, plus the number of
    /// hidden build steps on each slide.
    builds: Option<(String, String)>,
    build_steps: Vec<usize>,
    title: String,
    state: RefCell<State>,
}

#[derive(Default)]
struct State {
    current: usize,
    builds_revealed: usize,
    removed: HashSet<String>,
    clicks: Vec<(String, usize)>,
    screenshots: usize,
}

impl FakePage {
    pub fn new(slides: Vec<Vec<u8>>) -> Self {
        Self {
            slides,
            title: "Fake Deck".into(),
            ..Self::default()
        }
    }

    pub fn element(mut self, selector: &str, count: usize) -> Self {
        self.elements.insert(selector.into(), count);
        self
    }

    pub fn attr(mut self, selector: &str, name: &str, value: &str) -> Self {
        self.attributes
            .insert((selector.into(), name.into()), value.into());
        self
    }

    pub fn text(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.into(), text.into());
        self
    }

    pub fn next(mut self, selector: &str, index: usize) -> Self {
        self.next = Some((selector.into(), index));
        self
    }

    pub fn slide(mut self, selector: &str) -> Self {
        self.slide_selector = selector.into();
        self
    }

    pub fn builds(mut self, selector: &str, attribute: &str, steps: Vec<usize>) -> Self {
        self.builds = Some((selector.into(), attribute.into()));
        self.build_steps = steps;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Every click so far, in order.
    pub fn clicks(&self) -> Vec<(String, usize)> {
        self.state.borrow().clicks.clone()
    }

    /// Clicks on the "next" control.
    pub fn next_clicks(&self) -> usize {
        let next = self.next.clone();
        self.clicks()
            .into_iter()
            .filter(|c| Some(c) == next.as_ref())
            .count()
    }

    pub fn was_removed(&self, selector: &str) -> bool {
        self.state.borrow().removed.contains(selector)
    }

    pub fn screenshots(&self) -> usize {
        self.state.borrow().screenshots
    }

    fn hidden_builds(&self, state: &State) -> usize {
        self.build_steps
            .get(state.current)
            .copied()
            .unwrap_or(0)
            .saturating_sub(state.builds_revealed)
    }
}

impl SlidePage for FakePage {
    fn count(&self, selector: &str) -> Result<usize, DeckError> {
        if self.state.borrow().removed.contains(selector) {
            return Ok(0);
        }
        Ok(self.elements.get(selector).copied().unwrap_or(0))
    }

    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, DeckError> {
        if let Some((ref sel, ref attr)) = self.builds {
            if sel == selector && attr == name {
                let state = self.state.borrow();
                let total = self.build_steps.get(state.current).copied().unwrap_or(0);
                let hidden = self.hidden_builds(&state);
                let value = if hidden == 0 {
                    100
                } else {
                    100 * (total - hidden) / (total + 1)
                };
                return Ok(Some(value.to_string()));
            }
        }
        Ok(self
            .attributes
            .get(&(selector.to_string(), name.to_string()))
            .cloned())
    }

    fn inner_text(&self, selector: &str) -> Result<Option<String>, DeckError> {
        Ok(self.texts.get(selector).cloned())
    }

    fn click(&self, selector: &str, index: usize) -> Result<bool, DeckError> {
        let mut state = self.state.borrow_mut();
        state.clicks.push((selector.to_string(), index));

        let is_next = self
            .next
            .as_ref()
            .is_some_and(|(s, i)| s == selector && *i == index);
        if is_next {
            if self.hidden_builds(&state) > 0 {
                state.builds_revealed += 1;
            } else if state.current + 1 < self.slides.len() {
                state.current += 1;
                state.builds_revealed = 0;
            }
            return Ok(true);
        }

        let present = !state.removed.contains(selector)
            && self.elements.get(selector).copied().unwrap_or(0) > index;
        Ok(present)
    }

    fn remove(&self, selector: &str) -> Result<bool, DeckError> {
        let mut state = self.state.borrow_mut();
        if state.removed.contains(selector) || !self.elements.contains_key(selector) {
            return Ok(false);
        }
        state.removed.insert(selector.to_string());
        Ok(true)
    }

    fn screenshot(&self, selector: &str) -> Result<Vec<u8>, DeckError> {
        if selector != self.slide_selector {
            return Err(DeckError::Internal(format!("no element '{selector}'")));
        }
        let mut state = self.state.borrow_mut();
        state.screenshots += 1;
        self.slides
            .get(state.current)
            .cloned()
            .ok_or_else(|| DeckError::Internal("deck is empty".into()))
    }

    fn title(&self) -> Result<String, DeckError> {
        Ok(self.title.clone())
    }

    fn settle(&self, _wait: Duration) {}
}

// ── Synthetic screenshots ────────────────────────────────────────────────────

/// A `width`×`height` PNG filled with `fill`, framed by a black border of
/// `border` pixels on every side.
pub fn bordered_png(width: u32, height: u32, border: u32, fill: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let inside = x >= border && y >= border && x < width - border && y < height - border;
        if inside {
            Rgb(fill)
        } else {
            Rgb([0, 0, 0])
        }
    });
    encode_png(&img)
}

pub fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("PNG encoding");
    buf.into_inner()
}

/// Distinct, clearly non-black colours.
pub fn palette(i: usize) -> [u8; 3] {
    const COLOURS: [[u8; 3]; 6] = [
        [220, 40, 40],
        [40, 200, 60],
        [50, 80, 230],
        [240, 200, 30],
        [180, 60, 200],
        [250, 250, 250],
    ];
    COLOURS[i % COLOURS.len()]
}

/// `n` bordered slides, each a different colour and a different width so
/// page order is visible in the PDF's page sizes.
pub fn distinct_slides(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| bordered_png(100 + 25 * i as u32, 80, 10, palette(i)))
        .collect()
}

/// MediaBox `(width, height)` of every page, in page order.
pub fn pdf_page_sizes(bytes: &[u8]) -> Vec<(f32, f32)> {
    let doc = lopdf::Document::load_mem(bytes).expect("valid PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_object(id).and_then(|o| o.as_dict()).expect("page dict");
            let mb = page
                .get(b"MediaBox")
                .and_then(|o| o.as_array())
                .expect("MediaBox");
            (
                mb[2].as_float().expect("width"),
                mb[3].as_float().expect("height"),
            )
        })
        .collect()
}
