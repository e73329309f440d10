//! The browser seam: what the capture pipeline needs from a loaded page.
//!
//! Site adapters and the capture loop only talk to [`SlidePage`], never to
//! Chrome directly. [`crate::pipeline::browser::ChromeSession`] is the real
//! implementation; tests drive the same code with a scripted page.

use crate::error::DeckError;
use std::time::Duration;

/// A presentation page loaded in some browser.
///
/// Methods take CSS selectors. "First match" semantics apply wherever a
/// single element is implied.
pub trait SlidePage {
    /// Number of elements matching `selector`.
    fn count(&self, selector: &str) -> Result<usize, DeckError>;

    /// Attribute `name` of the first match, `None` when there is no match or
    /// no such attribute.
    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, DeckError>;

    /// `innerText` of the first match.
    fn inner_text(&self, selector: &str) -> Result<Option<String>, DeckError>;

    /// Fire a JavaScript `click()` on the `index`-th match, which also works
    /// for hidden controls. Returns `false` when there is no such element.
    fn click(&self, selector: &str, index: usize) -> Result<bool, DeckError>;

    /// Detach the first match from the DOM. Returns `false` when absent.
    fn remove(&self, selector: &str) -> Result<bool, DeckError>;

    /// PNG screenshot of the first match.
    fn screenshot(&self, selector: &str) -> Result<Vec<u8>, DeckError>;

    /// Document title.
    fn title(&self) -> Result<String, DeckError>;

    /// Block while the page animates or renders.
    fn settle(&self, wait: Duration);
}
