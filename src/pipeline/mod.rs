//! Pipeline stages for slide capture.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the browser can be swapped for a scripted page in tests.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ browser ──▶ sources ──▶ scrape ──▶ postprocess ──▶ assemble ──▶ ocr
//! (URL)     (Chrome)    (DOM prep)  (PNGs)     (crop)          (lopdf)      (ocrmypdf)
//! ```
//!
//! 1. [`input`]: validate the URL, detect the service, optional pre-flight
//! 2. [`browser`]: launch Chrome and implement [`page::SlidePage`]; blocking,
//!    runs in `spawn_blocking`
//! 3. [`sources`]: per-site DOM preparation and [`sources::DeckParams`]
//! 4. [`scrape`]: the capture loop with end-of-deck detection
//! 5. [`postprocess`]: decode, flatten alpha, crop black borders
//! 6. [`assemble`]: one PDF page per slide, written atomically
//! 7. [`ocr`]: optional text layer; failure is non-fatal
//!
//! [`inspect`] reads a finished PDF back for `--inspect-only` and tests.

pub mod assemble;
pub mod browser;
pub mod input;
pub mod inspect;
pub mod ocr;
pub mod page;
pub mod postprocess;
pub mod scrape;
pub mod sources;
