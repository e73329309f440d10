//! Chrome session: launch, load the deck, and implement [`SlidePage`].
//!
//! ## Why spawn_blocking?
//!
//! `headless_chrome` exposes a blocking API, and every capture step waits on
//! the browser anyway. The whole session ([`capture_with_chrome`]) runs in one
//! `tokio::task::spawn_blocking` call so the async runtime is never stalled.
//!
//! ## Lifetime
//!
//! [`ChromeSession`] owns the `Browser`; dropping it kills the Chrome
//! process. The session is a local inside [`capture_with_chrome`], so it is
//! released on every exit path: success, `?` early return, or panic.

use crate::config::CaptureConfig;
use crate::error::DeckError;
use crate::pipeline::input::Target;
use crate::pipeline::page::SlidePage;
use crate::pipeline::scrape::{self, CapturedDeck};
use crate::pipeline::sources;
use crate::progress::Stage;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Extra Chrome flags.
///
/// Without these, Pitch and Figma detect automation and serve a degraded
/// player.
static CHROME_ARGS: [&str; 2] = [
    "--disable-blink-features=AutomationControlled",
    "--log-level=3",
];

const HIDE_WEBDRIVER_JS: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// What a finished browser session hands back.
#[derive(Debug, Clone)]
pub struct SessionCapture {
    pub deck: CapturedDeck,
    pub title: Option<String>,
}

/// Launch options for the configured resolution and headless mode.
pub fn launch_options(config: &CaptureConfig) -> Result<LaunchOptions<'static>, DeckError> {
    let (width, height) = config.resolution.dimensions();
    LaunchOptions::default_builder()
        .headless(config.headless)
        .window_size(Some((width, height)))
        .idle_browser_timeout(Duration::from_secs(config.browser_idle_timeout_secs))
        .args(CHROME_ARGS.iter().map(|a| OsStr::new(*a)).collect())
        .build()
        .map_err(|e| DeckError::BrowserLaunch {
            detail: e.to_string(),
        })
}

/// A live Chrome instance with one tab showing the deck.
pub struct ChromeSession {
    tab: Arc<Tab>,
    // Declared last so the tab handle is dropped before the process is killed.
    _browser: Browser,
}

impl ChromeSession {
    /// Start Chrome and open a blank tab.
    pub fn launch(config: &CaptureConfig) -> Result<Self, DeckError> {
        let options = launch_options(config)?;
        info!(
            "Launching Chrome at {} ({}x{}, headless={})",
            config.resolution,
            options.window_size.map_or(0, |s| s.0),
            options.window_size.map_or(0, |s| s.1),
            config.headless
        );
        let browser = Browser::new(options).map_err(|e| DeckError::BrowserLaunch {
            detail: e.to_string(),
        })?;
        let tab = browser.new_tab().map_err(|e| DeckError::BrowserLaunch {
            detail: format!("could not open a tab: {e}"),
        })?;
        Ok(Self {
            tab,
            _browser: browser,
        })
    }

    /// Navigate to the deck and give the player time to render.
    pub fn open(&self, url: &str, wait: Duration) -> Result<(), DeckError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| DeckError::NavigationFailed {
                url: url.to_string(),
                detail: e.to_string(),
            })?;
        if let Err(e) = self.tab.evaluate(HIDE_WEBDRIVER_JS, false) {
            debug!("Could not hide navigator.webdriver: {e}");
        }
        debug!("Loaded {url}; waiting {:?} for the player", wait);
        std::thread::sleep(wait);
        Ok(())
    }

    /// Evaluate `expression` and return its JSON value (`Null` when undefined).
    fn eval(&self, expression: &str) -> Result<serde_json::Value, DeckError> {
        let remote = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| DeckError::Internal(format!("script failed: {e}")))?;
        Ok(remote.value.unwrap_or(serde_json::Value::Null))
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        debug!("Closing browser");
    }
}

/// Quote a string as a JavaScript literal.
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl SlidePage for ChromeSession {
    fn count(&self, selector: &str) -> Result<usize, DeckError> {
        let v = self.eval(&format!(
            "document.querySelectorAll({}).length",
            js_str(selector)
        ))?;
        Ok(v.as_u64().unwrap_or(0) as usize)
    }

    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, DeckError> {
        let v = self.eval(&format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.getAttribute({}) : null; }})()",
            js_str(selector),
            js_str(name)
        ))?;
        Ok(v.as_str().map(str::to_string))
    }

    fn inner_text(&self, selector: &str) -> Result<Option<String>, DeckError> {
        let v = self.eval(&format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.innerText : null; }})()",
            js_str(selector)
        ))?;
        Ok(v.as_str().map(str::to_string))
    }

    fn click(&self, selector: &str, index: usize) -> Result<bool, DeckError> {
        let v = self.eval(&format!(
            "(() => {{ const el = document.querySelectorAll({})[{}]; if (!el) return false; el.click(); return true; }})()",
            js_str(selector),
            index
        ))?;
        Ok(v.as_bool().unwrap_or(false))
    }

    fn remove(&self, selector: &str) -> Result<bool, DeckError> {
        let v = self.eval(&format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; el.remove(); return true; }})()",
            js_str(selector)
        ))?;
        Ok(v.as_bool().unwrap_or(false))
    }

    fn screenshot(&self, selector: &str) -> Result<Vec<u8>, DeckError> {
        let element = self
            .tab
            .wait_for_element(selector)
            .map_err(|e| DeckError::Internal(format!("slide element '{selector}': {e}")))?;
        element
            .capture_screenshot(CaptureScreenshotFormatOption::Png)
            .map_err(|e| DeckError::Internal(format!("screenshot of '{selector}': {e}")))
    }

    fn title(&self) -> Result<String, DeckError> {
        self.tab
            .get_title()
            .map_err(|e| DeckError::Internal(format!("reading title: {e}")))
    }

    fn settle(&self, wait: Duration) {
        std::thread::sleep(wait);
    }
}

/// Run the whole browser stage: launch, load, prepare, capture, close.
///
/// Blocking; call from `spawn_blocking`.
pub fn capture_with_chrome(
    target: &Target,
    config: &CaptureConfig,
) -> Result<SessionCapture, DeckError> {
    let stage = |s: Stage| {
        if let Some(ref cb) = config.progress_callback {
            cb.on_stage(s);
        }
    };

    stage(Stage::Launching);
    let session = ChromeSession::launch(config)?;

    stage(Stage::Loading);
    session.open(&target.url, config.load_wait())?;
    let params = sources::prepare(target.source, &session)?;

    stage(Stage::Capturing);
    let deck = scrape::capture_deck(&session, &params, config)?;

    let title = match session.title() {
        Ok(t) if !t.trim().is_empty() => Some(t.trim().to_string()),
        Ok(_) => None,
        Err(e) => {
            warn!("Could not read page title: {e}");
            None
        }
    };
    Ok(SessionCapture { deck, title })
}
