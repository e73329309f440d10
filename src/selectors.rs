//! DOM selectors for each supported presentation service.
//!
//! Every site-specific CSS selector lives here so a markup change on one of
//! the services means editing exactly one place. The site adapters in
//! [`crate::pipeline::sources`] only combine these.

/// Pitch.com player.
pub mod pitch {
    /// Cookie banner "customise" button.
    pub const COOKIE_SETTINGS: &str = r#"button[type="text"]"#;
    /// "Engagement" tracking checkbox inside the cookie dialog; we untick it.
    pub const COOKIE_ENGAGEMENT: &str = r#"input[name="engagement"]"#;
    pub const COOKIE_CONFIRM: &str = r#"button[type="submit"]"#;
    /// Popover shown at the end of the deck; it would cover the last slide.
    pub const BRANDING_POPOVER: &str = ".player-branding-popover";
    /// One progress dash per slide.
    pub const PROGRESS_DASH: &str = ".dash";
    /// Progress of the current slide's animated builds (0–100).
    pub const CURRENT_DASH_PROGRESS: &str = ".dash.selected [aria-valuenow]";
    pub const PROGRESS_ATTRIBUTE: &str = "aria-valuenow";
    pub const PROGRESS_COMPLETE: &str = "100";
    /// Player buttons; the class name changed between player versions.
    pub const PLAYER_BUTTONS: [&str; 2] = [".ng-player-v2--button", ".player-v2--button"];
    /// Index of "next" among the player buttons.
    pub const NEXT_BUTTON_INDEX: usize = 1;
    pub const SLIDE: &str = ".slide-wrapper";
}

/// Google Slides "Publish to web" viewer.
pub mod gslides {
    /// Clicking the viewer container advances one slide.
    pub const VIEWER: &str = ".punch-viewer-container";
    pub const SLIDE_COUNT: &str = "[aria-setsize]";
    pub const SLIDE_COUNT_ATTRIBUTE: &str = "aria-setsize";
    pub const SLIDE: &str = ".punch-viewer-svgpage-svgcontainer";
}

/// Figma Slides / prototype deck viewer.
pub mod figma {
    /// Header bar that would otherwise appear in every screenshot.
    pub const HEADER: &str = r#"[aria-label="Prototype controls"]"#;
    pub const NEXT: &str = r#"[aria-label="Next frame"]"#;
    /// Text like `3 / 12`.
    pub const STATUS: &str = r#"[role="status"]"#;
    pub const SLIDE: &str = "canvas";
}
