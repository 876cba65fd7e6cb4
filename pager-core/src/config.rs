//! Per-session configuration and render options.

use std::time::Duration;

use crate::DEFAULT_TIMEOUT_SECS;

/// Text assets shown around a session's lifecycle.
#[derive(Debug, Clone)]
pub struct TextAssets {
    /// Placeholder content published while the first page is prepared.
    pub prepare: String,
    /// Jump prompt; `{user}` expands to a mention of the prompted actor.
    pub prompt: String,
}

impl Default for TextAssets {
    fn default() -> Self {
        Self {
            prepare: "Preparing...".to_owned(),
            prompt: "{user}, to which page would you like to jump? Reply `cancel` or `0` to abort."
                .to_owned(),
        }
    }
}

/// Behavior knobs for one pagination session.
///
/// Read fresh at each loop iteration; immutable during a single wait.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// How long the session waits for the next qualifying input.
    pub timeout: Duration,
    /// Whether renderers should show a `page x/y` indicator.
    pub show_page_indicator: bool,
    /// Whether the presented message is deleted when the session expires.
    pub delete_on_timeout: bool,
    /// Text assets for the prepare placeholder and the jump prompt.
    pub assets: TextAssets,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            show_page_indicator: true,
            delete_on_timeout: false,
            assets: TextAssets::default(),
        }
    }
}

/// Subset of session options handed to the renderer on every render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Whether to show a `page x/y` indicator on rendered pages.
    pub show_page_indicator: bool,
    /// Placeholder content published while the first page is prepared.
    pub prepare: String,
}

impl RenderOptions {
    pub(crate) fn from_session(options: &SessionOptions) -> Self {
        Self {
            show_page_indicator: options.show_page_indicator,
            prepare: options.assets.prepare.clone(),
        }
    }
}
