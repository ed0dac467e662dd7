pub mod fetch;
pub mod sidebar;
pub mod web;

#[cfg(test)]
mod tests;

use crate::config::default_content_frame_selector;
use std::time::Duration;

/// Maximum number of sidebar expansion passes
pub const MAX_EXPANSION_PASSES: usize = 10;

/// Timeouts, settle delays and limits for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Navigation to the entry page
    pub entry_navigation_timeout: Duration,
    /// Navigation to every discovered page
    pub navigation_timeout: Duration,
    /// Wait for the sidebar selector on the entry page
    pub selector_timeout: Duration,
    /// Wait for the content iframe to reach DOMContentLoaded
    pub frame_load_timeout: Duration,
    /// Pause after each expansion click
    pub click_settle: Duration,
    /// Pause after an expansion pass that clicked something
    pub pass_settle: Duration,
    /// Pause for late rendering inside the content iframe
    pub frame_settle: Duration,
    /// Expand until the anchor count converges or this many passes ran
    pub max_passes: usize,
    /// Selector of the iframe holding the page body, if the site uses one
    pub content_frame_selector: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            entry_navigation_timeout: Duration::from_secs(60),
            navigation_timeout: Duration::from_secs(30),
            selector_timeout: Duration::from_secs(10),
            frame_load_timeout: Duration::from_secs(30),
            click_settle: Duration::from_millis(200),
            pass_settle: Duration::from_secs(1),
            frame_settle: Duration::from_secs(2),
            max_passes: MAX_EXPANSION_PASSES,
            content_frame_selector: default_content_frame_selector(),
        }
    }
}

impl CrawlSettings {
    pub fn with_content_frame_selector(mut self, selector: impl Into<String>) -> Self {
        self.content_frame_selector = selector.into();
        self
    }
}
