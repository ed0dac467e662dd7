//! Browser capabilities used by the crawl pipeline.
//!
//! The sidebar and fetch stages only talk to these traits; the
//! WebDriver-backed implementation lives in [`webdriver`].
#![allow(async_fn_in_trait)]

pub mod webdriver;

use crate::error::BrowserError;
use std::time::Duration;
use url::Url;

/// A document inside the tab: the top-level page or a nested frame
pub trait Frame {
    /// Handle to an element of this document
    type Element;

    /// Short human-readable name used in logs
    fn describe(&self) -> String;

    /// First element matching `selector`, if any
    async fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, BrowserError>;

    /// All elements matching `selector` in document order
    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, BrowserError>;

    /// Raw attribute value as written in the markup
    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    async fn is_visible(&self, element: &Self::Element) -> Result<bool, BrowserError>;

    /// The element's parent when that parent is an `<a>`
    async fn parent_anchor(
        &self,
        element: &Self::Element,
    ) -> Result<Option<Self::Element>, BrowserError>;

    async fn click(&self, element: &Self::Element) -> Result<(), BrowserError>;

    /// Current location of this document, used as the base for relative links
    async fn url(&self) -> Result<Url, BrowserError>;

    /// Serialized HTML of this document
    async fn content(&self) -> Result<String, BrowserError>;

    /// Wait until the document has finished parsing
    async fn wait_for_dom_content_loaded(&self, timeout: Duration) -> Result<(), BrowserError>;
}

/// The single tab a crawl runs in
pub trait Page {
    type Frame: Frame;

    /// Navigate and wait for the network to go idle, bounded by `timeout`
    async fn goto(&self, url: &Url, timeout: Duration) -> Result<(), BrowserError>;

    /// The top-level document
    fn main_frame(&self) -> Self::Frame;

    /// Every nested frame in document order, excluding the main frame
    async fn frames(&self) -> Result<Vec<Self::Frame>, BrowserError>;

    /// Wait for `selector` to appear in the top-level document
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
    -> Result<(), BrowserError>;

    /// Frame rendered by the top-level iframe matching `selector`
    ///
    /// `Ok(None)` when no such iframe exists.
    async fn content_frame(&self, selector: &str) -> Result<Option<Self::Frame>, BrowserError>;
}
