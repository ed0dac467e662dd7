//! Sidebar discovery: locate the navigation tree, expand it, harvest its links.
//!
//! Tree widgets on documentation sites usually render children only after
//! the parent node is opened, so expansion repeats until the number of
//! anchors stops growing or the pass limit is hit.

use super::CrawlSettings;
use crate::browser::{Frame, Page};
use crate::error::BrowserError;
use crate::links::LinkSet;
use url::Url;

/// Substrings of an image `src` marking a collapsed tree node.
///
/// Matches Doxygen-style tree themes; sidebars that signal state through
/// other icons or `aria-expanded` are not expanded.
pub const COLLAPSED_MARKERS: [&str; 3] = ["arrowright", "closed.png", "folderclosed"];

/// Result of the expansion loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionSummary {
    /// Number of passes that counted anchors
    pub passes: usize,
    /// Anchors visible after the last pass
    pub anchors: usize,
}

/// Whether an image source looks like a collapsed tree node
pub fn is_collapsed_marker(src: &str) -> bool {
    let src = src.to_lowercase();
    COLLAPSED_MARKERS.iter().any(|marker| src.contains(marker))
}

/// Find the document holding `selector`: the main document first, then nested frames in order
pub async fn locate_sidebar<P: Page>(
    page: &P,
    selector: &str,
    settings: &CrawlSettings,
) -> Option<P::Frame> {
    if let Err(e) = page
        .wait_for_selector(selector, settings.selector_timeout)
        .await
    {
        ::log::warn!(
            "Sidebar selector '{}' not found or timed out in main document: {}. \
             Proceeding with what we have.",
            selector,
            e
        );
    }

    let main = page.main_frame();
    match main.query_selector(selector).await {
        Ok(Some(_)) => {
            ::log::info!("Found sidebar '{}' in main document", selector);
            return Some(main);
        }
        Ok(None) => {}
        Err(e) => ::log::debug!("Querying main document for '{}' failed: {}", selector, e),
    }

    let frames = match page.frames().await {
        Ok(frames) => frames,
        Err(e) => {
            ::log::warn!("Could not enumerate frames: {}", e);
            Vec::new()
        }
    };

    for frame in frames {
        match frame.query_selector(selector).await {
            Ok(Some(_)) => {
                let location = frame
                    .url()
                    .await
                    .map(|url| url.to_string())
                    .unwrap_or_else(|_| frame.describe());
                ::log::info!("Found sidebar in frame: {}", location);
                return Some(frame);
            }
            Ok(None) => {}
            Err(e) => ::log::debug!("Skipping {}: {}", frame.describe(), e),
        }
    }

    ::log::warn!("Sidebar selector '{}' not found in any frame.", selector);
    None
}

/// Click collapsed nodes until no new anchors appear or `max_passes` is reached
pub async fn expand_sidebar<F: Frame>(
    frame: &F,
    selector: &str,
    settings: &CrawlSettings,
) -> ExpansionSummary {
    let anchor_selector = format!("{} a", selector);
    let image_selector = format!("{} img", selector);

    ::log::info!("Starting recursive sidebar expansion...");
    let mut summary = ExpansionSummary {
        passes: 0,
        anchors: 0,
    };

    for pass in 0..settings.max_passes {
        let count = match frame.query_selector_all(&anchor_selector).await {
            Ok(anchors) => anchors.len(),
            Err(e) => {
                ::log::warn!("Could not count sidebar links, stopping expansion: {}", e);
                break;
            }
        };
        summary.passes = pass + 1;
        ::log::info!("Expansion pass {}: {} links found.", pass + 1, count);

        if pass > 0 && count == summary.anchors {
            ::log::info!("No new links found. Expansion complete.");
            break;
        }
        summary.anchors = count;

        let clicked = click_collapsed_nodes(frame, &image_selector, settings).await;
        if clicked == 0 {
            ::log::info!("No expandable items found or clickable.");
            break;
        }
        ::log::debug!("Expanded {} nodes in pass {}", clicked, pass + 1);

        tokio::time::sleep(settings.pass_settle).await;
    }

    if summary.passes == settings.max_passes {
        ::log::debug!("Expansion stopped at the pass limit of {}", settings.max_passes);
    }
    summary
}

/// One expansion pass; returns how many nodes were clicked
async fn click_collapsed_nodes<F: Frame>(
    frame: &F,
    image_selector: &str,
    settings: &CrawlSettings,
) -> usize {
    let images = match frame.query_selector_all(image_selector).await {
        Ok(images) => images,
        Err(e) => {
            ::log::debug!("Could not list sidebar images: {}", e);
            return 0;
        }
    };

    let mut clicked = 0;
    for image in &images {
        match click_if_collapsed(frame, image).await {
            Ok(true) => {
                clicked += 1;
                tokio::time::sleep(settings.click_settle).await;
            }
            Ok(false) => {}
            Err(e) => ::log::trace!("Ignoring click error: {}", e),
        }
    }
    clicked
}

async fn click_if_collapsed<F: Frame>(frame: &F, image: &F::Element) -> Result<bool, BrowserError> {
    let src = frame.attribute(image, "src").await?.unwrap_or_default();
    if !is_collapsed_marker(&src) || !frame.is_visible(image).await? {
        return Ok(false);
    }

    match frame.parent_anchor(image).await? {
        Some(anchor) => frame.click(&anchor).await?,
        None => frame.click(image).await?,
    }
    Ok(true)
}

/// Harvest the sidebar's anchors into a link set seeded with the entry URL
pub async fn collect_links<F: Frame>(frame: &F, selector: &str, entry_url: &Url) -> LinkSet {
    let mut links = LinkSet::new(entry_url);

    let anchors = match frame.query_selector_all(&format!("{} a", selector)).await {
        Ok(anchors) => anchors,
        Err(e) => {
            ::log::warn!("Could not read sidebar links: {}", e);
            return links;
        }
    };
    ::log::info!("Found {} anchors in sidebar after expansion.", anchors.len());

    let base = match frame.url().await {
        Ok(base) => base,
        Err(e) => {
            ::log::warn!(
                "Could not read location of {}, resolving links against the entry URL: {}",
                frame.describe(),
                e
            );
            entry_url.clone()
        }
    };

    for anchor in &anchors {
        match frame.attribute(anchor, "href").await {
            Ok(Some(href)) => {
                links.insert_href(&base, &href);
            }
            Ok(None) => {}
            Err(e) => ::log::debug!("Could not read href: {}", e),
        }
    }

    links
}

/// Run the whole discovery stage on the already loaded entry page
pub async fn discover_links<P: Page>(
    page: &P,
    entry_url: &Url,
    sidebar_selector: Option<&str>,
    settings: &CrawlSettings,
) -> LinkSet {
    let Some(selector) = sidebar_selector else {
        ::log::info!("No sidebar selector given, crawling the entry page only");
        return LinkSet::new(entry_url);
    };

    ::log::info!("Extracting links from sidebar: {}", selector);
    let Some(frame) = locate_sidebar(page, selector, settings).await else {
        return LinkSet::new(entry_url);
    };

    expand_sidebar(&frame, selector, settings).await;
    collect_links(&frame, selector, entry_url).await
}
