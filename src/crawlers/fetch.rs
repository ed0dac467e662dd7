use super::CrawlSettings;
use crate::browser::{Frame, Page};
use crate::error::{BrowserError, CrawlError};
use crate::links::LinkSet;
use crate::paths::save_path;
use crate::results::{CrawlReport, FailedPage, PageContent};
use crate::writer::write_page;
use std::path::{Path, PathBuf};
use url::Url;

/// Capture the current page, preferring the embedded content iframe
///
/// Any problem with the iframe falls back to the top-level document; only
/// a failure to read the top-level document itself is an error.
pub async fn extract_content<P: Page>(
    page: &P,
    settings: &CrawlSettings,
) -> Result<PageContent, BrowserError> {
    match frame_content(page, settings).await {
        Ok(Some(html)) => {
            ::log::info!("Successfully captured content from iframe.");
            return Ok(PageContent::FromFrame(html));
        }
        Ok(None) => {}
        Err(e) => ::log::warn!(
            "Timeout or error waiting for iframe '{}': {}. Falling back to page content.",
            settings.content_frame_selector,
            e
        ),
    }

    let html = page.main_frame().content().await?;
    Ok(PageContent::FromTopLevel(html))
}

async fn frame_content<P: Page>(
    page: &P,
    settings: &CrawlSettings,
) -> Result<Option<String>, BrowserError> {
    let selector = settings.content_frame_selector.as_str();
    let Some(frame) = page.content_frame(selector).await? else {
        return Ok(None);
    };

    ::log::info!(
        "Detected content iframe '{}'. Waiting for it to load...",
        selector
    );
    frame
        .wait_for_dom_content_loaded(settings.frame_load_timeout)
        .await?;
    tokio::time::sleep(settings.frame_settle).await;

    Ok(Some(frame.content().await?))
}

/// Navigate to `url` and capture its content
pub async fn fetch_page<P: Page>(
    page: &P,
    url: &Url,
    settings: &CrawlSettings,
) -> Result<PageContent, BrowserError> {
    page.goto(url, settings.navigation_timeout).await?;
    extract_content(page, settings).await
}

/// Fetch one link and write it below `crawl_dir`; returns the written path
pub async fn save_link<P: Page>(
    page: &P,
    url: &Url,
    crawl_dir: &Path,
    settings: &CrawlSettings,
) -> Result<PathBuf, CrawlError> {
    let content = fetch_page(page, url, settings).await?;
    let path = save_path(url, crawl_dir);
    write_page(&path, content.html())?;
    Ok(path)
}

/// Fetch every link in order; a failing page is logged and skipped
pub async fn fetch_all<P: Page>(
    page: &P,
    links: &LinkSet,
    crawl_dir: &Path,
    settings: &CrawlSettings,
) -> CrawlReport {
    let total = links.len();
    let mut report = CrawlReport::new(total);

    for (i, link) in links.iter().enumerate() {
        if report.visited.contains(link) {
            continue;
        }

        ::log::info!("[{}/{}] Processing: {}", i + 1, total, link);
        match save_link(page, link, crawl_dir, settings).await {
            Ok(path) => {
                ::log::debug!("Saved {} to {}", link, path.display());
                report.visited.insert(link.clone());
            }
            Err(e) => {
                ::log::error!("Failed to fetch {}: {}", link, e);
                report.failed.push(FailedPage {
                    url: link.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}
