use super::CrawlSettings;
use super::fetch::fetch_all;
use super::sidebar::discover_links;
use crate::browser::Page;
use crate::browser::webdriver::WebDriverPage;
use crate::config::{CrawlConfig, CrawlTarget};
use crate::error::CrawlError;
use crate::results::CrawlReport;

/// Runs a browser crawl described by `config` and returns what was written.
///
/// Opens one WebDriver session, crawls with it and closes it again on
/// every path after it was opened.
///
/// # Arguments
///
/// * `config` - Crawl configuration
pub async fn run(config: &CrawlConfig) -> Result<CrawlReport, CrawlError> {
    let config = config.resolve_env();
    let target = config.target()?;
    let settings =
        CrawlSettings::default().with_content_frame_selector(&config.content_frame_selector);

    ::log::info!("Starting browser fetch for {}", target.entry_url);
    ::log::info!(
        "Sidebar selector: {}",
        target.sidebar_selector.as_deref().unwrap_or("<none>")
    );

    let crawl_dir = target.crawl_dir();
    std::fs::create_dir_all(&crawl_dir).map_err(|e| CrawlError::io(&crawl_dir, e))?;

    let page = WebDriverPage::connect(&config.webdriver_url, config.headless).await?;

    let outcome = crawl(&page, &target, &settings).await;

    if let Err(e) = page.close().await {
        ::log::warn!("Failed to close browser session: {}", e);
    }

    let report = outcome?;
    ::log::info!(
        "Browser fetch complete. Processed {} of {} pages.",
        report.processed(),
        report.discovered
    );
    Ok(report)
}

/// Crawl `target` in an already open tab
///
/// Only a failed entry navigation is returned as an error; every later
/// problem degrades to a smaller link set or a skipped page.
pub async fn crawl<P: Page>(
    page: &P,
    target: &CrawlTarget,
    settings: &CrawlSettings,
) -> Result<CrawlReport, CrawlError> {
    ::log::info!("Navigating to entry page...");
    page.goto(&target.entry_url, settings.entry_navigation_timeout)
        .await?;

    let links = discover_links(
        page,
        &target.entry_url,
        target.sidebar_selector.as_deref(),
        settings,
    )
    .await;
    ::log::info!("Found {} unique links to process.", links.len());

    Ok(fetch_all(page, &links, &target.crawl_dir(), settings).await)
}
