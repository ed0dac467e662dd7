//! Browser-driven crawler for documentation sites.
//!
//! Opens an entry page in a WebDriver session, expands its sidebar tree,
//! and saves the rendered HTML of every linked page under
//! `<output>/crawl/<host>/...`.

pub mod browser;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod links;
pub mod paths;
pub mod results;
pub mod writer;

// Re-export commonly used types for convenience
pub use config::{CrawlConfig, CrawlTarget};
pub use error::{BrowserError, CrawlError};
pub use results::{CrawlReport, PageContent};

use std::path::{Path, PathBuf};

/// Builder for a single crawl run
pub struct Crawl {
    config: CrawlConfig,
}

impl Crawl {
    /// Create a new Crawl builder for the given entry URL and output directory
    pub fn new(entry_url: &str, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: CrawlConfig::new(entry_url, output_dir),
        }
    }

    /// Start from a complete configuration
    pub fn from_config(config: CrawlConfig) -> Self {
        Self { config }
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        Ok(Self::from_config(CrawlConfig::from_file(path)?))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(json: &str) -> Result<Self, CrawlError> {
        Ok(Self::from_config(CrawlConfig::from_json(json)?))
    }

    /// Set the CSS selector of the navigation sidebar
    pub fn with_sidebar_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.sidebar_selector = Some(selector.into());
        self
    }

    /// Set the WebDriver server to connect to
    pub fn with_webdriver_url(mut self, webdriver_url: impl Into<String>) -> Self {
        self.config.webdriver_url = webdriver_url.into();
        self
    }

    /// Show or hide the browser window
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set the selector of the iframe holding page bodies
    pub fn with_content_frame_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.content_frame_selector = selector.into();
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Run the crawl
    pub async fn run(self) -> Result<CrawlReport, CrawlError> {
        crawlers::web::run(&self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let crawl = Crawl::new("https://docs.example.com/", "out")
            .with_sidebar_selector("#sidebar")
            .with_webdriver_url("http://localhost:9515")
            .with_headless(false)
            .with_content_frame_selector("iframe.body");

        let config = crawl.config();
        assert_eq!(config.sidebar_selector.as_deref(), Some("#sidebar"));
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert!(!config.headless);
        assert_eq!(config.content_frame_selector, "iframe.body");
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_builder_from_json() {
        let crawl = Crawl::with_config_str(
            r##"{"entry_url": "https://docs.example.com/", "sidebar_selector": "#toc"}"##,
        )
        .unwrap();
        assert_eq!(crawl.config().sidebar_selector.as_deref(), Some("#toc"));
    }
}
