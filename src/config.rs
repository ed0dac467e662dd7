use crate::error::CrawlError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

/// Name of the directory created under the output directory
pub const CRAWL_DIR_NAME: &str = "crawl";

/// Configuration for a single crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL to start crawling from
    pub entry_url: String,

    /// Directory that receives the `crawl/` tree
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// CSS selector of the navigation sidebar (entry page only when absent)
    #[serde(default)]
    pub sidebar_selector: Option<String>,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Selector of the iframe some documentation platforms render page bodies into
    #[serde(default = "default_content_frame_selector")]
    pub content_frame_selector: String,
}

/// Validated, immutable input of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub entry_url: Url,
    pub output_dir: PathBuf,
    pub sidebar_selector: Option<String>,
}

impl CrawlTarget {
    /// Directory all pages are written below
    pub fn crawl_dir(&self) -> PathBuf {
        self.output_dir.join(CRAWL_DIR_NAME)
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Default value for webdriver_url
pub fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

/// Default value for content_frame_selector
pub fn default_content_frame_selector() -> String {
    "#ui-content-frame".to_string()
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(entry_url: &str, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            entry_url: entry_url.to_string(),
            output_dir: output_dir.into(),
            sidebar_selector: None,
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            content_frame_selector: default_content_frame_selector(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CrawlError> {
        let mut file = File::open(path).map_err(CrawlError::ConfigRead)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(CrawlError::ConfigRead)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, CrawlError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Copy of this configuration with the WEBDRIVER_URL environment variable applied
    pub fn resolve_env(&self) -> Self {
        self.clone()
            .with_webdriver_override(std::env::var("WEBDRIVER_URL").ok())
    }

    /// Replace the WebDriver URL unless `webdriver_url` is missing or empty
    pub fn with_webdriver_override(mut self, webdriver_url: Option<String>) -> Self {
        if let Some(webdriver_url) = webdriver_url.filter(|url| !url.is_empty()) {
            self.webdriver_url = webdriver_url;
        }
        self
    }

    /// Parse the entry URL and freeze the run input
    pub fn target(&self) -> Result<CrawlTarget, CrawlError> {
        let entry_url = Url::parse(&self.entry_url).map_err(|source| CrawlError::InvalidUrl {
            url: self.entry_url.clone(),
            source,
        })?;

        Ok(CrawlTarget {
            entry_url,
            output_dir: self.output_dir.clone(),
            sidebar_selector: self
                .sidebar_selector
                .clone()
                .filter(|selector| !selector.trim().is_empty()),
        })
    }
}
