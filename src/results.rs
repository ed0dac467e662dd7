use std::collections::BTreeSet;
use url::Url;

/// HTML captured for a page, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// Body rendered inside the embedded content iframe
    FromFrame(String),
    /// Full top-level document
    FromTopLevel(String),
}

impl PageContent {
    pub fn html(&self) -> &str {
        match self {
            PageContent::FromFrame(html) | PageContent::FromTopLevel(html) => html,
        }
    }

    pub fn is_from_frame(&self) -> bool {
        matches!(self, PageContent::FromFrame(_))
    }
}

/// A page that could not be fetched or written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub url: Url,
    pub reason: String,
}

/// Outcome of the fetch phase
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Number of links in the link set
    pub discovered: usize,

    /// Pages fetched and written during this run
    pub visited: BTreeSet<Url>,

    /// Pages skipped because of an error
    pub failed: Vec<FailedPage>,
}

impl CrawlReport {
    pub fn new(discovered: usize) -> Self {
        Self {
            discovered,
            ..Self::default()
        }
    }

    pub fn processed(&self) -> usize {
        self.visited.len()
    }
}
