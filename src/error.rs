use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while driving the browser session
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The WebDriver server refused to open a session
    #[error("failed to start WebDriver session: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    /// A WebDriver command failed
    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    /// A bounded wait elapsed
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    /// A script returned something other than what was asked for
    #[error("unexpected script result: {0}")]
    Script(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The browser reported a URL that does not parse
    #[error("browser reported an invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BrowserError {
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        BrowserError::Timeout {
            what: what.into(),
            after,
        }
    }
}

/// Errors that abort a run or a single page
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read configuration: {0}")]
    ConfigRead(#[source] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl CrawlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CrawlError::Io {
            path: path.into(),
            source,
        }
    }
}
