use super::{Frame, Page};
use crate::error::BrowserError;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

/// Desktop Chrome user agent; some documentation hosts serve 404s to headless defaults
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
);

/// Nested frames deeper than this are not searched
const MAX_FRAME_DEPTH: usize = 5;

/// Network is considered idle once nothing new loaded for this long
const NETWORK_QUIET_PERIOD: Duration = Duration::from_millis(500);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Well-known local WebDriver endpoints tried when the configured one refuses
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://127.0.0.1:4444",
];

const LOAD_STATE_SCRIPT: &str = "return { ready: document.readyState, \
     resources: performance.getEntriesByType('resource').length };";

const READY_STATE_SCRIPT: &str = "return document.readyState;";

const LOCATION_SCRIPT: &str = "return window.location.href;";

const FRAME_COUNT_SCRIPT: &str = "return window.frames.length;";

const FRAME_INDEX_SCRIPT: &str = "const target = arguments[0].contentWindow; \
     for (let i = 0; i < window.frames.length; i++) { \
         if (window.frames[i] === target) { return i; } \
     } \
     return null;";

#[derive(Debug, Deserialize, PartialEq)]
struct LoadState {
    ready: String,
    resources: u64,
}

/// Frame path the session currently has selected, if known
///
/// WebDriver has one "current" browsing context per session; caching it
/// lets repeated calls on the same frame skip the switch.
#[derive(Debug, Default)]
struct FrameCursor {
    active: Option<Vec<u16>>,
}

impl FrameCursor {
    fn at_top() -> Self {
        Self {
            active: Some(Vec::new()),
        }
    }

    fn is_at(&self, path: &[u16]) -> bool {
        self.active.as_deref() == Some(path)
    }

    fn entered(&mut self, path: &[u16]) {
        self.active = Some(path.to_vec());
    }

    fn forget(&mut self) {
        self.active = None;
    }

    /// A failed command may mean the frame was detached or the top-level
    /// document navigated away, so the next call re-enters from the top.
    fn after_command(&mut self, succeeded: bool) {
        if !succeeded {
            self.forget();
        }
    }
}

/// Depth-first walk over frame index paths, yielding frames in document order
struct FrameWalk {
    pending: Vec<Vec<u16>>,
    max_depth: usize,
}

impl FrameWalk {
    fn new(max_depth: usize) -> Self {
        Self {
            pending: vec![Vec::new()],
            max_depth,
        }
    }

    fn next_path(&mut self) -> Option<Vec<u16>> {
        self.pending.pop()
    }

    fn wants_children(&self, path: &[u16]) -> bool {
        path.len() < self.max_depth
    }

    /// Children go on the stack in reverse so the first child is visited next
    fn push_children(&mut self, path: &[u16], count: u16) {
        if !self.wants_children(path) {
            return;
        }
        for index in (0..count).rev() {
            let mut child = path.to_vec();
            child.push(index);
            self.pending.push(child);
        }
    }
}

/// Decides when a page has stopped loading resources
struct IdleTracker {
    last: Option<LoadState>,
    quiet_since: Instant,
    quiet_period: Duration,
}

impl IdleTracker {
    fn new(now: Instant, quiet_period: Duration) -> Self {
        Self {
            last: None,
            quiet_since: now,
            quiet_period,
        }
    }

    /// Record a sample taken at `now`; true once the document is complete
    /// and nothing changed for the quiet period
    fn observe(&mut self, state: LoadState, now: Instant) -> bool {
        if self.last.as_ref() != Some(&state) {
            self.quiet_since = now;
            self.last = Some(state);
            return false;
        }
        state.ready == "complete" && now.duration_since(self.quiet_since) >= self.quiet_period
    }
}

/// WebDriver session shared by the page and its frames
#[derive(Clone)]
struct Session {
    client: Client,
    cursor: Arc<Mutex<FrameCursor>>,
}

impl Session {
    async fn enter(&self, path: &[u16]) -> Result<(), BrowserError> {
        let mut cursor = self.cursor.lock().await;
        if cursor.is_at(path) {
            return Ok(());
        }

        cursor.forget();
        self.client.enter_frame(None).await?;
        for &index in path {
            self.client.enter_frame(Some(index)).await?;
        }
        cursor.entered(path);
        Ok(())
    }

    /// Navigation always returns the session to the top-level document
    async fn reset_to_top(&self) {
        *self.cursor.lock().await = FrameCursor::at_top();
    }

    async fn forget_active(&self) {
        self.cursor.lock().await.forget();
    }

    /// Pass a command result through, dropping the cached frame on failure
    async fn checked<T>(&self, result: Result<T, CmdError>) -> Result<T, BrowserError> {
        self.cursor.lock().await.after_command(result.is_ok());
        Ok(result?)
    }

    async fn script<T: serde::de::DeserializeOwned>(
        &self,
        path: &[u16],
        script: &str,
        args: Vec<Value>,
    ) -> Result<T, BrowserError> {
        self.enter(path).await?;
        let value = self.checked(self.client.execute(script, args).await).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// The crawl tab, backed by a fantoccini WebDriver client
pub struct WebDriverPage {
    session: Session,
}

/// A document inside the tab, addressed by its frame index path from the top
#[derive(Clone)]
pub struct WebDriverFrame {
    session: Session,
    path: Vec<u16>,
}

/// Session capabilities: headless desktop browser with a realistic user agent
pub fn capabilities(headless: bool) -> Map<String, Value> {
    let mut chrome_args = vec![
        format!("--user-agent={}", USER_AGENT),
        "--window-size=1920,1080".to_string(),
    ];
    let mut firefox_args = vec!["-width=1920".to_string(), "-height=1080".to_string()];
    if headless {
        chrome_args.push("--headless=new".to_string());
        firefox_args.push("-headless".to_string());
    }

    let caps = json!({
        "goog:chromeOptions": { "args": chrome_args },
        "moz:firefoxOptions": {
            "args": firefox_args,
            "prefs": { "general.useragent.override": USER_AGENT }
        }
    });

    match caps {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

async fn connect_with(webdriver_url: &str, headless: bool) -> Result<Client, BrowserError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(headless));
    Ok(builder.connect(webdriver_url).await?)
}

impl WebDriverPage {
    /// Open a browser session, trying well-known local endpoints if the configured one fails
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, BrowserError> {
        let client = match connect_with(webdriver_url, headless).await {
            Ok(client) => {
                ::log::info!("Connected to WebDriver at {}", webdriver_url);
                client
            }
            Err(first_error) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    webdriver_url,
                    first_error
                );
                Self::connect_fallback(webdriver_url, headless)
                    .await
                    .ok_or(first_error)?
            }
        };

        let page = Self {
            session: Session {
                client,
                cursor: Arc::new(Mutex::new(FrameCursor::at_top())),
            },
        };
        Ok(page)
    }

    async fn connect_fallback(webdriver_url: &str, headless: bool) -> Option<Client> {
        for url in FALLBACK_WEBDRIVER_URLS {
            if url == webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            match connect_with(url, headless).await {
                Ok(client) => {
                    ::log::info!("Connected to fallback WebDriver at {}", url);
                    return Some(client);
                }
                Err(e) => ::log::debug!("Fallback WebDriver {} unavailable: {}", url, e),
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        None
    }

    /// End the WebDriver session and close the browser
    pub async fn close(self) -> Result<(), BrowserError> {
        self.session.client.close().await?;
        Ok(())
    }

    fn frame(&self, path: Vec<u16>) -> WebDriverFrame {
        WebDriverFrame {
            session: self.session.clone(),
            path,
        }
    }

    async fn child_frame_count(&self, path: &[u16]) -> Result<u16, BrowserError> {
        self.session.script(path, FRAME_COUNT_SCRIPT, Vec::new()).await
    }

    async fn navigate(&self, url: &Url) -> Result<(), BrowserError> {
        self.session.forget_active().await;
        self.session.client.goto(url.as_str()).await?;
        self.session.reset_to_top().await;
        self.wait_for_network_idle().await
    }

    /// Poll until the document is complete and no new resources arrive for a quiet period
    async fn wait_for_network_idle(&self) -> Result<(), BrowserError> {
        let mut tracker = IdleTracker::new(Instant::now(), NETWORK_QUIET_PERIOD);

        loop {
            let state: LoadState = self
                .session
                .script(&[], LOAD_STATE_SCRIPT, Vec::new())
                .await?;
            let resources = state.resources;
            if tracker.observe(state, Instant::now()) {
                ::log::trace!("Network idle after {} resources", resources);
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl Page for WebDriverPage {
    type Frame = WebDriverFrame;

    async fn goto(&self, url: &Url, timeout: Duration) -> Result<(), BrowserError> {
        let client = &self.session.client;
        client
            .update_timeouts(TimeoutConfiguration::new(
                Some(timeout),
                Some(timeout),
                Some(Duration::ZERO),
            ))
            .await?;

        match tokio::time::timeout(timeout, self.navigate(url)).await {
            Ok(result) => result,
            Err(_) => {
                self.session.forget_active().await;
                Err(BrowserError::timeout(format!("network idle on {}", url), timeout))
            }
        }
    }

    fn main_frame(&self) -> WebDriverFrame {
        self.frame(Vec::new())
    }

    async fn frames(&self) -> Result<Vec<WebDriverFrame>, BrowserError> {
        let mut found = Vec::new();
        let mut walk = FrameWalk::new(MAX_FRAME_DEPTH);

        while let Some(path) = walk.next_path() {
            if walk.wants_children(&path) {
                let count = match self.child_frame_count(&path).await {
                    Ok(count) => count,
                    Err(e) => {
                        ::log::debug!("Could not list child frames of {:?}: {}", path, e);
                        0
                    }
                };
                walk.push_children(&path, count);
            }
            if !path.is_empty() {
                found.push(self.frame(path));
            }
        }

        Ok(found)
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.session.enter(&[]).await?;
        let found = self
            .session
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await;
        self.session.checked(found).await?;
        Ok(())
    }

    async fn content_frame(
        &self,
        selector: &str,
    ) -> Result<Option<WebDriverFrame>, BrowserError> {
        let Some(iframe) = self.main_frame().query_selector(selector).await? else {
            return Ok(None);
        };

        let index: Option<u16> = self
            .session
            .script(&[], FRAME_INDEX_SCRIPT, vec![serde_json::to_value(&iframe)?])
            .await?;

        match index {
            Some(index) => Ok(Some(self.frame(vec![index]))),
            None => Err(BrowserError::Script(format!(
                "'{}' does not host a frame",
                selector
            ))),
        }
    }
}

impl Frame for WebDriverFrame {
    type Element = Element;

    fn describe(&self) -> String {
        if self.path.is_empty() {
            "main frame".to_string()
        } else {
            let indices: Vec<String> = self.path.iter().map(u16::to_string).collect();
            format!("frame [{}]", indices.join("/"))
        }
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<Element>, BrowserError> {
        Ok(self.query_selector_all(selector).await?.into_iter().next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        self.session.enter(&self.path).await?;
        let found = self.session.client.find_all(Locator::Css(selector)).await;
        self.session.checked(found).await
    }

    async fn attribute(
        &self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        self.session.enter(&self.path).await?;
        self.session.checked(element.attr(name).await).await
    }

    async fn is_visible(&self, element: &Element) -> Result<bool, BrowserError> {
        self.session.enter(&self.path).await?;
        self.session.checked(element.is_displayed().await).await
    }

    async fn parent_anchor(&self, element: &Element) -> Result<Option<Element>, BrowserError> {
        self.session.enter(&self.path).await?;
        let parent = self
            .session
            .checked(element.find(Locator::XPath("..")).await)
            .await?;
        let tag = self.session.checked(parent.tag_name().await).await?;
        if tag.eq_ignore_ascii_case("a") {
            Ok(Some(parent))
        } else {
            Ok(None)
        }
    }

    async fn click(&self, element: &Element) -> Result<(), BrowserError> {
        self.session.enter(&self.path).await?;
        self.session.checked(element.click().await).await
    }

    async fn url(&self) -> Result<Url, BrowserError> {
        let href: String = self
            .session
            .script(&self.path, LOCATION_SCRIPT, Vec::new())
            .await?;
        Ok(Url::parse(&href)?)
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.session.enter(&self.path).await?;
        self.session.checked(self.session.client.source().await).await
    }

    async fn wait_for_dom_content_loaded(&self, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            let state: String = self
                .session
                .script(&self.path, READY_STATE_SCRIPT, Vec::new())
                .await?;
            if state != "loading" {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::timeout(
                    format!("DOMContentLoaded in {}", self.describe()),
                    timeout,
                ));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_carry_user_agent() {
        let caps = capabilities(true);
        let chrome_args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        let user_agent_arg = format!("--user-agent={}", USER_AGENT);
        assert!(chrome_args
            .iter()
            .any(|arg| arg.as_str() == Some(user_agent_arg.as_str())));
        assert!(chrome_args.iter().any(|arg| arg == "--headless=new"));
        assert_eq!(
            caps["moz:firefoxOptions"]["prefs"]["general.useragent.override"],
            USER_AGENT
        );
    }

    #[test]
    fn test_headful_capabilities() {
        let caps = capabilities(false);
        let chrome_args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!chrome_args.iter().any(|arg| arg == "--headless=new"));
    }

    fn load(ready: &str, resources: u64) -> LoadState {
        LoadState {
            ready: ready.to_string(),
            resources,
        }
    }

    #[test]
    fn test_idle_after_quiet_period() {
        let start = Instant::now();
        let ms = |n| start + Duration::from_millis(n);
        let mut tracker = IdleTracker::new(start, Duration::from_millis(500));

        assert!(!tracker.observe(load("complete", 3), ms(0)));
        assert!(!tracker.observe(load("complete", 3), ms(200)));
        assert!(tracker.observe(load("complete", 3), ms(600)));

        // A late resource restarts the quiet period
        assert!(!tracker.observe(load("complete", 4), ms(700)));
        assert!(!tracker.observe(load("complete", 4), ms(1000)));
        assert!(tracker.observe(load("complete", 4), ms(1300)));
    }

    #[test]
    fn test_not_idle_before_document_complete() {
        let start = Instant::now();
        let mut tracker = IdleTracker::new(start, Duration::from_millis(500));

        assert!(!tracker.observe(load("interactive", 1), start));
        assert!(!tracker.observe(load("interactive", 1), start + Duration::from_secs(5)));
        assert!(!tracker.observe(load("complete", 1), start + Duration::from_secs(6)));
        assert!(tracker.observe(load("complete", 1), start + Duration::from_secs(7)));
    }

    fn walk_order(child_count: impl Fn(&[u16]) -> u16, max_depth: usize) -> Vec<Vec<u16>> {
        let mut walk = FrameWalk::new(max_depth);
        let mut order = Vec::new();
        while let Some(path) = walk.next_path() {
            walk.push_children(&path, child_count(&path));
            if !path.is_empty() {
                order.push(path);
            }
        }
        order
    }

    #[test]
    fn test_frame_walk_is_document_order() {
        let child_count = |path: &[u16]| match path {
            [] => 2,
            [0] => 2,
            [0, 1] => 1,
            _ => 0,
        };
        assert_eq!(
            walk_order(child_count, MAX_FRAME_DEPTH),
            vec![vec![0], vec![0, 0], vec![0, 1], vec![0, 1, 0], vec![1]]
        );
    }

    #[test]
    fn test_frame_walk_respects_depth_limit() {
        let child_count = |path: &[u16]| match path {
            [] => 2,
            [0] => 3,
            _ => 0,
        };
        assert_eq!(walk_order(child_count, 1), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_cursor_forgets_frame_after_failed_command() {
        let mut cursor = FrameCursor::at_top();
        cursor.entered(&[0, 1]);
        assert!(cursor.is_at(&[0, 1]));

        cursor.after_command(true);
        assert!(cursor.is_at(&[0, 1]));

        cursor.after_command(false);
        assert!(!cursor.is_at(&[0, 1]));
        assert!(!cursor.is_at(&[]));
    }

    #[test]
    fn test_load_state_deserializes() {
        let state: LoadState =
            serde_json::from_value(json!({ "ready": "complete", "resources": 12 })).unwrap();
        assert_eq!(
            state,
            LoadState {
                ready: "complete".to_string(),
                resources: 12
            }
        );
    }
}
