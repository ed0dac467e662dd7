use super::instant_settings;
use super::mock::{MockFrame, MockPage, MockSite};
use crate::browser::Page;
use crate::crawlers::fetch::{extract_content, fetch_all, fetch_page};
use crate::links::LinkSet;
use crate::results::PageContent;
use std::fs;
use std::time::Duration;
use url::Url;

const CONTENT_FRAME: &str = "#ui-content-frame";

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn test_top_level_content_without_iframe() {
    let html = "<html><body><h1>Guide</h1></body></html>";
    let page = MockPage::new().with_site(MockSite::page("https://a.com/guide", html));

    let content = fetch_page(&page, &url("https://a.com/guide"), &instant_settings())
        .await
        .unwrap();
    assert_eq!(content, PageContent::FromTopLevel(html.to_string()));
    assert!(!content.html().is_empty());
}

#[tokio::test]
async fn test_content_from_embedded_frame() {
    let body = MockFrame::document(
        "https://a.com/content/topic.html",
        "<html><body><p>Topic body</p></body></html>",
    );
    let page = MockPage::new().with_site(
        MockSite::page("https://a.com/?guid=1", "<html><body>chrome</body></html>")
            .with_content_frame(CONTENT_FRAME, body),
    );

    let content = fetch_page(&page, &url("https://a.com/?guid=1"), &instant_settings())
        .await
        .unwrap();
    assert!(content.is_from_frame());
    assert_eq!(content.html(), "<html><body><p>Topic body</p></body></html>");
}

#[tokio::test]
async fn test_frame_load_failure_falls_back_to_page() {
    let body =
        MockFrame::document("https://a.com/content/topic.html", "<p>late</p>").failing_load();
    let page = MockPage::new().with_site(
        MockSite::page("https://a.com/x", "<html><body>chrome</body></html>")
            .with_content_frame(CONTENT_FRAME, body),
    );
    page.goto(&url("https://a.com/x"), Duration::ZERO).await.unwrap();

    let content = extract_content(&page, &instant_settings()).await.unwrap();
    assert_eq!(
        content,
        PageContent::FromTopLevel("<html><body>chrome</body></html>".to_string())
    );
}

#[tokio::test]
async fn test_unresolvable_frame_falls_back_to_page() {
    let page = MockPage::new().with_site(
        MockSite::page("https://a.com/y", "<html><body>outer</body></html>")
            .with_unresolvable_content_frame(CONTENT_FRAME),
    );
    page.goto(&url("https://a.com/y"), Duration::ZERO).await.unwrap();

    let content = extract_content(&page, &instant_settings()).await.unwrap();
    assert_eq!(
        content,
        PageContent::FromTopLevel("<html><body>outer</body></html>".to_string())
    );
}

#[tokio::test]
async fn test_custom_content_frame_selector() {
    let body = MockFrame::document("https://a.com/body.html", "<p>body</p>");
    let page = MockPage::new().with_site(
        MockSite::page("https://a.com/x", "<p>chrome</p>").with_content_frame("iframe#main", body),
    );
    page.goto(&url("https://a.com/x"), Duration::ZERO).await.unwrap();

    let default = extract_content(&page, &instant_settings()).await.unwrap();
    assert!(!default.is_from_frame());

    let settings = instant_settings().with_content_frame_selector("iframe#main");
    let custom = extract_content(&page, &settings).await.unwrap();
    assert_eq!(custom, PageContent::FromFrame("<p>body</p>".to_string()));
}

#[tokio::test]
async fn test_failing_link_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let page = MockPage::new()
        .with_site(MockSite::page("https://a.com/1", "<p>one</p>"))
        .with_site(MockSite::page("https://a.com/3", "<p>three</p>"));

    let mut links = LinkSet::new(&url("https://a.com/1"));
    links.insert(&url("https://a.com/2"));
    links.insert(&url("https://a.com/3"));

    let report = fetch_all(&page, &links, dir.path(), &instant_settings()).await;

    assert_eq!(report.discovered, 3);
    assert_eq!(report.visited.len(), 2);
    assert!(!report.visited.contains(&url("https://a.com/2")));
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].url, url("https://a.com/2"));

    assert_eq!(fs::read_to_string(dir.path().join("a.com/1.html")).unwrap(), "<p>one</p>");
    assert_eq!(fs::read_to_string(dir.path().join("a.com/3.html")).unwrap(), "<p>three</p>");
    assert!(!dir.path().join("a.com/2.html").exists());

    assert_eq!(
        page.visits(),
        vec!["https://a.com/1", "https://a.com/2", "https://a.com/3"]
    );
}

#[tokio::test]
async fn test_write_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let page = MockPage::new()
        .with_site(MockSite::page("https://a.com/1", "<p>one</p>"))
        .with_site(MockSite::page("https://a.com/2/page", "<p>two</p>"))
        .with_site(MockSite::page("https://a.com/3", "<p>three</p>"));

    // A regular file where the page's directory should go
    fs::create_dir_all(dir.path().join("a.com")).unwrap();
    fs::write(dir.path().join("a.com/2"), "not a directory").unwrap();

    let mut links = LinkSet::new(&url("https://a.com/1"));
    links.insert(&url("https://a.com/2/page"));
    links.insert(&url("https://a.com/3"));

    let report = fetch_all(&page, &links, dir.path(), &instant_settings()).await;

    assert_eq!(report.discovered, 3);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].url, url("https://a.com/2/page"));
    assert!(!report.visited.contains(&url("https://a.com/2/page")));
    assert_eq!(report.processed(), 2);

    assert_eq!(fs::read_to_string(dir.path().join("a.com/1.html")).unwrap(), "<p>one</p>");
    assert_eq!(fs::read_to_string(dir.path().join("a.com/3.html")).unwrap(), "<p>three</p>");
    assert_eq!(page.visits().len(), 3);
}
