mod fetch_tests;

use super::CrawlSettings;
use std::time::Duration;

/// Default timeouts with every settle delay removed
fn instant_settings() -> CrawlSettings {
    CrawlSettings {
        click_settle: Duration::ZERO,
        pass_settle: Duration::ZERO,
        frame_settle: Duration::ZERO,
        ..CrawlSettings::default()
    }
}
