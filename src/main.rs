use clap::Parser;
use sidebar_crawl::crawlers::web;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    println!("Note: browser crawling requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using {}",
        config.resolve_env().webdriver_url
    );

    let start_time = std::time::Instant::now();
    match web::run(&config).await {
        Ok(report) => {
            for failed in &report.failed {
                ::log::debug!("Skipped {}: {}", failed.url, failed.reason);
            }
            ::log::info!(
                "Crawling complete - saved {} of {} pages in {:.2} seconds",
                report.processed(),
                report.discovered,
                start_time.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            ::log::error!("Top level browser error: {}", e);
            std::process::exit(1);
        }
    }
}
