use clap::Parser;
use sidebar_crawl::CrawlConfig;
use sidebar_crawl::error::CrawlError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sidebar-crawl")]
#[command(
    about = "Saves the rendered pages of a documentation site by walking its sidebar in a browser"
)]
#[command(version)]
pub struct Args {
    /// Entry URL of the documentation site
    pub url: String,

    /// Directory that receives the crawl/ tree [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// CSS selector of the navigation sidebar (entry page only when omitted)
    #[arg(short, long)]
    pub sidebar: Option<String>,

    /// WebDriver server URL (WEBDRIVER_URL takes precedence)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// CSS selector of the iframe holding page bodies
    #[arg(long)]
    pub content_frame: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// JSON configuration file; flags given on the command line override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Merge the command line with the optional configuration file
    pub fn into_config(self) -> Result<CrawlConfig, CrawlError> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = CrawlConfig::from_file(path)?;
                config.entry_url = self.url;
                if let Some(output) = self.output {
                    config.output_dir = output;
                }
                config
            }
            None => CrawlConfig::new(
                &self.url,
                self.output.unwrap_or_else(|| PathBuf::from(".")),
            ),
        };

        if let Some(sidebar) = self.sidebar {
            config.sidebar_selector = Some(sidebar);
        }
        if let Some(webdriver_url) = self.webdriver_url {
            config.webdriver_url = webdriver_url;
        }
        if let Some(content_frame) = self.content_frame {
            config.content_frame_selector = content_frame;
        }
        if self.headful {
            config.headless = false;
        }

        Ok(config)
    }
}
