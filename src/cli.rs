use crate::http_client::DEFAULT_USER_AGENT;
use crate::models::PerformanceMetrics;
use clap::Parser;

pub const DEFAULT_MAX_PAGES: usize = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_PROBE_LIMIT: usize = 25;
pub const DEFAULT_OUTPUT: &str = "text";

#[derive(Parser, Debug)]
#[command(name = "sitegrade")]
#[command(about = "Crawl a website and grade its SEO and technical health", long_about = None)]
pub struct Cli {
    /// The URL to start crawling from
    #[arg(value_name = "URL")]
    pub url: String,

    /// Maximum number of links away from the start URL (unlimited by default)
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Maximum number of pages to fetch (default: 200)
    #[arg(short, long)]
    pub max_pages: Option<usize>,

    /// Per-request timeout in seconds (default: 15)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(short, long)]
    pub user_agent: Option<String>,

    /// Output format: text or json (default: text)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Save report to file
    #[arg(short, long)]
    pub save: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Rate limit for requests per second per host (e.g., 1.0 for 1 req/s)
    #[arg(short = 'r', long)]
    pub rate_limit: Option<f64>,

    /// Number of pages fetched concurrently (default: 8)
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Outbound links probed for brokenness on each page (default: 25)
    #[arg(short = 'p', long)]
    pub probe_limit: Option<usize>,

    /// Stop the crawl after this many seconds
    #[arg(long)]
    pub max_duration: Option<u64>,

    /// Path to configuration file (JSON, TOML, or YAML)
    #[arg(long)]
    pub config: Option<String>,

    /// Lab performance metrics, only settable from a configuration file
    #[arg(skip)]
    pub performance: Option<PerformanceMetrics>,
}

impl Cli {
    /// Unset options are left for a config file to fill; these resolve
    /// whatever is still missing to the built-in defaults.
    pub fn max_pages(&self) -> usize {
        self.max_pages.unwrap_or(DEFAULT_MAX_PAGES)
    }

    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or(DEFAULT_OUTPUT)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn probe_limit(&self) -> usize {
        self.probe_limit.unwrap_or(DEFAULT_PROBE_LIMIT)
    }
}
