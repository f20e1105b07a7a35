pub mod aggregator;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod extractor;
pub mod fetcher;
pub mod frontier;
pub mod grader;
pub mod http_client;
pub mod link_checker;
pub mod models;
pub mod reporter;
pub mod scorer;
pub mod url_normalizer;

use aggregator::CrawlMetrics;
use anyhow::Result;
use cli::Cli;
use colored::*;
use config::Config;
use crawler::{Crawler, CrawlerConfig};
use models::{CrawlResult, PerformanceMetrics};
use reporter::Reporter;
use scorer::{AuditResult, Scorer};
use std::time::Duration;

impl From<&Cli> for CrawlerConfig {
    fn from(args: &Cli) -> Self {
        Self {
            seed_url: args.url.clone(),
            max_pages: args.max_pages(),
            max_depth: args.depth,
            timeout: Duration::from_secs(args.timeout()),
            user_agent: args.user_agent().to_string(),
            concurrency: args.concurrency(),
            probe_limit: args.probe_limit(),
            requests_per_second: args.rate_limit,
            max_duration: args.max_duration.map(Duration::from_secs),
        }
    }
}

/// Derives metrics, category scores and the grade from a finished crawl.
pub fn audit(crawl: &CrawlResult, performance: Option<&PerformanceMetrics>) -> (CrawlMetrics, AuditResult) {
    let metrics = CrawlMetrics::from_crawl(crawl);
    let audit = Scorer::score(&metrics, performance);
    (metrics, audit)
}

pub async fn run(args: Cli) -> Result<()> {
    let args = Config::resolve(args)?;

    let mut crawler = Crawler::new(CrawlerConfig::from(&args))?;
    let json_output = args.output() == "json";

    if !json_output {
        println!("{}", "Sitegrade - Website Audit".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!();
        println!("{} {}", "Starting crawl:".bright_white().bold(), crawler.seed());
        match args.depth {
            Some(depth) => println!("{} {}", "Max depth:".bright_white().bold(), depth),
            None => println!("{} unlimited", "Max depth:".bright_white().bold()),
        }
        println!("{} {}", "Max pages:".bright_white().bold(), args.max_pages());
        println!();

        crawler.enable_progress_bar();
    }

    let cancel = crawler.cancel_flag();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the pages crawled so far");
            cancel.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });

    let crawl = crawler.crawl().await;
    ctrl_c.abort();

    let (metrics, result) = audit(&crawl, args.performance.as_ref());

    if args.verbose && !json_output {
        println!(
            "{} {} pages, {} fetch attempts, {} URLs left unvisited",
            "Crawled:".bright_white().bold(),
            crawl.pages.len(),
            crawl.fetch_attempts(),
            crawl.pending
        );
    }

    let report = Reporter::generate_report(&crawl, &metrics, &result);

    match args.output() {
        "json" => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        _ => {
            Reporter::print_text_report(&report);
        }
    }

    if let Some(filename) = args.save {
        Reporter::save_json_report(&report, &filename)?;
    }

    Ok(())
}
