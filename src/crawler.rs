use crate::extractor::extract;
use crate::fetcher::Fetcher;
use crate::frontier::Frontier;
use crate::http_client::{DEFAULT_USER_AGENT, build_http_client};
use crate::link_checker::LinkChecker;
use crate::models::{CrawlResult, LinkCheck, PageRecord, RedirectChain};
use crate::url_normalizer::canonicalize;
use anyhow::{Context, Result, anyhow, bail};
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub seed_url: String,
    pub max_pages: usize,
    pub max_depth: Option<usize>,
    pub timeout: Duration,
    pub user_agent: String,
    pub concurrency: usize,
    /// Outbound links probed per page
    pub probe_limit: usize,
    /// Per-host request rate, unlimited when `None`
    pub requests_per_second: Option<f64>,
    /// Wall-clock budget for the whole crawl
    pub max_duration: Option<Duration>,
}

impl CrawlerConfig {
    pub fn new(seed_url: &str) -> Self {
        Self {
            seed_url: seed_url.to_string(),
            max_pages: 200,
            max_depth: None,
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 8,
            probe_limit: 25,
            requests_per_second: None,
            max_duration: None,
        }
    }

    /// Rejects configurations the crawl cannot start with
    pub fn validate(&self) -> Result<Url> {
        let seed = Url::parse(&self.seed_url).context("Invalid URL")?;

        match seed.scheme() {
            "http" | "https" => {}
            scheme => bail!(
                "Invalid URL scheme '{}': only http and https are supported",
                scheme
            ),
        }

        if seed.host_str().is_none() {
            bail!("URL has no host: {}", self.seed_url);
        }
        if self.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.timeout.is_zero() {
            bail!("timeout must be greater than zero");
        }
        if let Some(rps) = self.requests_per_second
            && !(rps.is_finite() && rps > 0.0)
        {
            bail!("rate limit must be a positive number, got {}", rps);
        }

        canonicalize(&seed).ok_or_else(|| anyhow!("Invalid URL: {}", self.seed_url))
    }
}

/// Outcome of visiting one page, handed back to the crawl loop.
struct PageVisit {
    page: PageRecord,
    /// Where the fetch ended up after redirects
    final_url: Url,
    redirect_chain: Option<RedirectChain>,
    link_checks: Vec<LinkCheck>,
}

pub struct Crawler {
    seed: Url,
    max_pages: usize,
    max_depth: Option<usize>,
    concurrency: usize,
    max_duration: Option<Duration>,
    fetcher: Fetcher,
    link_checker: LinkChecker,
    cancelled: Arc<AtomicBool>,
    progress_bar: Option<ProgressBar>,
}

impl Crawler {
    /// Validates `config` and prepares the HTTP client. No request is sent.
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let seed = config.validate()?;
        let client = build_http_client(config.timeout, &config.user_agent)
            .context("Failed to build HTTP client")?;

        Ok(Self {
            link_checker: LinkChecker::new(seed.clone(), config.probe_limit),
            seed,
            max_pages: config.max_pages,
            max_depth: config.max_depth,
            concurrency: config.concurrency,
            max_duration: config.max_duration,
            fetcher: Fetcher::new(client, config.requests_per_second),
            cancelled: Arc::new(AtomicBool::new(false)),
            progress_bar: None,
        })
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Flag that stops the crawl when set. Pages already in flight are
    /// discarded.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Enable progress bar for crawling
    pub fn enable_progress_bar(&mut self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("[{elapsed_precise}] {spinner:.cyan} Crawling: {pos} pages")
                .expect("Progress bar template should be valid"),
        );
        self.progress_bar = Some(pb);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Crawls breadth-first from the seed until the frontier runs dry, the
    /// page budget is spent, the deadline passes or the crawl is cancelled.
    ///
    /// This loop is the only owner of the frontier and the result; page visits
    /// run concurrently but only hand their outcome back here.
    pub async fn crawl(&self) -> CrawlResult {
        let mut frontier = Frontier::new(self.max_pages, self.max_depth);
        frontier.enqueue(self.seed.clone(), 0);

        let mut result = CrawlResult::new(self.seed.clone());
        // Final URLs whose content is already in the result
        let mut landed: HashSet<Url> = HashSet::new();
        let mut in_flight = FuturesUnordered::new();
        let deadline = self.max_duration.map(|d| Instant::now() + d);

        tracing::info!(seed = %self.seed, max_pages = self.max_pages, "Starting crawl");

        if let Some(ref pb) = self.progress_bar {
            pb.set_position(0);
        }

        loop {
            if self.is_cancelled() {
                result.cancelled = true;
                break;
            }

            while in_flight.len() < self.concurrency {
                match frontier.dequeue() {
                    Some((url, depth)) => in_flight.push(self.visit(url, depth)),
                    None => break,
                }
            }

            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, in_flight.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::warn!(in_flight = in_flight.len(), "Crawl deadline reached");
                        result.cancelled = true;
                        break;
                    }
                },
                None => in_flight.next().await,
            };

            let Some(visit) = next else {
                break;
            };

            if self.is_cancelled() {
                result.cancelled = true;
                break;
            }

            let PageVisit {
                mut page,
                final_url,
                redirect_chain,
                mut link_checks,
            } = visit;

            if final_url != page.url {
                frontier.mark_seen(final_url.clone());
            }

            if page.is_parsed() && !landed.insert(final_url) {
                // Same document already recorded under another URL
                tracing::debug!(url = %page.url, "Content already recorded, skipping signals");
                page = PageRecord {
                    content_type: page.content_type.take(),
                    ..PageRecord::failed(page.url.clone(), page.status, page.depth)
                };
                link_checks.clear();
            }

            for link in self.link_checker.internal_links(&page.outbound_links) {
                frontier.enqueue(link.clone(), page.depth + 1);
            }

            result.record(page, redirect_chain, link_checks);

            if let Some(ref pb) = self.progress_bar {
                pb.set_position(result.pages.len() as u64);
            }
        }

        drop(in_flight);
        result.pending = frontier.pending();

        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(format!("Crawled {} pages", result.pages.len()));
        }

        tracing::info!(
            pages = result.pages.len(),
            dispatched = frontier.dispatched_count(),
            pending = result.pending,
            exhausted = frontier.is_exhausted(),
            cancelled = result.cancelled,
            "Crawl finished"
        );

        result
    }

    async fn visit(&self, url: Url, depth: usize) -> PageVisit {
        let response = self.fetcher.fetch(&url).await;
        let redirect_chain = response.redirect_chain(&url);

        let content_type = response.content_type().map(str::to_string);
        let is_html = content_type.as_deref().is_some_and(is_html_content_type);

        let page = if (200..300).contains(&response.status) && is_html {
            PageRecord {
                url: url.clone(),
                status: response.status,
                depth,
                content_type,
                ..extract(&response.body, &response.final_url)
            }
        } else {
            if (200..300).contains(&response.status) {
                tracing::debug!(
                    url = %url,
                    content_type = content_type.as_deref().unwrap_or("none"),
                    "Skipping non-HTML page"
                );
            }
            PageRecord {
                content_type,
                ..PageRecord::failed(url.clone(), response.status, depth)
            }
        };

        let link_checks = self
            .link_checker
            .check_links(&self.fetcher, &url, &page.outbound_links)
            .await;

        PageVisit {
            page,
            final_url: response.final_url,
            redirect_chain,
            link_checks,
        }
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}
