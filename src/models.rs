use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// Signals extracted from one fetched page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: Url,
    /// HTTP status of the final response, 0 when the page was unreachable
    pub status: u16,
    pub depth: usize,
    pub content_type: Option<String>,
    /// Whether the body was read as HTML for on-page signals
    pub parsed: bool,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical: Option<Url>,
    pub h1_count: usize,
    pub images: Vec<Image>,
    pub has_open_graph: bool,
    pub has_viewport: bool,
    pub html_length: usize,
    pub text_length: usize,
    pub outbound_links: Vec<Url>,
}

impl PageRecord {
    /// Minimal record for a page that was not parsed.
    pub fn failed(url: Url, status: u16, depth: usize) -> Self {
        Self {
            url,
            status,
            depth,
            content_type: None,
            parsed: false,
            title: None,
            meta_description: None,
            canonical: None,
            h1_count: 0,
            images: vec![],
            has_open_graph: false,
            has_viewport: false,
            html_length: 0,
            text_length: 0,
            outbound_links: vec![],
        }
    }

    /// Only 2xx HTML pages carry on-page signals
    pub fn is_parsed(&self) -> bool {
        self.parsed && (200..300).contains(&self.status)
    }

    pub fn text_ratio(&self) -> f64 {
        self.text_length as f64 / self.html_length.max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub has_alt: bool,
}

/// Outcome of probing one outbound link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCheck {
    pub source: Url,
    pub target: Url,
    pub is_internal: bool,
    /// 0 when the target was unreachable or timed out
    pub status_code: u16,
}

impl LinkCheck {
    pub fn is_broken(&self) -> bool {
        self.status_code == 0 || self.status_code >= 400
    }
}

/// Redirect hops followed by a single fetch, ending at the final URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectChain {
    pub source: Url,
    pub hops: Vec<Url>,
}

impl RedirectChain {
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn final_url(&self) -> &Url {
        self.hops.last().unwrap_or(&self.source)
    }
}

/// Everything a crawl observed, keyed by canonical URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub seed_url: Url,
    pub pages: HashMap<Url, PageRecord>,
    /// Fetch attempts per raw status code, unreachable pages under 0
    pub status_counts: BTreeMap<u16, usize>,
    pub broken_internal: Vec<LinkCheck>,
    pub broken_external: Vec<LinkCheck>,
    pub redirect_chains: Vec<RedirectChain>,
    /// Undispatched URLs left in the frontier
    pub pending: usize,
    pub cancelled: bool,
}

impl CrawlResult {
    pub fn new(seed_url: Url) -> Self {
        Self {
            seed_url,
            pages: HashMap::new(),
            status_counts: BTreeMap::new(),
            broken_internal: vec![],
            broken_external: vec![],
            redirect_chains: vec![],
            pending: 0,
            cancelled: false,
        }
    }

    /// Folds one finished page visit into the result.
    pub fn record(
        &mut self,
        page: PageRecord,
        redirect_chain: Option<RedirectChain>,
        link_checks: Vec<LinkCheck>,
    ) {
        *self.status_counts.entry(page.status).or_insert(0) += 1;

        if let Some(chain) = redirect_chain {
            self.redirect_chains.push(chain);
        }

        for check in link_checks.into_iter().filter(LinkCheck::is_broken) {
            if check.is_internal {
                self.broken_internal.push(check);
            } else {
                self.broken_external.push(check);
            }
        }

        self.pages.insert(page.url.clone(), page);
    }

    pub fn fetch_attempts(&self) -> usize {
        self.status_counts.values().sum()
    }
}

/// Optional lab metrics supplied from outside the crawl (e.g. PageSpeed).
/// Times are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub lcp: Option<f64>,
    pub fcp: Option<f64>,
    pub cls: Option<f64>,
    pub total_blocking_time: Option<f64>,
    pub speed_index: Option<f64>,
    pub time_to_interactive: Option<f64>,
}
