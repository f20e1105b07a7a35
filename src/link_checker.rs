use crate::fetcher::Fetcher;
use crate::models::LinkCheck;
use crate::url_normalizer::is_internal;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use url::Url;

/// Concurrent probes per page
const PROBE_CONCURRENCY: usize = 8;

/// Buckets outbound links relative to the seed and probes a bounded sample.
pub struct LinkChecker {
    seed: Url,
    probe_limit: usize,
}

impl LinkChecker {
    pub fn new(seed: Url, probe_limit: usize) -> Self {
        Self { seed, probe_limit }
    }

    pub fn is_internal(&self, url: &Url) -> bool {
        is_internal(url, &self.seed)
    }

    /// Internal links of a page, in document order and without repeats.
    pub fn internal_links<'a>(&self, links: &'a [Url]) -> Vec<&'a Url> {
        let mut seen = HashSet::new();
        links
            .iter()
            .filter(|url| self.is_internal(url) && seen.insert(*url))
            .collect()
    }

    /// The first `probe_limit` distinct links of a page, which are the ones
    /// that get a liveness probe.
    pub fn sample<'a>(&self, links: &'a [Url]) -> Vec<&'a Url> {
        let mut seen = HashSet::new();
        links
            .iter()
            .filter(|url| seen.insert(*url))
            .take(self.probe_limit)
            .collect()
    }

    /// Probes the sampled links of `source`. Every probed link gets a
    /// [`LinkCheck`], broken or not.
    pub async fn check_links(&self, fetcher: &Fetcher, source: &Url, links: &[Url]) -> Vec<LinkCheck> {
        stream::iter(self.sample(links))
            .map(|target| async move {
                let status_code = fetcher.probe(target).await;
                if status_code == 0 || status_code >= 400 {
                    tracing::debug!(source = %source, target = %target, status_code, "Broken link");
                }

                LinkCheck {
                    source: source.clone(),
                    target: target.clone(),
                    is_internal: self.is_internal(target),
                    status_code,
                }
            })
            .buffered(PROBE_CONCURRENCY)
            .collect()
            .await
    }
}
