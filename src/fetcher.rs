use crate::models::RedirectChain;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, Method, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Hard cap on redirect hops followed by a single request
pub const MAX_REDIRECTS: usize = 10;

/// A fetch is reported as a redirect chain once it follows more hops than this
pub const REDIRECT_CHAIN_THRESHOLD: usize = 2;

/// Result of fetching one URL. Transport failures are folded in as status 0.
#[derive(Debug)]
pub struct FetchResponse {
    pub status: u16,
    pub final_url: Url,
    pub headers: HeaderMap,
    pub body: String,
    /// URLs reached by each followed redirect, in order
    pub redirect_hops: Vec<Url>,
    pub error: Option<String>,
}

impl FetchResponse {
    fn unreachable(url: &Url, error: String) -> Self {
        Self {
            status: 0,
            final_url: url.clone(),
            headers: HeaderMap::new(),
            body: String::new(),
            redirect_hops: vec![],
            error: Some(error),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.status == 0
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// The followed hops as a chain, if there were more than the threshold.
    pub fn redirect_chain(&self, source: &Url) -> Option<RedirectChain> {
        (self.redirect_hops.len() > REDIRECT_CHAIN_THRESHOLD).then(|| RedirectChain {
            source: source.clone(),
            hops: self.redirect_hops.clone(),
        })
    }
}

pub struct Fetcher {
    client: Client,
    rate_limiter: Option<DefaultKeyedRateLimiter<String>>,
}

impl Fetcher {
    pub fn new(client: Client, requests_per_second: Option<f64>) -> Self {
        // Keyed by host so that probes to third-party sites do not slow the crawl
        let rate_limiter = requests_per_second
            .and_then(|rps| Duration::try_from_secs_f64(1.0 / rps).ok())
            .and_then(Quota::with_period)
            .map(RateLimiter::keyed);

        Self {
            client,
            rate_limiter,
        }
    }

    /// GETs `url`, following redirects, and reads the body.
    pub async fn fetch(&self, url: &Url) -> FetchResponse {
        let (response, redirect_hops) = match self.send_following(Method::GET, url).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Page unreachable");
                return FetchResponse::unreachable(url, e.to_string());
            }
        };

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        match response.text().await {
            Ok(body) => {
                tracing::debug!(url = %url, status, hops = redirect_hops.len(), "Fetched page");
                FetchResponse {
                    status,
                    final_url,
                    headers,
                    body,
                    redirect_hops,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to read response body");
                FetchResponse {
                    redirect_hops,
                    ..FetchResponse::unreachable(url, e.to_string())
                }
            }
        }
    }

    /// Liveness check for a link: HEAD, falling back to GET when the server
    /// rejects HEAD. Returns 0 when the target cannot be reached.
    pub async fn probe(&self, url: &Url) -> u16 {
        let status = match self.send_following(Method::HEAD, url).await {
            Ok((response, _)) => response.status(),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "HEAD probe failed");
                return 0;
            }
        };

        if status != StatusCode::METHOD_NOT_ALLOWED && status != StatusCode::NOT_IMPLEMENTED {
            return status.as_u16();
        }

        match self.send_following(Method::GET, url).await {
            Ok((response, _)) => response.status().as_u16(),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "GET probe failed");
                0
            }
        }
    }

    async fn send_following(
        &self,
        method: Method,
        url: &Url,
    ) -> reqwest::Result<(Response, Vec<Url>)> {
        let mut current = url.clone();
        let mut hops = Vec::new();

        loop {
            self.throttle(&current).await;

            let response = self
                .client
                .request(method.clone(), current.clone())
                .send()
                .await?;

            if !response.status().is_redirection() || hops.len() >= MAX_REDIRECTS {
                return Ok((response, hops));
            }

            let next = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|location| current.join(location).ok());

            match next {
                Some(mut next) => {
                    next.set_fragment(None);
                    hops.push(next.clone());
                    current = next;
                }
                // 304 and friends carry no Location
                None => return Ok((response, hops)),
            }
        }
    }

    async fn throttle(&self, url: &Url) {
        if let Some(limiter) = &self.rate_limiter
            && let Some(host) = url.host_str()
        {
            limiter.until_key_ready(&host.to_string()).await;
        }
    }
}
