use crate::models::{CrawlResult, PageRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pages whose visible text is below this share of the raw HTML
pub const LOW_TEXT_RATIO: f64 = 0.1;

const LARGE_IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];
const COMPRESSED_MARKER: &str = "compressed";

/// Crawl-wide counts derived from a finished [`CrawlResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlMetrics {
    pub total_crawled_pages: usize,
    pub http_2xx: usize,
    pub http_3xx: usize,
    pub http_4xx: usize,
    pub http_5xx: usize,
    pub unreachable: usize,
    pub redirect_chains: usize,
    pub broken_internal_links: usize,
    pub broken_external_links: usize,
    pub missing_title: usize,
    pub duplicate_title: usize,
    pub missing_meta_description: usize,
    pub missing_h1: usize,
    pub multiple_h1: usize,
    pub missing_image_alt: usize,
    pub large_uncompressed_images: usize,
    pub low_text_ratio_pages: usize,
    pub missing_open_graph: usize,
    pub missing_viewport: usize,
    pub https: bool,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CrawlMetrics {
    pub fn from_crawl(crawl: &CrawlResult) -> Self {
        let mut metrics = Self {
            total_crawled_pages: crawl.pages.len(),
            redirect_chains: crawl.redirect_chains.len(),
            broken_internal_links: crawl.broken_internal.len(),
            broken_external_links: crawl.broken_external.len(),
            https: crawl.seed_url.scheme() == "https",
            ..Self::default()
        };

        for (&status, &count) in &crawl.status_counts {
            match status {
                0 => metrics.unreachable += count,
                200..=299 => metrics.http_2xx += count,
                300..=399 => metrics.http_3xx += count,
                400..=499 => metrics.http_4xx += count,
                500..=599 => metrics.http_5xx += count,
                _ => {}
            }
        }

        let parsed: Vec<&PageRecord> = crawl.pages.values().filter(|p| p.is_parsed()).collect();
        let mut titles = HashSet::new();
        let mut titled_pages = 0;

        for page in &parsed {
            match &page.title {
                Some(title) => {
                    titled_pages += 1;
                    titles.insert(title.as_str());
                }
                None => metrics.missing_title += 1,
            }

            if page.meta_description.is_none() {
                metrics.missing_meta_description += 1;
            }

            match page.h1_count {
                0 => metrics.missing_h1 += 1,
                1 => {}
                _ => metrics.multiple_h1 += 1,
            }

            for image in &page.images {
                if !image.has_alt {
                    metrics.missing_image_alt += 1;
                }
                if is_large_uncompressed(&image.src) {
                    metrics.large_uncompressed_images += 1;
                }
            }

            if page.text_ratio() < LOW_TEXT_RATIO {
                metrics.low_text_ratio_pages += 1;
            }
            if !page.has_open_graph {
                metrics.missing_open_graph += 1;
            }
            if !page.has_viewport {
                metrics.missing_viewport += 1;
            }
        }

        metrics.duplicate_title = titled_pages - titles.len();
        metrics.total_errors = metrics.http_4xx
            + metrics.http_5xx
            + metrics.broken_internal_links
            + metrics.broken_external_links;
        metrics.total_warnings = metrics.redirect_chains;

        metrics
    }

    /// How much easy improvement is available, 10 to 100.
    pub fn quick_wins_score(&self) -> usize {
        let mut score = 10;
        if self.missing_title > 0 {
            score += 20;
        }
        if self.missing_meta_description > 0 {
            score += 20;
        }
        if self.missing_image_alt > 0 {
            score += 15;
        }
        if self.large_uncompressed_images > 0 {
            score += 15;
        }
        if self.http_4xx + self.http_5xx > 0 {
            score += 20;
        }
        score.min(100)
    }

    /// Highest-impact fixes suggested by the counts
    pub fn opportunities(&self) -> Vec<String> {
        let mut opportunities = Vec::new();
        if self.large_uncompressed_images > 0 {
            opportunities.push("Compress & convert images to WebP/AVIF.".to_string());
        }
        if self.missing_title > 0 {
            opportunities.push("Add unique, descriptive <title> tags to all pages.".to_string());
        }
        if self.missing_meta_description > 0 {
            opportunities.push("Write compelling meta descriptions for key pages.".to_string());
        }
        if self.http_4xx + self.http_5xx > 0 {
            opportunities.push("Resolve all 4xx/5xx errors; update/bypass broken links.".to_string());
        }
        if self.missing_open_graph > 0 {
            opportunities.push("Add Open Graph title/description for richer sharing.".to_string());
        }
        opportunities
    }
}

fn is_large_uncompressed(src: &str) -> bool {
    let src = src.to_lowercase();
    LARGE_IMAGE_EXTENSIONS.iter().any(|ext| src.ends_with(ext)) && !src.contains(COMPRESSED_MARKER)
}
