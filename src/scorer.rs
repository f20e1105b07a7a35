use crate::aggregator::CrawlMetrics;
use crate::grader::{Grade, grade};
use crate::models::PerformanceMetrics;
use serde::{Deserialize, Serialize};

const BASE_SCORE: f64 = 100.0;
const HTTPS_SCORE: f64 = 100.0;
const PLAIN_HTTP_SCORE: f64 = 70.0;
/// Opportunities & ROI starts above 100 so the minimal quick-wins score still maps to 100
const OPPORTUNITY_BASE: f64 = 110.0;

const LCP_BUDGET_MS: f64 = 2500.0;
const CLS_BUDGET: f64 = 0.1;

/// Counts from [`CrawlMetrics`] that carry a penalty weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TotalErrors,
    TotalWarnings,
    Http4xx,
    Http5xx,
    BrokenInternalLinks,
    BrokenExternalLinks,
    RedirectChains,
    MissingTitle,
    DuplicateTitle,
    MissingMetaDescription,
    MissingH1,
    MultipleH1,
    LargeUncompressedImages,
}

impl Metric {
    pub fn value(self, metrics: &CrawlMetrics) -> usize {
        match self {
            Metric::TotalErrors => metrics.total_errors,
            Metric::TotalWarnings => metrics.total_warnings,
            Metric::Http4xx => metrics.http_4xx,
            Metric::Http5xx => metrics.http_5xx,
            Metric::BrokenInternalLinks => metrics.broken_internal_links,
            Metric::BrokenExternalLinks => metrics.broken_external_links,
            Metric::RedirectChains => metrics.redirect_chains,
            Metric::MissingTitle => metrics.missing_title,
            Metric::DuplicateTitle => metrics.duplicate_title,
            Metric::MissingMetaDescription => metrics.missing_meta_description,
            Metric::MissingH1 => metrics.missing_h1,
            Metric::MultipleH1 => metrics.multiple_h1,
            Metric::LargeUncompressedImages => metrics.large_uncompressed_images,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    SiteHealth,
    Crawlability,
    OnPageSeo,
    Performance,
    MobileSecurity,
    Opportunities,
}

impl Category {
    /// Every category, in the order the overall score sums them
    pub const ALL: [Category; 6] = [
        Category::SiteHealth,
        Category::Crawlability,
        Category::OnPageSeo,
        Category::Performance,
        Category::MobileSecurity,
        Category::Opportunities,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::SiteHealth => "Site Health",
            Category::Crawlability => "Crawlability & Indexation",
            Category::OnPageSeo => "On-Page SEO",
            Category::Performance => "Performance & Technical",
            Category::MobileSecurity => "Mobile, Security & International",
            Category::Opportunities => "Opportunities & ROI",
        }
    }

    /// Share of the overall score. The weights of [`Category::ALL`] sum to 1.
    pub fn weight(self) -> f64 {
        match self {
            Category::SiteHealth => 0.20,
            Category::Crawlability => 0.20,
            Category::OnPageSeo => 0.20,
            Category::Performance => 0.20,
            Category::MobileSecurity => 0.10,
            Category::Opportunities => 0.10,
        }
    }

    /// Per-unit penalty of each metric counted against this category
    pub fn penalties(self) -> &'static [(Metric, f64)] {
        match self {
            Category::SiteHealth => &[(Metric::TotalErrors, 0.4), (Metric::TotalWarnings, 0.15)],
            Category::Crawlability => &[
                (Metric::Http4xx, 0.3),
                (Metric::Http5xx, 0.5),
                (Metric::BrokenInternalLinks, 0.25),
                (Metric::BrokenExternalLinks, 0.15),
                (Metric::RedirectChains, 0.1),
            ],
            Category::OnPageSeo => &[
                (Metric::MissingTitle, 0.2),
                (Metric::DuplicateTitle, 0.15),
                (Metric::MissingMetaDescription, 0.15),
                (Metric::MissingH1, 0.2),
                (Metric::MultipleH1, 0.1),
                (Metric::LargeUncompressedImages, 0.05),
            ],
            Category::Performance => &[
                (Metric::Http5xx, 0.6),
                (Metric::LargeUncompressedImages, 0.4),
            ],
            Category::MobileSecurity | Category::Opportunities => &[],
        }
    }

    /// Score of this category, clamped to `[0, 100]`.
    pub fn score(self, metrics: &CrawlMetrics, performance: Option<&PerformanceMetrics>) -> f64 {
        let raw = match self {
            Category::MobileSecurity => {
                if metrics.https {
                    HTTPS_SCORE
                } else {
                    PLAIN_HTTP_SCORE
                }
            }
            Category::Opportunities => OPPORTUNITY_BASE - metrics.quick_wins_score() as f64,
            Category::Performance => {
                BASE_SCORE - self.penalty(metrics) - performance.map_or(0.0, vitals_penalty)
            }
            _ => BASE_SCORE - self.penalty(metrics),
        };

        clamp_score(raw)
    }

    fn penalty(self, metrics: &CrawlMetrics) -> f64 {
        self.penalties()
            .iter()
            .map(|(metric, weight)| metric.value(metrics) as f64 * weight)
            .sum()
    }
}

/// Penalty from externally measured web vitals. Absent values cost nothing.
fn vitals_penalty(performance: &PerformanceMetrics) -> f64 {
    let lcp = performance
        .lcp
        .filter(|v| v.is_finite())
        .map_or(0.0, |lcp| ((lcp - LCP_BUDGET_MS) / 100.0).max(0.0));
    let cls = performance
        .cls
        .filter(|v| v.is_finite())
        .map_or(0.0, |cls| ((cls - CLS_BUDGET) * 200.0).max(0.0));
    lcp + cls
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, BASE_SCORE)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub name: String,
    pub value: f64,
}

/// Category scores, overall score and grade of one crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub category_scores: Vec<CategoryScore>,
    pub overall: f64,
    pub grade: Grade,
}

impl AuditResult {
    pub fn category(&self, category: Category) -> f64 {
        self.category_scores
            .iter()
            .find(|score| score.category == category)
            .map_or(0.0, |score| score.value)
    }
}

pub struct Scorer;

impl Scorer {
    pub fn score(metrics: &CrawlMetrics, performance: Option<&PerformanceMetrics>) -> AuditResult {
        let category_scores: Vec<CategoryScore> = Category::ALL
            .iter()
            .map(|&category| CategoryScore {
                category,
                name: category.name().to_string(),
                value: category.score(metrics, performance),
            })
            .collect();

        let overall = overall_score(&category_scores);

        AuditResult {
            category_scores,
            overall,
            grade: grade(overall),
        }
    }
}

/// Weighted sum of category scores, rounded to one decimal.
pub fn overall_score(category_scores: &[CategoryScore]) -> f64 {
    let total: f64 = category_scores
        .iter()
        .map(|score| score.value * score.category.weight())
        .sum();
    clamp_score((total * 10.0).round() / 10.0)
}
