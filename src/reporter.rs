use crate::aggregator::CrawlMetrics;
use crate::grader::Grade;
use crate::models::CrawlResult;
use crate::scorer::AuditResult;
use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Everything handed to report consumers for one audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub seed_url: String,
    pub timestamp: String,
    pub audit: AuditResult,
    pub metrics: CrawlMetrics,
    pub opportunities: Vec<String>,
    pub crawl: CrawlResult,
}

pub struct Reporter;

impl Reporter {
    pub fn generate_report(crawl: &CrawlResult, metrics: &CrawlMetrics, audit: &AuditResult) -> AuditReport {
        AuditReport {
            seed_url: crawl.seed_url.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            audit: audit.clone(),
            metrics: metrics.clone(),
            opportunities: metrics.opportunities(),
            crawl: crawl.clone(),
        }
    }

    fn colored_score(value: f64) -> ColoredString {
        let text = format!("{:>5.1}", value);
        if value >= 90.0 {
            text.bright_green()
        } else if value >= 70.0 {
            text.yellow()
        } else {
            text.bright_red()
        }
    }

    fn colored_grade(grade: Grade) -> ColoredString {
        match grade {
            Grade::APlus | Grade::A | Grade::AMinus => grade.as_str().bright_green().bold(),
            Grade::BPlus | Grade::B | Grade::BMinus => grade.as_str().yellow().bold(),
            _ => grade.as_str().bright_red().bold(),
        }
    }

    fn colored_count(count: usize) -> ColoredString {
        if count > 0 {
            count.to_string().bright_red()
        } else {
            count.to_string().bright_green()
        }
    }

    pub fn print_text_report(report: &AuditReport) {
        println!("\n{}", "=".repeat(80).bright_blue());
        println!("{}", "Sitegrade - Audit Report".bright_cyan().bold());
        println!("{}", "=".repeat(80).bright_blue());
        println!();

        println!("{}: {}", "Start URL".bright_white().bold(), report.seed_url);
        println!("{}: {}", "Timestamp".bright_white().bold(), report.timestamp);
        if report.crawl.cancelled {
            println!("{}", "Crawl stopped early, results are partial".yellow());
        }
        println!();

        println!(
            "{} {}  {} {}",
            "Overall:".bright_white().bold(),
            Self::colored_score(report.audit.overall),
            "Grade:".bright_white().bold(),
            Self::colored_grade(report.audit.grade)
        );
        println!();

        println!("{}", "Category Scores".bright_yellow().bold().underline());
        for score in &report.audit.category_scores {
            println!("  {:<34} {}", score.name, Self::colored_score(score.value));
        }
        println!();

        let metrics = &report.metrics;
        println!("{}", "Crawl Summary".bright_yellow().bold().underline());
        println!(
            "  Pages Crawled:        {}",
            metrics.total_crawled_pages.to_string().bright_green()
        );
        println!(
            "  Status 2xx/3xx:       {} / {}",
            metrics.http_2xx, metrics.http_3xx
        );
        println!(
            "  Status 4xx/5xx:       {} / {}",
            Self::colored_count(metrics.http_4xx),
            Self::colored_count(metrics.http_5xx)
        );
        println!("  Unreachable:          {}", Self::colored_count(metrics.unreachable));
        println!(
            "  Broken Links:         {} internal, {} external",
            Self::colored_count(metrics.broken_internal_links),
            Self::colored_count(metrics.broken_external_links)
        );
        println!(
            "  Redirect Chains:      {}",
            if metrics.redirect_chains > 0 {
                metrics.redirect_chains.to_string().yellow()
            } else {
                metrics.redirect_chains.to_string().bright_green()
            }
        );
        println!();

        println!("{}", "On-Page Findings".bright_yellow().bold().underline());
        let findings = [
            ("Missing titles", metrics.missing_title),
            ("Duplicate titles", metrics.duplicate_title),
            ("Missing meta descriptions", metrics.missing_meta_description),
            ("Missing H1", metrics.missing_h1),
            ("Multiple H1", metrics.multiple_h1),
            ("Images missing alt", metrics.missing_image_alt),
            ("Large uncompressed images", metrics.large_uncompressed_images),
            ("Low text-to-HTML ratio", metrics.low_text_ratio_pages),
            ("Missing Open Graph", metrics.missing_open_graph),
            ("Missing viewport", metrics.missing_viewport),
        ];
        for (label, count) in findings {
            println!("  {:<27} {}", format!("{}:", label), Self::colored_count(count));
        }

        if !report.crawl.broken_internal.is_empty() || !report.crawl.broken_external.is_empty() {
            println!();
            println!("{}", "Broken Links".bright_yellow().bold().underline());
            for check in report
                .crawl
                .broken_internal
                .iter()
                .chain(&report.crawl.broken_external)
            {
                let status = if check.status_code == 0 {
                    "unreachable".dimmed()
                } else {
                    check.status_code.to_string().bright_red()
                };
                println!("  [{}] {} (on {})", status, check.target, check.source);
            }
        }

        if !report.opportunities.is_empty() {
            println!();
            println!("{}", "Opportunities".bright_yellow().bold().underline());
            for opportunity in &report.opportunities {
                println!("  - {}", opportunity);
            }
        }

        println!();
        println!("{}", "=".repeat(80).bright_blue());
    }

    pub fn save_json_report(report: &AuditReport, filename: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file =
            File::create(filename).with_context(|| format!("Failed to create {}", filename))?;
        file.write_all(json.as_bytes())?;
        println!("Report saved to: {}", filename.bright_green());
        Ok(())
    }
}
