use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::models::PerformanceMetrics;

/// Configuration file structure that mirrors CLI arguments
/// All fields are optional to allow partial configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// The URL to start crawling from
    pub url: Option<String>,

    /// Maximum number of links away from the start URL
    pub depth: Option<usize>,

    /// Maximum number of pages to fetch
    pub max_pages: Option<usize>,

    /// Per-request timeout in seconds
    pub timeout: Option<u64>,

    /// User-Agent header
    pub user_agent: Option<String>,

    /// Output format: text or json
    pub output: Option<String>,

    /// Save report to file
    pub save: Option<String>,

    /// Verbose output
    pub verbose: Option<bool>,

    /// Rate limit for requests per second per host
    pub rate_limit: Option<f64>,

    /// Number of pages fetched concurrently
    pub concurrency: Option<usize>,

    /// Outbound links probed per page
    pub probe_limit: Option<usize>,

    /// Crawl time budget in seconds
    pub max_duration: Option<u64>,

    /// Externally measured web vitals
    pub performance: Option<PerformanceMetrics>,
}

/// Configuration file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    const ALL: [ConfigFormat; 3] = [ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml];

    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let format = ConfigFormat::from_path(path)
            .with_context(|| format!("Unsupported config file format: {}", path.display()))?;

        let config = match format {
            ConfigFormat::Json => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            ConfigFormat::Toml => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Default configuration file locations, highest priority first:
    /// the current directory, then the user config directory
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for format in &ConfigFormat::ALL {
            for ext in format.extensions() {
                paths.push(PathBuf::from(format!("sitegrade.{}", ext)));
            }
        }

        // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        if let Some(config_home) = config_home {
            let config_dir = config_home.join("sitegrade");
            for format in &ConfigFormat::ALL {
                for ext in format.extensions() {
                    paths.push(config_dir.join(format!("config.{}", ext)));
                }
            }
        }

        paths
    }

    /// Try to load configuration from default paths
    /// Returns the first configuration file found, or None if no config exists
    pub fn from_default_paths() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Ok(Some(Self::from_file(&path)?));
            }
        }
        Ok(None)
    }

    /// Loads the file named by `--config`, or the first default file, and
    /// merges it under the CLI arguments.
    pub fn resolve(cli: Cli) -> Result<Cli> {
        let config = match &cli.config {
            Some(path) => Some(Self::from_file(Path::new(path))?),
            None => Self::from_default_paths()?,
        };

        Ok(match config {
            Some(config) => config.merge_with_cli(&cli),
            None => cli,
        })
    }

    /// Merge this configuration with CLI arguments
    /// Options given on the command line take precedence over config file values
    pub fn merge_with_cli(&self, cli: &Cli) -> Cli {
        Cli {
            url: cli.url.clone(),
            depth: cli.depth.or(self.depth),
            max_pages: cli.max_pages.or(self.max_pages),
            timeout: cli.timeout.or(self.timeout),
            user_agent: cli.user_agent.clone().or_else(|| self.user_agent.clone()),
            output: cli.output.clone().or_else(|| self.output.clone()),
            save: cli.save.clone().or_else(|| self.save.clone()),
            verbose: cli.verbose || self.verbose.unwrap_or(false),
            rate_limit: cli.rate_limit.or(self.rate_limit),
            concurrency: cli.concurrency.or(self.concurrency),
            probe_limit: cli.probe_limit.or(self.probe_limit),
            max_duration: cli.max_duration.or(self.max_duration),
            config: cli.config.clone(),
            performance: cli.performance.clone().or_else(|| self.performance.clone()),
        }
    }
}
