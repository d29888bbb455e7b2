// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Every field has a default, so a config file only needs the values it wants
// to change. Values come from (lowest to highest priority):
// 1. the defaults below
// 2. an optional JSON file (--config)
// 3. command-line flags
//
// Durations are stored as plain numbers (seconds / milliseconds) so the JSON
// file stays readable; the accessor methods turn them into Durations.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CrawlError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlConfig {
    /// Base URL that relative next-chapter links are resolved against
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of seeds being traversed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Total timeout of one request attempt
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Attempts per URL before giving up
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// After failed attempt k the fetcher waits k * backoff_secs
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: f64,

    /// Pause before every request attempt
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_next_selector")]
    pub next_selector: String,

    #[serde(default = "default_content_selector")]
    pub content_selector: String,

    #[serde(default = "default_toc_selector")]
    pub toc_selector: String,

    /// File extension of chapter pages (12.html, 12_3.html)
    #[serde(default = "default_page_extension")]
    pub page_extension: String,

    /// Reject seeds that don't follow the chapter numbering instead of
    /// crawling them with an unknown chapter id
    #[serde(default)]
    pub strict_seeds: bool,

    /// Number of pages parsed and written to disk at the same time
    #[serde(default = "default_extraction_workers")]
    pub extraction_workers: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            backoff_secs: default_backoff_secs(),
            request_delay_ms: default_request_delay_ms(),
            user_agent: default_user_agent(),
            next_selector: default_next_selector(),
            content_selector: default_content_selector(),
            toc_selector: default_toc_selector(),
            page_extension: default_page_extension(),
            strict_seeds: false,
            extraction_workers: default_extraction_workers(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("novels")
}

fn default_concurrency() -> usize {
    20
}

fn default_timeout_secs() -> f64 {
    6.1
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_secs() -> f64 {
    1.0
}

fn default_request_delay_ms() -> u64 {
    200
}

fn default_user_agent() -> String {
    String::from(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/139.0.7258.140 Safari/537.36",
    )
}

fn default_next_selector() -> String {
    String::from("#pb_next")
}

fn default_content_selector() -> String {
    String::from("#chaptercontent")
}

fn default_toc_selector() -> String {
    String::from("div.book_last a")
}

fn default_page_extension() -> String {
    String::from("html")
}

fn default_extraction_workers() -> usize {
    4
}

impl CrawlConfig {
    /// Loads a JSON config file. Missing fields fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| CrawlError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_secs_f64(self.backoff_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// The parsed base URL. Call validate() first to get a readable error.
    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| CrawlError::url(&self.base_url, e))
    }

    // Checks everything that would otherwise blow up halfway through a run
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(CrawlError::Config("concurrency must be at least 1".into()));
        }
        if self.retries == 0 {
            return Err(CrawlError::Config("retries must be at least 1".into()));
        }
        if self.extraction_workers == 0 {
            return Err(CrawlError::Config(
                "extractionWorkers must be at least 1".into(),
            ));
        }
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(CrawlError::Config(format!(
                "timeout must be a positive number of seconds, got {}",
                self.timeout_secs
            )));
        }
        if !self.backoff_secs.is_finite() || self.backoff_secs < 0.0 {
            return Err(CrawlError::Config(format!(
                "backoff must not be negative, got {}",
                self.backoff_secs
            )));
        }
        if self.page_extension.trim().is_empty() {
            return Err(CrawlError::Config("pageExtension must not be empty".into()));
        }
        self.base()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CrawlConfig {
        CrawlConfig {
            base_url: "https://example.com/book/1/list.html".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.retries, 3);
        assert_eq!(config.timeout(), Duration::from_millis(6100));
        assert_eq!(config.backoff_unit(), Duration::from_secs(1));
        assert_eq!(config.next_selector, "#pb_next");
        assert!(!config.strict_seeds);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CrawlConfig =
            serde_json::from_str(r#"{ "concurrency": 5, "strictSeeds": true }"#).unwrap();
        assert_eq!(config.concurrency, 5);
        assert!(config.strict_seeds);
        assert_eq!(config.retries, 3);
        assert_eq!(config.page_extension, "html");
    }

    #[test]
    fn test_validate_accepts_defaults_with_base_url() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = CrawlConfig {
            concurrency: 0,
            ..valid()
        };
        assert!(matches!(config.validate(), Err(CrawlError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let config = CrawlConfig { retries: 0, ..valid() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_timeout() {
        let config = CrawlConfig {
            timeout_secs: 0.0,
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = CrawlConfig {
            timeout_secs: f64::NAN,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = CrawlConfig {
            base_url: "relative/path".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CrawlError::Url { .. })));
    }
}
