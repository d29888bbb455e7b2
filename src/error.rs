// src/error.rs
// =============================================================================
// Error types for the crawl engine and its collaborators.
//
// The engine itself never fails a whole run because of page content: network
// failures become empty fetch results and odd links become boundaries. The
// errors below cover the rest:
// - bad configuration (caught before the run starts)
// - faults inside one worker (caught at the worker boundary, see worker.rs)
// - collaborator failures (table of contents, disk writes)
//
// main.rs wraps these in anyhow::Error with extra context.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid CSS selector '{0}'")]
    Selector(String),

    #[error("invalid chapter pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("concurrency limiter closed")]
    LimiterClosed(#[from] tokio::sync::AcquireError),

    #[error("table of contents: {0}")]
    Toc(String),
}

impl CrawlError {
    pub fn url(url: &str, source: url::ParseError) -> Self {
        CrawlError::Url {
            url: url.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_error_names_the_url() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = CrawlError::url("not a url", source);
        assert!(err.to_string().contains("'not a url'"));
    }
}
