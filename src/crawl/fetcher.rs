// src/crawl/fetcher.rs
// =============================================================================
// This module downloads chapter pages, retrying transient failures.
//
// How one fetch works:
// 1. Wait a short politeness delay
// 2. Send a GET with a total timeout (connect + body)
// 3. On a 2xx status, return the body right away
// 4. Otherwise log the failure, wait `attempt * backoff_unit`, try again
// 5. After the last attempt, log and return None
//
// A failed fetch is NOT an error for the caller. The worker that asked for the
// page just stops its chain; other chains keep going.
//
// Rust concepts:
// - Traits: PageFetcher lets tests swap the network for an in-memory map
// - async-trait: async methods on a trait we use as Arc<dyn PageFetcher>
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::CrawlConfig;
use crate::error::Result;

// Anything that can turn a URL into page text
//
// Returns None when the page could not be fetched. Implementations log their
// own failures.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<String>;
}

// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff_unit: Duration,
    pub request_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            attempts: config.retries,
            backoff_unit: config.backoff_unit(),
            request_delay: config.request_delay(),
        }
    }

    // Linear backoff: 1 unit after the first failure, 2 after the second, ...
    //
    // Returns None after the last attempt (no point sleeping before giving up)
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.attempts {
            None
        } else {
            Some(self.backoff_unit * attempt)
        }
    }
}

// The real fetcher, backed by a shared reqwest client
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        // One client for the whole run (connection pooling).
        // The timeout applies to every request made with it.
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            policy: RetryPolicy::from_config(config),
        })
    }

    async fn attempt(&self, url: &str) -> std::result::Result<String, String> {
        let response = self.client.get(url).send().await.map_err(describe)?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        response.text().await.map_err(describe)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        let attempts = self.policy.attempts;

        for attempt in 1..=attempts {
            if !self.policy.request_delay.is_zero() {
                tokio::time::sleep(self.policy.request_delay).await;
            }

            match self.attempt(url).await {
                Ok(body) => return Some(body),
                Err(reason) => {
                    tracing::warn!(%url, attempt, attempts, %reason, "fetch attempt failed");
                }
            }

            if let Some(delay) = self.policy.delay_after(attempt) {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!(%url, attempts, "giving up after all attempts failed");
        None
    }
}

// Short, readable reason for a reqwest error
fn describe(error: reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return Option instead of Result?
//    - Every failure here is handled the same way: log it and move on
//    - The caller only needs to know "did I get a page or not"
//    - Option makes it impossible to accidentally propagate a network error
//      up and abort a whole crawl
//
// 2. Why Duration * u32?
//    - std::time::Duration implements Mul<u32>
//    - backoff_unit * 2 gives twice the unit, which is our linear backoff
//
// 3. What does #[async_trait] do?
//    - Plain traits can't be used as `dyn Trait` when they have async fns
//    - The macro rewrites each async fn to return a boxed future
//    - That lets the worker hold an Arc<dyn PageFetcher>
// -----------------------------------------------------------------------------
