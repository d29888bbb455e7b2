// src/crawl/testing.rs
// =============================================================================
// In-memory stand-ins for the network and the extraction step, used by the
// worker and coordinator tests.
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::boundary::{BoundaryClassifier, NumberedPages};
use super::fetcher::PageFetcher;
use crate::error::Result;
use crate::extract::{ExtractionPool, PageHandler};

pub const BASE: &str = "https://novel.test/book/1/list.html";

pub fn url(page: &str) -> String {
    format!("https://novel.test/book/1/{}", page)
}

// A chapter page whose next link points at `next` (if any)
pub fn page(next: Option<&str>) -> String {
    match next {
        Some(next) => format!(
            r#"<title>t</title><div id="chaptercontent">text</div><a id="pb_next" href="{}">next</a>"#,
            next
        ),
        None => r#"<title>t</title><div id="chaptercontent">text</div>"#.to_string(),
    }
}

pub fn classifier() -> BoundaryClassifier {
    BoundaryClassifier::new(
        Box::new(NumberedPages::new("html").unwrap()),
        "#pb_next",
        Url::parse(BASE).unwrap(),
    )
    .unwrap()
}

// Serves pages from a map, records what was fetched and how many fetches
// overlapped
#[derive(Default)]
pub struct MapFetcher {
    pages: HashMap<String, String>,
    panics_on: Option<String>,
    latency: Duration,
    fetched: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, name: &str, next: Option<&str>) -> Self {
        self.pages.insert(url(name), page(next));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn panicking_on(mut self, name: &str) -> Self {
        self.panics_on = Some(url(name));
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        if self.panics_on.as_deref() == Some(url) {
            panic!("simulated fault fetching {}", url);
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_string());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.pages.get(url).cloned()
    }
}

// Remembers every label it was given
#[derive(Default)]
pub struct RecordingHandler {
    labels: Mutex<Vec<String>>,
}

impl RecordingHandler {
    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }
}

impl PageHandler for RecordingHandler {
    fn handle(&self, _page: &str, label: &str) -> Result<()> {
        self.labels.lock().unwrap().push(label.to_string());
        Ok(())
    }
}

pub fn pool(handler: Arc<dyn PageHandler>) -> ExtractionPool {
    ExtractionPool::new(handler, 4)
}
