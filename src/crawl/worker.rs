// src/crawl/worker.rs
// =============================================================================
// This module walks one chapter, page by page.
//
// A worker is started with a seed: the first page of a main chapter. Then it
// loops:
// 1. Claim the current URL in the shared tracker (stop if already claimed)
// 2. Fetch it (stop if the fetcher gave up)
// 3. Hand the page to the extraction pool (text gets saved to disk)
// 4. Find the page's "next" link (stop if there is none)
// 5. If the next link is still the same main chapter, go to 1 with it,
//    otherwise stop: the next chapter has its own worker
//
// Pages inside one chapter are strictly sequential: a sub-page is only
// fetched after its predecessor has been fetched and saved.
//
// Any unexpected error inside the loop ends THIS seed only. It's logged and
// reported in the outcome; other workers never see it.
// =============================================================================

use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

use super::boundary::{BoundaryClassifier, ChapterRef, NextStep};
use super::fetcher::PageFetcher;
use super::tracker::ChainTracker;
use crate::error::Result;
use crate::extract::ExtractionPool;

// How one seed's traversal ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "termination", rename_all = "snake_case")]
pub enum Termination {
    /// The chain ran out: no next link, or the next page was already claimed
    Completed,
    /// The next link leaves this main chapter (or doesn't parse at all)
    BoundaryReached { next: String },
    /// The fetcher gave up on a page
    FetchFailed { url: String },
    /// Something unexpected went wrong, or the seed was rejected
    Aborted { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    pub seed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_id: Option<String>,
    /// Pages this worker downloaded, in order
    pub pages: Vec<String>,
    #[serde(flatten)]
    pub termination: Termination,
}

impl CrawlOutcome {
    pub fn aborted(seed: String, reason: String) -> Self {
        Self {
            seed,
            main_id: None,
            pages: Vec::new(),
            termination: Termination::Aborted { reason },
        }
    }

    /// Completed and BoundaryReached are both normal ends of a chapter
    pub fn is_ok(&self) -> bool {
        matches!(
            self.termination,
            Termination::Completed | Termination::BoundaryReached { .. }
        )
    }
}

// What to do with a seed whose URL doesn't follow the chapter numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Log it and crawl the seed page anyway, without a chapter id. Since no
    /// next link can continue an unknown chapter, only the seed page is saved.
    Permissive,
    /// Refuse the seed without fetching anything
    Strict,
}

pub struct TraversalWorker {
    fetcher: Arc<dyn PageFetcher>,
    classifier: Arc<BoundaryClassifier>,
    tracker: Arc<ChainTracker>,
    extraction: ExtractionPool,
    seed_policy: SeedPolicy,
}

impl TraversalWorker {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        classifier: Arc<BoundaryClassifier>,
        tracker: Arc<ChainTracker>,
        extraction: ExtractionPool,
        seed_policy: SeedPolicy,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            tracker,
            extraction,
            seed_policy,
        }
    }

    pub async fn run(&self, seed: String) -> CrawlOutcome {
        let span = tracing::info_span!("worker", seed = %seed);
        self.run_seed(seed).instrument(span).await
    }

    async fn run_seed(&self, seed: String) -> CrawlOutcome {
        let seed_ref = self.classifier.chapter_ref(&seed);

        if seed_ref.is_none() {
            match self.seed_policy {
                SeedPolicy::Strict => {
                    tracing::warn!("seed URL does not follow the chapter numbering, skipping it");
                    return CrawlOutcome::aborted(
                        seed,
                        "seed URL does not follow the chapter numbering".to_string(),
                    );
                }
                SeedPolicy::Permissive => {
                    tracing::warn!(
                        "seed URL does not follow the chapter numbering, crawling it without a chapter id"
                    );
                }
            }
        }

        let mut pages = Vec::new();
        let termination = match self.traverse(&seed, seed_ref.as_ref(), &mut pages).await {
            Ok(termination) => termination,
            Err(e) => {
                tracing::error!(error = %e, "worker aborted");
                Termination::Aborted {
                    reason: e.to_string(),
                }
            }
        };

        tracing::debug!(pages = pages.len(), ?termination, "worker finished");

        CrawlOutcome {
            seed,
            main_id: seed_ref.map(|r| r.main_id),
            pages,
            termination,
        }
    }

    async fn traverse(
        &self,
        seed: &str,
        seed_ref: Option<&ChapterRef>,
        pages: &mut Vec<String>,
    ) -> Result<Termination> {
        let mut current = seed.to_string();

        loop {
            // Claim before fetching, so nobody else downloads it meanwhile
            if !self.tracker.try_mark(&current) {
                tracing::debug!(url = %current, "already visited, stopping");
                return Ok(Termination::Completed);
            }

            let page: Arc<str> = match self.fetcher.fetch(&current).await {
                Some(body) => Arc::from(body),
                None => return Ok(Termination::FetchFailed { url: current }),
            };
            pages.push(current.clone());

            self.extraction.submit(page.clone(), current.clone()).await?;

            let next = match self.classifier.next_link(&page)? {
                Some(next) => next,
                None => {
                    tracing::debug!(url = %current, "no next link");
                    return Ok(Termination::Completed);
                }
            };

            match self.classifier.classify(seed_ref, next) {
                NextStep::Continue(next) => current = next,
                NextStep::OtherChapter(next) | NextStep::Unparsable(next) => {
                    tracing::debug!(%next, "chapter boundary reached");
                    return Ok(Termination::BoundaryReached { next });
                }
            }
        }
    }
}
