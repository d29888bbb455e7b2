// src/crawl/coordinator.rs
// =============================================================================
// This module runs one worker per seed, but never too many at once.
//
// How it works:
// 1. Create a fresh visited-URL tracker for this run
// 2. Spawn one tokio task per seed
// 3. Each task waits for a permit from a semaphore before it starts walking;
//    the number of permits is the concurrency limit
// 4. Wait for every task, turn each result into a CrawlOutcome
//
// A task that panics only loses its own seed: tokio catches the panic and
// hands it back as a JoinError, which we record as an aborted outcome.
// =============================================================================

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;

use super::boundary::BoundaryClassifier;
use super::fetcher::PageFetcher;
use super::tracker::ChainTracker;
use super::worker::{CrawlOutcome, SeedPolicy, Termination, TraversalWorker};
use crate::error::CrawlError;
use crate::extract::ExtractionPool;

pub struct Coordinator {
    fetcher: Arc<dyn PageFetcher>,
    classifier: Arc<BoundaryClassifier>,
    extraction: ExtractionPool,
    concurrency: usize,
    seed_policy: SeedPolicy,
}

impl Coordinator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        classifier: Arc<BoundaryClassifier>,
        extraction: ExtractionPool,
        concurrency: usize,
        seed_policy: SeedPolicy,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            extraction,
            concurrency: concurrency.max(1),
            seed_policy,
        }
    }

    // Crawls every seed and returns one outcome per seed, in seed order
    pub async fn run(&self, seeds: Vec<String>) -> Vec<CrawlOutcome> {
        let tracker = Arc::new(ChainTracker::new());
        let worker = Arc::new(TraversalWorker::new(
            self.fetcher.clone(),
            self.classifier.clone(),
            tracker.clone(),
            self.extraction.clone(),
            self.seed_policy,
        ));
        let slots = Arc::new(Semaphore::new(self.concurrency));

        tracing::info!(seeds = seeds.len(), concurrency = self.concurrency, "starting crawl");

        let tasks = seeds.iter().cloned().map(|seed| {
            let worker = worker.clone();
            let slots = slots.clone();
            tokio::spawn(async move {
                let _permit = slots.acquire_owned().await?;
                Ok::<_, CrawlError>(worker.run(seed).await)
            })
        });
        let results = join_all(tasks).await;

        let outcomes: Vec<CrawlOutcome> = seeds
            .into_iter()
            .zip(results)
            .map(|(seed, result)| match result {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => CrawlOutcome::aborted(seed, e.to_string()),
                Err(e) => CrawlOutcome::aborted(seed, format!("worker task failed: {}", e)),
            })
            .collect();

        let summary = RunSummary::from_outcomes(&outcomes);
        for outcome in outcomes.iter().filter(|o| !o.is_ok()) {
            tracing::error!(seed = %outcome.seed, termination = ?outcome.termination, "seed failed");
        }
        tracing::info!(
            completed = summary.completed,
            boundary = summary.boundary_reached,
            fetch_failed = summary.fetch_failed,
            aborted = summary.aborted,
            pages = summary.pages,
            visited = tracker.len(),
            "crawl finished"
        );

        outcomes
    }
}

// Totals per termination kind
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub completed: usize,
    pub boundary_reached: usize,
    pub fetch_failed: usize,
    pub aborted: usize,
    pub pages: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[CrawlOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.pages += outcome.pages.len();
            match outcome.termination {
                Termination::Completed => summary.completed += 1,
                Termination::BoundaryReached { .. } => summary.boundary_reached += 1,
                Termination::FetchFailed { .. } => summary.fetch_failed += 1,
                Termination::Aborted { .. } => summary.aborted += 1,
            }
        }
        summary
    }

    pub fn failures(&self) -> usize {
        self.fetch_failed + self.aborted
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Semaphore and not buffer_unordered?
//    - buffer_unordered polls all futures inside ONE task, so a panic in one
//      future would tear down the whole stream
//    - Spawning a task per seed gives each seed its own panic boundary, and
//      the semaphore still caps how many run at once
//
// 2. What is a permit?
//    - acquire_owned() waits until a slot is free and returns a guard
//    - The slot is given back when the guard (_permit) is dropped, i.e. when
//      the task finishes, whether it succeeded or not
//
// 3. Why zip seeds with results?
//    - join_all keeps the order of its input
//    - So result i belongs to seed i, even when the task panicked and we have
//      nothing but a JoinError
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::testing::{self, url, MapFetcher, RecordingHandler};
    use std::collections::HashSet;
    use std::time::Duration;

    fn coordinator(fetcher: Arc<MapFetcher>, concurrency: usize) -> Coordinator {
        Coordinator::new(
            fetcher,
            Arc::new(testing::classifier()),
            testing::pool(Arc::new(RecordingHandler::default())),
            concurrency,
            SeedPolicy::Permissive,
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_limit_is_respected() {
        let mut fetcher = MapFetcher::new().with_latency(Duration::from_millis(20));
        let mut seeds = Vec::new();
        for chapter in 1..=50 {
            let name = format!("{}.html", chapter);
            fetcher = fetcher.with_page(&name, None);
            seeds.push(url(&name));
        }
        let fetcher = Arc::new(fetcher);

        let outcomes = coordinator(fetcher.clone(), 10).run(seeds).await;

        assert_eq!(outcomes.len(), 50);
        assert!(outcomes.iter().all(|o| o.termination == Termination::Completed));
        assert!(fetcher.peak() <= 10, "peak was {}", fetcher.peak());
        assert_eq!(fetcher.fetched().len(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_faulting_seed_is_isolated() {
        let fetcher = Arc::new(
            MapFetcher::new()
                .with_page("1.html", Some("1_2.html"))
                .with_page("1_2.html", None)
                .with_page("2.html", None)
                .with_page("4.html", None)
                .panicking_on("3.html"),
        );
        let seeds = vec![url("1.html"), url("2.html"), url("3.html"), url("4.html")];

        let outcomes = coordinator(fetcher.clone(), 2).run(seeds.clone()).await;

        assert_eq!(outcomes.len(), 4);
        for (outcome, seed) in outcomes.iter().zip(&seeds) {
            assert_eq!(&outcome.seed, seed);
        }
        assert!(matches!(outcomes[2].termination, Termination::Aborted { .. }));
        assert!(outcomes[0].is_ok() && outcomes[1].is_ok() && outcomes[3].is_ok());
        assert_eq!(outcomes[0].pages.len(), 2);

        let summary = RunSummary::from_outcomes(&outcomes);
        assert_eq!(summary.aborted, 1);
        assert_eq!(summary.failures(), 1);
        assert_eq!(summary.completed, 3);
    }

    #[tokio::test]
    async fn test_duplicate_seeds_are_fetched_once() {
        let fetcher = Arc::new(MapFetcher::new().with_page("5.html", None));
        let seeds = vec![url("5.html"), url("5.html")];

        let outcomes = coordinator(fetcher.clone(), 4).run(seeds).await;

        assert_eq!(fetcher.fetched(), vec![url("5.html")]);
        let pages: usize = outcomes.iter().map(|o| o.pages.len()).sum();
        assert_eq!(pages, 1);
        assert!(outcomes.iter().all(|o| o.termination == Termination::Completed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_converging_chains_never_refetch() {
        // Two seeds inside the same chapter walk into each other
        let fetcher = Arc::new(
            MapFetcher::new()
                .with_page("8.html", Some("8_2.html"))
                .with_page("8_2.html", Some("8_3.html"))
                .with_page("8_3.html", Some("9.html"))
                .with_page("9.html", None),
        );
        let seeds = vec![url("8.html"), url("8_2.html"), url("9.html")];

        let outcomes = coordinator(fetcher.clone(), 3).run(seeds).await;

        let fetched = fetcher.fetched();
        let unique: HashSet<_> = fetched.iter().collect();
        assert_eq!(fetched.len(), unique.len());
        assert_eq!(fetched.len(), 4);
        assert!(outcomes.iter().all(CrawlOutcome::is_ok));
    }

    #[tokio::test]
    async fn test_every_seed_failing_still_completes_the_run() {
        let fetcher = Arc::new(MapFetcher::new());
        let seeds = vec![url("1.html"), url("2.html")];

        let outcomes = coordinator(fetcher, 2).run(seeds).await;

        let summary = RunSummary::from_outcomes(&outcomes);
        assert_eq!(summary.fetch_failed, 2);
        assert_eq!(summary.pages, 0);
    }
}
