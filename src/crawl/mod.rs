// src/crawl/mod.rs
// =============================================================================
// The chapter traversal engine.
//
// Submodules, leaves first:
// - fetcher: downloads a page, retrying with linear backoff
// - boundary: chapter numbering, next-link lookup, continue-or-stop decision
// - tracker: visited-URL set shared by all workers of a run
// - worker: walks one chapter from its seed page
// - coordinator: runs the workers under a concurrency limit
// =============================================================================

mod boundary;
mod coordinator;
mod fetcher;
mod tracker;
mod worker;

#[cfg(test)]
mod testing;

pub use boundary::{BoundaryClassifier, NumberedPages};
pub use coordinator::{Coordinator, RunSummary};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use worker::{CrawlOutcome, SeedPolicy, Termination};
