// src/crawl/tracker.rs
// =============================================================================
// The set of pages already claimed during one crawl run.
//
// All workers share one tracker. Before fetching a page a worker calls
// try_mark(url):
// - true  -> nobody had this URL yet, the caller now owns the fetch
// - false -> another worker (or this one, via a cyclic link) already has it
//
// The check and the insert happen as ONE operation. A separate lookup
// followed by insert() could let two workers both see "not visited" and both
// download the same page.
// =============================================================================

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct ChainTracker {
    visited: DashSet<String>,
}

impl ChainTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_mark(&self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is DashSet?
//    - A HashSet that many threads can use at the same time
//    - Internally split into shards, each with its own lock
//    - insert() locks only one shard, so it's atomic for that key
//
// 2. Why &self and not &mut self in try_mark?
//    - DashSet handles the locking internally ("interior mutability")
//    - So the tracker can sit behind an Arc and be shared by every worker
//      without a Mutex around it
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_mark_once() {
        let tracker = ChainTracker::new();
        assert!(tracker.try_mark("https://example.com/6.html"));
        assert!(!tracker.try_mark("https://example.com/6.html"));
        assert!(tracker.try_mark("https://example.com/6_2.html"));
        assert_eq!(tracker.len(), 2);
        assert!(!tracker.try_mark("https://example.com/6_2.html"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_mark_has_single_winner() {
        let tracker = Arc::new(ChainTracker::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let tracker = tracker.clone();
                let winners = winners.clone();
                tokio::spawn(async move {
                    for page in 0..20 {
                        if tracker.try_mark(&format!("https://example.com/{}.html", page)) {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        // 64 tasks raced for 20 URLs: exactly one winner per URL
        assert_eq!(winners.load(Ordering::SeqCst), 20);
        assert_eq!(tracker.len(), 20);
    }
}
