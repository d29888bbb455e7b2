// src/extract/pool.rs
// =============================================================================
// Runs page extraction off the async scheduler.
//
// Parsing HTML and writing files is blocking work. If it ran directly inside a
// worker's async loop it would stall every other worker sharing that runtime
// thread. So each page is handed to tokio's blocking thread pool, and a
// semaphore caps how many pages are being processed at once.
//
// Failures inside a handler are logged here and swallowed: a chapter that
// fails to save must not stop the crawl.
// =============================================================================

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::Result;

// Consumes one downloaded page
//
// `label` identifies the page in logs (the worker passes the page URL).
pub trait PageHandler: Send + Sync + 'static {
    fn handle(&self, page: &str, label: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct ExtractionPool {
    handler: Arc<dyn PageHandler>,
    slots: Arc<Semaphore>,
}

impl ExtractionPool {
    pub fn new(handler: Arc<dyn PageHandler>, workers: usize) -> Self {
        Self {
            handler,
            slots: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    // Processes one page on the blocking pool and waits for it to finish
    //
    // Handler errors and handler panics are logged and reported as Ok; only a
    // closed semaphore comes back as Err.
    pub async fn submit(&self, page: Arc<str>, label: String) -> Result<()> {
        let permit = self.slots.clone().acquire_owned().await?;
        let handler = self.handler.clone();
        let task_label = label.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            handler.handle(&page, &task_label)
        })
        .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(page = %label, error = %e, "extraction failed");
            }
            Err(e) => {
                tracing::error!(page = %label, error = %e, "extraction task panicked");
            }
        }

        Ok(())
    }
}
