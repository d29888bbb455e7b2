// src/extract/mod.rs
// =============================================================================
// Everything the crawl engine hands pages to, or gets seeds from.
//
// Submodules:
// - toc: reads the table of contents and returns the chapter seed URLs
// - html: turns a chapter page into title + text
// - store: appends chapter text to files on disk
// - pool: runs page handling on the blocking thread pool
// =============================================================================

mod html;
mod pool;
mod store;
mod toc;

pub use html::{ChapterExtractor, ChapterWriter};
pub use pool::{ExtractionPool, PageHandler};
pub use store::NovelStore;
pub use toc::{discover_seeds, normalize_seeds};
