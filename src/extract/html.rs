// src/extract/html.rs
// =============================================================================
// This module turns a chapter page into plain text and saves it.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
//
// What we pull out of a page:
// - the chapter title: the text of <title>
// - the chapter body: every text node under the content element
//   (default `#chaptercontent`), trimmed, empty ones dropped, one per line
// =============================================================================

use scraper::{Html, Selector};

use super::pool::PageHandler;
use super::store::NovelStore;
use crate::error::{CrawlError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub text: String,
}

pub struct ChapterExtractor {
    title: Selector,
    content: Selector,
}

impl ChapterExtractor {
    pub fn new(content_selector: &str) -> Result<Self> {
        Ok(Self {
            title: parse_selector("title")?,
            content: parse_selector(content_selector)?,
        })
    }

    // Returns None when the page has no content element
    pub fn extract(&self, html: &str) -> Option<Chapter> {
        let document = Html::parse_document(html);

        let content = document.select(&self.content).next()?;
        let text = content
            .text()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Some(Chapter {
            title: page_title(&document, &self.title).unwrap_or_default(),
            text,
        })
    }
}

// Text of the page's <title>, trimmed; None if missing or blank
pub fn page_title(document: &Html, title: &Selector) -> Option<String> {
    document
        .select(title)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| CrawlError::Selector(selector.to_string()))
}

// Default page handler: extract the chapter and append it to its file
pub struct ChapterWriter {
    extractor: ChapterExtractor,
    store: NovelStore,
}

impl ChapterWriter {
    pub fn new(extractor: ChapterExtractor, store: NovelStore) -> Self {
        Self { extractor, store }
    }
}

impl PageHandler for ChapterWriter {
    fn handle(&self, page: &str, label: &str) -> Result<()> {
        match self.extractor.extract(page) {
            Some(chapter) => {
                let path = self.store.append(&chapter.title, &chapter.text)?;
                tracing::info!(page = %label, title = %chapter.title, file = %path.display(), "chapter saved");
            }
            None => {
                tracing::warn!(page = %label, "no chapter content found on page");
            }
        }
        Ok(())
    }
}
