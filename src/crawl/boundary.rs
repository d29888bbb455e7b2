// src/crawl/boundary.rs
// =============================================================================
// This module decides where one chapter ends and the next one begins.
//
// Chapter pages follow a numbering convention in their URL:
//   .../12.html    -> main chapter 12, first page
//   .../12_3.html  -> main chapter 12, sub-page 3
//
// Each page has a "next" link. While that link stays inside the same main
// chapter (12.html -> 12_2.html -> 12_3.html) the worker keeps going. As soon
// as it points at a different main chapter (12_3.html -> 13.html) we have hit
// a boundary: chapter 13 has its own worker, so this one stops.
//
// The numbering rule lives behind the ChapterScheme trait so a differently
// structured site only needs a new scheme, not a new traversal loop.
// =============================================================================

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::error::{CrawlError, Result};

// What a URL tells us about its place in the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterRef {
    pub main_id: String,
    pub sub_id: Option<String>,
}

impl ChapterRef {
    // Sub-pages belong to the same chapter as their first page
    pub fn same_chapter(&self, other: &ChapterRef) -> bool {
        self.main_id == other.main_id
    }
}

// A chapter numbering convention
pub trait ChapterScheme: Send + Sync {
    fn chapter_ref(&self, url: &str) -> Option<ChapterRef>;

    // Does `next` continue the chapter that started at `seed`?
    //
    // A seed without a ref (its URL didn't parse) has no continuations.
    fn is_continuation(&self, seed: Option<&ChapterRef>, next: &ChapterRef) -> bool {
        seed.map_or(false, |seed| seed.same_chapter(next))
    }
}

// The `<main>[_<sub>].<ext>` convention
#[derive(Debug, Clone)]
pub struct NumberedPages {
    pattern: Regex,
}

impl NumberedPages {
    pub fn new(extension: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"(\d+)(?:_(\d+))?\.{}$",
            regex::escape(extension.trim_start_matches('.'))
        ))?;
        Ok(Self { pattern })
    }
}

impl ChapterScheme for NumberedPages {
    fn chapter_ref(&self, url: &str) -> Option<ChapterRef> {
        let caps = self.pattern.captures(url)?;
        Some(ChapterRef {
            main_id: caps.get(1)?.as_str().to_string(),
            sub_id: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }
}

// What to do with a next link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// Same main chapter, keep going
    Continue(String),
    /// Next link doesn't follow the numbering convention
    Unparsable(String),
    /// Next link belongs to another main chapter
    OtherChapter(String),
}

// Ties the numbering scheme to the page markup
pub struct BoundaryClassifier {
    scheme: Box<dyn ChapterScheme>,
    next_selector: Selector,
    base: Url,
}

impl BoundaryClassifier {
    pub fn new(scheme: Box<dyn ChapterScheme>, next_selector: &str, base: Url) -> Result<Self> {
        let next_selector = Selector::parse(next_selector)
            .map_err(|_| CrawlError::Selector(next_selector.to_string()))?;
        Ok(Self {
            scheme,
            next_selector,
            base,
        })
    }

    pub fn chapter_ref(&self, url: &str) -> Option<ChapterRef> {
        self.scheme.chapter_ref(url)
    }

    // Finds the designated next-page anchor and resolves its href
    //
    // Returns Ok(None) when the page has no next link (end of the book, or a
    // page without navigation). A href that can't be joined to the base URL
    // is an error: the page markup is broken in a way we didn't expect.
    pub fn next_link(&self, page: &str) -> Result<Option<String>> {
        let document = Html::parse_document(page);

        let href = document
            .select(&self.next_selector)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty());

        match href {
            Some(href) => {
                let resolved = self.base.join(href).map_err(|e| CrawlError::url(href, e))?;
                Ok(Some(resolved.to_string()))
            }
            None => Ok(None),
        }
    }

    pub fn classify(&self, seed: Option<&ChapterRef>, next_url: String) -> NextStep {
        match self.scheme.chapter_ref(&next_url) {
            None => NextStep::Unparsable(next_url),
            Some(next) if self.scheme.is_continuation(seed, &next) => NextStep::Continue(next_url),
            Some(_) => NextStep::OtherChapter(next_url),
        }
    }
}
