// src/extract/toc.rs
// =============================================================================
// This module reads a book's table of contents page.
//
// How it works:
// 1. Fetch the TOC page (same retrying fetcher as the chapters)
// 2. Select the chapter anchors (default `div.book_last a`)
// 3. Keep hrefs that point at chapter pages (ending in `.html`)
// 4. Resolve them against the TOC URL, keeping page order
//
// The page <title> becomes the novel title, which names the output folder.
// =============================================================================

use scraper::Html;
use serde::Serialize;
use url::Url;

use super::html::{page_title, parse_selector};
use crate::config::CrawlConfig;
use crate::crawl::PageFetcher;
use crate::error::{CrawlError, Result};

const UNTITLED: &str = "untitled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOfContents {
    pub title: String,
    pub seeds: Vec<String>,
}

// Fetches and parses the table of contents at `config.base_url`
pub async fn discover_seeds(
    fetcher: &dyn PageFetcher,
    config: &CrawlConfig,
) -> Result<TableOfContents> {
    let base = config.base()?;

    let page = fetcher
        .fetch(base.as_str())
        .await
        .ok_or_else(|| CrawlError::Toc(format!("could not fetch {}", base)))?;

    parse_toc(&page, &base, &config.toc_selector, &config.page_extension)
}

pub fn parse_toc(html: &str, base: &Url, selector: &str, extension: &str) -> Result<TableOfContents> {
    let document = Html::parse_document(html);
    let anchors = parse_selector(selector)?;
    let title = parse_selector("title")?;
    let suffix = format!(".{}", extension.trim_start_matches('.'));

    let seeds = document
        .select(&anchors)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.ends_with(&suffix))
        .filter_map(|href| resolve_link(base, href))
        .collect();

    Ok(TableOfContents {
        title: page_title(&document, &title).unwrap_or_else(|| UNTITLED.to_string()),
        seeds,
    })
}

// Puts seeds given on the command line into the same form as discovered ones
//
// The tracker compares URLs as strings, so `https://Novel.test/a/6.html` and
// `https://novel.test/a/6.html` must become one key before the crawl starts.
pub fn normalize_seeds(seeds: Vec<String>) -> Result<Vec<String>> {
    seeds
        .into_iter()
        .map(|seed| {
            Url::parse(seed.trim())
                .map(|url| url.to_string())
                .map_err(|e| CrawlError::url(&seed, e))
        })
        .collect()
}

// Resolves a link (possibly relative) to an absolute URL
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    // Skip anchors and special protocols
    if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:") {
        return None;
    }

    match base.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            tracing::warn!(%href, error = %e, "skipping unresolvable chapter link");
            None
        }
    }
}
