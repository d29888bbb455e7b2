// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Flags that tune the crawl are Option<T>: when a flag is absent, the value
// from the config file (or the built-in default) is kept.
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CrawlConfig;

#[derive(Parser, Debug)]
#[command(
    name = "chapter-crawler",
    version = "0.1.0",
    about = "Download a serialized novel by following its chapter pages",
    long_about = "chapter-crawler reads a book's table of contents, then walks every chapter \
                  from its first page through all of its sub-pages, saving the text of each \
                  chapter to its own file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl every chapter listed in a table of contents
    ///
    /// Example: chapter-crawler crawl https://example.com/book/64694/list.html --limit 5
    Crawl {
        /// Table of contents URL (also the base for relative chapter links)
        toc_url: String,

        #[command(flatten)]
        options: CrawlOptions,

        /// Only crawl the first N chapters
        #[arg(long)]
        limit: Option<usize>,

        /// Crawl these chapter URLs instead of the ones in the table of contents
        ///
        /// Can be given several times
        #[arg(long = "seed")]
        seeds: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Only list the chapters found in a table of contents
    ///
    /// Example: chapter-crawler toc https://example.com/book/64694/list.html
    Toc {
        /// Table of contents URL
        toc_url: String,

        /// JSON config file (same format as for `crawl`)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output the chapter list as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct CrawlOptions {
    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the novel folder is created in
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Maximum number of chapters crawled at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Attempts per page before giving up
    #[arg(long)]
    pub retries: Option<u32>,

    /// Skip chapter URLs that don't follow the `<n>.html` / `<n>_<m>.html`
    /// numbering instead of crawling them
    #[arg(long)]
    pub strict_seeds: bool,
}

impl CrawlOptions {
    // Copies every flag that was given onto the config
    pub fn apply(&self, config: &mut CrawlConfig) {
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if self.strict_seeds {
            config.strict_seeds = true;
        }
    }
}
