// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Build the config: defaults, then --config file, then flags
// 4. Find the chapter seeds, crawl them, print the results
// 5. Exit with proper code (0 = all chapters done, 1 = some failed, 2 = error)
// =============================================================================

mod cli;       // src/cli.rs - command-line parsing
mod config;    // src/config.rs - crawl settings
mod crawl;     // src/crawl/ - the chapter traversal engine
mod error;     // src/error.rs - engine error type
mod extract;   // src/extract/ - TOC discovery, text extraction, storage

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, CrawlOptions, Commands};
use config::CrawlConfig;
use crawl::{
    BoundaryClassifier, Coordinator, CrawlOutcome, HttpFetcher, NumberedPages, RunSummary,
    SeedPolicy, Termination,
};
use extract::{ChapterExtractor, ChapterWriter, ExtractionPool, NovelStore};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so the results table / JSON on stdout stays clean
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            toc_url,
            options,
            limit,
            seeds,
            json,
        } => handle_crawl(&toc_url, &options, limit, seeds, json).await,
        Commands::Toc {
            toc_url,
            config,
            json,
        } => handle_toc(&toc_url, config.as_deref(), json).await,
    }
}

fn load_config(path: Option<&Path>, toc_url: &str, options: &CrawlOptions) -> Result<CrawlConfig> {
    let mut config = match path {
        Some(path) => CrawlConfig::from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => CrawlConfig::default(),
    };

    config.base_url = toc_url.to_string();
    options.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

// Handles the 'crawl' subcommand
async fn handle_crawl(
    toc_url: &str,
    options: &CrawlOptions,
    limit: Option<usize>,
    seeds: Vec<String>,
    json: bool,
) -> Result<i32> {
    let config = load_config(options.config.as_deref(), toc_url, options)?;
    let fetcher = Arc::new(HttpFetcher::new(&config).context("Failed to create HTTP client")?);

    if !json {
        println!("🔍 Reading table of contents: {}", toc_url);
    }

    let (title, mut seeds) = if seeds.is_empty() {
        let toc = extract::discover_seeds(fetcher.as_ref(), &config)
            .await
            .context("Failed to read the table of contents")?;
        (toc.title, toc.seeds)
    } else {
        // Explicit seeds: the TOC is only needed for the novel title
        let title = match extract::discover_seeds(fetcher.as_ref(), &config).await {
            Ok(toc) => toc.title,
            Err(e) => {
                tracing::warn!(error = %e, "could not read the novel title, using 'untitled'");
                "untitled".to_string()
            }
        };
        let seeds = extract::normalize_seeds(seeds).context("Invalid --seed URL")?;
        (title, seeds)
    };

    if let Some(limit) = limit {
        seeds.truncate(limit);
    }

    if seeds.is_empty() {
        if !json {
            println!("⚠️  No chapters found");
        }
        return Ok(0);
    }

    let store = NovelStore::open(&config.output_dir, &title)
        .context("Failed to create the output directory")?;

    if !json {
        println!("📖 {}", title);
        println!("📄 {} chapter(s) -> {}", seeds.len(), store.dir().display());
        println!("🌐 Crawling with up to {} chapter(s) at a time...\n", config.concurrency);
    }

    let writer = ChapterWriter::new(ChapterExtractor::new(&config.content_selector)?, store);
    let extraction = ExtractionPool::new(Arc::new(writer), config.extraction_workers);

    let classifier = BoundaryClassifier::new(
        Box::new(NumberedPages::new(&config.page_extension)?),
        &config.next_selector,
        config.base()?,
    )?;

    let seed_policy = if config.strict_seeds {
        SeedPolicy::Strict
    } else {
        SeedPolicy::Permissive
    };

    let coordinator = Coordinator::new(
        fetcher,
        Arc::new(classifier),
        extraction,
        config.concurrency,
        seed_policy,
    );
    let outcomes = coordinator.run(seeds).await;

    print_results(&outcomes, json)?;

    if RunSummary::from_outcomes(&outcomes).failures() > 0 {
        Ok(1) // Exit code 1 = some chapters failed
    } else {
        Ok(0) // Exit code 0 = all good
    }
}

// Handles the 'toc' subcommand
async fn handle_toc(toc_url: &str, config_path: Option<&Path>, json: bool) -> Result<i32> {
    let config = load_config(config_path, toc_url, &CrawlOptions::default())?;
    let fetcher = HttpFetcher::new(&config).context("Failed to create HTTP client")?;

    let toc = extract::discover_seeds(&fetcher, &config)
        .await
        .context("Failed to read the table of contents")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&toc)?);
    } else {
        println!("📖 {}", toc.title);
        for (index, seed) in toc.seeds.iter().enumerate() {
            println!("{:>5}  {}", index + 1, seed);
        }
        println!("\n📋 Total: {}", toc.seeds.len());
    }

    Ok(0)
}

// Prints the results either as a table or JSON
fn print_results(outcomes: &[CrawlOutcome], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(outcomes)?;
        println!("{}", json_output);
    } else {
        print_table(outcomes);
    }
    Ok(())
}

fn print_table(outcomes: &[CrawlOutcome]) {
    println!("{:<60} {:>6} {:<20}", "CHAPTER", "PAGES", "STATUS");
    println!("{}", "=".repeat(88));

    for outcome in outcomes {
        // Truncate URL if too long for display
        let seed_display = if outcome.seed.chars().count() > 57 {
            let head: String = outcome.seed.chars().take(57).collect();
            format!("{}...", head)
        } else {
            outcome.seed.clone()
        };

        println!(
            "{:<60} {:>6} {:<20}",
            seed_display,
            outcome.pages.len(),
            format_termination(&outcome.termination)
        );
    }

    println!();

    let summary = RunSummary::from_outcomes(outcomes);
    println!("📊 Summary:");
    println!("   ✅ Completed: {}", summary.completed + summary.boundary_reached);
    println!("   ❌ Failed: {}", summary.failures());
    println!("   📄 Pages: {}", summary.pages);
    println!("   📋 Total: {}", outcomes.len());
}

fn format_termination(termination: &Termination) -> String {
    match termination {
        Termination::Completed => "✅ DONE".to_string(),
        Termination::BoundaryReached { .. } => "✅ DONE (boundary)".to_string(),
        Termination::FetchFailed { .. } => "❌ FETCH FAILED".to_string(),
        Termination::Aborted { reason } => format!("⚠️  ABORTED: {}", reason),
    }
}
