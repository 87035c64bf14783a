//! # sitebrief CLI Application
//!
//! This module implements the command-line interface for the sitebrief
//! pipeline, providing access to its crawl, storage, and serving
//! capabilities through a set of subcommands.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands for the pipeline stages:
//!   - `crawl`: crawl a site, summarize its pages, and store the results
//!   - `list`: inspect the stored content records
//!   - `serve`: run the HTTP API (scrape, content update, chat)
//!
//! The completion API key is read from `OPENAI_API_KEY`; without it, the
//! summarizer and the chat responder degrade to fixed fallback strings
//! rather than failing.

mod telemetry;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sitebrief::chat::ChatResponder;
use sitebrief::crawler::{Crawler, CrawlerConfig};
use sitebrief::llm::Client;
use sitebrief::server::{router, AppState};
use sitebrief::store::Database;
use sitebrief::summarize::Summarizer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Crawl a website, summarize its pages, and chat over the stored content", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl a site, summarize its pages, and store the results
    Crawl(CrawlArgs),

    /// List stored content records
    List(ListArgs),

    /// Run the HTTP API server
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Domain to crawl, e.g. https://example.com
    #[arg(required = true)]
    domain: String,

    /// Maximum number of visited pages
    #[arg(short = 'p', long, default_value = "20")]
    max_pages: usize,

    /// Database path
    #[arg(long, default_value = "sitebrief.db")]
    database: PathBuf,

    /// Crawl and print results without writing to the database
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Database path
    #[arg(long, default_value = "sitebrief.db")]
    database: PathBuf,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    addr: String,

    /// Database path
    #[arg(long, default_value = "sitebrief.db")]
    database: PathBuf,

    /// Domain crawled by GET /api/scrape
    #[arg(short, long, default_value = "http://localhost:3000")]
    domain: String,

    /// Maximum number of visited pages per crawl
    #[arg(short = 'p', long, default_value = "20")]
    max_pages: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing_subscriber();

    let cli = Cli::parse();
    match cli.command {
        Commands::Crawl(args) => crawl(args).await,
        Commands::List(args) => list(args).await,
        Commands::Serve(args) => serve(args).await,
    }
}

fn completion_client() -> Option<Client> {
    let client = Client::from_env();
    if client.is_none() {
        warn!("No OPENAI_API_KEY set; summaries and chat replies will be fallback strings");
    }
    client
}

fn build_crawler(max_pages: usize, summarizer: Summarizer) -> anyhow::Result<Crawler> {
    let config = CrawlerConfig::builder().max_pages(max_pages).build();
    Crawler::new(config, summarizer).context("Failed to create crawler")
}

async fn open_database(path: &PathBuf) -> anyhow::Result<Database> {
    let path = path.to_string_lossy();
    Database::new_from_path(&path)
        .await
        .with_context(|| format!("Failed to open database at {}", path))
}

async fn crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let summarizer = Summarizer::new(completion_client());
    let crawler = build_crawler(args.max_pages, summarizer)?;

    let outcome = crawler.crawl(&args.domain).await;

    for page in &outcome.pages {
        println!("{}\n  {}\n", page.url, page.title);
    }
    for failure in &outcome.failures {
        eprintln!("failed: {} ({})", failure.path, failure.error);
    }
    println!(
        "{} pages, {} failures",
        outcome.pages.len(),
        outcome.failures.len()
    );

    if args.dry_run {
        info!("Dry run; skipping database write");
        return Ok(());
    }

    let db = open_database(&args.database).await?;
    let stored = db
        .replace_content(&outcome.pages)
        .await
        .context("Failed to store crawled content")?;
    println!("stored {} records", stored);

    Ok(())
}

async fn list(args: ListArgs) -> anyhow::Result<()> {
    let db = open_database(&args.database).await?;
    let records = db
        .all_content()
        .await
        .context("Failed to read stored content")?;

    if records.is_empty() {
        println!("no stored content");
        return Ok(());
    }

    for record in records {
        println!("{}\n  {}\n  {} chars\n", record.url, record.title, record.content.len());
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let db = open_database(&args.database).await?;
    let client = completion_client();

    let summarizer = Summarizer::new(client.clone());
    let crawler = build_crawler(args.max_pages, summarizer)?;
    let responder = ChatResponder::new(client, db.clone());

    let state = Arc::new(AppState {
        db,
        crawler,
        responder,
        scrape_domain: args.domain,
    });

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.addr))?;
    info!("Listening on {}", args.addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
