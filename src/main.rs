//! litgap - PubMed Research Gap Pipeline
//!
//! A Rust microservice that turns a research idea into a PubMed query,
//! retrieves matching articles (optionally with scraped PMC full text), and
//! synthesizes research gaps across them with the Gemini API.
//!
//! ## Usage
//!
//! ### HTTP Server Mode
//! ```bash
//! litgap serve --port 8000
//! ```
//!
//! ### CLI Mode
//! ```bash
//! litgap search '("air pollution"[TIAB]) AND ("asthma"[TIAB])' --limit 20
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use litgap::article::Article;
use litgap::gemini::{GeminiClient, GeminiConfig};
use litgap::pipeline::{self, SearchParams};
use litgap::pubmed::PubMedClient;
use litgap::scrape::PmcScraper;
use litgap::server::{router, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// PubMed Research Gap Pipeline - Rust Microservice
#[derive(Parser)]
#[command(name = "litgap")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Search PubMed and print the matching articles as JSON
    Search {
        /// PubMed boolean query
        query: String,

        /// Inclusive start of the publication date range (YYYY/MM/DD)
        #[arg(long, default_value = "1900/01/01")]
        start_date: String,

        /// Inclusive end of the publication date range (YYYY/MM/DD)
        #[arg(long, default_value = "3000/01/01")]
        stop_date: String,

        /// Maximum number of articles to retrieve
        #[arg(short, long, default_value = "100")]
        limit: usize,

        /// Batch size for detail fetches
        #[arg(long, default_value = "50")]
        chunk_size: usize,

        /// Include preprints in the results
        #[arg(long)]
        include_preprints: bool,

        /// Restrict to records with free full text
        #[arg(long)]
        free_full_text_only: bool,

        /// Scrape PMC full text for records that carry a PMCID
        #[arg(long)]
        fetch_full_text: bool,

        /// Write the JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a PubMed query from a free-text research idea
    GenerateQuery {
        /// Research idea
        idea: String,
    },

    /// Synthesize research gaps from a JSON article list (the output of `search`)
    Analyze {
        /// Path to a JSON file containing an array of articles
        input: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    // The service is useless without a Gemini credential; refuse to start.
    let api_key = std::env::var("GEMINI_API_KEY")
        .context("A GEMINI_API_KEY is required. Please set it in the environment.")?;
    info!("Gemini API key loaded successfully");

    let gemini = GeminiClient::new(GeminiConfig::new(api_key))?;
    let pubmed = PubMedClient::new()?;
    let scraper = PmcScraper::new()?;

    match cli.command {
        Commands::Serve { port, host } => run_server(host, port, pubmed, scraper, gemini).await,
        Commands::Search {
            query,
            start_date,
            stop_date,
            limit,
            chunk_size,
            include_preprints,
            free_full_text_only,
            fetch_full_text,
            output,
        } => {
            let params = SearchParams {
                query,
                start_date,
                stop_date,
                limit,
                chunk_size,
                exclude_preprints: !include_preprints,
                free_full_text_only,
                fetch_full_text,
            };
            run_search_command(&pubmed, &scraper, &params, output).await
        }
        Commands::GenerateQuery { idea } => {
            let query = gemini.generate_query(&idea).await?;
            println!("{}", query);
            Ok(())
        }
        Commands::Analyze { input } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {:?}", input))?;
            let articles: Vec<Article> =
                serde_json::from_str(&raw).context("Invalid article JSON")?;
            let result = gemini.synthesize_gaps(&articles).await?;
            println!("{}", result);
            Ok(())
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn run_server(
    host: String,
    port: u16,
    pubmed: PubMedClient,
    scraper: PmcScraper,
    gemini: GeminiClient,
) -> Result<()> {
    let state = Arc::new(AppState {
        pubmed,
        scraper,
        gemini,
    });
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Starting HTTP server");
    println!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn run_search_command(
    pubmed: &PubMedClient,
    scraper: &PmcScraper,
    params: &SearchParams,
    output: Option<PathBuf>,
) -> Result<()> {
    let articles = pipeline::run_search(pubmed, scraper, params).await;
    let json = serde_json::to_string_pretty(&articles)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json).with_context(|| format!("Failed to write {:?}", path))?;
            println!("Saved {} articles to {:?}", articles.len(), path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
