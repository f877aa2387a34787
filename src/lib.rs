//! # litgap
//!
//! PubMed Research Gap Pipeline - Rust Microservice
//!
//! ## Modules
//!
//! - [`pubmed`] - E-utilities client (esearch/efetch)
//! - [`medline`] - PubMed article XML parsing
//! - [`scrape`] - PMC full-text scraping
//! - [`gemini`] - Generative Language API client
//! - [`prompts`] - Prompt templates for the generative calls
//! - [`pipeline`] - Search orchestration
//! - [`server`] - HTTP API
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use litgap::pipeline::{self, SearchParams};
//! use litgap::pubmed::PubMedClient;
//! use litgap::scrape::PmcScraper;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pubmed = PubMedClient::new()?;
//!     let scraper = PmcScraper::new()?;
//!     let params: SearchParams = serde_json::from_str(r#"{"query": "asthma"}"#)?;
//!     let articles = pipeline::run_search(&pubmed, &scraper, &params).await;
//!     println!("Found {} articles", articles.len());
//!     Ok(())
//! }
//! ```

pub mod article;
pub mod error;
pub mod gemini;
pub mod medline;
pub mod pipeline;
pub mod prompts;
pub mod pubmed;
pub mod scrape;
pub mod server;

pub use error::{LitgapError, Result};
