//! Best-effort full-text scraping from PubMed Central article pages.
//!
//! The page layout is owned by a third party, so the extraction hinges on a
//! single accessibility attribute and every failure maps to a typed
//! [`FullText`] outcome instead of an error. A failed scrape must never be
//! fatal to the surrounding search request.

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::info;
use url::Url;

use crate::article::FullText;
use crate::error::{LitgapError, Result};

/// Base URL for PMC article pages
pub const PMC_ARTICLE_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/articles";

/// User agent string for requests; PMC blocks obvious non-browser clients
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Per-page timeout in seconds
const SCRAPE_TIMEOUT_SECS: u64 = 20;

/// PMC page scraper with an injectable base URL for testing.
#[derive(Debug, Clone)]
pub struct PmcScraper {
    client: reqwest::Client,
    base_url: String,
}

impl PmcScraper {
    /// Create a scraper against the production PMC host.
    pub fn new() -> Result<Self> {
        Self::with_base_url(PMC_ARTICLE_URL)
    }

    /// Create a scraper against a custom host (used by tests).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Url::parse(base_url).map_err(|e| {
            LitgapError::Config(format!("Invalid PMC base URL '{}': {}", base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LitgapError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch and extract the full text for one PMCID.
    ///
    /// Always returns one of the four outcomes; transport and HTTP-status
    /// failures become [`FullText::Failed`] with the first line of the error.
    pub async fn fetch_full_text(&self, pmcid: &str) -> FullText {
        let url = format!("{}/{}/", self.base_url, pmcid);
        info!(pmcid = %pmcid, "Scraping full text");

        let outcome = match self.fetch_page(&url).await {
            Ok(html) => extract_article_text(&html),
            Err(e) => return FullText::Failed(first_line(&e.to_string())),
        };
        match outcome {
            Ok(full_text) => full_text,
            Err(e) => FullText::Failed(first_line(&e.to_string())),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .timeout(Duration::from_secs(SCRAPE_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LitgapError::Api {
                code: status.as_u16() as i32,
                message: format!("HTTP error: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

/// Extract paragraph text from the article content container.
///
/// The container is identified by its accessibility label; paragraph texts
/// are trimmed and space-joined.
pub fn extract_article_text(html: &str) -> Result<FullText> {
    let container_selector = Selector::parse(r#"[aria-label="Article content"]"#)
        .map_err(|e| LitgapError::Parse(e.to_string()))?;
    let paragraph_selector =
        Selector::parse("p").map_err(|e| LitgapError::Parse(e.to_string()))?;

    let document = Html::parse_document(html);

    let Some(container) = document.select(&container_selector).next() else {
        return Ok(FullText::ContainerNotFound);
    };

    let text = container
        .select(&paragraph_selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(if text.is_empty() {
        FullText::Empty
    } else {
        FullText::Text(text)
    })
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or("").to_string()
}
