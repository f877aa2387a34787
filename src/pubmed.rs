//! PubMed E-utilities client.
//!
//! Two-step metadata retrieval: esearch translates a boolean term plus date
//! filters into PMIDs, efetch returns article XML for a batch of PMIDs.
//! Both calls degrade to empty results on failure; the search endpoint never
//! propagates an upstream error to its caller.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};
use url::Url;

use crate::error::{LitgapError, Result};

/// NCBI E-utilities base URL
pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov";
/// esearch endpoint path
pub const ESEARCH_PATH: &str = "/entrez/eutils/esearch.fcgi";
/// efetch endpoint path
pub const EFETCH_PATH: &str = "/entrez/eutils/efetch.fcgi";

/// Cap on the number of PMIDs esearch may report
const ESEARCH_RETMAX: &str = "100000";
/// esearch timeout in seconds
const SEARCH_TIMEOUT_SECS: u64 = 30;
/// efetch timeout in seconds
const FETCH_TIMEOUT_SECS: u64 = 45;

/// Filters applied to a PMID search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Boolean query (already in PubMed syntax)
    pub query: String,
    /// Inclusive start of the publication date range, "YYYY/MM/DD"
    pub start_date: String,
    /// Inclusive end of the publication date range, "YYYY/MM/DD"
    pub stop_date: String,
    /// Append `NOT preprint[pt]` to the term
    pub exclude_preprints: bool,
    /// Append `AND free full text[filter]` to the term
    pub free_full_text_only: bool,
}

/// E-utilities client with an injectable base URL for testing.
#[derive(Debug, Clone)]
pub struct PubMedClient {
    client: reqwest::Client,
    base_url: String,
}

impl PubMedClient {
    /// Create a client against the production E-utilities host.
    pub fn new() -> Result<Self> {
        Self::with_base_url(EUTILS_BASE_URL)
    }

    /// Create a client against a custom host (used by tests).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Url::parse(base_url).map_err(|e| {
            LitgapError::Config(format!("Invalid E-utilities base URL '{}': {}", base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LitgapError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search PubMed for PMIDs matching the query and filters.
    ///
    /// Returns a deduplicated set. Any upstream failure is logged and yields
    /// an empty set; callers cannot distinguish "failed" from "no matches".
    pub async fn search_pmids(&self, options: &SearchOptions) -> HashSet<String> {
        let term = build_search_term(options);
        match self.do_search(&term, options).await {
            Ok(pmids) => {
                info!(
                    count = pmids.len(),
                    query = %options.query.chars().take(50).collect::<String>(),
                    "E-search complete"
                );
                pmids
            }
            Err(e) => {
                error!(error = %e, "Network error while fetching PMIDs");
                HashSet::new()
            }
        }
    }

    async fn do_search(&self, term: &str, options: &SearchOptions) -> Result<HashSet<String>> {
        let url = format!("{}{}", self.base_url, ESEARCH_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("db", "pubmed"),
                ("term", term),
                ("retmode", "json"),
                ("retmax", ESEARCH_RETMAX),
                ("mindate", options.start_date.as_str()),
                ("maxdate", options.stop_date.as_str()),
                ("datetype", "pdat"),
            ])
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;

        let data: ESearchResponse = response.json().await?;
        Ok(data.esearchresult.idlist.into_iter().collect())
    }

    /// Fetch detail XML for a batch of PMIDs in one efetch call.
    ///
    /// Returns `None` for an empty batch or on any upstream failure; there is
    /// no per-identifier partial result.
    pub async fn fetch_details(&self, pmids: &[String]) -> Option<String> {
        if pmids.is_empty() {
            return None;
        }
        match self.do_fetch(pmids).await {
            Ok(xml) => Some(xml),
            Err(e) => {
                error!(error = %e, batch = pmids.len(), "Network error while fetching article details");
                None
            }
        }
    }

    async fn do_fetch(&self, pmids: &[String]) -> Result<String> {
        let url = format!("{}{}", self.base_url, EFETCH_PATH);
        let params = [
            ("db", "pubmed".to_string()),
            ("retmode", "xml".to_string()),
            ("id", pmids.join(",")),
        ];
        let response = self
            .client
            .post(&url)
            .form(&params)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

/// Build the parenthesized boolean term with optional filter clauses.
fn build_search_term(options: &SearchOptions) -> String {
    let mut term = format!("({})", options.query);
    if options.exclude_preprints {
        term.push_str(" NOT preprint[pt]");
    }
    if options.free_full_text_only {
        term.push_str(" AND free full text[filter]");
    }
    term
}

// === esearch response types ===

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: ESearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}
