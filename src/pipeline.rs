//! Search orchestration.
//!
//! One pass per request: PMID search → truncate to the requested limit →
//! chunked detail fetch → XML parsing → optional per-record full-text
//! scraping. Failures degrade to fewer results; a bad chunk never aborts the
//! chunks after it.

use serde::Deserialize;
use tracing::{info, warn};

use crate::article::Article;
use crate::medline;
use crate::pubmed::{PubMedClient, SearchOptions};
use crate::scrape::PmcScraper;

/// Parameters for one search; doubles as the `/search` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    /// PubMed boolean query
    pub query: String,
    /// Inclusive start of the publication date range, "YYYY/MM/DD"
    #[serde(default = "default_start_date")]
    pub start_date: String,
    /// Inclusive end of the publication date range, "YYYY/MM/DD"
    #[serde(default = "default_stop_date")]
    pub stop_date: String,
    /// Cap on the number of PMIDs processed
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Batch size for detail fetches
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_true")]
    pub exclude_preprints: bool,
    #[serde(default)]
    pub free_full_text_only: bool,
    /// Attempt PMC full-text scraping for records with a PMCID
    #[serde(default)]
    pub fetch_full_text: bool,
}

fn default_start_date() -> String {
    "1900/01/01".to_string()
}

fn default_stop_date() -> String {
    "3000/01/01".to_string()
}

fn default_limit() -> usize {
    100
}

fn default_chunk_size() -> usize {
    50
}

fn default_true() -> bool {
    true
}

impl SearchParams {
    fn search_options(&self) -> SearchOptions {
        SearchOptions {
            query: self.query.clone(),
            start_date: self.start_date.clone(),
            stop_date: self.stop_date.clone(),
            exclude_preprints: self.exclude_preprints,
            free_full_text_only: self.free_full_text_only,
        }
    }
}

/// Run one search request end to end.
pub async fn run_search(
    pubmed: &PubMedClient,
    scraper: &PmcScraper,
    params: &SearchParams,
) -> Vec<Article> {
    info!(
        limit = params.limit,
        fetch_full_text = params.fetch_full_text,
        "Starting search"
    );

    let pmids = pubmed.search_pmids(&params.search_options()).await;
    let mut pmid_list: Vec<String> = pmids.into_iter().collect();
    pmid_list.truncate(params.limit);
    if pmid_list.is_empty() {
        return Vec::new();
    }

    // slice::chunks panics on zero; the parameter invariant is batch size > 0
    let chunk_size = params.chunk_size.max(1);

    let mut articles = Vec::new();
    for chunk in pmid_list.chunks(chunk_size) {
        let Some(xml) = pubmed.fetch_details(chunk).await else {
            continue;
        };

        let safe_xml = medline::strip_control_chars(&xml);
        let records = match medline::parse_article_set(&safe_xml) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Skipping a chunk due to an XML parsing error");
                continue;
            }
        };

        for mut article in records {
            if params.fetch_full_text && !article.pmcid.is_empty() {
                article.full_text = scraper.fetch_full_text(&article.pmcid).await;
            }
            articles.push(article);
        }
    }

    info!(count = articles.len(), "Search complete");
    articles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_defaults() {
        let params: SearchParams =
            serde_json::from_str(r#"{"query": "aspirin"}"#).expect("deserialize");
        assert_eq!(params.query, "aspirin");
        assert_eq!(params.start_date, "1900/01/01");
        assert_eq!(params.stop_date, "3000/01/01");
        assert_eq!(params.limit, 100);
        assert_eq!(params.chunk_size, 50);
        assert!(params.exclude_preprints);
        assert!(!params.free_full_text_only);
        assert!(!params.fetch_full_text);
    }

    #[test]
    fn test_search_params_overrides() {
        let params: SearchParams = serde_json::from_str(
            r#"{"query": "q", "limit": 3, "chunk_size": 1, "exclude_preprints": false, "fetch_full_text": true}"#,
        )
        .expect("deserialize");
        assert_eq!(params.limit, 3);
        assert_eq!(params.chunk_size, 1);
        assert!(!params.exclude_preprints);
        assert!(params.fetch_full_text);
    }

    #[test]
    fn test_search_options_carry_filters() {
        let params: SearchParams = serde_json::from_str(
            r#"{"query": "q", "free_full_text_only": true, "start_date": "2020/01/01"}"#,
        )
        .expect("deserialize");
        let options = params.search_options();
        assert_eq!(options.query, "q");
        assert_eq!(options.start_date, "2020/01/01");
        assert!(options.exclude_preprints);
        assert!(options.free_full_text_only);
    }
}
