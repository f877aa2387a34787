//! Google Generative Language API client.
//!
//! One client, two operations: boolean-query construction from a research
//! idea, and research-gap synthesis over a list of articles. Transport and
//! HTTP-status failures surface as [`LitgapError::Network`]; a response that
//! does not carry candidate text surfaces as [`LitgapError::Parse`]. The
//! HTTP layer maps those to 503 and 500 respectively. No retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::article::Article;
use crate::error::{LitgapError, Result};
use crate::prompts;

/// Generative Language API base URL
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model name
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Query-generation timeout in seconds
const QUERY_TIMEOUT_SECS: u64 = 60;
/// Gap-analysis timeout in seconds; synthesis over 30k chars is slow
const ANALYSIS_TIMEOUT_SECS: u64 = 300;

/// Low temperature for deterministic query strings
const QUERY_TEMPERATURE: f32 = 0.2;
/// Moderate temperature for synthesis prose
const ANALYSIS_TEMPERATURE: f32 = 0.3;
/// Output cap for the synthesis call
const ANALYSIS_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Gemini configuration, fixed at startup and passed into the client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl GeminiConfig {
    /// Configuration against the production endpoint with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Generative Language API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            LitgapError::Config(format!("Invalid Gemini base URL '{}': {}", config.base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LitgapError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Turn a free-text research idea into a PubMed boolean query.
    pub async fn generate_query(&self, idea: &str) -> Result<String> {
        info!(
            idea = %idea.chars().take(80).collect::<String>(),
            "Generating query"
        );
        let prompt = prompts::build_query_prompt(idea);
        let text = self
            .generate(&prompt, QUERY_TEMPERATURE, None, QUERY_TIMEOUT_SECS)
            .await?;
        Ok(text.trim().to_string())
    }

    /// Synthesize research gaps across a list of articles.
    ///
    /// Returns the raw completion text, deliberately untrimmed.
    pub async fn synthesize_gaps(&self, articles: &[Article]) -> Result<String> {
        info!(count = articles.len(), "Starting gap analysis");
        let prompt = prompts::build_analysis_prompt(articles);
        self.generate(
            &prompt,
            ANALYSIS_TEMPERATURE,
            Some(ANALYSIS_MAX_OUTPUT_TOKENS),
            ANALYSIS_TIMEOUT_SECS,
        )
        .await
    }

    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
        max_output_tokens: Option<u32>,
        timeout_secs: u64,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await?
            .error_for_status()?;

        let raw = response.text().await?;
        let data: GenerateResponse = serde_json::from_str(&raw)
            .map_err(|e| LitgapError::Parse(format!("Invalid AI response body: {}", e)))?;

        extract_candidate_text(data)
    }
}

/// Text of the first candidate's first content part.
fn extract_candidate_text(response: GenerateResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| LitgapError::Parse("AI response contained no candidate text".to_string()))
}

// === Generative Language API wire types ===

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_candidate_text() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "(\"x\"[TIAB])"}], "role": "model"}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(
            extract_candidate_text(response).expect("extract"),
            "(\"x\"[TIAB])"
        );
    }

    #[test]
    fn test_extract_fails_without_candidates() {
        let response: GenerateResponse = serde_json::from_str("{}").expect("parse");
        assert!(extract_candidate_text(response).is_err());
    }

    #[test]
    fn test_extract_fails_without_content_parts() {
        let json = r#"{"candidates": [{"content": {"parts": []}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).expect("parse");
        assert!(extract_candidate_text(response).is_err());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hi".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: Some(2048),
            },
        };
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"maxOutputTokens\":2048"));
    }

    #[test]
    fn test_request_omits_absent_output_cap() {
        let request = GenerateRequest {
            contents: vec![],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: None,
            },
        };
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("maxOutputTokens"));
    }
}
