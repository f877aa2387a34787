//! HTTP API surface: health, query generation, search, gap analysis.
//!
//! Upstream AI transport failures map to 503, malformed AI responses to 500,
//! both with the `{"detail": ...}` error body the frontend already consumes.
//! Search failures never produce an error status; they degrade to fewer
//! results.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::article::Article;
use crate::error::LitgapError;
use crate::gemini::GeminiClient;
use crate::pipeline::{self, SearchParams};
use crate::pubmed::PubMedClient;
use crate::scrape::PmcScraper;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "litgap backend";

/// Shared clients, constructed once at startup and read-only afterwards.
pub struct AppState {
    pub pubmed: PubMedClient,
    pub scraper: PmcScraper,
    pub gemini: GeminiClient,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/generate-query", post(generate_query_handler))
        .route("/search", post(search_handler))
        .route("/analyze", post(analyze_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error wrapper mapping pipeline errors onto HTTP statuses.
struct ApiError(LitgapError);

impl From<LitgapError> for ApiError {
    fn from(e: LitgapError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            LitgapError::Network(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Could not connect to the AI service: {}", e),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Received an invalid response from the AI service.".to_string(),
            ),
        };
        error!(status = %status, error = %self.0, "Request failed");
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    timestamp: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Deserialize)]
struct IdeaRequest {
    idea: String,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    query: String,
}

async fn generate_query_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IdeaRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = state.gemini.generate_query(&request.idea).await?;
    Ok(Json(QueryResponse { query }))
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(params): Json<SearchParams>,
) -> Json<Vec<Article>> {
    let articles = pipeline::run_search(&state.pubmed, &state.scraper, &params).await;
    Json(articles)
}

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    result: String,
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let result = state.gemini.synthesize_gaps(&request.articles).await?;
    Ok(Json(AnalysisResponse { result }))
}
