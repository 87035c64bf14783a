//! HTTP API for the crawl-and-chat pipeline
//!
//! Exposes the scrape trigger, the content-update endpoints, and the chat
//! endpoint. Handlers wrap their fallible work and translate failures into
//! structured JSON error bodies; validation failures are 400s, everything
//! else is a generic 500.

use crate::chat::{ChatReply, ChatResponder};
use crate::crawler::{Crawler, ProcessedPage};
use crate::llm::ChatMessage;
use crate::store::Database;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared state for all handlers
pub struct AppState {
    /// Content and session storage
    pub db: Database,

    /// Crawl coordinator
    pub crawler: Crawler,

    /// Chat responder
    pub responder: ChatResponder,

    /// Domain crawled by `GET /api/scrape`
    pub scrape_domain: String,
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/scrape", get(scrape_handler))
        .route(
            "/api/update-content",
            post(update_content_handler).get(last_update_handler),
        )
        .route("/api/chat", post(chat_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type HandlerError = (StatusCode, Json<serde_json::Value>);

fn internal_error(details: Option<String>) -> HandlerError {
    let body = match details {
        Some(details) => json!({"error": "Internal server error", "details": details}),
        None => json!({"error": "Internal server error"}),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
}

/// Response for `GET /api/scrape`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeResponse {
    message: String,
    // Field name kept for compatibility with existing API consumers
    pages_scrapped: usize,
    db_update_result: usize,
    content: Vec<ProcessedPage>,
}

/// Crawl the configured domain and replace all stored content
async fn scrape_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let outcome = state.crawler.crawl(&state.scrape_domain).await;
    info!(
        "Scrape of {} produced {} pages ({} failures)",
        state.scrape_domain,
        outcome.pages.len(),
        outcome.failures.len()
    );

    let stored = state.db.replace_content(&outcome.pages).await.map_err(|e| {
        error!("Failed to store scraped content: {}", e);
        internal_error(Some(e.to_string()))
    })?;

    Ok(Json(ScrapeResponse {
        message: "Scraping completed".to_string(),
        pages_scrapped: outcome.pages.len(),
        db_update_result: stored,
        content: outcome.pages,
    }))
}

/// Request body for `POST /api/update-content`
#[derive(Debug, Deserialize)]
struct UpdateContentRequest {
    #[serde(default)]
    domain: Option<String>,
}

/// Response for `POST /api/update-content`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateContentResponse {
    message: String,
    count: usize,
    sample_urls: Vec<String>,
}

/// Crawl a caller-supplied domain and replace all stored content
async fn update_content_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateContentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let domain = match request.domain.as_deref() {
        Some(domain) if !domain.trim().is_empty() => domain.trim().to_string(),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Domain is required"})),
            ))
        }
    };

    let outcome = state.crawler.crawl(&domain).await;

    let count = state.db.replace_content(&outcome.pages).await.map_err(|e| {
        error!("Failed to store updated content: {}", e);
        internal_error(Some(e.to_string()))
    })?;

    let sample_urls = outcome
        .pages
        .iter()
        .take(3)
        .map(|page| page.url.clone())
        .collect();

    Ok(Json(UpdateContentResponse {
        message: format!("Content updated from {}", domain),
        count,
        sample_urls,
    }))
}

/// Response for `GET /api/update-content`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LastUpdateResponse {
    last_update: Option<String>,
}

/// Report the update time of the most recently updated content record
async fn last_update_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let latest = state.db.latest_update().await.map_err(|e| {
        error!("Failed to read last update time: {}", e);
        internal_error(None)
    })?;

    let last_update = latest
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .map(|dt| dt.to_rfc3339());

    Ok(Json(LastUpdateResponse { last_update }))
}

/// Request body for `POST /api/chat`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    #[serde(default)]
    session_id: Option<String>,
}

/// Answer one chat turn grounded in the stored content
async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, HandlerError> {
    let reply = state
        .responder
        .respond(&request.messages, request.session_id.as_deref())
        .await
        .map_err(|e| {
            error!("Chat request failed: {}", e);
            internal_error(None)
        })?;

    Ok(Json(reply))
}
