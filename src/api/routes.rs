use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State},
    http::{header, HeaderValue},
    response::IntoResponse,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use chrono::Utc;
use std::time::Instant;
use tracing::info;

use crate::error::{Result, AppError};
use crate::api::models::{SummarizeRequest, SummarizeResponse};
use crate::api::response;
use crate::pipeline::{download_file_name, MARKDOWN_MIME};
use crate::summarizer::Summary;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/summarize", post(summarize_handler))
        .route("/api/summarize/download", post(download_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health() -> &'static str {
    "ok"
}

async fn summarize_handler(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<impl IntoResponse> {
    let url = req.url.trim_end();
    let summary = summarize(&state, url).await?;

    Ok(response::success(SummarizeResponse {
        url: url.to_string(),
        word_count: summary.word_count(),
        summary: summary.into_inner(),
        file_name: download_file_name(url),
        mime_type: MARKDOWN_MIME.to_string(),
        generated_at: Utc::now(),
    }))
}

async fn download_handler(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<impl IntoResponse> {
    let url = req.url.trim_end();
    let summary = summarize(&state, url).await?;

    let disposition = format!("attachment; filename=\"{}\"", download_file_name(url));
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| AppError::ValidationError(format!("Unusable download file name: {}", e)))?;
    let content_type = HeaderValue::from_str(&format!("{}; charset=utf-8", MARKDOWN_MIME))
        .map_err(|e| AppError::ConfigError(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        summary.into_inner(),
    ))
}

async fn summarize(state: &AppState, url: &str) -> Result<Summary> {
    info!(url, "processing summarize request");
    let start_time = Instant::now();

    let result = state.pipeline.run(url).await;

    info!(url, elapsed = ?start_time.elapsed(), ok = result.is_ok(), "request processing finished");
    result
}
