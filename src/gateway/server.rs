//! HTTP surface of the relay gateway.

use super::upstream::UpstreamClient;
use crate::error::RecapError;
use crate::models::{ResummarizeRequest, SearchQuery, SortMode};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

const DEFAULT_AUDIO_TYPE: &str = "audio/mpeg";

/// Shared application state.
struct AppState {
    upstream: UpstreamClient,
}

/// Build the gateway router around one shared upstream client.
pub fn router(upstream: UpstreamClient) -> Router {
    let state = Arc::new(AppState { upstream });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/summaries", get(news_summaries))
        .route("/youtube-summaries", get(video_summaries))
        .route("/summarize-originals", post(summarize_originals))
        .route("/tts", get(tts))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct NewsParams {
    q: Option<String>,
    sort: Option<String>,
}

#[derive(Deserialize)]
struct VideoParams {
    keyword: Option<String>,
}

#[derive(Deserialize)]
struct TtsParams {
    file_id: Option<String>,
}

#[derive(Deserialize)]
struct SummarizeOriginalsBody {
    #[serde(default)]
    originals: Vec<String>,
}

/// Error body returned for every failed call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl IntoResponse for RecapError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &self {
            RecapError::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        };
        let body = ErrorBody {
            status: status.as_u16(),
            message,
            detail: self.detail().cloned(),
        };
        (status, Json(body)).into_response()
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[instrument(skip_all)]
async fn news_summaries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsParams>,
) -> Result<Json<serde_json::Value>, RecapError> {
    let keyword = params
        .q
        .ok_or_else(|| RecapError::Validation("Missing required parameter: q".to_string()))?;
    let sort = match params.sort.as_deref() {
        None | Some("") => SortMode::default(),
        Some(raw) => raw.parse().map_err(RecapError::Validation)?,
    };
    let query = SearchQuery::new(&keyword, sort)
        .map_err(|_| RecapError::Validation("Missing required parameter: q".to_string()))?;

    info!(keyword = %query.keyword, sort = %query.sort, "relaying news summaries");
    Ok(Json(state.upstream.news_summaries(&query).await?))
}

#[instrument(skip_all)]
async fn video_summaries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VideoParams>,
) -> Result<Json<serde_json::Value>, RecapError> {
    let keyword = params.keyword.unwrap_or_default();
    info!(keyword = %keyword.trim(), "relaying video summaries");
    Ok(Json(state.upstream.video_summaries(&keyword).await?))
}

#[instrument(skip_all)]
async fn summarize_originals(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SummarizeOriginalsBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, RecapError> {
    let Json(body) = body.map_err(|e| RecapError::Validation(e.body_text()))?;
    let request = ResummarizeRequest::new(body.originals).map_err(|_| {
        RecapError::Validation("originals must contain at least one non-empty text".to_string())
    })?;

    info!(originals = request.originals.len(), "relaying re-summarize request");
    Ok(Json(state.upstream.resummarize(&request).await?))
}

#[instrument(skip_all)]
async fn tts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TtsParams>,
) -> Result<Response, RecapError> {
    let file_id = params.file_id.unwrap_or_default();
    let upstream = state.upstream.audio(&file_id).await?;

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_AUDIO_TYPE)
        .to_string();
    let disposition = format!("inline; filename=\"{}.mp3\"", safe_filename(&file_id));
    let content_length = upstream.headers().get(header::CONTENT_LENGTH).cloned();

    info!(file_id = %file_id.trim(), %content_type, "relaying audio");
    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response();
    if let Some(length) = content_length {
        response.headers_mut().insert(header::CONTENT_LENGTH, length);
    }
    Ok(response)
}

fn safe_filename(file_id: &str) -> String {
    file_id
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename(" abc-1_2 "), "abc-1_2");
        assert_eq!(safe_filename("a\"b/../c"), "ab..c");
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            status: 504,
            message: "late".into(),
            detail: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "status": 504, "message": "late" }));
    }
}
