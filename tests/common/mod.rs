//! Fake upstream summarization service shared by the integration tests.
#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use recap::config::GatewaySettings;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Keyword that makes the fake news endpoint hang past the gateway timeout.
pub const SLOW: &str = "slow";
/// Keyword that makes the fake news endpoint answer with an object.
pub const NOT_A_LIST: &str = "notalist";
/// Keyword that makes the fake news endpoint answer 404.
pub const MISSING: &str = "missing";
/// Keyword that makes the fake news endpoint answer plain text.
pub const GARBAGE: &str = "garbage";
/// Original text that makes re-summarize answer with an HTML error page.
pub const HTML_FAILURE: &str = "html please";
/// Original text that makes re-summarize answer JSON without a summary.
pub const NO_SUMMARY: &str = "no summary please";

#[derive(Clone, Default)]
pub struct FakeUpstream {
    pub hits: Arc<AtomicUsize>,
    pub originals: Arc<Mutex<Vec<Vec<String>>>>,
    pub audio_url: Arc<Mutex<Option<String>>>,
}

impl FakeUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn set_audio_url(&self, url: Option<&str>) {
        *self.audio_url.lock().unwrap() = url.map(str::to_string);
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/summaries", get(news))
            .route("/summarize", get(videos))
            .route("/summarize-originals", post(resummarize))
            .route("/tts", get(tts))
            .with_state(self.clone())
    }

    /// Serve the fake on an ephemeral port and return its base address.
    pub async fn spawn(&self) -> String {
        spawn(self.router()).await
    }
}

pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn gateway_settings(upstream_url: &str, timeout_secs: u64) -> GatewaySettings {
    GatewaySettings {
        upstream_url: upstream_url.to_string(),
        timeout_secs,
        connect_timeout_secs: 1,
        ..Default::default()
    }
}

async fn news(
    State(state): State<FakeUpstream>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let q = params.get("q").cloned().unwrap_or_default();
    let sort = params.get("sort").cloned().unwrap_or_default();

    match q.as_str() {
        SLOW => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!([])).into_response()
        }
        NOT_A_LIST => Json(json!({ "items": "unexpected" })).into_response(),
        MISSING => (StatusCode::NOT_FOUND, Json(json!({ "detail": "no news for keyword" })))
            .into_response(),
        GARBAGE => (StatusCode::OK, "definitely not json").into_response(),
        _ => Json(json!([
            {
                "title": format!("{} headline one", q),
                "url": "https://news.example/1",
                "summary": format!("<b>First</b> ({})", sort),
                "description": format!("{} article one body", q)
            },
            {
                "title": format!("{} headline two", q),
                "url": "https://news.example/2",
                "summary": "Second",
                "description": format!("{} article two body", q)
            }
        ]))
        .into_response(),
    }
}

async fn videos(
    State(state): State<FakeUpstream>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let keyword = params.get("keyword").cloned().unwrap_or_default();
    Json(json!([{
        "video_id": "vid00000001",
        "title": format!("{} highlights", keyword),
        "summary": "Video summary",
        "transcript": format!("{} video transcript", keyword)
    }]))
    .into_response()
}

async fn resummarize(
    State(state): State<FakeUpstream>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let originals: Vec<String> = body["originals"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    state.originals.lock().unwrap().push(originals.clone());

    if originals.iter().any(|o| o == HTML_FAILURE) {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            "<html>upstream exploded</html>",
        )
            .into_response();
    }
    if originals.iter().any(|o| o == NO_SUMMARY) {
        return Json(json!({ "error": "summary model unavailable" })).into_response();
    }

    let mut reply = json!({ "summary": format!("Combined summary of {} texts", originals.len()) });
    if let Some(url) = state.audio_url.lock().unwrap().clone() {
        reply["audio_url"] = json!(url);
    }
    Json(reply).into_response()
}

async fn tts(
    State(state): State<FakeUpstream>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let file_id = params.get("file_id").cloned().unwrap_or_default();
    let content_type = if file_id.ends_with("wav") {
        "audio/wav"
    } else {
        "audio/mpeg"
    };
    (
        [(header::CONTENT_TYPE, content_type)],
        format!("ID3-bytes-for-{}", file_id).into_bytes(),
    )
        .into_response()
}
