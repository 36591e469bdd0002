// tests/gateway_http.rs
//
// HTTP-level tests for the gateway Router without opening a gateway socket.
// The router is exercised via tower::ServiceExt::oneshot; only the fake
// upstream listens on a real port.

mod common;

use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::FakeUpstream;
use recap::gateway::{router, UpstreamClient};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

const BODY_LIMIT: usize = 1024 * 1024;

async fn gateway_for(upstream_url: &str, timeout_secs: u64) -> Router {
    let settings = common::gateway_settings(upstream_url, timeout_secs);
    router(UpstreamClient::new(&settings).expect("build upstream client"))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, headers, bytes)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

fn post_json(uri: &str, payload: Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST")
}

#[tokio::test]
async fn health_returns_ok() {
    let app = gateway_for("http://127.0.0.1:9", 1).await;
    let (status, _, bytes) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["status"], "ok");
}

#[tokio::test]
async fn missing_parameters_are_rejected_without_upstream_call() {
    let upstream = FakeUpstream::default();
    let url = upstream.spawn().await;

    let cases = [
        get("/summaries"),
        get("/summaries?q=%20%20"),
        get("/youtube-summaries"),
        get("/youtube-summaries?keyword="),
        get("/tts"),
        post_json("/summarize-originals", json!({ "originals": [] })),
        post_json("/summarize-originals", json!({ "originals": ["", "  "] })),
        post_json("/summarize-originals", json!({})),
    ];

    for req in cases {
        let uri = req.uri().to_string();
        let (status, _, bytes) = send(gateway_for(&url, 5).await, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} should be 400");
        let v: Json = serde_json::from_slice(&bytes).expect("error body is JSON");
        assert_eq!(v["status"], 400);
        assert!(v["message"].as_str().is_some_and(|m| !m.is_empty()));
    }
    assert_eq!(upstream.hits(), 0, "validation must precede any upstream call");
}

#[tokio::test]
async fn news_and_videos_are_relayed() {
    let upstream = FakeUpstream::default();
    let url = upstream.spawn().await;

    let (status, _, bytes) = send(gateway_for(&url, 5).await, get("/summaries?q=sports&sort=date")).await;
    assert_eq!(status, StatusCode::OK);
    let news: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(news.as_array().unwrap().len(), 2);
    assert_eq!(news[0]["summary"], "<b>First</b> (date)");

    let (_, _, bytes) = send(gateway_for(&url, 5).await, get("/summaries?q=sports")).await;
    let news: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(news[0]["summary"], "<b>First</b> (sim)", "sort defaults to sim");

    let (status, _, bytes) = send(gateway_for(&url, 5).await, get("/youtube-summaries?keyword=sports")).await;
    assert_eq!(status, StatusCode::OK);
    let videos: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(videos[0]["video_id"], "vid00000001");
}

#[tokio::test]
async fn unknown_sort_is_rejected() {
    let upstream = FakeUpstream::default();
    let url = upstream.spawn().await;
    let (status, _, _) = send(gateway_for(&url, 5).await, get("/summaries?q=x&sort=newest")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn upstream_status_and_detail_pass_through() {
    let upstream = FakeUpstream::default();
    let url = upstream.spawn().await;

    let uri = format!("/summaries?q={}", common::MISSING);
    let (status, _, bytes) = send(gateway_for(&url, 5).await, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["status"], 404);
    assert_eq!(v["message"], "no news for keyword");
    assert_eq!(v["detail"]["detail"], "no news for keyword");
}

#[tokio::test]
async fn upstream_timeout_becomes_structured_error() {
    let upstream = FakeUpstream::default();
    let url = upstream.spawn().await;

    let uri = format!("/summaries?q={}", common::SLOW);
    let (status, _, bytes) = send(gateway_for(&url, 1).await, get(&uri)).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["status"], 504);
}

#[tokio::test]
async fn unreachable_upstream_becomes_500() {
    // Bind then drop a listener to get a port nothing answers on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let (status, _, bytes) = send(gateway_for(&url, 2).await, get("/youtube-summaries?keyword=x")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["status"], 500);
    assert!(v.get("detail").is_none());
}

#[tokio::test]
async fn non_json_upstream_payload_is_malformed() {
    let upstream = FakeUpstream::default();
    let url = upstream.spawn().await;

    let uri = format!("/summaries?q={}", common::GARBAGE);
    let (status, _, bytes) = send(gateway_for(&url, 5).await, get(&uri)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert!(v["message"].as_str().unwrap().contains("Malformed"));
}

#[tokio::test]
async fn resummarize_forwards_non_blank_originals() {
    let upstream = FakeUpstream::default();
    upstream.set_audio_url(Some("/tts?file_id=sum-1"));
    let url = upstream.spawn().await;

    let req = post_json("/summarize-originals", json!({ "originals": ["one", "", "two"] }));
    let (status, _, bytes) = send(gateway_for(&url, 5).await, req).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["summary"], "Combined summary of 2 texts");
    assert_eq!(v["audio_url"], "/tts?file_id=sum-1");
    assert_eq!(upstream.originals.lock().unwrap()[0], vec!["one", "two"]);
}

#[tokio::test]
async fn audio_bytes_and_content_type_pass_through() {
    let upstream = FakeUpstream::default();
    let url = upstream.spawn().await;

    let (status, headers, bytes) = send(gateway_for(&url, 5).await, get("/tts?file_id=clip-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "inline; filename=\"clip-1.mp3\""
    );
    assert_eq!(bytes, b"ID3-bytes-for-clip-1");
    assert_eq!(
        headers[header::CONTENT_LENGTH],
        b"ID3-bytes-for-clip-1".len().to_string().as_str()
    );

    let (_, headers, _) = send(gateway_for(&url, 5).await, get("/tts?file_id=clip.wav")).await;
    assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
}
