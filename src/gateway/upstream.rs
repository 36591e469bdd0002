//! Pooled HTTP client for the upstream summarization service.

use crate::config::GatewaySettings;
use crate::error::{RecapError, Result};
use crate::models::{ResummarizeRequest, SearchQuery};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const NEWS_PATH: &str = "summaries";
const VIDEO_PATH: &str = "summarize";
const RESUMMARIZE_PATH: &str = "summarize-originals";
const AUDIO_PATH: &str = "tts";

/// Client for the upstream service.
///
/// Cloning is cheap and every clone shares the same keep-alive pool.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl UpstreamClient {
    /// Create a client with the pool and deadlines from settings.
    pub fn new(settings: &GatewaySettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .pool_idle_timeout(settings.pool_idle_timeout())
            .tcp_keepalive(settings.pool_idle_timeout())
            .build()?;

        Ok(Self {
            http,
            base: parse_base(&settings.upstream_url)?,
            timeout: settings.timeout(),
        })
    }

    /// Upstream base address.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetch summarized news for a keyword.
    #[instrument(skip(self), fields(keyword = %query.keyword, sort = %query.sort))]
    pub async fn news_summaries(&self, query: &SearchQuery) -> Result<Value> {
        let url = self.endpoint(NEWS_PATH)?;
        let request = self
            .http
            .get(url)
            .query(&[("q", query.keyword.as_str()), ("sort", query.sort.as_query())]);
        self.send_json(request).await
    }

    /// Fetch summarized videos for a keyword.
    #[instrument(skip(self))]
    pub async fn video_summaries(&self, keyword: &str) -> Result<Value> {
        let keyword = require("keyword", keyword)?;
        let url = self.endpoint(VIDEO_PATH)?;
        let request = self.http.get(url).query(&[("keyword", keyword)]);
        self.send_json(request).await
    }

    /// Ask upstream for one consolidated summary of the given originals.
    #[instrument(skip(self, request), fields(originals = request.originals.len()))]
    pub async fn resummarize(&self, request: &ResummarizeRequest) -> Result<Value> {
        let url = self.endpoint(RESUMMARIZE_PATH)?;
        self.send_json(self.http.post(url).json(request)).await
    }

    /// Open the synthesized audio for a file id.
    ///
    /// The response is returned unread so the body can be streamed through.
    #[instrument(skip(self))]
    pub async fn audio(&self, file_id: &str) -> Result<Response> {
        let file_id = require("file_id", file_id)?;
        let url = self.endpoint(AUDIO_PATH)?;
        let response = self
            .http
            .get(url)
            .query(&[("file_id", file_id)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        check_status(response).await
    }

    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Upstream returned non-JSON payload: {}", e);
            RecapError::MalformedResponse(format!("Upstream payload is not valid JSON: {}", e))
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| RecapError::Config(format!("Invalid upstream path {}: {}", path, e)))
    }

    fn transport_error(&self, e: reqwest::Error) -> RecapError {
        if e.is_timeout() {
            warn!("Upstream timed out after {:?}", self.timeout);
            RecapError::UpstreamTimeout(self.timeout.as_secs())
        } else if e.is_decode() {
            RecapError::MalformedResponse(e.to_string())
        } else {
            warn!("Upstream transport failure: {}", e);
            RecapError::Transport(e.to_string())
        }
    }
}

/// Turn a non-success upstream status into a structured error.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("Upstream {} body: {}", status, body);
    Err(upstream_error(status, &body))
}

fn upstream_error(status: StatusCode, body: &str) -> RecapError {
    let detail = match serde_json::from_str::<Value>(body) {
        Ok(v) => Some(v),
        Err(_) if !body.trim().is_empty() => Some(Value::String(body.trim().to_string())),
        Err(_) => None,
    };

    let message = match &detail {
        Some(Value::Object(map)) => map
            .get("detail")
            .or_else(|| map.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
    .unwrap_or_else(|| format!("Upstream returned {}", status));

    RecapError::Upstream {
        status: status.as_u16(),
        message,
        detail,
    }
}

fn require<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RecapError::Validation(format!("Missing required parameter: {}", name)));
    }
    Ok(value)
}

/// Parse the base address so relative joins append instead of replacing.
fn parse_base(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| RecapError::Config(format!("Invalid upstream url {}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_keeps_path_prefix() {
        let base = parse_base("http://svc.local:8080/api").unwrap();
        assert_eq!(base.join(NEWS_PATH).unwrap().as_str(), "http://svc.local:8080/api/summaries");

        let base = parse_base("http://svc.local:8080").unwrap();
        assert_eq!(base.join(AUDIO_PATH).unwrap().as_str(), "http://svc.local:8080/tts");
    }

    #[test]
    fn test_invalid_base_is_config_error() {
        assert!(matches!(parse_base("not a url"), Err(RecapError::Config(_))));
    }

    #[test]
    fn test_upstream_error_extracts_detail() {
        let err = upstream_error(StatusCode::NOT_FOUND, r#"{"detail":"no results"}"#);
        match err {
            RecapError::Upstream { status, message, detail } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no results");
                assert!(detail.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = upstream_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.status_code(), 502);
        assert!(err.detail().is_none());
    }

    #[tokio::test]
    async fn test_blank_inputs_fail_before_network() {
        let mut settings = GatewaySettings::default();
        // Nothing listens here; a network attempt would surface as Transport.
        settings.upstream_url = "http://127.0.0.1:9".to_string();
        let client = UpstreamClient::new(&settings).unwrap();

        assert!(matches!(
            client.video_summaries("  ").await,
            Err(RecapError::Validation(_))
        ));
        assert!(matches!(client.audio("").await, Err(RecapError::Validation(_))));
    }
}
