//! Client-side access to the gateway.

use crate::error::{RecapError, Result};
use crate::gateway::ErrorBody;
use crate::models::{AudioClip, ResummarizeReply, ResummarizeRequest, SearchQuery};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Longest slice of an unexpected body kept in an error message.
const BODY_PREVIEW_CHARS: usize = 500;

/// Operations the client needs from the gateway.
///
/// List fetches return the raw JSON so the caller decides how to render
/// payloads of the wrong shape.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Fetch summarized news.
    async fn news_summaries(&self, query: &SearchQuery) -> Result<Value>;

    /// Fetch summarized videos.
    async fn video_summaries(&self, keyword: &str) -> Result<Value>;

    /// Request one consolidated summary.
    ///
    /// Any well-formed JSON answer is returned as a reply, whatever its
    /// status; only unreachable or unreadable answers are errors.
    async fn resummarize(&self, request: &ResummarizeRequest) -> Result<ResummarizeReply>;

    /// Download synthesized audio.
    async fn audio(&self, file_id: &str) -> Result<AudioClip>;
}

/// [`GatewayApi`] over HTTP.
pub struct HttpGateway {
    http: reqwest::Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(gateway_url: &str) -> Result<Self> {
        let mut raw = gateway_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|e| RecapError::Config(format!("Invalid gateway url {}: {}", raw, e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| RecapError::Config(format!("Invalid gateway path {}: {}", path, e)))
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .http
            .get(self.endpoint(path)?)
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(|e| RecapError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl GatewayApi for HttpGateway {
    async fn news_summaries(&self, query: &SearchQuery) -> Result<Value> {
        self.get_json(
            "summaries",
            &[("q", query.keyword.as_str()), ("sort", query.sort.as_query())],
        )
        .await
    }

    async fn video_summaries(&self, keyword: &str) -> Result<Value> {
        self.get_json("youtube-summaries", &[("keyword", keyword)]).await
    }

    async fn resummarize(&self, request: &ResummarizeRequest) -> Result<ResummarizeReply> {
        let response = self
            .http
            .post(self.endpoint("summarize-originals")?)
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        debug!("summarize-originals answered {} ({} bytes)", status, body.len());

        if !is_json {
            return Err(RecapError::MalformedResponse(preview(&body)));
        }
        serde_json::from_str(&body).map_err(|e| RecapError::MalformedResponse(e.to_string()))
    }

    async fn audio(&self, file_id: &str) -> Result<AudioClip> {
        let response = self
            .http
            .get(self.endpoint("tts")?)
            .query(&[("file_id", file_id)])
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();
        let bytes = response.bytes().await.map_err(transport)?;

        Ok(AudioClip {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

fn transport(e: reqwest::Error) -> RecapError {
    if e.is_timeout() {
        RecapError::Transport(format!("gateway timed out: {}", e))
    } else {
        RecapError::Transport(e.to_string())
    }
}

/// Map a gateway error response back into a structured error.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => RecapError::Upstream {
            status: err.status,
            message: err.message,
            detail: err.detail,
        },
        Err(_) => RecapError::Upstream {
            status: status.as_u16(),
            message: if body.trim().is_empty() {
                format!("Gateway returned {}", status)
            } else {
                preview(&body)
            },
            detail: None,
        },
    })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let body = "가".repeat(600);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }

    #[test]
    fn test_invalid_gateway_url() {
        assert!(matches!(HttpGateway::new("::nope"), Err(RecapError::Config(_))));
        assert!(HttpGateway::new("http://127.0.0.1:3000").is_ok());
    }
}
