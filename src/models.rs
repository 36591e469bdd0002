//! Data types shared by the gateway and the client.

use crate::error::{RecapError, Result};
use serde::{Deserialize, Serialize};

/// Ordering requested for news results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Most relevant first (upstream value `sim`).
    #[default]
    #[serde(rename = "sim", alias = "relevance")]
    Relevance,
    /// Most recent first.
    #[serde(rename = "date")]
    Date,
}

impl SortMode {
    /// Value sent on the wire as the `sort` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            SortMode::Relevance => "sim",
            SortMode::Date => "date",
        }
    }
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sim" | "relevance" => Ok(SortMode::Relevance),
            "date" => Ok(SortMode::Date),
            _ => Err(format!("Unknown sort mode: {}", s)),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query())
    }
}

/// A validated keyword search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub sort: SortMode,
}

impl SearchQuery {
    /// Build a query, rejecting blank keywords.
    pub fn new(keyword: &str, sort: SortMode) -> Result<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(RecapError::Validation("Enter a search keyword".to_string()));
        }
        Ok(Self {
            keyword: keyword.to_string(),
            sort,
        })
    }
}

/// A summarized news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    /// Article URL, also the item's stable identifier.
    pub url: String,
    /// Article body kept for re-summarization.
    #[serde(rename = "description", default)]
    pub original_text: String,
    #[serde(rename = "summary", default)]
    pub summary_html: String,
}

/// A summarized video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub video_id: String,
    pub title: String,
    /// Transcript kept for re-summarization.
    #[serde(rename = "transcript", default)]
    pub original_text: String,
    #[serde(rename = "summary", default)]
    pub summary_html: String,
}

impl VideoItem {
    /// Short watch link for the video.
    pub fn watch_url(&self) -> String {
        format!("https://youtu.be/{}", self.video_id)
    }
}

/// Something that can be rendered in a result list and selected.
pub trait ListItem: Clone + std::fmt::Debug {
    /// Stable identifier (URL for news, video id for videos).
    fn key(&self) -> &str;
    /// Unsummarized source text.
    fn original_text(&self) -> &str;
    fn title(&self) -> &str;
    fn summary_html(&self) -> &str;
}

impl ListItem for NewsItem {
    fn key(&self) -> &str {
        &self.url
    }

    fn original_text(&self) -> &str {
        &self.original_text
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn summary_html(&self) -> &str {
        &self.summary_html
    }
}

impl ListItem for VideoItem {
    fn key(&self) -> &str {
        &self.video_id
    }

    fn original_text(&self) -> &str {
        &self.original_text
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn summary_html(&self) -> &str {
        &self.summary_html
    }
}

/// Body of a re-summarize call. Never empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResummarizeRequest {
    pub originals: Vec<String>,
}

impl ResummarizeRequest {
    /// Build a request from original texts, dropping blank entries.
    pub fn new<I, S>(originals: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let originals: Vec<String> = originals
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.trim().is_empty())
            .collect();

        if originals.is_empty() {
            return Err(RecapError::EmptySelection);
        }
        Ok(Self { originals })
    }
}

/// Opaque locator for a synthesized audio clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioRef(pub String);

impl AudioRef {
    /// Resolve the identifier understood by the `/tts` passthrough.
    ///
    /// Accepts a full URL, a relative path with a `file_id` query parameter,
    /// or a bare identifier.
    pub fn file_id(&self) -> String {
        let raw = self.0.trim();
        let parsed = url::Url::parse(raw)
            .or_else(|_| url::Url::parse("http://localhost/").and_then(|base| base.join(raw)));

        if let Ok(parsed) = parsed {
            if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == "file_id") {
                return id.into_owned();
            }
        }
        raw.to_string()
    }
}

/// A successful re-summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResummarizeResult {
    pub summary: String,
    pub audio_ref: Option<AudioRef>,
}

/// Any well-formed JSON answer to a re-summarize call, success or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResummarizeReply {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ResummarizeReply {
    /// Split into a result, or the application-level failure message.
    pub fn into_result(self) -> std::result::Result<ResummarizeResult, String> {
        match self.summary.filter(|s| !s.trim().is_empty()) {
            Some(summary) => Ok(ResummarizeResult {
                summary,
                audio_ref: self
                    .audio_url
                    .filter(|u| !u.trim().is_empty())
                    .map(AudioRef),
            }),
            None => Err(self
                .message
                .or(self.error)
                .or_else(|| match self.detail {
                    Some(serde_json::Value::String(s)) => Some(s),
                    Some(other) => Some(other.to_string()),
                    None => None,
                })
                .unwrap_or_else(|| "No summary was returned".to_string())),
        }
    }
}

/// Binary audio as relayed from upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub content_type: String,
    pub bytes: Vec<u8>,
}
