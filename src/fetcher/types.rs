use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use reqwest::StatusCode;
use url::Url;

/// Character encoding a document was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static Encoding);

impl Charset {
    pub fn from_encoding(encoding: &'static Encoding) -> Self {
        Self(encoding)
    }

    /// Resolve a charset label such as `utf-8` or `latin1` (WHATWG rules).
    pub fn from_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().to_lowercase().as_bytes()).map(Self)
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.0
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self(encoding_rs::UTF_8)
    }
}

/// A fetched HTML document, decoded to UTF-8.
#[derive(Debug)]
pub struct PageResponse {
    /// URL after redirects; relative links in the document resolve against it.
    pub url_final: Url,
    pub status: StatusCode,
    pub content_type: String,
    pub body_utf8: String,
    pub charset: Charset,
    pub fetched_at: DateTime<Utc>,
}

impl PageResponse {
    /// Build a response for an in-memory document. Used by tests and fuzzing.
    pub fn from_html(url: Url, html: impl Into<String>) -> Self {
        Self {
            url_final: url,
            status: StatusCode::OK,
            content_type: "text/html; charset=utf-8".to_string(),
            body_utf8: html.into(),
            charset: Charset::default(),
            fetched_at: Utc::now(),
        }
    }
}
