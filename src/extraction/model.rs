use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Input to the extraction pipeline.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ExtractionRequest {
    /// Absolute http(s) URL of the article. Absent or non-string values are
    /// rejected as invalid input.
    #[serde(default)]
    pub url: Option<String>,
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// Output of a successful extraction.
///
/// Exactly one of `body` and `summary` is set: `body` when summaries are
/// off, `summary` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArticleResult {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// ISO 639-1 code detected from the body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ArticleResult {
    pub fn with_body(title: String, body: String, language: Option<String>) -> Self {
        Self {
            title,
            body: Some(body),
            summary: None,
            language,
        }
    }

    pub fn with_summary(title: String, summary: String, language: Option<String>) -> Self {
        Self {
            title,
            body: None,
            summary: Some(summary),
            language,
        }
    }

    /// The narratable text, whichever field carries it.
    pub fn text(&self) -> &str {
        self.summary
            .as_deref()
            .or(self.body.as_deref())
            .unwrap_or_default()
    }
}
