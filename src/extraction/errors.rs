use axum::http::StatusCode;
use thiserror::Error;

use crate::{fetcher::FetchError, summarizer::SummarizationError};

/// Every way an extraction request can fail.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{label} links not supported.")]
    UnsupportedSource { domain: String, label: String },

    #[error("Extraction failed")]
    FetchFailed(#[source] FetchError),

    #[error("Could not find readable content on the page")]
    ParseFailed,

    #[error("Content too short or not meaningful ({length} of {minimum} characters)")]
    ContentTooShort { length: usize, minimum: usize },

    #[error("Summarization failed")]
    SummarizationFailed(#[source] SummarizationError),
}

impl ExtractionError {
    pub fn invalid_url() -> Self {
        Self::InvalidInput("Invalid URL".to_string())
    }

    pub fn unsupported(domain: &str) -> Self {
        Self::UnsupportedSource {
            domain: domain.to_string(),
            label: source_label(domain),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::UnsupportedSource { .. } => "unsupported_source",
            Self::FetchFailed(_) => "fetch_failed",
            Self::ParseFailed => "parse_failed",
            Self::ContentTooShort { .. } => "content_too_short",
            Self::SummarizationFailed(_) => "summarization_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::UnsupportedSource { .. } => StatusCode::BAD_REQUEST,
            Self::ParseFailed | Self::ContentTooShort { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::FetchFailed(_) | Self::SummarizationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Underlying cause for server-side failures.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::FetchFailed(err) => Some(err.to_string()),
            Self::SummarizationFailed(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

/// Human label for a denylisted domain.
fn source_label(domain: &str) -> String {
    match domain {
        "twitter.com" | "x.com" => "Twitter/X".to_string(),
        "facebook.com" | "fb.com" => "Facebook".to_string(),
        "instagram.com" => "Instagram".to_string(),
        other => other.to_string(),
    }
}
