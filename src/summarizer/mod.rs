//! Text condensation behind a single contract.
//!
//! Two strategies are provided: a deterministic first-sentences summary and a
//! remote text-generation model. Callers pick one through [`SummaryMode`] and
//! only ever see the [`Summarizer`] trait.

pub mod extractive;
pub mod generative;

use async_trait::async_trait;
use serde::Serialize;
use std::{fmt, str::FromStr, sync::Arc};
use thiserror::Error;
use utoipa::ToSchema;

pub use extractive::ExtractiveSummarizer;
pub use generative::GenerativeSummarizer;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("nothing to summarize")]
    EmptyInput,

    #[error("no API key configured for the generative summarizer")]
    MissingApiKey,

    #[error("summarization request timed out")]
    Timeout,

    #[error("summarization request failed: {0}")]
    Request(String),

    #[error("summarization service is rate limiting requests")]
    RateLimited,

    #[error("summarization service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed summarization response: {0}")]
    MalformedResponse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Condense `text`. One outbound call at most, never retried.
    async fn summarize(&self, text: &str) -> Result<String, SummarizationError>;

    /// Short strategy name for logs.
    fn name(&self) -> &'static str;
}

/// Which summarizer, if any, the extraction pipeline runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    #[default]
    Off,
    Extractive,
    Generative,
}

impl FromStr for SummaryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "false" => Ok(Self::Off),
            "extractive" | "local" => Ok(Self::Extractive),
            "generative" | "gemini" => Ok(Self::Generative),
            other => Err(format!(
                "unknown summary mode '{}' (expected off, extractive or generative)",
                other
            )),
        }
    }
}

impl fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Extractive => "extractive",
            Self::Generative => "generative",
        };
        f.write_str(name)
    }
}

/// Build the summarizer selected by `config`, `None` when summaries are off.
pub fn from_config(config: &Config) -> Result<Option<Arc<dyn Summarizer>>, SummarizationError> {
    let summarizer: Arc<dyn Summarizer> = match config.summary_mode() {
        SummaryMode::Off => return Ok(None),
        SummaryMode::Extractive => Arc::new(ExtractiveSummarizer),
        SummaryMode::Generative => Arc::new(GenerativeSummarizer::from_config(config)?),
    };
    Ok(Some(summarizer))
}
