use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    config::Config,
    extraction::{
        errors::ExtractionError,
        model::{ArticleResult, ExtractionRequest},
    },
    extractor::{ContentExtractor, ReadabilityExtractor, detect_language},
    fetcher::{DocumentFetcher, FetchError, HttpFetcher},
    summarizer::{self, SummarizationError, Summarizer},
};

/// Tunables of the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSettings {
    pub domain_denylist: Vec<String>,
    pub min_content_length: usize,
    pub summary_input_cap: usize,
}

impl ExtractionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            domain_denylist: config.domain_denylist().to_vec(),
            min_content_length: config.min_content_length(),
            summary_input_cap: config.summary_input_cap(),
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// URL in, article (or summary) out.
///
/// Performs one outbound fetch and at most one summarization call per
/// request. Nothing is retried; callers may retry the whole request.
#[derive(Clone)]
pub struct ExtractionService {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<dyn ContentExtractor>,
    summarizer: Option<Arc<dyn Summarizer>>,
    settings: ExtractionSettings,
}

impl ExtractionService {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        extractor: Arc<dyn ContentExtractor>,
        summarizer: Option<Arc<dyn Summarizer>>,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            summarizer,
            settings,
        }
    }

    /// Production wiring: reqwest fetcher, readability extractor and the
    /// configured summarizer.
    pub fn from_config(config: &Config) -> Result<Self, ServiceSetupError> {
        let summarizer = summarizer::from_config(config)?;
        Self::from_config_with(config, summarizer)
    }

    /// Like [`from_config`](Self::from_config) but with an already built
    /// summarizer, so callers can share it.
    pub fn from_config_with(
        config: &Config,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Result<Self, ServiceSetupError> {
        let fetcher = HttpFetcher::new(config.request_timeout())?;
        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(ReadabilityExtractor),
            summarizer,
            ExtractionSettings::from_config(config),
        ))
    }

    pub fn summarizes(&self) -> bool {
        self.summarizer.is_some()
    }

    #[instrument(skip_all, fields(url = request.url.as_deref().unwrap_or_default()))]
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ArticleResult, ExtractionError> {
        let url = self.validate(request)?;

        info!("fetching {}", url);
        let page = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(ExtractionError::FetchFailed)?;

        let article = self
            .extractor
            .extract(&page.body_utf8, &page.url_final)
            .filter(|article| !article.text.trim().is_empty())
            .ok_or_else(|| {
                warn!("no readable content at {}", page.url_final);
                ExtractionError::ParseFailed
            })?;

        let length = article.char_count();
        if length < self.settings.min_content_length {
            warn!(
                "content too short: {} < {} chars",
                length, self.settings.min_content_length
            );
            return Err(ExtractionError::ContentTooShort {
                length,
                minimum: self.settings.min_content_length,
            });
        }

        let language = detect_language(&article.text).map(str::to_string);

        let Some(summarizer) = &self.summarizer else {
            info!("extracted {} chars titled {:?}", length, article.title);
            return Ok(ArticleResult::with_body(article.title, article.text, language));
        };

        let input = truncate_chars(&article.text, self.settings.summary_input_cap);
        let summary = summarizer
            .summarize(input)
            .await
            .map_err(ExtractionError::SummarizationFailed)?;

        info!(
            "summarized {} chars into {} with {} strategy",
            length,
            summary.chars().count(),
            summarizer.name()
        );
        Ok(ArticleResult::with_summary(article.title, summary, language))
    }

    /// Presence, denylist, then syntax. Denylisted URLs never reach the network.
    fn validate(&self, request: &ExtractionRequest) -> Result<Url, ExtractionError> {
        let raw = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(ExtractionError::invalid_url)?;

        let lowered = raw.to_lowercase();
        if let Some(domain) = self
            .settings
            .domain_denylist
            .iter()
            .find(|domain| lowered.contains(domain.as_str()))
        {
            warn!("rejecting denylisted source {}", domain);
            return Err(ExtractionError::unsupported(domain));
        }

        let url = Url::parse(raw).map_err(|_| ExtractionError::invalid_url())?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ExtractionError::invalid_url());
        }
        Ok(url)
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Failures while wiring the production service.
#[derive(thiserror::Error, Debug)]
pub enum ServiceSetupError {
    #[error("failed to build fetcher: {0}")]
    Fetcher(#[from] FetchError),
    #[error("failed to build summarizer: {0}")]
    Summarizer(#[from] SummarizationError),
}
