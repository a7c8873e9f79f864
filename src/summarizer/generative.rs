use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    config::Config,
    summarizer::{SummarizationError, Summarizer},
};

const PROMPT_PREFIX: &str = "Summarize the following article in 5-6 clear sentences. \
Reply with the summary only, as plain prose without headings or bullet points.\n\nArticle:\n";
/// Error bodies are echoed into error messages, so keep them short.
const MAX_ERROR_BODY: usize = 300;

/// Summaries from a Gemini-style `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GenerativeSummarizer {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerativeSummarizer {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SummarizationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SummarizationError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SummarizationError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SummarizationError> {
        let api_key = config
            .gemini_api_key()
            .ok_or(SummarizationError::MissingApiKey)?;
        Self::new(
            config.gemini_base_url(),
            config.gemini_model(),
            api_key,
            config.request_timeout(),
        )
    }

    fn prompt(text: &str) -> String {
        format!("{}{}", PROMPT_PREFIX, text.trim())
    }
}

#[async_trait]
impl Summarizer for GenerativeSummarizer {
    #[instrument(skip_all, fields(input_chars = text.chars().count()))]
    async fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        if text.trim().is_empty() {
            return Err(SummarizationError::EmptyInput);
        }

        let prompt = Self::prompt(text);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("summarization service rate limited the request");
            return Err(SummarizationError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationError::Http {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SummarizationError::MalformedResponse(e.to_string()))?;

        let summary = payload
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string();

        if summary.is_empty() {
            return Err(SummarizationError::MalformedResponse(
                "response contained no text".to_string(),
            ));
        }

        debug!("received summary of {} chars", summary.chars().count());
        Ok(summary)
    }

    fn name(&self) -> &'static str {
        "generative"
    }
}

fn map_request_error(err: reqwest::Error) -> SummarizationError {
    if err.is_timeout() {
        SummarizationError::Timeout
    } else {
        SummarizationError::Request(err.to_string())
    }
}
