use async_trait::async_trait;

use crate::summarizer::{SummarizationError, Summarizer};

const SENTENCE_SEPARATOR: &str = ". ";
const SUMMARY_SENTENCES: usize = 2;

/// First-two-sentences summary. Deterministic and offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn summarize_text(text: &str) -> Result<String, SummarizationError> {
        if text.trim().is_empty() {
            return Err(SummarizationError::EmptyInput);
        }

        let sentences: Vec<&str> = text.split(SENTENCE_SEPARATOR).collect();
        if sentences.len() <= SUMMARY_SENTENCES {
            return Ok(text.to_string());
        }

        let mut summary = sentences[..SUMMARY_SENTENCES].join(SENTENCE_SEPARATOR);
        summary.push('.');
        Ok(summary)
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        Self::summarize_text(text)
    }

    fn name(&self) -> &'static str {
        "extractive"
    }
}
