use std::sync::Arc;

use crate::{
    config::Config,
    extraction::{ExtractionService, ServiceSetupError},
    summarizer::{self, ExtractiveSummarizer, Summarizer, SummaryMode},
};

#[derive(Clone)]
pub struct AppState {
    pub extraction: Arc<ExtractionService>,
    /// Backs `/summarize`. The configured strategy, or the extractive one
    /// when the pipeline runs without summaries.
    pub summarizer: Arc<dyn Summarizer>,
    pub summary_mode: SummaryMode,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, ServiceSetupError> {
        let summarizer = summarizer::from_config(config)?;
        let extraction = ExtractionService::from_config_with(config, summarizer.clone())?;
        Ok(Self {
            extraction: Arc::new(extraction),
            summarizer: summarizer.unwrap_or_else(|| Arc::new(ExtractiveSummarizer)),
            summary_mode: config.summary_mode(),
        })
    }
}
