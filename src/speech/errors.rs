use thiserror::Error;

use crate::speech::engine::EngineError;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("speech synthesis not supported: {0}")]
    NarrationUnsupported(String),

    #[error("narration failed: {0}")]
    NarrationEngine(#[from] EngineError),
}

impl SpeechError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NarrationUnsupported(_) => "narration_unsupported",
            Self::NarrationEngine(_) => "narration_engine_error",
        }
    }
}
