use async_trait::async_trait;
use thiserror::Error;

pub const DEFAULT_LANG: &str = "en-US";

/// A voice offered by a narration engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Identifier the engine understands (e.g. an espeak voice file).
    pub id: String,
    /// Display name, matched against the preferred voice.
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// One request to speak a single unit of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<Voice>,
    pub lang: String,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("engine process error: {0}")]
    Io(#[from] std::io::Error),

    #[error("utterance interrupted")]
    Interrupted,
}

/// Black-box speech output. At most one utterance plays at a time.
#[async_trait]
pub trait NarrationEngine: Send + Sync {
    /// `false` when no speech output exists on this system at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Currently known voices. May be empty while the engine is still loading.
    async fn voices(&self) -> Vec<Voice>;

    /// Speak one utterance; resolves when it has finished playing.
    ///
    /// After [`cancel`](Self::cancel) the pending call resolves promptly,
    /// usually with [`EngineError::Interrupted`].
    async fn speak(&self, utterance: &Utterance) -> Result<(), EngineError>;

    /// Halt whatever is playing right now. Must not block.
    fn cancel(&self);
}
