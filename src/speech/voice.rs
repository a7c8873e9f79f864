use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::speech::{
    engine::{NarrationEngine, Voice},
    errors::SpeechError,
};

pub const DEFAULT_PREFERRED_VOICE: &str = "Google US English";

/// Backoff schedule for the one-time wait on an engine's voice list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceWait {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl Default for VoiceWait {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Poll `engine` until it reports at least one voice.
pub async fn wait_for_voices(
    engine: &dyn NarrationEngine,
    wait: VoiceWait,
) -> Result<Vec<Voice>, SpeechError> {
    let deadline = Instant::now() + wait.timeout;
    let mut delay = wait.initial_delay;

    loop {
        let voices = engine.voices().await;
        if !voices.is_empty() {
            debug!("{} voices available", voices.len());
            return Ok(voices);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(SpeechError::NarrationUnsupported(format!(
                "no voices became available within {:?}",
                wait.timeout
            )));
        }

        sleep(delay.min(deadline - now)).await;
        delay = (delay * 2).min(wait.max_delay);
    }
}

/// Preferred voice when present (name substring match), else the first one.
pub fn select_voice(voices: &[Voice], preferred: &str) -> Option<Voice> {
    voices
        .iter()
        .find(|voice| !preferred.is_empty() && voice.name.contains(preferred))
        .or_else(|| voices.first())
        .cloned()
}
