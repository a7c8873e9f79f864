use async_trait::async_trait;
use std::{
    process::Stdio,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{
    process::{Child, Command},
    sync::OnceCell,
    time::{sleep, timeout},
};
use tracing::{debug, warn};

use crate::speech::engine::{EngineError, NarrationEngine, Utterance, Voice};

pub const DEFAULT_PROGRAM: &str = "espeak-ng";

const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(2);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The child process of the utterance currently playing.
#[derive(Debug)]
struct Playback {
    id: u64,
    child: Child,
}

/// Narration through a local `espeak-ng` compatible program.
///
/// Each utterance is one child process. `cancel` kills it on the spot, without
/// waiting for the speaking task to be polled again. Availability is checked
/// once at construction and the voice list is read once from
/// `<program> --voices`.
#[derive(Debug)]
pub struct CommandEngine {
    program: String,
    available: bool,
    words_per_minute: Option<u32>,
    voices: OnceCell<Vec<Voice>>,
    current: Mutex<Option<Playback>>,
    next_id: AtomicU64,
}

impl CommandEngine {
    /// Check that `program --version` runs, then build the engine around it.
    pub async fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        let available = answers_version(&program).await;
        if !available {
            warn!("{} is not usable for narration", program);
        }
        Self {
            program,
            available,
            words_per_minute: None,
            voices: OnceCell::new(),
            current: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn with_rate(mut self, words_per_minute: u32) -> Self {
        self.words_per_minute = Some(words_per_minute);
        self
    }

    async fn load_voices(&self) -> Vec<Voice> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                parse_voice_list(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                warn!("{} --voices exited with {}", self.program, output.status);
                Vec::new()
            }
            Err(err) => {
                warn!("failed to list voices with {}: {}", self.program, err);
                Vec::new()
            }
        }
    }

    fn current(&self) -> MutexGuard<'_, Option<Playback>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install `next` as the playing utterance, killing whatever played before.
    fn replace_current(&self, next: Option<Playback>) {
        let previous = std::mem::replace(&mut *self.current(), next);
        if let Some(mut previous) = previous {
            if let Err(err) = previous.child.start_kill() {
                debug!("utterance {} already gone: {}", previous.id, err);
            }
        }
    }

    /// Drop the playback `id` from the slot, killing it, if it still owns it.
    fn release(&self, id: u64) {
        let mut current = self.current();
        if current.as_ref().is_some_and(|playback| playback.id == id)
            && let Some(mut playback) = current.take()
        {
            let _ = playback.child.start_kill();
        }
    }
}

/// Releases the engine slot when a `speak` future is dropped early.
struct PlaybackGuard<'a> {
    engine: &'a CommandEngine,
    id: u64,
}

impl Drop for PlaybackGuard<'_> {
    fn drop(&mut self) {
        self.engine.release(self.id);
    }
}

async fn answers_version(program: &str) -> bool {
    let status = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();

    matches!(timeout(VERSION_CHECK_TIMEOUT, status).await, Ok(Ok(status)) if status.success())
}

#[async_trait]
impl NarrationEngine for CommandEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn voices(&self) -> Vec<Voice> {
        if let Some(voices) = self.voices.get() {
            return voices.clone();
        }
        // An empty list is not cached so a later poll can try again
        let voices = self.load_voices().await;
        if !voices.is_empty() {
            let _ = self.voices.set(voices.clone());
        }
        voices
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), EngineError> {
        let mut command = Command::new(&self.program);
        if let Some(voice) = &utterance.voice {
            command.arg("-v").arg(&voice.id);
        }
        if let Some(wpm) = self.words_per_minute {
            command.arg("-s").arg(wpm.to_string());
        }
        let child = command
            .arg("--")
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.replace_current(Some(Playback { id, child }));
        let _guard = PlaybackGuard { engine: self, id };
        debug!("spawned {} for {} chars", self.program, utterance.text.len());

        // The child lives in the shared slot so `cancel` can kill it directly;
        // exit is observed by polling.
        loop {
            {
                let mut current = self.current();
                let Some(playback) = current.as_mut().filter(|playback| playback.id == id) else {
                    return Err(EngineError::Interrupted);
                };
                if let Some(status) = playback.child.try_wait()? {
                    *current = None;
                    if status.success() {
                        return Ok(());
                    }
                    return Err(EngineError::Synthesis(format!(
                        "{} exited with {}",
                        self.program, status
                    )));
                }
            }
            sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    fn cancel(&self) {
        self.replace_current(None);
    }
}

/// Parse the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            match columns.as_slice() {
                [_priority, lang, _age_gender, name, _file, ..] => {
                    Some(Voice::new(*lang, name.replace('_', " "), *lang))
                }
                _ => None,
            }
        })
        .collect()
}
