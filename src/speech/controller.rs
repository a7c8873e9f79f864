use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::speech::{
    engine::{DEFAULT_LANG, EngineError, NarrationEngine, Utterance},
    errors::SpeechError,
    segment::{SpeechUnit, segment},
    session::{PlaybackSession, PlaybackStatus},
    voice::{DEFAULT_PREFERRED_VOICE, VoiceWait, select_voice, wait_for_voices},
};

/// How a narration ended, short of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every unit was narrated.
    Completed,
    /// `stop` was called; `cursor` is where `resume` picks up.
    Stopped { cursor: usize },
    /// A newer `speak` or `resume` replaced this narration.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Substring of the voice name to prefer when the engine offers it.
    pub preferred_voice: String,
    /// BCP 47 language tag set on every utterance.
    pub lang: String,
    pub voice_wait: VoiceWait,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            preferred_voice: DEFAULT_PREFERRED_VOICE.to_string(),
            lang: DEFAULT_LANG.to_string(),
            voice_wait: VoiceWait::default(),
        }
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    session: Option<PlaybackSession>,
    /// Bumped on every new session; a driver whose id no longer matches has
    /// been superseded.
    session_id: u64,
    /// Token of the driver currently allowed to touch the engine.
    active: Option<CancellationToken>,
}

fn lock(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sentence-by-sentence narration with stop and resume.
///
/// One controller owns one engine and at most one live session. Starting a
/// new narration always cancels the previous one first, so two sessions can
/// never drive the engine at the same time. Narration runs on a Tokio task;
/// `speak` and `resume` must be called from within a Tokio runtime.
pub struct SpeechController {
    engine: Arc<dyn NarrationEngine>,
    options: Arc<ControllerOptions>,
    state: Arc<Mutex<ControllerState>>,
}

impl SpeechController {
    pub fn new(engine: Arc<dyn NarrationEngine>) -> Self {
        Self::with_options(engine, ControllerOptions::default())
    }

    pub fn with_options(engine: Arc<dyn NarrationEngine>, options: ControllerOptions) -> Self {
        Self {
            engine,
            options: Arc::new(options),
            state: Arc::new(Mutex::new(ControllerState::default())),
        }
    }

    /// Narrate `text` starting at unit `start_unit`, replacing any narration
    /// in progress.
    ///
    /// An `Ok` from the returned [`Narration`] does not by itself mean the text
    /// was read to the end. Only [`PlaybackOutcome::Completed`] reports that.
    /// [`PlaybackOutcome::Stopped`] carries the cursor left by [`stop`](Self::stop),
    /// and [`PlaybackOutcome::Superseded`] means a later `speak` or `resume`
    /// took over before this one finished.
    pub fn speak(&self, text: &str, start_unit: usize) -> Narration {
        let units: Arc<[SpeechUnit]> = segment(text).into();
        info!("speaking {} units from {}", units.len(), start_unit);
        self.start(units, start_unit)
    }

    /// Halt narration immediately and remember the current unit.
    ///
    /// No-op unless a narration is speaking or waiting for voices.
    pub fn stop(&self) {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        let Some(session) = state.session.as_mut() else {
            return;
        };
        if !session.is_live() {
            return;
        }

        if let Some(token) = state.active.take() {
            token.cancel();
        }
        self.engine.cancel();
        session.set_status(PlaybackStatus::Paused);
        info!("narration stopped at unit {}", session.cursor());
    }

    /// Continue the last session from its recorded cursor.
    ///
    /// Returns `None` when there is nothing to resume or narration is already
    /// running. A completed session is replayed from the beginning. The
    /// returned [`Narration`] resolves with the same outcomes as
    /// [`speak`](Self::speak).
    pub fn resume(&self) -> Option<Narration> {
        let (units, start) = {
            let guard = lock(&self.state);
            let session = guard.session.as_ref()?;
            match session.status() {
                PlaybackStatus::Idle | PlaybackStatus::Speaking => return None,
                PlaybackStatus::Completed => (session.units().clone(), 0),
                PlaybackStatus::Paused | PlaybackStatus::Failed => {
                    (session.units().clone(), session.cursor())
                }
            }
        };
        info!("resuming narration at unit {}", start);
        Some(self.start(units, start))
    }

    /// `Idle` when no session exists yet.
    pub fn status(&self) -> PlaybackStatus {
        lock(&self.state)
            .session
            .as_ref()
            .map_or(PlaybackStatus::Idle, PlaybackSession::status)
    }

    pub fn cursor(&self) -> usize {
        lock(&self.state)
            .session
            .as_ref()
            .map_or(0, PlaybackSession::cursor)
    }

    /// Units of the current session.
    pub fn units(&self) -> Option<Arc<[SpeechUnit]>> {
        lock(&self.state)
            .session
            .as_ref()
            .map(|session| session.units().clone())
    }

    fn start(&self, units: Arc<[SpeechUnit]>, start_unit: usize) -> Narration {
        let token = CancellationToken::new();
        let available = self.engine.is_available();
        let id = {
            let mut guard = lock(&self.state);
            let state = &mut *guard;

            if let Some(previous) = state.active.take() {
                previous.cancel();
            }
            self.engine.cancel();

            state.session_id += 1;
            let mut session = PlaybackSession::new(units, start_unit);

            if !available {
                session.set_status(PlaybackStatus::Failed);
                state.session = Some(session);
                return Narration::ready(Err(SpeechError::NarrationUnsupported(
                    "no narration engine on this system".to_string(),
                )));
            }
            if session.is_finished() {
                session.set_status(PlaybackStatus::Completed);
                state.session = Some(session);
                return Narration::ready(Ok(PlaybackOutcome::Completed));
            }

            state.session = Some(session);
            state.active = Some(token.clone());
            state.session_id
        };

        let driver = Driver {
            engine: self.engine.clone(),
            options: self.options.clone(),
            state: self.state.clone(),
            id,
            token,
        };
        let span = info_span!("narration", session = id, start = start_unit);
        Narration::running(tokio::spawn(driver.run().instrument(span)))
    }
}

impl std::fmt::Debug for SpeechController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechController")
            .field("options", &self.options)
            .field("status", &self.status())
            .field("cursor", &self.cursor())
            .finish()
    }
}

/// Task that walks one session through the engine.
struct Driver {
    engine: Arc<dyn NarrationEngine>,
    options: Arc<ControllerOptions>,
    state: Arc<Mutex<ControllerState>>,
    id: u64,
    token: CancellationToken,
}

impl Driver {
    async fn run(self) -> Result<PlaybackOutcome, SpeechError> {
        let voices = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Ok(self.interrupted()),
            voices = wait_for_voices(self.engine.as_ref(), self.options.voice_wait) => voices,
        };
        let voices = match voices {
            Ok(voices) => voices,
            Err(err) => return self.fail(err),
        };
        let voice = select_voice(&voices, &self.options.preferred_voice);
        if let Some(voice) = &voice {
            debug!("using voice {} ({})", voice.name, voice.id);
        }

        {
            let mut guard = lock(&self.state);
            if !self.owns(&guard) {
                return Ok(self.outcome(&guard));
            }
            if let Some(session) = guard.session.as_mut() {
                session.set_status(PlaybackStatus::Speaking);
            }
        }

        loop {
            let unit = {
                let mut guard = lock(&self.state);
                if !self.owns(&guard) {
                    return Ok(self.outcome(&guard));
                }
                let state = &mut *guard;
                let Some(session) = state.session.as_mut() else {
                    return Ok(PlaybackOutcome::Superseded);
                };
                match session.current().cloned() {
                    Some(unit) if unit.is_blank() => {
                        session.advance();
                        continue;
                    }
                    Some(unit) => unit,
                    None => {
                        session.set_status(PlaybackStatus::Completed);
                        state.active = None;
                        info!("narration completed");
                        return Ok(PlaybackOutcome::Completed);
                    }
                }
            };

            let utterance = Utterance {
                text: unit.speakable().to_string(),
                voice: voice.clone(),
                lang: self.options.lang.clone(),
            };
            debug!("speaking unit {}", unit.index());

            let result = tokio::select! {
                biased;
                _ = self.token.cancelled() => None,
                result = self.engine.speak(&utterance) => Some(result),
            };

            // A completion that arrives after stop or supersession must not
            // move the cursor.
            let mut guard = lock(&self.state);
            let Some(result) = result.filter(|_| self.owns(&guard)) else {
                return Ok(self.outcome(&guard));
            };
            let state = &mut *guard;
            let Some(session) = state.session.as_mut() else {
                return Ok(PlaybackOutcome::Superseded);
            };
            match result {
                Ok(()) => {
                    session.advance();
                }
                Err(err) => {
                    warn!("engine failed on unit {}: {}", unit.index(), err);
                    session.set_status(PlaybackStatus::Failed);
                    state.active = None;
                    return Err(SpeechError::NarrationEngine(err));
                }
            }
        }
    }

    fn owns(&self, state: &ControllerState) -> bool {
        state.session_id == self.id && !self.token.is_cancelled()
    }

    fn outcome(&self, state: &ControllerState) -> PlaybackOutcome {
        if state.session_id != self.id {
            return PlaybackOutcome::Superseded;
        }
        PlaybackOutcome::Stopped {
            cursor: state.session.as_ref().map_or(0, PlaybackSession::cursor),
        }
    }

    fn interrupted(&self) -> PlaybackOutcome {
        self.outcome(&lock(&self.state))
    }

    fn fail(&self, err: SpeechError) -> Result<PlaybackOutcome, SpeechError> {
        let mut guard = lock(&self.state);
        if !self.owns(&guard) {
            return Ok(self.outcome(&guard));
        }
        let state = &mut *guard;
        if let Some(session) = state.session.as_mut() {
            session.set_status(PlaybackStatus::Failed);
        }
        state.active = None;
        warn!("narration failed: {}", err);
        Err(err)
    }
}

/// Future of one narration pass, returned by `speak` and `resume`.
///
/// Dropping it does not stop playback; use [`SpeechController::stop`].
#[derive(Debug)]
pub struct Narration {
    inner: NarrationInner,
}

#[derive(Debug)]
enum NarrationInner {
    Ready(Option<Result<PlaybackOutcome, SpeechError>>),
    Running(JoinHandle<Result<PlaybackOutcome, SpeechError>>),
}

impl Narration {
    fn ready(result: Result<PlaybackOutcome, SpeechError>) -> Self {
        Self {
            inner: NarrationInner::Ready(Some(result)),
        }
    }

    fn running(handle: JoinHandle<Result<PlaybackOutcome, SpeechError>>) -> Self {
        Self {
            inner: NarrationInner::Running(handle),
        }
    }
}

impl Future for Narration {
    type Output = Result<PlaybackOutcome, SpeechError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            // Already yielded its result once
            NarrationInner::Ready(result) => result.take().map_or(Poll::Pending, Poll::Ready),
            NarrationInner::Running(handle) => Pin::new(handle).poll(cx).map(|joined| {
                joined.unwrap_or_else(|err| {
                    Err(SpeechError::NarrationEngine(EngineError::Synthesis(
                        format!("narration task ended abnormally: {}", err),
                    )))
                })
            }),
        }
    }
}
