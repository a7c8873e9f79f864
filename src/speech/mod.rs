pub mod command;
pub mod controller;
pub mod engine;
pub mod errors;
pub mod segment;
pub mod session;
pub mod voice;


pub use command::CommandEngine;
pub use controller::{ControllerOptions, Narration, PlaybackOutcome, SpeechController};
pub use engine::{EngineError, NarrationEngine, Utterance, Voice};
pub use errors::SpeechError;
pub use segment::{SpeechUnit, segment};
pub use session::{PlaybackSession, PlaybackStatus};
pub use voice::{VoiceWait, select_voice, wait_for_voices};
