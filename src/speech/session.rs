use std::sync::Arc;

use crate::speech::segment::SpeechUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Created, waiting for the engine's voices.
    Idle,
    Speaking,
    Paused,
    Completed,
    Failed,
}

/// Cursor-tracked state of one narration pass.
///
/// `cursor` is the index of the next unit to narrate and never exceeds
/// `units.len()`.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    units: Arc<[SpeechUnit]>,
    cursor: usize,
    status: PlaybackStatus,
}

impl PlaybackSession {
    pub fn new(units: Arc<[SpeechUnit]>, start: usize) -> Self {
        let cursor = start.min(units.len());
        Self {
            units,
            cursor,
            status: PlaybackStatus::Idle,
        }
    }

    pub fn units(&self) -> &Arc<[SpeechUnit]> {
        &self.units
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn set_status(&mut self, status: PlaybackStatus) {
        self.status = status;
    }

    pub fn current(&self) -> Option<&SpeechUnit> {
        self.units.get(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.units.len()
    }

    /// Move past the current unit. Returns `false` once at the end.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Narration in progress, or about to be.
    pub fn is_live(&self) -> bool {
        matches!(self.status, PlaybackStatus::Idle | PlaybackStatus::Speaking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::segment::segment;

    fn units(text: &str) -> Arc<[SpeechUnit]> {
        segment(text).into()
    }

    #[test]
    fn test_start_is_clamped() {
        let session = PlaybackSession::new(units("A. B."), 10);
        assert_eq!(session.cursor(), 2);
        assert!(session.is_finished());
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut session = PlaybackSession::new(units("A. B."), 0);
        assert_eq!(session.current().unwrap().speakable(), "A.");
        assert!(session.advance());
        assert!(session.advance());
        assert!(!session.advance());
        assert_eq!(session.cursor(), 2);
        assert!(session.current().is_none());
    }

    #[test]
    fn test_new_session_is_idle_and_live() {
        let session = PlaybackSession::new(units("A."), 0);
        assert_eq!(session.status(), PlaybackStatus::Idle);
        assert!(session.is_live());
    }
}
