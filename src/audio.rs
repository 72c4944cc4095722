//! Audio cues for the terminal: the only output device we can count on is the
//! bell, so effects map to bell patterns and music is tracked as state only.
//!
//! Every failure is swallowed. A game without sound is still a game.

use crate::game::MusicCue;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Good item caught
    Collect,
    /// Hazard caught
    Hit,
    /// Score milestone
    Milestone,
    /// Impact meter filled
    Win,
    /// Run ended without a win
    RunOver,
}

impl SoundEffect {
    /// Number of bell strokes.
    fn bells(&self) -> usize {
        match self {
            SoundEffect::Collect => 0,
            SoundEffect::Hit => 1,
            SoundEffect::Milestone => 1,
            SoundEffect::Win => 2,
            SoundEffect::RunOver => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicState {
    Stopped,
    Playing,
    Paused,
}

pub struct AudioManager {
    out: Option<Box<dyn Write>>,
    muted: bool,
    music: MusicState,
}

impl AudioManager {
    pub fn new(muted: bool) -> Self {
        Self::with_output(Box::new(std::io::stdout()), muted)
    }

    pub fn with_output(out: Box<dyn Write>, muted: bool) -> Self {
        Self {
            out: Some(out),
            muted,
            music: MusicState::Stopped,
        }
    }

    pub fn music(&self) -> MusicState {
        self.music
    }

    pub fn play(&mut self, effect: SoundEffect) {
        if self.muted {
            return;
        }
        let n = effect.bells();
        if n == 0 {
            return;
        }
        let Some(out) = self.out.as_mut() else { return };
        let result = out
            .write_all("\x07".repeat(n).as_bytes())
            .and_then(|()| out.flush());
        if let Err(e) = result {
            // Stop trying after the first failure.
            log::debug!("audio output unavailable: {e}");
            self.out = None;
        }
    }

    pub fn music_cue(&mut self, cue: MusicCue) {
        let next = match (cue, self.music) {
            (MusicCue::Start, _) => MusicState::Playing,
            (MusicCue::Pause, MusicState::Playing) => MusicState::Paused,
            (MusicCue::Resume, MusicState::Paused) => MusicState::Playing,
            (MusicCue::Stop, _) => MusicState::Stopped,
            (_, state) => state,
        };
        if next != self.music {
            log::debug!("music {:?} -> {:?}", self.music, next);
            self.music = next;
        }
    }
}
