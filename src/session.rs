//! Run state machine: HOME → PLAYING ⇄ PAUSED → (CELEBRATE →) RESULTS.
//!
//! The host drives everything through `on_tick(timestamp_ms)` and the action
//! methods; it reads back `hud()` and drains `take_events()` after each call.
//! Actions requested from a phase where they do not apply are ignored.

use crate::catalog::FACTS;
use crate::celebration::{Celebration, CelebrationConfig};
use crate::difficulty::{Difficulty, SpeedRamp};
use crate::game::{GameEvent, GameState, Hud, MusicCue, Outcome, PlayArea};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Home,
    Playing,
    Paused,
    Celebrate,
    Results,
}

/// What the results screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub outcome: Outcome,
    pub title: &'static str,
    pub heading: &'static str,
    pub body: &'static str,
    pub score: u32,
}

const WIN_TITLE: &str = "Impact Reached! 🎉";
const WIN_HEADING: &str = "Great job!";
const WIN_BODY: &str = "Your Impact bar hit 100%. Thanks for learning and sharing clean water facts.";
const RUN_COMPLETE_TITLE: &str = "Run Complete!";

#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    difficulty: Difficulty,
    area: PlayArea,
    ramp: Option<SpeedRamp>,
    state: GameState,
    rng: Pcg32,
    /// Timestamp of the previous frame; None means the next frame uses dt = 0.
    last_frame_ms: Option<f64>,
    celebration: Option<Celebration>,
    summary: Option<RunSummary>,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(seed: u64, difficulty: Difficulty, area: PlayArea, ramp: Option<SpeedRamp>) -> Self {
        Self {
            phase: Phase::Home,
            difficulty,
            area,
            ramp,
            state: GameState::new(difficulty.config(), area, ramp),
            rng: Pcg32::seed_from_u64(seed),
            last_frame_ms: None,
            celebration: None,
            summary: None,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Preset used by the next `start_run(None)` or `play_again`.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[inline]
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn hud(&self) -> Hud {
        self.state.hud()
    }

    /// True while the host should keep delivering frames.
    pub fn wants_frames(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::Celebrate)
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// HOME/RESULTS → PLAYING with a fresh run. `difficulty` is resolved by
    /// name, falling back to the default preset.
    pub fn start_run(&mut self, difficulty: Option<&str>) {
        if !matches!(self.phase, Phase::Home | Phase::Results) {
            return;
        }
        if let Some(name) = difficulty {
            self.difficulty = Difficulty::from_name(name);
        }
        self.state = GameState::new(self.difficulty.config(), self.area, self.ramp);
        self.last_frame_ms = None;
        self.celebration = None;
        self.summary = None;
        self.set_phase(Phase::Playing);
        self.events.push(GameEvent::Music(MusicCue::Start));
        log::info!("run started: difficulty={}", self.difficulty.name());
    }

    /// RESULTS → PLAYING with the same preset.
    pub fn play_again(&mut self) {
        if self.phase == Phase::Results {
            self.start_run(None);
        }
    }

    pub fn pause(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.set_phase(Phase::Paused);
        self.events.push(GameEvent::Music(MusicCue::Pause));
    }

    pub fn resume(&mut self) {
        if self.phase != Phase::Paused {
            return;
        }
        self.last_frame_ms = None;
        self.set_phase(Phase::Playing);
        self.events.push(GameEvent::Music(MusicCue::Resume));
    }

    /// RESULTS → HOME, or abandon a paused run. Ignored during the celebration.
    pub fn go_home(&mut self) {
        match self.phase {
            Phase::Results => {}
            Phase::Paused => self.events.push(GameEvent::Music(MusicCue::Stop)),
            _ => return,
        }
        self.set_phase(Phase::Home);
    }

    pub fn share_result(&self) -> String {
        format!("I scored {} in Drop Run!", self.state.score)
    }

    pub fn set_player_lane(&mut self, lane: i32) {
        if self.phase == Phase::Playing {
            self.state.set_player_lane(lane);
        }
    }

    /// Relative move, as produced by arrow keys or swipes.
    pub fn shift_lane(&mut self, delta: i32) {
        self.set_player_lane(self.state.player_lane as i32 + delta);
    }

    /// One frame. Only does work while PLAYING or CELEBRATE.
    pub fn on_tick(&mut self, now_ms: f64) {
        match self.phase {
            Phase::Playing => self.tick_playing(now_ms),
            Phase::Celebrate => self.tick_celebration(now_ms),
            _ => {}
        }
    }

    fn tick_playing(&mut self, now_ms: f64) {
        let dt = match self.last_frame_ms {
            Some(prev) => ((now_ms - prev).max(0.0) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        self.state.maybe_spawn(now_ms, &mut self.rng);
        self.state.advance(dt, &mut self.events);
        self.state.remaining_secs -= dt;

        match self.state.termination() {
            Some(Outcome::Impact) => self.begin_celebration(now_ms),
            Some(Outcome::Normal) => self.finish_normal(),
            None => {}
        }
    }

    fn begin_celebration(&mut self, now_ms: f64) {
        self.last_frame_ms = None;
        self.summary = Some(RunSummary {
            outcome: Outcome::Impact,
            title: WIN_TITLE,
            heading: WIN_HEADING,
            body: WIN_BODY,
            score: self.state.score,
        });
        self.events.push(GameEvent::Music(MusicCue::Stop));
        self.events.push(GameEvent::RunEnded {
            outcome: Outcome::Impact,
            title: WIN_TITLE,
            heading: WIN_HEADING,
            body: WIN_BODY,
        });
        let celebration = Celebration::start(CelebrationConfig::default(), now_ms);
        self.events.push(GameEvent::CelebrationBurst {
            size: celebration.opening_burst(),
        });
        self.celebration = Some(celebration);
        self.set_phase(Phase::Celebrate);
        log::info!("impact reached: score={}", self.state.score);
    }

    fn finish_normal(&mut self) {
        self.last_frame_ms = None;
        let fact = FACTS[self.rng.random_range(0..FACTS.len())];
        self.summary = Some(RunSummary {
            outcome: Outcome::Normal,
            title: RUN_COMPLETE_TITLE,
            heading: fact.title,
            body: fact.text,
            score: self.state.score,
        });
        self.events.push(GameEvent::Music(MusicCue::Stop));
        self.events.push(GameEvent::RunEnded {
            outcome: Outcome::Normal,
            title: RUN_COMPLETE_TITLE,
            heading: fact.title,
            body: fact.text,
        });
        self.set_phase(Phase::Results);
        log::info!(
            "run complete: score={} lives={} time_left={:.1}",
            self.state.score,
            self.state.lives,
            self.state.remaining_secs.max(0.0)
        );
    }

    fn tick_celebration(&mut self, now_ms: f64) {
        let Some(celebration) = self.celebration.as_mut() else {
            return;
        };
        let mut bursts = Vec::new();
        let finished = celebration.poll(now_ms, &mut bursts);
        self.events
            .extend(bursts.into_iter().map(|size| GameEvent::CelebrationBurst { size }));
        if finished {
            self.celebration = None;
            self.events.push(GameEvent::CelebrationFinished);
            self.set_phase(Phase::Results);
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        log::debug!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}
