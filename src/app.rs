//! App: terminal init, frame loop, key dispatch and event fan-out.

use crate::Args;
use crate::audio::{AudioManager, MusicState, SoundEffect};
use crate::catalog::ItemKind;
use crate::difficulty::{Difficulty, SpeedRamp};
use crate::effects::Effects;
use crate::game::{GameEvent, Outcome, PlayArea};
use crate::input::{Action, key_to_action};
use crate::session::{Phase, Session};
use crate::theme::Theme;
use crate::ui::{self, DrawContext, ResultsFx};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use rand::rngs::ThreadRng;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

const TOAST_MS: u64 = 2500;
const MAX_FRAME_RATE: f64 = 240.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub selected: Difficulty,
    pub show_help: bool,
    pub animation_start: Instant,
}

impl MenuState {
    fn new(selected: Difficulty) -> Self {
        Self {
            selected,
            show_help: false,
            animation_start: Instant::now(),
        }
    }
}

struct Toast {
    text: String,
    until: Instant,
}

pub struct App {
    args: Args,
    theme: Theme,
    session: Session,
    audio: AudioManager,
    effects: Effects,
    /// Presentation-only randomness; the session keeps its own seeded RNG.
    fx_rng: ThreadRng,
    menu: MenuState,
    toast: Option<Toast>,
    results_fx: ResultsFx,
    last_phase: Phase,
    clock_start: Instant,
    last_frame: Instant,
}

impl App {
    pub fn new(args: Args, theme: Theme, seed: u64) -> Result<Self> {
        let difficulty = Difficulty::from_name(&args.difficulty);
        let ramp = (!args.no_ramp).then(SpeedRamp::default);
        let mut session = Session::new(seed, difficulty, PlayArea::default(), ramp);
        if args.no_menu {
            session.start_run(None);
        }
        let audio = AudioManager::new(args.mute);
        let now = Instant::now();
        Ok(Self {
            theme,
            last_phase: session.phase(),
            session,
            audio,
            effects: Effects::default(),
            fx_rng: rand::rng(),
            menu: MenuState::new(difficulty),
            toast: None,
            results_fx: ResultsFx::default(),
            clock_start: now,
            last_frame: now,
            args,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
        // Not every terminal supports it; plain presses still work.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let result = ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))
            .context("creating terminal")
            .and_then(|mut terminal| self.run_loop(&mut terminal));

        // Restore
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.args.frame_rate.clamp(1.0, MAX_FRAME_RATE))
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = self.frame_duration();
        loop {
            let now = Instant::now();
            self.step(now);

            let ctx = DrawContext {
                session: &self.session,
                effects: &self.effects,
                theme: &self.theme,
                menu: &self.menu,
                toast: self.toast.as_ref().map(|t| t.text.as_str()),
                music_on: self.audio.music() == MusicState::Playing,
                no_animation: self.args.no_animation,
                now,
            };
            let results_fx = &mut self.results_fx;
            terminal.draw(|f| ui::draw(f, &ctx, results_fx))?;

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else { continue };
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_action(key_to_action(key)) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// One frame of game time plus everything that hangs off it.
    fn step(&mut self, now: Instant) {
        if self.session.wants_frames() {
            let now_ms = now.duration_since(self.clock_start).as_secs_f64() * 1000.0;
            self.session.on_tick(now_ms);
        }
        self.dispatch_events();
        self.sync_phase();

        let delta_ms = now.saturating_duration_since(self.last_frame).as_millis();
        self.last_frame = now;
        self.effects.tick(delta_ms.min(u32::MAX as u128) as u32);
        if self.toast.as_ref().is_some_and(|t| now >= t.until) {
            self.toast = None;
        }
    }

    fn dispatch_events(&mut self) {
        for event in self.session.take_events() {
            match event {
                GameEvent::Collected { lane, kind, text } => {
                    self.audio.play(match kind {
                        ItemKind::Good => SoundEffect::Collect,
                        ItemKind::Bad => SoundEffect::Hit,
                    });
                    self.effects.popup(lane, kind, text);
                }
                GameEvent::Milestone { threshold, message } => {
                    log::debug!("milestone {threshold}: {message}");
                    self.audio.play(SoundEffect::Milestone);
                    self.effects.banner(message);
                }
                GameEvent::RunEnded { outcome, .. } => {
                    self.audio.play(match outcome {
                        Outcome::Impact => SoundEffect::Win,
                        Outcome::Normal => SoundEffect::RunOver,
                    });
                }
                GameEvent::CelebrationBurst { size } => self.effects.rain(size, &mut self.fx_rng),
                GameEvent::CelebrationFinished => {}
                GameEvent::Music(cue) => self.audio.music_cue(cue),
            }
        }
    }

    /// Screen-level resets whenever the session changes phase.
    fn sync_phase(&mut self) {
        let phase = self.session.phase();
        if phase == self.last_phase {
            return;
        }
        match (self.last_phase, phase) {
            (_, Phase::Home) => {
                self.menu = MenuState::new(self.session.difficulty());
                self.effects.clear();
            }
            (Phase::Home | Phase::Results, Phase::Playing) => {
                self.effects.clear();
                self.results_fx.reset();
            }
            (_, Phase::Results) => self.results_fx.reset(),
            _ => {}
        }
        self.last_phase = phase;
    }

    fn show_toast(&mut self, text: String) {
        self.toast = Some(Toast {
            text,
            until: Instant::now() + Duration::from_millis(TOAST_MS),
        });
    }

    /// Returns true when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        if action == Action::Quit {
            return true;
        }
        match self.session.phase() {
            Phase::Home if self.menu.show_help => {
                if matches!(action, Action::Help | Action::Confirm | Action::Pause) {
                    self.menu.show_help = false;
                }
            }
            Phase::Home => match action {
                Action::MoveLeft | Action::Up => self.menu.selected = self.menu.selected.prev(),
                Action::MoveRight | Action::Down => self.menu.selected = self.menu.selected.next(),
                Action::Help => self.menu.show_help = true,
                Action::Confirm => {
                    self.session.select_difficulty(self.menu.selected);
                    self.session.start_run(None);
                }
                _ => {}
            },
            Phase::Playing => match action {
                Action::Pause => self.session.pause(),
                _ => {
                    if let Some(delta) = action.lane_delta() {
                        self.session.shift_lane(delta);
                    }
                }
            },
            Phase::Paused => match action {
                Action::Pause | Action::Confirm => self.session.resume(),
                Action::Home => self.session.go_home(),
                _ => {}
            },
            // The celebration always runs to the end.
            Phase::Celebrate => {}
            Phase::Results => match action {
                Action::PlayAgain | Action::Confirm => self.session.play_again(),
                Action::Home => self.session.go_home(),
                Action::Share => {
                    let text = self.session.share_result();
                    log::info!("share: {text}");
                    self.show_toast(text);
                }
                _ => {}
            },
        }
        self.dispatch_events();
        self.sync_phase();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn make_app(extra: &[&str]) -> App {
        let mut argv = vec!["droprun", "--mute", "--seed", "7"];
        argv.extend_from_slice(extra);
        let args = Args::parse_from(argv);
        App::new(args, Theme::default(), 7).unwrap()
    }

    #[test]
    fn test_menu_selects_difficulty_and_starts() {
        let mut app = make_app(&[]);
        assert_eq!(app.session.phase(), Phase::Home);
        assert!(!app.handle_action(Action::MoveRight));
        assert_eq!(app.menu.selected, Difficulty::Hard);
        app.handle_action(Action::Confirm);
        assert_eq!(app.session.phase(), Phase::Playing);
        assert_eq!(app.session.difficulty(), Difficulty::Hard);
        assert_eq!(app.audio.music(), MusicState::Playing);
    }

    #[test]
    fn test_help_overlay_swallows_keys_until_closed() {
        let mut app = make_app(&[]);
        app.handle_action(Action::Help);
        app.handle_action(Action::MoveLeft);
        assert_eq!(app.menu.selected, Difficulty::Normal);
        app.handle_action(Action::Help);
        app.handle_action(Action::Confirm);
        assert_eq!(app.session.phase(), Phase::Playing);
    }

    #[test]
    fn test_no_menu_and_cli_difficulty() {
        let app = make_app(&["--no-menu", "--difficulty", "EASY"]);
        assert_eq!(app.session.phase(), Phase::Playing);
        assert_eq!(app.session.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_pause_resume_and_home_from_pause() {
        let mut app = make_app(&["--no-menu"]);
        app.handle_action(Action::MoveLeft);
        assert_eq!(app.session.state().player_lane, 0);
        app.handle_action(Action::Pause);
        assert_eq!(app.session.phase(), Phase::Paused);
        assert_eq!(app.audio.music(), MusicState::Paused);
        app.handle_action(Action::MoveRight);
        assert_eq!(app.session.state().player_lane, 0);
        app.handle_action(Action::Home);
        assert_eq!(app.session.phase(), Phase::Home);
        assert_eq!(app.audio.music(), MusicState::Stopped);
    }

    #[test]
    fn test_quit_from_any_screen() {
        let mut app = make_app(&[]);
        assert!(app.handle_action(Action::Quit));
        let mut app = make_app(&["--no-menu"]);
        assert!(app.handle_action(Action::Quit));
    }
}
