//! Drop Run: three-lane catch-and-dodge arcade game in the terminal.

mod app;
mod audio;
mod catalog;
mod celebration;
mod difficulty;
mod effects;
mod game;
mod input;
mod session;
mod spawner;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_else(|e| {
        log::warn!("theme not loaded, using defaults: {e}");
        theme::Theme::default()
    });
    let seed = args.seed.unwrap_or_else(clock_seed);
    log::info!("droprun starting: seed={seed}");
    let mut app = App::new(args, theme, seed)?;
    app.run()?;
    Ok(())
}

/// The terminal UI owns stdout/stderr, so logs only go to a file when asked.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else { return Ok(()) };
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Three-lane catch-and-dodge arcade game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "droprun",
    version,
    about = "Drop Run: catch clean-water items, dodge hazards, fill the Impact bar.",
    long_about = "Drop Run is a three-lane arcade game in the terminal.\n\n\
        Items fall down three lanes. Catch the good ones (♻ ✨ 🔧) to score and fill \
        the Impact bar; hazards (💥 🛢 ⚠) cost a life and points. Fill Impact to 100% \
        to win. The run also ends when the timer or your lives run out.\n\n\
        CONTROLS:\n  Left/Right, h/l, a/d  Switch lane    P / Esc  Pause\n  \
        Enter/Space  Start / resume    M  Home    R  Play again    S  Share    Q  Quit"
)]
pub struct Args {
    /// Difficulty preset: easy, normal or hard. Unknown names fall back to normal.
    #[arg(short, long, default_value = "normal", value_name = "NAME")]
    pub difficulty: String,

    /// Seed for the game RNG. Same seed and inputs replay the same run.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Keep the fall speed fixed instead of slowly ramping it up.
    #[arg(long)]
    pub no_ramp: bool,

    /// Skip the home screen and start a run immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Disable panel fade effects.
    #[arg(long)]
    pub no_animation: bool,

    /// No terminal bell.
    #[arg(long)]
    pub mute: bool,

    /// Target frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Path to theme file (btop-style theme[key]="value"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
