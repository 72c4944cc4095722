//! Layout and drawing: home, playfield with HUD sidebar, pause, celebration, results.
//!
//! Reads session state and the effects layer; never mutates either.

use crate::app::MenuState;
use crate::catalog::ItemKind;
use crate::difficulty::Difficulty;
use crate::effects::Effects;
use crate::game::{GameState, LANES, MAX_IMPACT, PlayArea, START_LIVES};
use crate::session::{Phase, Session};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget, Wrap};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Terminal columns per lane (lanes are separated by a one-column divider).
const LANE_COLS: u16 = 9;
const BOARD_MIN_ROWS: u16 = 12;
const BOARD_MAX_ROWS: u16 = 30;
const SIDEBAR_WIDTH: u16 = 24;
const RESULTS_FADE_MS: u32 = 600;

/// Everything a frame needs to read.
pub struct DrawContext<'a> {
    pub session: &'a Session,
    pub effects: &'a Effects,
    pub theme: &'a Theme,
    pub menu: &'a MenuState,
    pub toast: Option<&'a str>,
    pub music_on: bool,
    pub no_animation: bool,
    pub now: Instant,
}

/// tachyonfx fade for the results panel, created on first draw of RESULTS.
#[derive(Default)]
pub struct ResultsFx {
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl ResultsFx {
    pub fn reset(&mut self) {
        self.effect = None;
        self.last_process = None;
    }
}

pub fn draw(frame: &mut Frame, ctx: &DrawContext, results_fx: &mut ResultsFx) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(ctx.theme.bg)), area);
    match ctx.session.phase() {
        Phase::Home => {
            draw_home(frame, ctx, area);
            if ctx.menu.show_help {
                draw_help(frame, ctx.theme, area);
            }
        }
        Phase::Playing => draw_game(frame, ctx, area),
        Phase::Paused => {
            draw_game(frame, ctx, area);
            draw_pause_overlay(frame, ctx.theme, area);
        }
        Phase::Celebrate => draw_game(frame, ctx, area),
        Phase::Results => draw_results(frame, ctx, area, results_fx),
    }
    if let Some(toast) = ctx.toast {
        draw_toast(frame, ctx.theme, area, toast);
    }
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn bold(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn panel(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
}

fn draw_home(frame: &mut Frame, ctx: &DrawContext, area: Rect) {
    let theme = ctx.theme;
    let popup = centered(area, 46, 18);

    let highlight = Style::default()
        .fg(Color::Black)
        .bg(theme.accent)
        .add_modifier(Modifier::BOLD);
    let normal = Style::default().fg(theme.main_fg);
    let tabs: Vec<Span> = Difficulty::ALL
        .iter()
        .flat_map(|d| {
            let label = format!(" {} ", d.name().to_uppercase());
            let style = if *d == ctx.menu.selected { highlight } else { normal };
            [Span::styled(label, style), Span::raw("  ")]
        })
        .collect();

    let cfg = ctx.menu.selected.config();
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" 💧 Drop ", bold(theme.water)),
            Span::styled("Run ", bold(theme.title)),
        ]),
        Line::from(Span::styled(
            "Catch the good, dodge the bad.",
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(" ─ DIFFICULTY ─ ", Style::default().fg(theme.div_line))),
        Line::from(tabs),
        Line::from(Span::styled(
            format!("{}s run · {:.0} fall speed", cfg.timer_secs, cfg.fall_speed),
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(" [ PLAY ] ", highlight)),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↔ ", bold(theme.water)),
            Span::from("DIFFICULTY   "),
            Span::styled(" ENTER ", bold(theme.water)),
            Span::from("PLAY"),
        ]),
        Line::from(vec![
            Span::styled(" ? ", bold(theme.water)),
            Span::from("HOW TO PLAY   "),
            Span::styled(" Q ", bold(theme.bad)),
            Span::from("QUIT"),
        ]),
    ];

    // Slide in from below on first show.
    let elapsed = ctx.now.duration_since(ctx.menu.animation_start).as_millis() as f32;
    let t = (elapsed / 400.0).min(1.0);
    let offset = ((1.0 - t).powi(3) * 6.0) as u16;
    let mut anim = popup;
    anim.y = anim.y.saturating_add(offset).min(area.bottom().saturating_sub(anim.height));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(theme))
        .render(anim, frame.buffer_mut());
}

fn draw_help(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 50, 14);
    frame.render_widget(Clear, popup);
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("←/→ ", bold(theme.water)),
            Span::styled("switch between the three lanes", fg),
        ]),
        Line::from(vec![
            Span::styled("♻ ✨ 🔧 ", bold(theme.good)),
            Span::styled("add points and fill Impact", fg),
        ]),
        Line::from(vec![
            Span::styled("💥 🛢 ⚠ ", bold(theme.bad)),
            Span::styled("cost a life and points", fg),
        ]),
        Line::from(""),
        Line::from(Span::styled("Fill the Impact bar to 100% to win.", fg)),
        Line::from(Span::styled("The run ends when time or lives run out.", fg)),
        Line::from(""),
        Line::from(Span::styled("P pause · ? close", Style::default().fg(theme.inactive_fg))),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(theme).title(Span::styled(" How to play ", bold(theme.title))))
        .render(popup, frame.buffer_mut());
}

/// Board + sidebar, centred.
fn draw_game(frame: &mut Frame, ctx: &DrawContext, area: Rect) {
    let board_w = LANES as u16 * LANE_COLS + (LANES as u16 - 1) + 2;
    let board_h = area.height.saturating_sub(2).clamp(BOARD_MIN_ROWS, BOARD_MAX_ROWS) + 2;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(board_w + SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(board_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_w), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    draw_board(frame, ctx, inner[0]);
    draw_sidebar(frame, ctx, inner[1]);
}

/// Maps logical play-area units onto board cells.
struct BoardMap {
    inner: Rect,
    area: PlayArea,
}

impl BoardMap {
    fn row(&self, y: f32) -> Option<u16> {
        if y < 0.0 {
            return None;
        }
        let r = (y / self.area.height * self.inner.height as f32) as u16;
        (r < self.inner.height).then_some(self.inner.y + r)
    }

    fn lane_left(&self, lane: usize) -> u16 {
        self.inner.x + lane as u16 * (LANE_COLS + 1)
    }

    /// Left column for `text` centred on the lane's logical x-centre.
    fn lane_text_x(&self, lane: usize, text: &str) -> u16 {
        let w = Line::from(text).width() as u16;
        let frac = self.area.lane_center_x(lane) / self.area.width;
        let centre = self.inner.x + (frac * self.inner.width as f32) as u16;
        centre.saturating_sub(w / 2).max(self.inner.x)
    }

    /// Column for a 0..1 fraction of the board width.
    fn x_fraction(&self, x: f32) -> u16 {
        let last = self.inner.width.saturating_sub(1);
        self.inner.x + ((x * last as f32) as u16).min(last)
    }
}

fn draw_board(frame: &mut Frame, ctx: &DrawContext, area: Rect) {
    let theme = ctx.theme;
    let state = ctx.session.state();
    let block = panel(theme).title(Span::styled(" Drop Run ", bold(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    if inner.width < LANES as u16 * (LANE_COLS + 1) - 1 || inner.height < 4 {
        Paragraph::new("Terminal too small")
            .style(Style::default().fg(theme.main_fg))
            .render(inner, frame.buffer_mut());
        return;
    }
    let map = BoardMap {
        inner,
        area: state.area,
    };
    let buf = frame.buffer_mut();

    // Lane dividers and the collection band.
    let (band_top, band_bottom) = state.area.band();
    let band_rows = map.row(band_top).zip(map.row(band_bottom - 1.0));
    for row in inner.y..inner.bottom() {
        let in_band = band_rows.is_some_and(|(a, b)| (a..=b).contains(&row));
        for lane in 1..LANES {
            let x = map.lane_left(lane) - 1;
            buf[(x, row)]
                .set_symbol("│")
                .set_style(Style::default().fg(theme.div_line).bg(theme.bg));
        }
        if in_band {
            for lane in 0..LANES {
                let x0 = map.lane_left(lane);
                for x in x0..x0 + LANE_COLS {
                    buf[(x, row)].set_style(Style::default().bg(theme.div_line));
                }
            }
        }
    }

    for obj in &state.objects {
        let Some(row) = map.row(obj.y) else { continue };
        let color = if obj.item.is_good() { theme.good } else { theme.bad };
        let x = map.lane_text_x(obj.lane, obj.item.icon);
        buf.set_string(x, row, obj.item.icon, Style::default().fg(color));
    }

    draw_player(buf, &map, state, theme, band_rows.map(|(_, b)| b));

    for popup in &ctx.effects.popups {
        let Some((top, _)) = band_rows else { break };
        let rise = (popup.progress() * 3.0) as u16;
        let row = top.saturating_sub(1 + rise).max(inner.y);
        let color = match popup.kind {
            ItemKind::Good => theme.good,
            ItemKind::Bad => theme.bad,
        };
        let x = map.lane_text_x(popup.lane, &popup.text);
        buf.set_string(x, row, &popup.text, bold(color));
    }

    for drop in &ctx.effects.droplets {
        let row = inner.y + (drop.fall() * inner.height.saturating_sub(1) as f32) as u16;
        let x = map.x_fraction(drop.x_at());
        buf[(x, row)].set_symbol("•").set_style(bold(theme.water));
    }

    if let Some(banner) = &ctx.effects.banner {
        let y = inner.y + inner.height / 3;
        let w = Line::from(banner.text.as_str()).width() as u16;
        let x = inner.x + inner.width.saturating_sub(w) / 2;
        buf.set_string(x, y, &banner.text, bold(theme.title).bg(theme.bg));
    }

    if ctx.session.phase() == Phase::Celebrate {
        if let Some(summary) = ctx.session.summary() {
            let y = inner.y + inner.height / 2;
            let w = Line::from(summary.title).width() as u16;
            let x = inner.x + inner.width.saturating_sub(w) / 2;
            buf.set_string(x, y, summary.title, bold(theme.accent).bg(theme.bg));
        }
    }
}

fn draw_player(
    buf: &mut ratatui::buffer::Buffer,
    map: &BoardMap,
    state: &GameState,
    theme: &Theme,
    row: Option<u16>,
) {
    let Some(row) = row else { return };
    const PLAYER: &str = "╰─▲─╯";
    let x = map.lane_text_x(state.player_lane, PLAYER);
    buf.set_string(x, row, PLAYER, bold(theme.accent).bg(theme.div_line));
}

fn draw_sidebar(frame: &mut Frame, ctx: &DrawContext, area: Rect) {
    let theme = ctx.theme;
    let hud = ctx.session.hud();
    let title_style = Style::default().fg(theme.title);
    let fg = Style::default().fg(theme.main_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // stats
            Constraint::Length(1),
            Constraint::Length(4), // impact
            Constraint::Length(1),
            Constraint::Length(6), // keys
        ])
        .split(area);

    let stats_block = panel(theme);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());

    let secs = hud.remaining_secs.ceil() as u32;
    let mut hearts = vec![Span::styled("Lives: ", title_style)];
    hearts.push(Span::styled(
        "♥".repeat(hud.lives as usize),
        Style::default().fg(theme.bad),
    ));
    hearts.push(Span::styled(
        "♡".repeat(START_LIVES.saturating_sub(hud.lives) as usize),
        Style::default().fg(theme.inactive_fg),
    ));
    let stats = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(hud.score.to_string(), fg),
        ]),
        Line::from(hearts),
        Line::from(vec![
            Span::styled("Time:  ", title_style),
            Span::styled(format!("{:02}:{:02}", secs / 60, secs % 60), fg),
        ]),
        Line::from(vec![
            Span::styled("Mode:  ", title_style),
            Span::styled(ctx.session.difficulty().name(), fg),
        ]),
        Line::from(vec![
            Span::styled("Music: ", title_style),
            Span::styled(if ctx.music_on { "♪ on" } else { "off" }, fg),
        ]),
    ];
    Paragraph::new(Text::from(stats)).render(stats_inner, frame.buffer_mut());

    let impact_block = panel(theme).title(Span::styled(" Impact ", title_style));
    let impact_inner = impact_block.inner(chunks[2]);
    impact_block.render(chunks[2], frame.buffer_mut());
    let ratio = (hud.impact as f64 / MAX_IMPACT as f64).clamp(0.0, 1.0);
    Gauge::default()
        .ratio(ratio)
        .label(format!("{}%", hud.impact))
        .gauge_style(Style::default().fg(theme.water).bg(theme.div_line))
        .render(impact_inner, frame.buffer_mut());

    let keys_block = panel(theme);
    let keys_inner = keys_block.inner(chunks[4]);
    keys_block.render(chunks[4], frame.buffer_mut());
    let hint = Style::default().fg(theme.inactive_fg);
    Paragraph::new(Text::from(vec![
        Line::from(Span::styled("←/→  move", hint)),
        Line::from(Span::styled("P    pause", hint)),
        Line::from(Span::styled("Q    quit", hint)),
    ]))
    .render(keys_inner, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 30, 6);
    frame.render_widget(Clear, popup);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Paused ", Style::default().fg(Color::Black).bg(theme.accent))),
        Line::from(""),
        Line::from(Span::styled(
            " P Resume  M Home  Q Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(theme))
        .render(popup, frame.buffer_mut());
}

fn draw_results(frame: &mut Frame, ctx: &DrawContext, area: Rect, results_fx: &mut ResultsFx) {
    let theme = ctx.theme;
    let popup = centered(area, 52, 16);
    let Some(summary) = ctx.session.summary() else {
        return;
    };
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {} ", summary.title), bold(theme.title))),
        Line::from(""),
        Line::from(Span::styled(format!("Score: {}", summary.score), bold(theme.accent))),
        Line::from(""),
        Line::from(Span::styled(summary.heading, bold(theme.water))),
        Line::from(Span::styled(summary.body, fg)),
        Line::from(""),
        Line::from(vec![
            Span::styled(" R ", bold(theme.water)),
            Span::from("PLAY AGAIN  "),
            Span::styled(" M ", bold(theme.water)),
            Span::from("HOME  "),
            Span::styled(" S ", bold(theme.water)),
            Span::from("SHARE  "),
            Span::styled(" Q ", bold(theme.bad)),
            Span::from("QUIT"),
        ]),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(panel(theme).title(Span::styled(" Results ", bold(theme.title))))
        .render(popup, frame.buffer_mut());

    if ctx.no_animation {
        return;
    }
    let delta_ms = results_fx
        .last_process
        .map(|t| ctx.now.saturating_duration_since(t).as_millis().min(u32::MAX as u128) as u32)
        .unwrap_or(0);
    results_fx.last_process = Some(ctx.now);
    let effect = results_fx.effect.get_or_insert_with(|| {
        fx::fade_from(theme.bg, theme.bg, (RESULTS_FADE_MS, Interpolation::QuadOut)).with_area(popup)
    });
    if !effect.done() {
        frame.render_effect(effect, popup, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_toast(frame: &mut Frame, theme: &Theme, area: Rect, text: &str) {
    let w = (Line::from(text).width() as u16 + 4).min(area.width);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.bottom().saturating_sub(4),
        width: w,
        height: 3.min(area.height),
    };
    frame.render_widget(Clear, rect);
    Paragraph::new(Line::from(Span::styled(text.to_string(), bold(theme.main_fg))))
        .alignment(Alignment::Center)
        .block(panel(theme))
        .render(rect, frame.buffer_mut());
}
