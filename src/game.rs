//! Run state: live objects, lane collision, scoring, lives, impact and milestones.

use crate::catalog::{ItemDef, ItemKind};
use crate::difficulty::{RunConfig, SpeedRamp};
use crate::spawner::Spawner;
use rand::Rng;
use std::collections::BTreeSet;

pub const LANES: usize = 3;
pub const START_LANE: usize = 1;
pub const START_LIVES: u8 = 3;
pub const MAX_IMPACT: u32 = 100;

/// Collection band is `[height - BAND_TOP, height - BAND_BOTTOM]`, exclusive.
const BAND_TOP: f32 = 100.0;
const BAND_BOTTOM: f32 = 40.0;
/// Objects further than this below the play area are discarded.
const EXIT_MARGIN: f32 = 40.0;

/// Score thresholds, each announced at most once per run.
pub const MILESTONES: [(u32, &str); 4] = [
    (5, "First drops collected!"),
    (10, "The water is flowing!"),
    (15, "Wells are filling up!"),
    (20, "A whole village supplied!"),
];

/// Playable area in logical units, supplied by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self {
            width: 360.0,
            height: 600.0,
        }
    }
}

impl PlayArea {
    #[inline]
    pub fn lane_width(&self) -> f32 {
        self.width / LANES as f32
    }

    /// Horizontal centre of a lane.
    #[inline]
    pub fn lane_center_x(&self, lane: usize) -> f32 {
        (lane as f32 + 0.5) * self.lane_width()
    }

    /// (top, bottom) of the collection band.
    #[inline]
    pub fn band(&self) -> (f32, f32) {
        (self.height - BAND_TOP, self.height - BAND_BOTTOM)
    }

    #[inline]
    pub fn in_band(&self, y: f32) -> bool {
        let (top, bottom) = self.band();
        y > top && y < bottom
    }

    #[inline]
    pub fn exit_y(&self) -> f32 {
        self.height + EXIT_MARGIN
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallingObject {
    pub id: u32,
    pub lane: usize,
    pub y: f32,
    pub item: ItemDef,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Timer ran out or lives reached zero.
    Normal,
    /// Impact meter filled.
    Impact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCue {
    Start,
    Pause,
    Resume,
    Stop,
}

/// Observable outputs, drained by the host after each tick or action.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Collected { lane: usize, kind: ItemKind, text: String },
    Milestone { threshold: u32, message: &'static str },
    RunEnded { outcome: Outcome, title: &'static str, heading: &'static str, body: &'static str },
    CelebrationBurst { size: u32 },
    CelebrationFinished,
    Music(MusicCue),
}

/// HUD snapshot for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub lives: u8,
    pub impact: u32,
    pub remaining_secs: f32,
}

/// All mutable state of one run. Reset by building a new one.
#[derive(Debug, Clone)]
pub struct GameState {
    pub area: PlayArea,
    pub score: u32,
    pub lives: u8,
    pub impact: u32,
    pub remaining_secs: f32,
    pub player_lane: usize,
    pub fall_speed: f32,
    pub objects: Vec<FallingObject>,
    pub milestones_shown: BTreeSet<u32>,
    ramp: Option<SpeedRamp>,
    spawner: Spawner,
}

impl GameState {
    pub fn new(config: RunConfig, area: PlayArea, ramp: Option<SpeedRamp>) -> Self {
        Self {
            area,
            score: 0,
            lives: START_LIVES,
            impact: 0,
            remaining_secs: config.timer_secs,
            player_lane: START_LANE,
            fall_speed: config.fall_speed,
            objects: Vec::new(),
            milestones_shown: BTreeSet::new(),
            ramp,
            spawner: Spawner::new(config.initial_spawn_gap_ms),
        }
    }

    /// Clamp any requested lane into range.
    pub fn set_player_lane(&mut self, lane: i32) {
        self.player_lane = lane.clamp(0, LANES as i32 - 1) as usize;
    }

    pub fn maybe_spawn<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> bool {
        match self.spawner.maybe_spawn(now_ms, rng) {
            Some(obj) => {
                self.objects.push(obj);
                true
            }
            None => false,
        }
    }

    /// Advance every live object by `dt` seconds and resolve collections and misses.
    ///
    /// Collision is a per-frame positional sample against the band; an object
    /// fast enough to jump the whole band in one frame is not collected.
    pub fn advance(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if let Some(ramp) = self.ramp {
            self.fall_speed = (self.fall_speed + ramp.per_second * dt).min(ramp.max_speed);
        }

        let area = self.area;
        let step = self.fall_speed * dt;
        let mut objects = std::mem::take(&mut self.objects);
        objects.retain_mut(|obj| {
            obj.y += step;
            if obj.lane == self.player_lane && area.in_band(obj.y) {
                log::trace!("collected #{} in lane {}", obj.id, obj.lane);
                self.collect(obj.lane, &obj.item, events);
                return false;
            }
            obj.y <= area.exit_y()
        });
        self.objects = objects;
    }

    fn collect(&mut self, lane: usize, item: &ItemDef, events: &mut Vec<GameEvent>) {
        let pts = item.score_delta;
        match item.kind {
            ItemKind::Good => {
                self.apply_score(pts);
                self.impact = (self.impact + item.impact_delta).min(MAX_IMPACT);
                let text = if pts > 0 { format!("+{pts}") } else { pts.to_string() };
                events.push(GameEvent::Collected { lane, kind: item.kind, text });
                if let Some((threshold, message)) = self.check_milestone() {
                    events.push(GameEvent::Milestone { threshold, message });
                }
            }
            ItemKind::Bad => {
                self.lives = self.lives.saturating_sub(1);
                self.apply_score(pts);
                events.push(GameEvent::Collected {
                    lane,
                    kind: item.kind,
                    text: format!("-1 ♥  {pts}"),
                });
            }
        }
    }

    /// Score floors at zero.
    fn apply_score(&mut self, delta: i32) {
        self.score = (i64::from(self.score) + i64::from(delta)).max(0) as u32;
    }

    /// Announce the lowest unannounced threshold if the score has reached it.
    fn check_milestone(&mut self) -> Option<(u32, &'static str)> {
        let &(threshold, message) = MILESTONES
            .iter()
            .find(|(t, _)| !self.milestones_shown.contains(t))?;
        if self.score < threshold {
            return None;
        }
        self.milestones_shown.insert(threshold);
        Some((threshold, message))
    }

    /// Terminal condition, impact first.
    pub fn termination(&self) -> Option<Outcome> {
        if self.impact >= MAX_IMPACT {
            Some(Outcome::Impact)
        } else if self.remaining_secs <= 0.0 || self.lives == 0 {
            Some(Outcome::Normal)
        } else {
            None
        }
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            lives: self.lives,
            impact: self.impact,
            remaining_secs: self.remaining_secs.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BAD_ITEMS, GOOD_ITEMS};
    use crate::difficulty::Difficulty;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn state() -> GameState {
        GameState::new(Difficulty::Normal.config(), PlayArea::default(), None)
    }

    fn item(icon: &str) -> ItemDef {
        GOOD_ITEMS
            .iter()
            .chain(BAD_ITEMS.iter())
            .copied()
            .find(|i| i.icon == icon)
            .unwrap()
    }

    /// Place an object so that one `advance(0.0)` samples it at `y`.
    fn drop_at(state: &mut GameState, lane: usize, y: f32, icon: &str) {
        state.objects.push(FallingObject {
            id: state.objects.len() as u32 + 100,
            lane,
            y,
            item: item(icon),
        });
    }

    fn band_mid(state: &GameState) -> f32 {
        let (top, bottom) = state.area.band();
        (top + bottom) / 2.0
    }

    #[test]
    fn test_new_state_defaults() {
        let s = state();
        assert_eq!(s.score, 0);
        assert_eq!(s.lives, 3);
        assert_eq!(s.impact, 0);
        assert_eq!(s.player_lane, 1);
        assert_eq!(s.remaining_secs, 60.0);
        assert!(s.objects.is_empty());
    }

    #[test]
    fn test_good_collection_adds_score_and_impact() {
        let mut s = state();
        let y = band_mid(&s);
        drop_at(&mut s, 1, y, "✨");
        let mut events = Vec::new();
        s.advance(0.0, &mut events);
        assert_eq!(s.score, 10);
        assert_eq!(s.impact, 5);
        assert!(s.objects.is_empty());
        assert!(matches!(&events[0], GameEvent::Collected { text, .. } if text == "+10"));
    }

    #[test]
    fn test_hazard_floors_score_and_costs_a_life() {
        let mut s = state();
        s.score = 5;
        let y = band_mid(&s);
        drop_at(&mut s, 1, y, "💥");
        let mut events = Vec::new();
        s.advance(0.0, &mut events);
        assert_eq!(s.score, 0);
        assert_eq!(s.lives, 2);
        assert!(matches!(&events[0], GameEvent::Collected { kind: ItemKind::Bad, .. }));
    }

    #[test]
    fn test_lives_never_go_below_zero() {
        let mut s = state();
        s.lives = 0;
        let y = band_mid(&s);
        drop_at(&mut s, 1, y, "⚠");
        s.advance(0.0, &mut Vec::new());
        assert_eq!(s.lives, 0);
    }

    #[test]
    fn test_impact_caps_at_hundred() {
        let mut s = state();
        s.impact = 97;
        let y = band_mid(&s);
        drop_at(&mut s, 1, y, "🔧");
        s.advance(0.0, &mut Vec::new());
        assert_eq!(s.impact, 100);
        assert_eq!(s.termination(), Some(Outcome::Impact));
    }

    #[test]
    fn test_other_lane_is_never_collected() {
        let mut s = state();
        let y = band_mid(&s);
        drop_at(&mut s, 0, y, "✨");
        drop_at(&mut s, 2, y, "💥");
        let mut events = Vec::new();
        s.advance(0.0, &mut events);
        assert!(events.is_empty());
        assert_eq!(s.objects.len(), 2);
        assert_eq!((s.score, s.lives), (0, 3));
    }

    #[test]
    fn test_band_edges_are_exclusive() {
        let mut s = state();
        let (top, bottom) = s.area.band();
        drop_at(&mut s, 1, top, "✨");
        drop_at(&mut s, 1, bottom, "✨");
        drop_at(&mut s, 1, top - 30.0, "✨");
        s.advance(0.0, &mut Vec::new());
        assert_eq!(s.score, 0);
        assert_eq!(s.objects.len(), 3);
    }

    #[test]
    fn test_objects_below_exit_are_discarded_silently() {
        let mut s = state();
        s.player_lane = 0;
        let exit = s.area.exit_y();
        drop_at(&mut s, 1, exit + 1.0, "💥");
        drop_at(&mut s, 2, exit - 1.0, "✨");
        let mut events = Vec::new();
        s.advance(0.0, &mut events);
        assert!(events.is_empty());
        assert_eq!(s.objects.len(), 1);
        assert_eq!(s.lives, 3);
    }

    #[test]
    fn test_objects_fall_by_speed_times_dt() {
        let mut s = state();
        drop_at(&mut s, 0, 0.0, "✨");
        s.advance(0.5, &mut Vec::new());
        assert_eq!(s.objects[0].y, 60.0);
    }

    #[test]
    fn test_fast_object_can_skip_the_band() {
        let mut s = state();
        let (top, _) = s.area.band();
        drop_at(&mut s, 1, top - 10.0, "✨");
        // 120 units/s * 0.6 s = 72 units: jumps the 60-unit band.
        s.advance(0.6, &mut Vec::new());
        assert_eq!(s.score, 0);
        assert_eq!(s.objects.len(), 1);
    }

    #[test]
    fn test_speed_ramp_is_capped() {
        let ramp = SpeedRamp::default();
        let mut s = GameState::new(Difficulty::Normal.config(), PlayArea::default(), Some(ramp));
        s.advance(1.0, &mut Vec::new());
        assert_eq!(s.fall_speed, 122.0);
        for _ in 0..200 {
            s.advance(1.0, &mut Vec::new());
        }
        assert_eq!(s.fall_speed, ramp.max_speed);
    }

    #[test]
    fn test_lane_requests_are_clamped() {
        let mut s = state();
        s.set_player_lane(-4);
        assert_eq!(s.player_lane, 0);
        s.set_player_lane(9);
        assert_eq!(s.player_lane, 2);
        s.set_player_lane(1);
        assert_eq!(s.player_lane, 1);
    }

    #[test]
    fn test_one_milestone_per_collection() {
        let mut s = state();
        let y = band_mid(&s);
        drop_at(&mut s, 1, y, "♻");
        let mut events = Vec::new();
        s.advance(0.0, &mut events);
        // 15 points crosses 5, 10 and 15 but only the lowest fires.
        let milestones: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Milestone { threshold, .. } => Some(*threshold),
                _ => None,
            })
            .collect();
        assert_eq!(milestones, vec![5]);

        drop_at(&mut s, 1, y, "✨");
        events.clear();
        s.advance(0.0, &mut events);
        assert!(events.contains(&GameEvent::Milestone {
            threshold: 10,
            message: MILESTONES[1].1,
        }));
    }

    #[test]
    fn test_milestone_not_repeated_after_recrossing() {
        let mut s = state();
        let y = band_mid(&s);
        let mut seen = Vec::new();
        for icon in ["✨", "✨", "💥", "💥", "✨", "✨", "✨"] {
            drop_at(&mut s, 1, y, icon);
            let mut events = Vec::new();
            s.advance(0.0, &mut events);
            seen.extend(events.into_iter().filter_map(|e| match e {
                GameEvent::Milestone { threshold, .. } => Some(threshold),
                _ => None,
            }));
        }
        assert_eq!(seen.iter().filter(|&&t| t == 10).count(), 1);
        assert_eq!(seen.iter().filter(|&&t| t == 5).count(), 1);
    }

    #[test]
    fn test_hazards_never_fire_milestones() {
        let mut s = state();
        s.score = 50;
        let y = band_mid(&s);
        drop_at(&mut s, 1, y, "⚠");
        let mut events = Vec::new();
        s.advance(0.0, &mut events);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Milestone { .. })));
    }

    #[test]
    fn test_termination_priority() {
        let mut s = state();
        assert_eq!(s.termination(), None);
        s.lives = 0;
        assert_eq!(s.termination(), Some(Outcome::Normal));
        s.impact = MAX_IMPACT;
        assert_eq!(s.termination(), Some(Outcome::Impact));
        s.lives = 3;
        s.impact = 0;
        s.remaining_secs = 0.0;
        assert_eq!(s.termination(), Some(Outcome::Normal));
    }

    #[test]
    fn test_lane_centres() {
        let area = PlayArea::default();
        assert_eq!(area.lane_center_x(0), 60.0);
        assert_eq!(area.lane_center_x(1), 180.0);
        assert_eq!(area.lane_center_x(2), 300.0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Frame { dt_ms: u16 },
        Lane(i8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u16..120).prop_map(|dt_ms| Op::Frame { dt_ms }),
            (-3i8..5).prop_map(Op::Lane),
        ]
    }

    proptest! {
        #[test]
        fn prop_invariants_hold(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..400)) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut s = GameState::new(Difficulty::Hard.config(), PlayArea::default(), Some(SpeedRamp::default()));
            let mut now = 0.0f64;
            let mut events = Vec::new();
            for op in ops {
                match op {
                    Op::Frame { dt_ms } => {
                        now += f64::from(dt_ms);
                        s.maybe_spawn(now, &mut rng);
                        s.advance(f32::from(dt_ms) / 1000.0, &mut events);
                    }
                    Op::Lane(lane) => s.set_player_lane(i32::from(lane)),
                }
                prop_assert!(s.lives <= START_LIVES);
                prop_assert!(s.impact <= MAX_IMPACT);
                prop_assert!(s.player_lane < LANES);
                prop_assert!(s.objects.iter().all(|o| o.y <= s.area.exit_y()));
            }
        }
    }
}
