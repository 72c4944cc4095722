//! Timed random spawner: drops one object into a random lane per interval.

use crate::catalog::{self, ItemKind};
use crate::game::{FallingObject, LANES};
use rand::Rng;

/// Objects start just above the visible area.
pub const SPAWN_Y: f32 = -40.0;
/// Chance that a spawn is drawn from the good table.
pub const GOOD_CHANCE: f64 = 0.6;

/// After the first interval the gap is redrawn as
/// `max(MIN, BASE + rand * JITTER)` ms, independent of the preset.
const GAP_MIN_MS: f64 = 500.0;
const GAP_BASE_MS: f64 = 700.0;
const GAP_JITTER_MS: f64 = 500.0;

#[derive(Debug, Clone)]
pub struct Spawner {
    /// None until the first tick of a run; the first gap is measured from there.
    last_spawn_ms: Option<f64>,
    gap_ms: f64,
    next_id: u32,
}

impl Spawner {
    pub fn new(initial_gap_ms: f64) -> Self {
        Self {
            last_spawn_ms: None,
            gap_ms: initial_gap_ms,
            next_id: 1,
        }
    }

    #[inline]
    pub fn gap_ms(&self) -> f64 {
        self.gap_ms
    }

    /// Spawn one object if the current gap has elapsed. Returns the new object
    /// so the caller can append it to the live set.
    pub fn maybe_spawn<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> Option<FallingObject> {
        let last = *self.last_spawn_ms.get_or_insert(now_ms);
        if now_ms - last < self.gap_ms {
            return None;
        }
        self.last_spawn_ms = Some(now_ms);
        self.gap_ms = (GAP_BASE_MS + rng.random::<f64>() * GAP_JITTER_MS).max(GAP_MIN_MS);

        let lane = rng.random_range(0..LANES);
        let kind = if rng.random::<f64>() < GOOD_CHANCE {
            ItemKind::Good
        } else {
            ItemKind::Bad
        };
        let table = catalog::table(kind);
        let item = table[rng.random_range(0..table.len())];

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        Some(FallingObject {
            id,
            lane,
            y: SPAWN_Y,
            item,
        })
    }
}
