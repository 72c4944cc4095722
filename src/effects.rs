//! Transient visual units owned by the presentation layer: lane popups,
//! the milestone banner and celebration droplets. None of this feeds back
//! into the run.

use crate::catalog::ItemKind;
use rand::Rng;

const POPUP_LIFETIME_MS: u32 = 600;
const BANNER_LIFETIME_MS: u32 = 1800;
const DROP_LIFETIME_MS: u32 = 2400;

/// Floating delta text above the player ("+15", "-1 ♥  -12").
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub lane: usize,
    pub text: String,
    pub kind: ItemKind,
    pub age_ms: u32,
}

impl Popup {
    /// 0.0 when fresh, 1.0 when about to disappear.
    pub fn progress(&self) -> f32 {
        self.age_ms as f32 / POPUP_LIFETIME_MS as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub text: String,
    pub age_ms: u32,
}

/// One celebration droplet. `x` is a 0..1 fraction of the play width,
/// `fall` a 0..1 fraction of its fall.
#[derive(Debug, Clone, PartialEq)]
pub struct Droplet {
    pub x: f32,
    pub sway: f32,
    pub duration_ms: u32,
    pub age_ms: u32,
}

impl Droplet {
    pub fn fall(&self) -> f32 {
        (self.age_ms as f32 / self.duration_ms as f32).min(1.0)
    }

    /// Horizontal position including sway, clamped to the play width.
    pub fn x_at(&self) -> f32 {
        (self.x + self.sway * self.fall()).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default)]
pub struct Effects {
    pub popups: Vec<Popup>,
    pub banner: Option<Banner>,
    pub droplets: Vec<Droplet>,
}

impl Effects {
    pub fn clear(&mut self) {
        self.popups.clear();
        self.banner = None;
        self.droplets.clear();
    }

    pub fn popup(&mut self, lane: usize, kind: ItemKind, text: String) {
        self.popups.push(Popup {
            lane,
            text,
            kind,
            age_ms: 0,
        });
    }

    /// Replaces any banner still on screen.
    pub fn banner(&mut self, text: impl Into<String>) {
        self.banner = Some(Banner {
            text: text.into(),
            age_ms: 0,
        });
    }

    /// Instantiate `count` droplets at random positions, 1.2–2.4 s falls.
    pub fn rain<R: Rng + ?Sized>(&mut self, count: u32, rng: &mut R) {
        for _ in 0..count {
            let dir = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
            self.droplets.push(Droplet {
                x: rng.random::<f32>(),
                sway: dir * rng.random_range(0.02..0.08),
                duration_ms: rng.random_range(1200..=2400),
                age_ms: 0,
            });
        }
    }

    /// Age everything by `delta_ms` and drop what has expired.
    pub fn tick(&mut self, delta_ms: u32) {
        self.popups.retain_mut(|p| {
            p.age_ms += delta_ms;
            p.age_ms < POPUP_LIFETIME_MS
        });
        if let Some(banner) = &mut self.banner {
            banner.age_ms += delta_ms;
            if banner.age_ms >= BANNER_LIFETIME_MS {
                self.banner = None;
            }
        }
        self.droplets.retain_mut(|d| {
            d.age_ms += delta_ms;
            d.age_ms < DROP_LIFETIME_MS
        });
    }
}
