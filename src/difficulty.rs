//! Difficulty presets and the per-run configuration they produce.

/// Named difficulty presets. `Normal` is the fallback for unknown names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Fixed for the whole run once selected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    pub timer_secs: f32,
    pub initial_spawn_gap_ms: f64,
    pub fall_speed: f32,
}

/// Engine-level fall speed ramp; not part of a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRamp {
    /// Speed gained per second of play (units/s²).
    pub per_second: f32,
    pub max_speed: f32,
}

impl Default for SpeedRamp {
    fn default() -> Self {
        Self {
            per_second: 2.0,
            max_speed: 260.0,
        }
    }
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    /// Resolve a preset by name (case-insensitive). Unknown names fall back to
    /// the default preset.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "normal" | "medium" => Self::Normal,
            "hard" => Self::Hard,
            other => {
                log::warn!("unknown difficulty {other:?}, using {}", Self::default().name());
                Self::default()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }

    pub fn config(&self) -> RunConfig {
        match self {
            Self::Easy => RunConfig {
                timer_secs: 70.0,
                initial_spawn_gap_ms: 1000.0,
                fall_speed: 110.0,
            },
            Self::Normal => RunConfig {
                timer_secs: 60.0,
                initial_spawn_gap_ms: 900.0,
                fall_speed: 120.0,
            },
            Self::Hard => RunConfig {
                timer_secs: 45.0,
                initial_spawn_gap_ms: 720.0,
                fall_speed: 135.0,
            },
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Easy => Self::Hard,
            Self::Normal => Self::Easy,
            Self::Hard => Self::Normal,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Easy => Self::Normal,
            Self::Normal => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_values() {
        let easy = Difficulty::Easy.config();
        assert_eq!(easy.timer_secs, 70.0);
        assert_eq!(easy.initial_spawn_gap_ms, 1000.0);
        assert_eq!(easy.fall_speed, 110.0);

        let hard = Difficulty::Hard.config();
        assert_eq!(hard.timer_secs, 45.0);
        assert_eq!(hard.initial_spawn_gap_ms, 720.0);
        assert_eq!(hard.fall_speed, 135.0);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Difficulty::from_name("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::from_name(" easy "), Difficulty::Easy);
    }

    #[test]
    fn test_unknown_name_falls_back_to_normal() {
        assert_eq!(Difficulty::from_name("nightmare"), Difficulty::Normal);
        assert_eq!(Difficulty::from_name(""), Difficulty::Normal);
        assert_eq!(Difficulty::from_name("nightmare").config().timer_secs, 60.0);
    }

    #[test]
    fn test_cycle_visits_every_preset() {
        let mut d = Difficulty::Easy;
        for _ in 0..Difficulty::ALL.len() {
            d = d.next();
        }
        assert_eq!(d, Difficulty::Easy);
        assert_eq!(Difficulty::Easy.prev(), Difficulty::Hard);
    }
}
