//! Post-win celebration: timed waves of droplet bursts, polled once per frame.
//!
//! The sequence cannot be cancelled. It reports completion exactly once, after
//! the rain duration has passed and the settle delay has elapsed.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelebrationConfig {
    pub duration_ms: f64,
    pub wave_interval_ms: f64,
    pub settle_ms: f64,
    pub opening_burst: u32,
    pub wave_burst: u32,
    pub final_burst: u32,
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 3000.0,
            wave_interval_ms: 220.0,
            settle_ms: 800.0,
            opening_burst: 26,
            wave_burst: 12,
            final_burst: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Raining { next_wave_ms: f64 },
    Settling { until_ms: f64 },
    Finished,
}

#[derive(Debug, Clone)]
pub struct Celebration {
    config: CelebrationConfig,
    started_ms: f64,
    stage: Stage,
}

impl Celebration {
    /// Start at `now_ms`. The caller emits `opening_burst` itself.
    pub fn start(config: CelebrationConfig, now_ms: f64) -> Self {
        Self {
            config,
            started_ms: now_ms,
            stage: Stage::Raining {
                next_wave_ms: now_ms + config.wave_interval_ms,
            },
        }
    }

    #[inline]
    pub fn opening_burst(&self) -> u32 {
        self.config.opening_burst
    }

    /// Advance to `now_ms`, pushing the size of every burst due since the last
    /// poll. Returns true on the single poll where the sequence completes.
    pub fn poll(&mut self, now_ms: f64, bursts: &mut Vec<u32>) -> bool {
        while let Stage::Raining { next_wave_ms } = self.stage {
            if now_ms < next_wave_ms {
                break;
            }
            bursts.push(self.config.wave_burst);
            if now_ms - self.started_ms > self.config.duration_ms {
                bursts.push(self.config.final_burst);
                self.stage = Stage::Settling {
                    until_ms: now_ms + self.config.settle_ms,
                };
            } else {
                self.stage = Stage::Raining {
                    next_wave_ms: next_wave_ms + self.config.wave_interval_ms,
                };
            }
        }
        match self.stage {
            Stage::Settling { until_ms } if now_ms >= until_ms => {
                self.stage = Stage::Finished;
                true
            }
            _ => false,
        }
    }
}
