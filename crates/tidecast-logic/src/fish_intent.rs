//! Fish intent — where the fish wants to pull, independent of the tick loop.
//!
//! A two-phase machine alternates `Hold` and `Transition`:
//!
//! - **Hold**: the pull sways around the current direction by
//!   `sin(t / 300ms) * 0.2`. Duration is uniform in `[500, 2250]` ms, scaled
//!   by `200 / change_rate`.
//! - **Transition**: eases from the old direction to a freshly drawn target
//!   over `200ms * (200 / change_rate)` with a smoothstep curve.
//!
//! The side of each new target is drawn with a drifting `direction_bias`:
//! every choice nudges the bias 0.05 toward the side just chosen, so fish
//! get streaky. Output is scaled by `change_strength / 100`.
//!
//! The machine owns its own seeded RNG; identical seeds replay identically.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Intent tuning. The defaults are the live game-feel values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentConfig {
    pub hold_min_ms: f32,
    pub hold_max_ms: f32,
    pub sway_amplitude: f32,
    pub sway_period_ms: f32,
    pub transition_base_ms: f32,
    /// `change_rate` at which durations are unscaled.
    pub rate_reference: f32,
    pub bias_step: f32,
    pub bias_limit: f32,
    /// Smallest magnitude of a new target direction.
    pub min_target: f32,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            hold_min_ms: 500.0,
            hold_max_ms: 2250.0,
            sway_amplitude: 0.2,
            sway_period_ms: 300.0,
            transition_base_ms: 200.0,
            rate_reference: 200.0,
            bias_step: 0.05,
            bias_limit: 0.8,
            min_target: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IntentPhase {
    Hold { duration_ms: f32 },
    Transition { from: f32, to: f32, duration_ms: f32 },
}

/// Cubic ease, `0 → 1` over `t ∈ [0, 1]`.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Clone)]
pub struct FishIntent {
    config: IntentConfig,
    rate_scale: f32,
    strength: f32,
    direction: f32,
    bias: f32,
    phase: IntentPhase,
    phase_elapsed_ms: f32,
    clock_ms: f64,
    transitions: u32,
    rng: StdRng,
}

impl FishIntent {
    pub fn new(change_rate: f32, change_strength: f32, seed: u64, config: IntentConfig) -> Self {
        let mut intent = Self {
            rate_scale: config.rate_reference / change_rate.max(1.0),
            strength: (change_strength / 100.0).clamp(0.0, 1.0),
            config,
            direction: 0.0,
            bias: 0.0,
            phase: IntentPhase::Hold { duration_ms: 0.0 },
            phase_elapsed_ms: 0.0,
            clock_ms: 0.0,
            transitions: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        intent.begin_hold();
        intent
    }

    fn begin_hold(&mut self) {
        let base = self
            .rng
            .gen_range(self.config.hold_min_ms..=self.config.hold_max_ms);
        self.phase = IntentPhase::Hold {
            duration_ms: (base * self.rate_scale).max(1.0),
        };
        self.phase_elapsed_ms = 0.0;
    }

    fn begin_transition(&mut self) {
        let p_right = 0.5 + self.bias * 0.5;
        let right = self.rng.gen::<f32>() < p_right;
        let magnitude = self.rng.gen_range(self.config.min_target..=1.0);
        let target = if right { magnitude } else { -magnitude };

        let step = if right {
            self.config.bias_step
        } else {
            -self.config.bias_step
        };
        self.bias = (self.bias + step).clamp(-self.config.bias_limit, self.config.bias_limit);

        self.phase = IntentPhase::Transition {
            from: self.direction,
            to: target,
            duration_ms: (self.config.transition_base_ms * self.rate_scale).max(1.0),
        };
        self.phase_elapsed_ms = 0.0;
        self.transitions += 1;
    }

    fn duration_ms(&self) -> f32 {
        match self.phase {
            IntentPhase::Hold { duration_ms } | IntentPhase::Transition { duration_ms, .. } => {
                duration_ms
            }
        }
    }

    /// Advance the machine's own timer by `dt_ms`, crossing as many phase
    /// boundaries as the interval covers.
    pub fn advance(&mut self, dt_ms: f32) {
        let mut remaining = dt_ms.max(0.0);
        loop {
            let left = self.duration_ms() - self.phase_elapsed_ms;
            if remaining < left {
                self.phase_elapsed_ms += remaining;
                self.clock_ms += remaining as f64;
                return;
            }
            remaining -= left;
            self.clock_ms += left as f64;
            match self.phase {
                IntentPhase::Hold { .. } => self.begin_transition(),
                IntentPhase::Transition { to, .. } => {
                    self.direction = to;
                    self.begin_hold();
                }
            }
        }
    }

    /// Unscaled intended direction in `[-1, 1]`.
    pub fn raw_direction(&self) -> f32 {
        match self.phase {
            IntentPhase::Hold { .. } => {
                let sway = ((self.clock_ms / self.config.sway_period_ms as f64).sin() as f32)
                    * self.config.sway_amplitude;
                (self.direction + sway).clamp(-1.0, 1.0)
            }
            IntentPhase::Transition {
                from,
                to,
                duration_ms,
            } => from + (to - from) * smoothstep(self.phase_elapsed_ms / duration_ms),
        }
    }

    /// Intended pull, scaled by the fish's change strength.
    pub fn output(&self) -> f32 {
        self.raw_direction() * self.strength
    }

    /// Drifting side preference in `[-bias_limit, bias_limit]`; positive favours right.
    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn phase(&self) -> IntentPhase {
        self.phase
    }

    /// Direction changes started so far.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}
