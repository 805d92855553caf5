//! Cast-power meter — the oscillating bar shown before the line goes out.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastConfig {
    /// One full 0 → max → 0 sweep.
    pub period_ms: f32,
    pub max_power: f32,
    /// Power per point of starting stamina.
    pub power_per_bonus: f32,
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            period_ms: 1200.0,
            max_power: 100.0,
            power_per_bonus: 10.0,
        }
    }
}

/// Meter reading `held_ms` after the cast began (triangle wave).
pub fn cast_power(config: &CastConfig, held_ms: i64) -> f32 {
    let period = config.period_ms.max(1.0);
    let phase = (held_ms.max(0) as f32 % period) / period;
    let rise = if phase < 0.5 { phase * 2.0 } else { (1.0 - phase) * 2.0 };
    rise * config.max_power
}

/// Starting-stamina bonus for releasing at `power`.
pub fn cast_bonus(config: &CastConfig, power: f32) -> f32 {
    (power.clamp(0.0, config.max_power) / config.power_per_bonus).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_is_a_triangle() {
        let cfg = CastConfig::default();
        assert!(cast_power(&cfg, 0).abs() < f32::EPSILON);
        assert!((cast_power(&cfg, 300) - 50.0).abs() < 1e-3);
        assert!((cast_power(&cfg, 600) - 100.0).abs() < 1e-3);
        assert!((cast_power(&cfg, 900) - 50.0).abs() < 1e-3);
        assert!(cast_power(&cfg, 1200).abs() < 1e-3);
        assert!((cast_power(&cfg, 1800) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn negative_hold_reads_zero() {
        assert!(cast_power(&CastConfig::default(), -50).abs() < f32::EPSILON);
    }

    #[test]
    fn bonus_rounds_to_tenths_of_power() {
        let cfg = CastConfig::default();
        assert!((cast_bonus(&cfg, 100.0) - 10.0).abs() < f32::EPSILON);
        assert!((cast_bonus(&cfg, 64.0) - 6.0).abs() < f32::EPSILON);
        assert!((cast_bonus(&cfg, 66.0) - 7.0).abs() < f32::EPSILON);
        assert!(cast_bonus(&cfg, 0.0).abs() < f32::EPSILON);
        assert!((cast_bonus(&cfg, 250.0) - 10.0).abs() < f32::EPSILON);
    }
}
