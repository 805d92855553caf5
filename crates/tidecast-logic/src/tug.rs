//! Tug-of-bar simulation — resolves one catch attempt into caught or escaped.
//!
//! Runs as a fixed-period tick loop (100 ms). Each tick, in order:
//!
//! 1. Focus drains while the player steers, recovers while idle.
//! 2. The effective tug follows `fish_intent + input * player_weight`
//!    (clamped to ±1) through a 0.3 low-pass blend.
//! 3. Balance moves by `2 * effective_tug * 1.5`; touching 0 or 100 is an escape.
//! 4. The colour zone under the balance raises or relieves line tension,
//!    scaled by the line's strength; reaching 100 snaps the line.
//! 5. The same zone feeds or drains stamina; reaching the fish's stamina is a catch.
//!
//! The simulation never times out on its own.

use serde::{Deserialize, Serialize};

use crate::bar_layout::{BarLayout, ZoneColor};
use crate::catalog::BarType;
use crate::fish_intent::{FishIntent, IntentConfig};
use crate::generator::CatchCandidate;

/// Tick-loop tuning. The defaults are the live values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TugConfig {
    pub tick_ms: f32,
    pub focus_drain: f32,
    pub focus_recover: f32,
    /// Player pull numerator while focused; divided by the fish's tug strength.
    pub tug_weight_focused: f32,
    pub tug_weight_unfocused: f32,
    pub blend: f32,
    /// Balance travel per tick at full effective tug (2 × 1.5).
    pub balance_step: f32,
    pub start_balance: f32,
    pub max_tension: f32,
    pub tension_green: f32,
    pub tension_yellow: f32,
    pub tension_red: f32,
    pub stamina_green: f32,
    pub stamina_yellow: f32,
    pub stamina_red: f32,
}

impl Default for TugConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100.0,
            focus_drain: 6.6,
            focus_recover: 18.0,
            tug_weight_focused: 135.0,
            tug_weight_unfocused: 67.5,
            blend: 0.3,
            balance_step: 2.0 * 1.5,
            start_balance: 50.0,
            max_tension: 100.0,
            tension_green: -1.0,
            tension_yellow: 1.5,
            tension_red: 4.5,
            stamina_green: 1.0,
            stamina_yellow: 0.3,
            stamina_red: -0.5,
        }
    }
}

impl TugConfig {
    fn tension_delta(&self, color: ZoneColor) -> f32 {
        match color {
            ZoneColor::Green => self.tension_green,
            ZoneColor::Yellow => self.tension_yellow,
            ZoneColor::Red => self.tension_red,
        }
    }

    fn stamina_delta(&self, color: ZoneColor) -> f32 {
        match color {
            ZoneColor::Green => self.stamina_green,
            ZoneColor::Yellow => self.stamina_yellow,
            ZoneColor::Red => self.stamina_red,
        }
    }

    /// Player pull weight for the current focus and fish.
    pub fn player_weight(&self, focus: f32, tug_strength: f32) -> f32 {
        let numerator = if focus <= 0.0 {
            self.tug_weight_unfocused
        } else {
            self.tug_weight_focused
        };
        numerator / tug_strength.max(1.0)
    }
}

/// Discrete steering signal sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerInput {
    Left,
    #[default]
    None,
    Right,
}

impl PlayerInput {
    pub fn value(self) -> f32 {
        match self {
            PlayerInput::Left => -1.0,
            PlayerInput::None => 0.0,
            PlayerInput::Right => 1.0,
        }
    }
}

/// One-time stamina additions applied when the simulation starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StartBonuses {
    pub cast: f32,
    pub reaction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscapeReason {
    /// Balance touched either end of the bar.
    BalanceLost,
    /// Line tension reached its maximum.
    LineSnapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TugOutcome {
    Caught,
    Escaped(EscapeReason),
}

/// Per-tick simulation state. Client-local and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TugFrame {
    pub tick: u32,
    pub elapsed_ms: f32,
    pub stamina: f32,
    pub balance: f32,
    pub focus: f32,
    pub line_tension: f32,
    pub effective_tug: f32,
    /// Fish intent output sampled this tick.
    pub fish_direction: f32,
    pub zone: ZoneColor,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TugStep {
    pub frame: TugFrame,
    pub outcome: Option<TugOutcome>,
}

#[derive(Debug, Clone)]
pub struct TugSimulation {
    config: TugConfig,
    max_stamina: f32,
    tug_strength: f32,
    bar_type: BarType,
    max_focus: f32,
    line_strength: f32,
    frame: TugFrame,
    intent: FishIntent,
    outcome: Option<TugOutcome>,
}

impl TugSimulation {
    /// Set up an attempt against `candidate`, using the gear stats it carries.
    ///
    /// `seed` drives the fish-intent machine; the same seed and inputs replay
    /// the same attempt tick for tick.
    pub fn new(
        candidate: &CatchCandidate,
        bonuses: StartBonuses,
        seed: u64,
        config: TugConfig,
        intent_config: IntentConfig,
    ) -> Self {
        let max_stamina = candidate.stamina.max(1.0);
        let max_focus = candidate.gear.focus.max(0.0);
        let frame = TugFrame {
            tick: 0,
            elapsed_ms: 0.0,
            stamina: (bonuses.cast + bonuses.reaction).clamp(0.0, max_stamina),
            balance: config.start_balance,
            focus: max_focus,
            line_tension: 0.0,
            effective_tug: 0.0,
            fish_direction: 0.0,
            zone: ZoneColor::Green,
        };
        Self {
            intent: FishIntent::new(
                candidate.change_rate,
                candidate.change_strength,
                seed,
                intent_config,
            ),
            max_stamina,
            tug_strength: candidate.tug_strength,
            bar_type: candidate.bar_type,
            max_focus,
            line_strength: candidate.gear.line_tension.max(1.0),
            frame,
            outcome: None,
            config,
        }
    }

    pub fn frame(&self) -> &TugFrame {
        &self.frame
    }

    /// Direct access to the frame, for replays and scripted scenarios.
    pub fn frame_mut(&mut self) -> &mut TugFrame {
        &mut self.frame
    }

    pub fn outcome(&self) -> Option<TugOutcome> {
        self.outcome
    }

    pub fn max_stamina(&self) -> f32 {
        self.max_stamina
    }

    pub fn intent(&self) -> &FishIntent {
        &self.intent
    }

    /// Bar layout at the current point in the attempt.
    pub fn layout(&self) -> BarLayout {
        BarLayout::resolve(
            self.bar_type,
            self.frame.elapsed_ms / 1000.0,
            self.intent.bias(),
        )
    }

    /// Advance one tick with the player's input. Once terminal, further
    /// ticks leave the frame untouched and repeat the outcome.
    pub fn tick(&mut self, input: PlayerInput) -> TugStep {
        if self.outcome.is_some() {
            return TugStep {
                frame: self.frame.clone(),
                outcome: self.outcome,
            };
        }
        let cfg = &self.config;

        self.intent.advance(cfg.tick_ms);
        let f = &mut self.frame;
        f.tick += 1;
        f.elapsed_ms += cfg.tick_ms;
        f.fish_direction = self.intent.output();

        // 1. Focus
        f.focus = if input == PlayerInput::None {
            f.focus + cfg.focus_recover
        } else {
            f.focus - cfg.focus_drain
        }
        .clamp(0.0, self.max_focus);

        // 2. Effective tug
        let weight = cfg.player_weight(f.focus, self.tug_strength);
        let desired = (f.fish_direction + input.value() * weight).clamp(-1.0, 1.0);
        f.effective_tug += (desired - f.effective_tug) * cfg.blend;

        // 3. Balance
        f.balance = (f.balance + cfg.balance_step * f.effective_tug).clamp(0.0, 100.0);
        if f.balance <= 0.0 || f.balance >= 100.0 {
            self.outcome = Some(TugOutcome::Escaped(EscapeReason::BalanceLost));
            return self.step();
        }

        // 4. Line tension
        let layout = BarLayout::resolve(self.bar_type, f.elapsed_ms / 1000.0, self.intent.bias());
        let zone = layout.color_at(f.balance);
        f.zone = zone;
        let line_scale = cfg.max_tension / self.line_strength;
        f.line_tension =
            (f.line_tension + cfg.tension_delta(zone) * line_scale).clamp(0.0, cfg.max_tension);
        if f.line_tension >= cfg.max_tension {
            self.outcome = Some(TugOutcome::Escaped(EscapeReason::LineSnapped));
            return self.step();
        }

        // 5. Stamina
        f.stamina = (f.stamina + cfg.stamina_delta(zone)).clamp(0.0, self.max_stamina);
        if f.stamina >= self.max_stamina {
            self.outcome = Some(TugOutcome::Caught);
        }
        self.step()
    }

    fn step(&self) -> TugStep {
        TugStep {
            frame: self.frame.clone(),
            outcome: self.outcome,
        }
    }

    /// Run until terminal or `max_ticks`, asking `steer` for each tick's input.
    pub fn run_with<F>(&mut self, max_ticks: u32, mut steer: F) -> Option<TugOutcome>
    where
        F: FnMut(&TugFrame, &BarLayout) -> PlayerInput,
    {
        for _ in 0..max_ticks {
            let layout = self.layout();
            let input = steer(&self.frame, &layout);
            if let Some(outcome) = self.tick(input).outcome {
                return Some(outcome);
            }
        }
        self.outcome
    }
}

/// Steer toward the middle of the nearest green band, leading by the
/// current effective tug so the blend does not overshoot.
pub fn steer_toward_green(frame: &TugFrame, layout: &BarLayout) -> PlayerInput {
    let target = layout.nearest_green(frame.balance);
    let projected = frame.balance + frame.effective_tug * 6.0;
    if projected < target - 2.0 {
        PlayerInput::Right
    } else if projected > target + 2.0 {
        PlayerInput::Left
    } else {
        PlayerInput::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatchKind, Rarity};
    use crate::gear::GearStats;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn candidate(bar_type: BarType, change_strength: f32) -> CatchCandidate {
        CatchCandidate {
            kind: CatchKind::Fish,
            species: "Test Fish".into(),
            rarity: Rarity::Common,
            stamina: 60.0,
            tug_strength: 120.0,
            change_rate: 200.0,
            change_strength,
            bar_type,
            sell_price: 5,
            weight: Some(1.0),
            length: Some(20.0),
            modifier: None,
            is_massive: false,
            gear: GearStats::default(),
        }
    }

    fn sim(c: &CatchCandidate, seed: u64) -> TugSimulation {
        TugSimulation::new(
            c,
            StartBonuses::default(),
            seed,
            TugConfig::default(),
            IntentConfig::default(),
        )
    }

    #[test]
    fn still_fish_in_green_feeds_stamina_until_caught() {
        let c = candidate(BarType::Middle, 0.0);
        let mut s = sim(&c, 1);
        let mut last = s.frame().stamina;
        let mut ticks = 0;
        loop {
            let step = s.tick(PlayerInput::None);
            ticks += 1;
            assert!((step.frame.balance - 50.0).abs() < f32::EPSILON);
            assert_eq!(step.frame.zone, ZoneColor::Green);
            assert!(step.frame.stamina > last, "tick {ticks}");
            last = step.frame.stamina;
            if let Some(outcome) = step.outcome {
                assert_eq!(outcome, TugOutcome::Caught);
                break;
            }
            assert!(ticks < 1000);
        }
        assert_eq!(ticks, 60);
    }

    #[test]
    fn red_zone_at_99_tension_snaps_the_line() {
        let c = candidate(BarType::Middle, 0.0);
        let mut s = sim(&c, 1);
        s.frame_mut().balance = 10.0;
        s.frame_mut().line_tension = 99.0;
        let step = s.tick(PlayerInput::None);
        assert_eq!(step.frame.zone, ZoneColor::Red);
        assert!((step.frame.line_tension - 100.0).abs() < f32::EPSILON);
        assert_eq!(
            step.outcome,
            Some(TugOutcome::Escaped(EscapeReason::LineSnapped))
        );
    }

    #[test]
    fn touching_the_edge_loses_balance() {
        let c = candidate(BarType::Middle, 0.0);
        let mut s = sim(&c, 1);
        s.frame_mut().balance = 98.5;
        s.frame_mut().effective_tug = 1.0;
        let step = s.tick(PlayerInput::Right);
        assert!((step.frame.balance - 100.0).abs() < f32::EPSILON);
        assert_eq!(
            step.outcome,
            Some(TugOutcome::Escaped(EscapeReason::BalanceLost))
        );
    }

    #[test]
    fn state_stays_in_bounds_under_random_input() {
        let mut input_rng = StdRng::seed_from_u64(2024);
        for seed in 0..40 {
            for bar_type in [BarType::Middle, BarType::Double, BarType::DynamicSmall] {
                let c = candidate(bar_type, 100.0);
                let mut s = sim(&c, seed);
                for _ in 0..3000 {
                    let input = match input_rng.gen_range(0..3) {
                        0 => PlayerInput::Left,
                        1 => PlayerInput::None,
                        _ => PlayerInput::Right,
                    };
                    let step = s.tick(input);
                    let f = &step.frame;
                    assert!((0.0..=100.0).contains(&f.balance));
                    assert!((0.0..=100.0).contains(&f.line_tension));
                    assert!(f.stamina >= 0.0 && f.stamina <= c.stamina);
                    assert!(f.focus >= 0.0 && f.focus <= c.gear.focus);
                    assert!(f.effective_tug.abs() <= 1.0 + 1e-5);
                    if step.outcome.is_some() {
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn same_seed_and_inputs_replay_identically() {
        let c = candidate(BarType::DynamicMedium, 90.0);
        let inputs: Vec<PlayerInput> = (0..400)
            .map(|i| match (i / 7) % 3 {
                0 => PlayerInput::Left,
                1 => PlayerInput::None,
                _ => PlayerInput::Right,
            })
            .collect();
        let run = || {
            let mut s = sim(&c, 555);
            inputs
                .iter()
                .map(|input| s.tick(*input).frame)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn focus_drains_while_steering_and_recovers_idle() {
        let c = candidate(BarType::Middle, 0.0);
        let mut s = sim(&c, 1);
        let f = s.tick(PlayerInput::Left).frame;
        assert!((f.focus - (100.0 - 6.6)).abs() < 1e-4);
        let f = s.tick(PlayerInput::None).frame;
        assert!((f.focus - 100.0).abs() < 1e-4, "recovery clamps at max");
        for _ in 0..20 {
            s.frame_mut().balance = 50.0;
            s.frame_mut().effective_tug = 0.0;
            s.tick(PlayerInput::Right);
        }
        assert!(s.frame().focus.abs() < f32::EPSILON);
    }

    #[test]
    fn exhausted_focus_halves_player_pull() {
        let cfg = TugConfig::default();
        let focused = cfg.player_weight(10.0, 135.0);
        let spent = cfg.player_weight(0.0, 135.0);
        assert!((focused - 1.0).abs() < 1e-6);
        assert!((spent - 0.5).abs() < 1e-6);
    }

    #[test]
    fn effective_tug_is_low_pass_filtered() {
        let c = candidate(BarType::Middle, 0.0);
        let mut s = sim(&c, 1);
        let f = s.tick(PlayerInput::Right).frame;
        // desired = 135 / 120 clamped to 1 → 0.3 of the way
        assert!((f.effective_tug - 0.3).abs() < 1e-6);
        let f = s.tick(PlayerInput::Right).frame;
        assert!((f.effective_tug - 0.51).abs() < 1e-5);
    }

    #[test]
    fn stronger_line_builds_tension_slower() {
        let mut c = candidate(BarType::Middle, 0.0);
        c.gear.line_tension = 200.0;
        let mut s = sim(&c, 1);
        s.frame_mut().balance = 25.0;
        let f = s.tick(PlayerInput::None).frame;
        assert_eq!(f.zone, ZoneColor::Yellow);
        assert!((f.line_tension - 0.75).abs() < 1e-5);
        assert!((f.stamina - 0.3).abs() < 1e-5);
    }

    #[test]
    fn start_bonuses_seed_stamina() {
        let c = candidate(BarType::Middle, 0.0);
        let s = TugSimulation::new(
            &c,
            StartBonuses {
                cast: 7.0,
                reaction: 10.0,
            },
            1,
            TugConfig::default(),
            IntentConfig::default(),
        );
        assert!((s.frame().stamina - 17.0).abs() < f32::EPSILON);

        let capped = TugSimulation::new(
            &c,
            StartBonuses {
                cast: 500.0,
                reaction: 10.0,
            },
            1,
            TugConfig::default(),
            IntentConfig::default(),
        );
        assert!((capped.frame().stamina - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn terminal_outcome_is_sticky() {
        let c = candidate(BarType::Middle, 0.0);
        let mut s = sim(&c, 1);
        s.frame_mut().line_tension = 99.0;
        s.frame_mut().balance = 5.0;
        let first = s.tick(PlayerInput::None);
        let again = s.tick(PlayerInput::Right);
        assert_eq!(first.outcome, again.outcome);
        assert_eq!(first.frame, again.frame);
    }

    #[test]
    fn autopilot_lands_an_easy_fish() {
        let c = candidate(BarType::Middle, 60.0);
        let mut s = sim(&c, 42);
        let outcome = s.run_with(5000, steer_toward_green);
        assert_eq!(outcome, Some(TugOutcome::Caught));
    }
}
