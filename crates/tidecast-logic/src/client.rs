//! Client-side attempt runtime.
//!
//! Drives one attempt through
//! `Idle → Casting → WaitingForBite → ReactionWindow → InSimulation → Success | Failure`
//! using explicit timestamps. Only two transitions talk to the server: the
//! cast release is followed by `start`, and `Success` is followed by `catch`.
//! A missed reaction or an escape is a local failure; the stale session is
//! cleaned up by the server on the next call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cast::{cast_bonus, cast_power, CastConfig};
use crate::fish_intent::IntentConfig;
use crate::generator::CatchCandidate;
use crate::protocol::StartReply;
use crate::session::SessionConfig;
use crate::tug::{
    steer_toward_green, EscapeReason, PlayerInput, StartBonuses, TugConfig, TugOutcome,
    TugSimulation, TugStep,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub cast: CastConfig,
    pub session: SessionConfig,
    pub tug: TugConfig,
    pub intent: IntentConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientPhase {
    Idle,
    Casting,
    WaitingForBite,
    ReactionWindow,
    InSimulation,
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The reaction window closed without a reaction.
    MissedBite,
    Escaped(EscapeReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("cannot {action} while {phase:?}")]
    WrongPhase {
        action: &'static str,
        phase: ClientPhase,
    },
    #[error("the server has not confirmed the cast yet")]
    NotStarted,
}

#[derive(Debug, Clone)]
struct Attempt {
    version: u64,
    candidate: CatchCandidate,
    bite_at_ms: i64,
}

#[derive(Debug, Clone)]
pub struct ClientSession {
    config: ClientConfig,
    seed: u64,
    phase: ClientPhase,
    cast_started_ms: i64,
    cast_bonus: f32,
    attempt: Option<Attempt>,
    reaction_bonus: u32,
    simulation: Option<TugSimulation>,
    failure: Option<FailureReason>,
}

impl ClientSession {
    /// `seed` feeds the fish-intent machine of every attempt, mixed with the
    /// session version the server hands out.
    pub fn new(config: ClientConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            phase: ClientPhase::Idle,
            cast_started_ms: 0,
            cast_bonus: 0.0,
            attempt: None,
            reaction_bonus: 0,
            simulation: None,
            failure: None,
        }
    }

    pub fn phase(&self) -> ClientPhase {
        self.phase
    }

    pub fn failure(&self) -> Option<FailureReason> {
        self.failure
    }

    pub fn cast_bonus(&self) -> f32 {
        self.cast_bonus
    }

    pub fn reaction_bonus(&self) -> u32 {
        self.reaction_bonus
    }

    /// Session version to quote back to `catch`.
    pub fn version(&self) -> Option<u64> {
        self.attempt.as_ref().map(|a| a.version)
    }

    pub fn candidate(&self) -> Option<&CatchCandidate> {
        self.attempt.as_ref().map(|a| &a.candidate)
    }

    pub fn simulation(&self) -> Option<&TugSimulation> {
        self.simulation.as_ref()
    }

    fn expect_phase(&self, action: &'static str, phase: ClientPhase) -> Result<(), ClientError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(ClientError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn fail(&mut self, reason: FailureReason) {
        self.phase = ClientPhase::Failure;
        self.failure = Some(reason);
    }

    pub fn begin_cast(&mut self, now_ms: i64) -> Result<(), ClientError> {
        self.expect_phase("begin a cast", ClientPhase::Idle)?;
        self.phase = ClientPhase::Casting;
        self.cast_started_ms = now_ms;
        Ok(())
    }

    /// Power meter reading while casting.
    pub fn cast_meter(&self, now_ms: i64) -> f32 {
        if self.phase != ClientPhase::Casting {
            return 0.0;
        }
        cast_power(&self.config.cast, now_ms - self.cast_started_ms)
    }

    /// Lock in the cast bonus. The caller sends `start` next.
    pub fn release_cast(&mut self, now_ms: i64) -> Result<f32, ClientError> {
        self.expect_phase("release a cast", ClientPhase::Casting)?;
        let power = cast_power(&self.config.cast, now_ms - self.cast_started_ms);
        self.cast_bonus = cast_bonus(&self.config.cast, power);
        self.phase = ClientPhase::WaitingForBite;
        Ok(self.cast_bonus)
    }

    /// Server accepted the cast; the bite timer starts from `now_ms`.
    pub fn on_started(&mut self, reply: &StartReply, now_ms: i64) -> Result<(), ClientError> {
        self.expect_phase("accept a start reply", ClientPhase::WaitingForBite)?;
        self.attempt = Some(Attempt {
            version: reply.version,
            candidate: reply.candidate.clone(),
            bite_at_ms: now_ms + reply.bite_delay_ms,
        });
        Ok(())
    }

    /// Apply timer-driven transitions up to `now_ms`.
    pub fn poll(&mut self, now_ms: i64) -> ClientPhase {
        let Some(bite_at_ms) = self.attempt.as_ref().map(|a| a.bite_at_ms) else {
            return self.phase;
        };
        if self.phase == ClientPhase::WaitingForBite && now_ms >= bite_at_ms {
            self.phase = ClientPhase::ReactionWindow;
        }
        if self.phase == ClientPhase::ReactionWindow
            && now_ms - bite_at_ms > self.config.session.reaction_window_ms
        {
            self.fail(FailureReason::MissedBite);
        }
        self.phase
    }

    /// The player hooks the fish. Starts the simulation, or fails when the
    /// window has already closed.
    pub fn react(&mut self, now_ms: i64) -> Result<ClientPhase, ClientError> {
        if self.attempt.is_none() {
            return Err(ClientError::NotStarted);
        }
        self.poll(now_ms);
        if self.phase == ClientPhase::Failure {
            return Ok(self.phase);
        }
        self.expect_phase("react", ClientPhase::ReactionWindow)?;
        let Some(attempt) = self.attempt.as_ref() else {
            return Err(ClientError::NotStarted);
        };
        let Some(bonus) = self
            .config
            .session
            .reaction_bonus(now_ms - attempt.bite_at_ms)
        else {
            self.fail(FailureReason::MissedBite);
            return Ok(self.phase);
        };
        self.reaction_bonus = bonus;
        self.simulation = Some(TugSimulation::new(
            &attempt.candidate,
            StartBonuses {
                cast: self.cast_bonus,
                reaction: bonus as f32,
            },
            self.seed ^ attempt.version.wrapping_mul(0x9E37_79B9_7F4A_7C15),
            self.config.tug.clone(),
            self.config.intent.clone(),
        ));
        self.phase = ClientPhase::InSimulation;
        Ok(self.phase)
    }

    pub fn tick(&mut self, input: PlayerInput) -> Result<TugStep, ClientError> {
        self.expect_phase("tick", ClientPhase::InSimulation)?;
        let Some(simulation) = self.simulation.as_mut() else {
            return Err(ClientError::NotStarted);
        };
        let step = simulation.tick(input);
        match step.outcome {
            Some(TugOutcome::Caught) => self.phase = ClientPhase::Success,
            Some(TugOutcome::Escaped(reason)) => self.fail(FailureReason::Escaped(reason)),
            None => {}
        }
        Ok(step)
    }

    /// Play the simulation with the built-in steering until it ends or
    /// `max_ticks` pass.
    pub fn run_autopilot(&mut self, max_ticks: u32) -> Result<ClientPhase, ClientError> {
        for _ in 0..max_ticks {
            let input = match self.simulation.as_ref() {
                Some(sim) => steer_toward_green(sim.frame(), &sim.layout()),
                None => return Err(ClientError::NotStarted),
            };
            self.tick(input)?;
            if self.phase != ClientPhase::InSimulation {
                break;
            }
        }
        Ok(self.phase)
    }

    /// Back to idle, dropping the attempt.
    pub fn finish(&mut self) {
        self.phase = ClientPhase::Idle;
        self.cast_bonus = 0.0;
        self.attempt = None;
        self.reaction_bonus = 0;
        self.simulation = None;
        self.failure = None;
    }
}
