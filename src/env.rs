//! Multi-agent environment trait.
//!
//! The surface a training loop drives: one discrete action per agent in,
//! one observation row and one reward per agent out.

use crate::error::StepError;
use crate::game::{Action, BattleWorld, Observation, SpaceSpec, StepInfo, StepOutcome};
use crate::replay::render_ascii;

/// Trait for multi-agent environments with a shared step.
pub trait MultiAgentEnv {
    /// Number of agents (observation rows, action slots, reward entries).
    fn num_agents(&self) -> usize;

    /// Observation and action space description.
    fn spaces(&self) -> SpaceSpec;

    /// Start a new episode. `Some(seed)` makes the episode reproducible.
    fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo);

    /// Step with one action per agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the action count is wrong or the episode is over.
    fn step(&mut self, actions: &[Action]) -> Result<StepOutcome, StepError>;

    /// Step with raw discrete codes, one per agent.
    ///
    /// # Errors
    ///
    /// Returns an error if a code is not a valid action, or as [`MultiAgentEnv::step`].
    fn step_codes(&mut self, codes: &[u8]) -> Result<StepOutcome, StepError>;

    /// Text rendering of the current state.
    fn render(&self) -> String;
}

impl MultiAgentEnv for BattleWorld {
    fn num_agents(&self) -> usize {
        self.units().len()
    }

    fn spaces(&self) -> SpaceSpec {
        SpaceSpec::for_config(self.config())
    }

    fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        Self::reset(self, seed)
    }

    fn step(&mut self, actions: &[Action]) -> Result<StepOutcome, StepError> {
        Self::step(self, actions)
    }

    fn step_codes(&mut self, codes: &[u8]) -> Result<StepOutcome, StepError> {
        Self::step_codes(self, codes)
    }

    fn render(&self) -> String {
        render_ascii(self)
    }
}
