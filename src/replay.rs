//! Episode recording and replay.
//!
//! A world is fully determined by its configuration, so a replay needs only:
//! - `config` - builds the same terrain and roster
//! - `seed` - passed to `reset` before the first step
//! - `actions` - one action vector per recorded step
//!
//! No state deltas needed. To view step N, re-run the episode from step 0 to N.
//!
//! # Time Travel
//!
//! - **Forward**: Apply the next recorded action vector
//! - **Backward**: Re-run from step 0 to (`current_step` - 1)
//! - **Jump to step N**: Re-run from step 0 to N

mod render;

pub use render::render_ascii;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BattleConfig;
use crate::error::{ConfigError, StepError};
use crate::game::{Action, BattleWorld};

/// Everything needed to reproduce an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// World configuration.
    pub config: BattleConfig,
    /// Seed passed to `reset` before the first step.
    pub seed: u64,
    /// Action vectors in step order.
    pub actions: Vec<Vec<Action>>,
}

impl Recording {
    /// Start an empty recording.
    #[must_use]
    pub const fn new(config: BattleConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            actions: Vec::new(),
        }
    }

    /// Append one step's action vector.
    pub fn push(&mut self, actions: Vec<Action>) {
        self.actions.push(actions);
    }

    /// Number of recorded steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no step was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Save the recording as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a recording saved by [`Recording::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a recording.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Error type for replay operations.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The recorded configuration does not build a world.
    #[error("recorded config is invalid: {0}")]
    Config(#[from] ConfigError),
    /// A recorded action vector was rejected by the world.
    #[error("recorded step {step} rejected: {source}")]
    Step {
        /// Step (1-based) whose actions failed.
        step: u32,
        /// Rejection reason.
        source: StepError,
    },
    /// Step number out of bounds.
    #[error("step {requested} out of bounds (max: {max_step})")]
    StepOutOfBounds {
        /// Requested step.
        requested: u32,
        /// Last recorded step.
        max_step: u32,
    },
    /// No recorded step is left to apply.
    #[error("end of recording")]
    EndOfRecording,
    /// Reading or writing a recording failed.
    #[error("recording I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A recording file is not valid JSON.
    #[error("recording is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Replay engine - steps through a recording deterministically.
///
/// Since episodes are deterministic, this engine can:
/// - Step forward by applying the next action vector
/// - Step backward by replaying from step 0
/// - Jump to any step by replaying from step 0
#[derive(Debug)]
pub struct ReplayEngine {
    /// The recording being replayed.
    recording: Recording,
    /// World at the current step.
    world: BattleWorld,
    /// Recorded steps applied so far.
    current_step: u32,
}

impl ReplayEngine {
    /// Create a new replay engine from a recording, starting at step 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorded configuration is invalid.
    pub fn new(recording: Recording) -> Result<Self, ReplayError> {
        Self::new_at_step(recording, 0)
    }

    /// Create a new replay engine at a specific step.
    ///
    /// This replays from step 0 to the target step.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the step is past
    /// the end of the recording, or a recorded action vector is rejected.
    pub fn new_at_step(recording: Recording, target_step: u32) -> Result<Self, ReplayError> {
        let max_step = last_step(&recording);
        if target_step > max_step {
            return Err(ReplayError::StepOutOfBounds {
                requested: target_step,
                max_step,
            });
        }

        let mut world = BattleWorld::create(recording.config)?;
        world.reset(Some(recording.seed));

        let mut engine = Self {
            recording,
            world,
            current_step: 0,
        };
        while engine.current_step < target_step {
            engine.apply_next()?;
        }
        Ok(engine)
    }

    /// Get the recording.
    #[must_use]
    pub const fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Get the world at the current step.
    #[must_use]
    pub const fn world(&self) -> &BattleWorld {
        &self.world
    }

    /// Get current step number.
    #[must_use]
    pub const fn step(&self) -> u32 {
        self.current_step
    }

    /// Last step reachable in this recording.
    #[must_use]
    pub fn max_step(&self) -> u32 {
        last_step(&self.recording)
    }

    /// Whether the episode ended or the recording ran out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.world.is_done() || self.current_step >= self.max_step()
    }

    /// Step forward one recorded step.
    ///
    /// # Errors
    ///
    /// Returns an error at the end of the recording or if the recorded
    /// actions are rejected.
    pub fn step_forward(&mut self) -> Result<(), ReplayError> {
        if self.is_finished() {
            return Err(ReplayError::EndOfRecording);
        }
        self.apply_next()
    }

    /// Step backward one step.
    ///
    /// This replays from step 0 to (`current_step` - 1).
    ///
    /// # Errors
    ///
    /// Returns an error if already at step 0.
    pub fn step_backward(&mut self) -> Result<(), ReplayError> {
        if self.current_step == 0 {
            return Err(ReplayError::StepOutOfBounds {
                requested: 0,
                max_step: self.max_step(),
            });
        }
        self.goto_step(self.current_step - 1)
    }

    /// Jump to a specific step.
    ///
    /// This replays from step 0 to the target step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step is out of bounds.
    pub fn goto_step(&mut self, target_step: u32) -> Result<(), ReplayError> {
        let recording = self.recording.clone();
        *self = Self::new_at_step(recording, target_step)?;
        Ok(())
    }

    /// Render the current step to text.
    #[must_use]
    pub fn render(&self) -> String {
        render_ascii(&self.world)
    }

    fn apply_next(&mut self) -> Result<(), ReplayError> {
        let index = usize::try_from(self.current_step).unwrap_or(usize::MAX);
        let Some(actions) = self.recording.actions.get(index) else {
            return Err(ReplayError::EndOfRecording);
        };
        self.current_step += 1;
        self.world
            .step(actions)
            .map_err(|source| ReplayError::Step {
                step: self.current_step,
                source,
            })?;
        Ok(())
    }
}

fn last_step(recording: &Recording) -> u32 {
    u32::try_from(recording.len()).unwrap_or(u32::MAX)
}
