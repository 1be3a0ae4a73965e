// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Skirmish: a deterministic two-team grid battle for multi-agent reinforcement learning.
//!
//! This crate provides a battle simulator designed for:
//! - Reproducible episodes from a config and a seed
//! - A flat per-agent observation and one discrete action per agent
//! - Cheap recording and replay of whole episodes
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Rollouts / Replay / CLI           │
//! ├─────────────────────────────────────┤
//! │   MultiAgentEnv                     │
//! ├─────────────────────────────────────┤
//! │   Battle world (terrain, units)     │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod game;
pub mod replay;
pub mod rollout;

pub use config::{BattleConfig, RewardConfig};
pub use env::MultiAgentEnv;
pub use error::{ConfigError, StepError};

// Re-export key game types at crate root for convenience
pub use game::{
    Action, BattleWorld, Coord, Observation, Outcome, SpaceSpec, Status, StepInfo, StepOutcome,
    Team, TerrainCell, TerrainGrid, Unit,
};
pub use replay::{Recording, ReplayEngine, render_ascii};
