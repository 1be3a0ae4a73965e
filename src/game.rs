//! Game layer for the skirmish world.
//!
//! Implements the battle rules:
//! - Terrain grid with hills, obstacles and hideouts
//! - Units with health tiers, cooldowns and terrain-scaled movement
//! - Per-tick action resolution, captures and termination
//! - Observation and info encoding for learners

pub mod invariants;
mod observation;
mod step;
mod terrain;
mod unit;
mod world;

pub use observation::{
    NUM_ACTIONS, OBS_COLUMNS, Observation, ObservationRow, SpaceSpec, StepInfo, TeamCounters,
    observation_high,
};
pub use step::{Action, MOVE_DIRECTIONS, StepOutcome};
pub use terrain::{Coord, MAX_PLACEMENT_ATTEMPTS, TerrainCell, TerrainGrid};
pub use unit::{Status, Team, Unit, UnitId, UnitProfile};
pub use world::{BattleWorld, Outcome};
