#![no_main]

//! Battle step fuzzer.
//!
//! Builds a small world from fuzzer-chosen knobs and drives it with raw
//! action codes, including invalid ones and wrong-length vectors:
//! 1. Invalid input must be rejected without touching the world
//! 2. Valid input must keep every world invariant
//! 3. A finished episode must refuse further steps

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use skirmish::game::invariants::check_invariants;
use skirmish::{BattleConfig, BattleWorld, StepError};

/// Structured input for step fuzzing.
#[derive(Arbitrary, Debug)]
struct StepInput {
    /// Grid width offset (added to the minimum).
    width: u8,
    /// Grid height offset (added to the minimum).
    height: u8,
    /// Units per team offset.
    units: u8,
    /// Obstacle density in 1/256ths, capped.
    obstacles: u8,
    /// Terrain seed.
    terrain_seed: u64,
    /// Episode seed.
    episode_seed: u64,
    /// Action codes, consumed one roster-sized chunk per step.
    codes: Vec<u8>,
    /// Occasionally drop one code to exercise the length check.
    truncate_every: u8,
}

fuzz_target!(|input: StepInput| {
    let config = BattleConfig {
        width: 12 + u16::from(input.width % 20),
        height: 6 + u16::from(input.height % 20),
        units_per_team: 1 + u16::from(input.units % 8),
        obstacle_ratio: f64::from(input.obstacles % 64) / 256.0,
        hideout_band: 4,
        hideout_count: 4,
        max_steps: 64,
        terrain_seed: input.terrain_seed,
        ..BattleConfig::default()
    };

    let Ok(mut world) = BattleWorld::create(config) else {
        return;
    };
    world.reset(Some(input.episode_seed));
    let n = world.units().len();

    for (tick, chunk) in input.codes.chunks(n).enumerate() {
        let mut codes = chunk.to_vec();
        if input.truncate_every > 0 && tick % usize::from(input.truncate_every) == 0 {
            codes.pop();
        }

        let before = world.observation();
        match world.step_codes(&codes) {
            Ok(out) => {
                assert_eq!(out.rewards.len(), n);
                assert!(out.rewards.iter().all(|r| r.is_finite()));
                let violations = check_invariants(&world);
                assert!(
                    violations.is_empty(),
                    "Invariants violated after step {}: {:?}",
                    world.step_count(),
                    violations
                );
            }
            Err(StepError::EpisodeOver) => {
                assert!(world.is_done());
                break;
            }
            Err(StepError::ActionCountMismatch { expected, actual }) => {
                assert_eq!(expected, n);
                assert_ne!(actual, n);
                assert_eq!(world.observation(), before);
            }
            Err(StepError::InvalidAction { index, value }) => {
                assert!(value > 3);
                assert_eq!(codes[index], value);
                assert_eq!(world.observation(), before);
            }
        }
    }
});
