//! Property-based tests for battle mechanics.
//!
//! These tests drive worlds with arbitrary configurations and action
//! sequences and check that the world stays consistent.
//! Run with: cargo test --release prop_battle

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use skirmish::game::invariants::check_invariants;
use skirmish::{Action, BattleConfig, BattleWorld, MultiAgentEnv, Status, StepError, Team};

/// Small but valid configurations.
fn battle_config() -> impl Strategy<Value = BattleConfig> {
    (
        12u16..=24,
        8u16..=20,
        1u16..=6,
        0.0f64..0.25,
        0.0f64..0.3,
        any::<u64>(),
        10u32..=80,
    )
        .prop_map(
            |(width, height, units_per_team, obstacle_ratio, hill_ratio, terrain_seed, max_steps)| {
                BattleConfig {
                    width,
                    height,
                    units_per_team,
                    obstacle_ratio,
                    hill_ratio,
                    terrain_seed,
                    max_steps,
                    hideout_band: 4,
                    hideout_count: 4,
                    ..BattleConfig::default()
                }
            },
        )
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Move),
        Just(Action::Attack),
        Just(Action::Heal),
        Just(Action::Escort),
    ]
}

/// Play `script` cyclically until the episode ends, checking after every step.
fn play(world: &mut BattleWorld, script: &[Action]) -> Result<(), TestCaseError> {
    let n = world.units().len();
    let mut tick = 0usize;
    while !world.is_done() {
        let actions: Vec<Action> = (0..n)
            .map(|i| script[(tick * n + i) % script.len()])
            .collect();
        let out = world.step(&actions).unwrap();

        prop_assert_eq!(out.rewards.len(), n);
        prop_assert!(out.rewards.iter().all(|r| r.is_finite()));
        prop_assert_eq!(out.done, world.is_done());
        let violations = check_invariants(world);
        prop_assert!(violations.is_empty(), "{:?}", violations);
        tick += 1;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// World creation succeeds for any seed and places every unit legally.
    #[test]
    fn prop_create_places_legally(config in battle_config()) {
        let world = BattleWorld::create(config).unwrap();
        prop_assert_eq!(world.units().len(), config.roster_size());
        prop_assert!(check_invariants(&world).is_empty());

        for unit in world.units() {
            let x = unit.pos().x;
            match unit.team {
                Team::Left => prop_assert!(x < config.width / 2),
                Team::Right => prop_assert!(x >= config.width / 2),
            }
            prop_assert_eq!(unit.status(), Status::Healthy);
            prop_assert_eq!(unit.health(), config.max_health);
        }
        prop_assert_eq!(
            world.hideouts().len(),
            usize::from(config.hideouts_per_team()) * 2
        );
    }

    /// Arbitrary action scripts never break the world's invariants.
    #[test]
    fn prop_invariants_hold_over_episode(
        config in battle_config(),
        seed in any::<u64>(),
        script in prop::collection::vec(action(), 1..64)
    ) {
        let mut world = BattleWorld::create(config).unwrap();
        world.reset(Some(seed));
        play(&mut world, &script)?;

        prop_assert!(world.step_count() <= config.max_steps);
        let capped = Team::ALL
            .iter()
            .any(|&t| world.counters(t).captured >= config.capture_limit);
        prop_assert!(capped || world.step_count() == config.max_steps);
        prop_assert_eq!(
            world.step(&vec![Action::Move; world.units().len()]).unwrap_err(),
            StepError::EpisodeOver
        );
    }

    /// Same config, seed and actions give the same episode.
    #[test]
    fn prop_episode_deterministic(
        config in battle_config(),
        seed in any::<u64>(),
        script in prop::collection::vec(action(), 1..32)
    ) {
        let mut a = BattleWorld::create(config).unwrap();
        let mut b = BattleWorld::create(config).unwrap();
        prop_assert_eq!(a.reset(Some(seed)), b.reset(Some(seed)));
        play(&mut a, &script)?;
        play(&mut b, &script)?;
        prop_assert_eq!(a.observation(), b.observation());
        prop_assert_eq!(a.info(), b.info());
        prop_assert_eq!(a.returns(), b.returns());
    }

    /// Observations stay inside the advertised space.
    #[test]
    fn prop_observation_within_space(
        config in battle_config(),
        seed in any::<u64>(),
        codes in prop::collection::vec(0u8..4, 1..48)
    ) {
        let mut world = BattleWorld::create(config).unwrap();
        let spaces = world.spaces();
        let (obs, _) = MultiAgentEnv::reset(&mut world, Some(seed));
        prop_assert_eq!(obs.shape(), (spaces.rows, spaces.columns));

        let n = world.num_agents();
        let mut tick = 0usize;
        while !world.is_done() {
            let step_codes: Vec<u8> = (0..n).map(|i| codes[(tick + i) % codes.len()]).collect();
            let out = world.step_codes(&step_codes).unwrap();
            prop_assert!(out
                .observation
                .to_flat()
                .iter()
                .all(|&v| (spaces.low..=spaces.high).contains(&v)));
            tick += 1;
        }
    }

    /// Any code outside 0..=3 is rejected without advancing the world.
    #[test]
    fn prop_invalid_codes_rejected(bad in 4u8..=u8::MAX, slot in 0usize..4) {
        let config = BattleConfig {
            units_per_team: 2,
            ..BattleConfig::default()
        };
        let mut world = BattleWorld::create(config).unwrap();
        let before = world.observation();
        let mut codes = vec![0u8; 4];
        codes[slot] = bad;
        prop_assert_eq!(
            world.step_codes(&codes).unwrap_err(),
            StepError::InvalidAction { index: slot, value: bad }
        );
        prop_assert_eq!(world.step_count(), 0);
        prop_assert_eq!(world.observation(), before);
    }
}
