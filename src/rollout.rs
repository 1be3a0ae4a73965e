//! Episode runner and parallel rollouts.
//!
//! Provides a pure function interface: `(config, seed, policies) -> EpisodeSummary`
//!
//! The rollout runner handles:
//! - Deterministic world creation per episode
//! - Per-team scripted policies
//! - Parallel episodes with rayon
//! - Aggregated win and counter statistics

// Counters are converted to f64 for means.
#![allow(clippy::cast_precision_loss)]

mod policy;

pub use policy::{HeuristicPolicy, Policy, PolicyKind, RandomPolicy, TeamPolicies};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::BattleConfig;
use crate::error::{ConfigError, StepError};
use crate::game::{Action, BattleWorld, Outcome, Team, TeamCounters};
use crate::replay::Recording;

/// Error type for rollout operations.
#[derive(Debug, Error)]
pub enum RolloutError {
    /// The configuration does not build a world.
    #[error("cannot build world: {0}")]
    Config(#[from] ConfigError),
    /// A policy produced an action vector the world rejected.
    #[error("episode with seed {seed} failed: {source}")]
    Step {
        /// Episode seed.
        seed: u64,
        /// Rejection reason.
        source: StepError,
    },
}

/// Result of one complete episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    /// Seed passed to `reset`.
    pub seed: u64,
    /// Steps played.
    pub steps: u32,
    /// Winner or draw.
    pub outcome: Outcome,
    /// Final counters, indexed by team.
    pub counters: [TeamCounters; 2],
    /// Summed unit returns, indexed by team.
    pub team_returns: [f64; 2],
    /// Action vectors in step order.
    #[serde(skip)]
    pub actions: Vec<Vec<Action>>,
}

impl EpisodeSummary {
    /// Recording that replays this episode on a world built from `config`.
    #[must_use]
    pub fn to_recording(&self, config: &BattleConfig) -> Recording {
        Recording {
            config: *config,
            seed: self.seed,
            actions: self.actions.clone(),
        }
    }
}

/// Play one episode to termination.
///
/// The world is reset with `seed`; terrain is unchanged.
///
/// # Errors
///
/// Returns an error if a policy produces an invalid action vector.
pub fn run_episode(
    world: &mut BattleWorld,
    seed: u64,
    policies: &mut TeamPolicies,
) -> Result<EpisodeSummary, StepError> {
    world.reset(Some(seed));
    let mut actions = Vec::new();
    while !world.is_done() {
        let step_actions = policies.actions(world);
        world.step(&step_actions)?;
        actions.push(step_actions);
    }

    let mut team_returns = [0.0; 2];
    for (unit, ret) in world.units().iter().zip(world.returns()) {
        team_returns[unit.team.index()] += ret;
    }
    let summary = EpisodeSummary {
        seed,
        steps: world.step_count(),
        outcome: world.standing(),
        counters: [world.counters(Team::Left), world.counters(Team::Right)],
        team_returns,
        actions,
    };
    debug!(seed, steps = summary.steps, outcome = ?summary.outcome, "episode done");
    Ok(summary)
}

/// Aggregated statistics over many episodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RolloutStats {
    /// Episodes played.
    pub episodes: u64,
    /// Wins, indexed by team.
    pub wins: [u64; 2],
    /// Drawn episodes.
    pub draws: u64,
    /// Steps summed over all episodes.
    pub total_steps: u64,
    /// Captured units summed over all episodes, indexed by team.
    pub total_captured: [u64; 2],
    /// Downing blows summed over all episodes, indexed by team.
    pub total_kills: [u64; 2],
    /// Heals summed over all episodes, indexed by team.
    pub total_heals: [u64; 2],
    /// Team returns summed over all episodes, indexed by team.
    pub total_returns: [f64; 2],
}

impl RolloutStats {
    /// Add one episode.
    pub fn add(&mut self, episode: &EpisodeSummary) {
        self.episodes += 1;
        match episode.outcome {
            Outcome::Victory(team) => self.wins[team.index()] += 1,
            Outcome::Draw => self.draws += 1,
        }
        self.total_steps += u64::from(episode.steps);
        for team in Team::ALL {
            let i = team.index();
            let c = episode.counters[i];
            self.total_captured[i] += u64::from(c.captured);
            self.total_kills[i] += u64::from(c.kills);
            self.total_heals[i] += u64::from(c.heals);
            self.total_returns[i] += episode.team_returns[i];
        }
    }

    fn mean(&self, total: f64) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            total / self.episodes as f64
        }
    }

    /// Fraction of episodes won by `team`.
    #[must_use]
    pub fn win_rate(&self, team: Team) -> f64 {
        self.mean(self.wins[team.index()] as f64)
    }

    /// Fraction of drawn episodes.
    #[must_use]
    pub fn draw_rate(&self) -> f64 {
        self.mean(self.draws as f64)
    }

    /// Mean episode length.
    #[must_use]
    pub fn mean_steps(&self) -> f64 {
        self.mean(self.total_steps as f64)
    }

    /// Mean units of `team` captured per episode.
    #[must_use]
    pub fn mean_captured(&self, team: Team) -> f64 {
        self.mean(self.total_captured[team.index()] as f64)
    }

    /// Mean downing blows by `team` per episode.
    #[must_use]
    pub fn mean_kills(&self, team: Team) -> f64 {
        self.mean(self.total_kills[team.index()] as f64)
    }

    /// Mean heals by `team` per episode.
    #[must_use]
    pub fn mean_heals(&self, team: Team) -> f64 {
        self.mean(self.total_heals[team.index()] as f64)
    }

    /// Mean summed return of `team` per episode.
    #[must_use]
    pub fn mean_return(&self, team: Team) -> f64 {
        self.mean(self.total_returns[team.index()])
    }
}

/// Run `episodes` episodes in parallel and aggregate them.
///
/// Episode `i` uses seed `base_seed + i` (wrapping). Episodes run on rayon's
/// pool but are aggregated in seed order, so the statistics do not depend
/// on the thread count.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any episode fails.
pub fn run_rollouts(
    config: &BattleConfig,
    base_seed: u64,
    episodes: u64,
    left: PolicyKind,
    right: PolicyKind,
) -> Result<RolloutStats, RolloutError> {
    run_rollouts_with(config, base_seed, episodes, left, right, &|_| {})
}

/// [`run_rollouts`] with a callback invoked after every finished episode.
///
/// The callback runs on worker threads in completion order.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any episode fails.
pub fn run_rollouts_with(
    config: &BattleConfig,
    base_seed: u64,
    episodes: u64,
    left: PolicyKind,
    right: PolicyKind,
    on_episode: &(dyn Fn(&EpisodeSummary) + Sync),
) -> Result<RolloutStats, RolloutError> {
    // Terrain depends only on the config; build it once and clone per episode.
    let template = BattleWorld::create(*config)?;
    info!(
        episodes,
        base_seed,
        left = left.name(),
        right = right.name(),
        "starting rollouts"
    );

    let summaries = (0..episodes)
        .into_par_iter()
        .map(|i| {
            let seed = base_seed.wrapping_add(i);
            let mut world = template.clone();
            let mut policies = TeamPolicies::from_kinds(left, right, seed);
            let mut summary = run_episode(&mut world, seed, &mut policies)
                .map_err(|source| RolloutError::Step { seed, source })?;
            summary.actions = Vec::new();
            on_episode(&summary);
            Ok(summary)
        })
        .collect::<Result<Vec<_>, RolloutError>>()?;

    let mut stats = RolloutStats::default();
    for summary in &summaries {
        stats.add(summary);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BattleConfig {
        BattleConfig {
            units_per_team: 4,
            max_steps: 60,
            terrain_seed: 2,
            ..BattleConfig::default()
        }
    }

    #[test]
    fn test_run_episode_terminates() {
        let mut world = BattleWorld::create(small_config()).unwrap();
        let mut policies = TeamPolicies::from_kinds(PolicyKind::Random, PolicyKind::Random, 7);
        let summary = run_episode(&mut world, 7, &mut policies).unwrap();
        assert!(summary.steps >= 1 && summary.steps <= 60);
        assert_eq!(summary.actions.len(), usize::try_from(summary.steps).unwrap());
        assert!(world.is_done());
        assert_eq!(world.outcome(), Some(summary.outcome));
    }

    #[test]
    fn test_episode_is_reproducible() {
        let run = || {
            let mut world = BattleWorld::create(small_config()).unwrap();
            let mut policies =
                TeamPolicies::from_kinds(PolicyKind::Heuristic, PolicyKind::Random, 11);
            run_episode(&mut world, 11, &mut policies).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_stats_add_and_means() {
        let mut stats = RolloutStats::default();
        assert!(stats.mean_steps().abs() < f64::EPSILON);

        let episode = EpisodeSummary {
            seed: 0,
            steps: 40,
            outcome: Outcome::Victory(Team::Right),
            counters: [
                TeamCounters {
                    captured: 3,
                    kills: 1,
                    heals: 2,
                },
                TeamCounters::default(),
            ],
            team_returns: [-20.0, 50.0],
            actions: Vec::new(),
        };
        stats.add(&episode);
        stats.add(&EpisodeSummary {
            outcome: Outcome::Draw,
            steps: 60,
            ..episode.clone()
        });

        assert_eq!(stats.episodes, 2);
        assert!((stats.win_rate(Team::Right) - 0.5).abs() < 1e-12);
        assert!((stats.draw_rate() - 0.5).abs() < 1e-12);
        assert!((stats.mean_steps() - 50.0).abs() < 1e-12);
        assert!((stats.mean_captured(Team::Left) - 3.0).abs() < 1e-12);
        assert!((stats.mean_return(Team::Right) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_rollouts_independent_of_threads() {
        let config = small_config();
        let parallel =
            run_rollouts(&config, 100, 8, PolicyKind::Heuristic, PolicyKind::Random).unwrap();

        let single = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(|| {
                run_rollouts(&config, 100, 8, PolicyKind::Heuristic, PolicyKind::Random)
            })
            .unwrap();

        assert_eq!(parallel, single);
        assert_eq!(parallel.episodes, 8);
        assert_eq!(parallel.wins[0] + parallel.wins[1] + parallel.draws, 8);
    }

    #[test]
    fn test_rollouts_reject_bad_config() {
        let config = BattleConfig {
            units_per_team: 0,
            ..BattleConfig::default()
        };
        let result = run_rollouts(&config, 0, 1, PolicyKind::Random, PolicyKind::Random);
        assert!(matches!(result, Err(RolloutError::Config(_))));
    }

    #[test]
    fn test_summary_to_recording_replays() {
        let config = small_config();
        let mut world = BattleWorld::create(config).unwrap();
        let mut policies = TeamPolicies::from_kinds(PolicyKind::Random, PolicyKind::Heuristic, 3);
        let summary = run_episode(&mut world, 3, &mut policies).unwrap();

        let recording = summary.to_recording(&config);
        let engine =
            crate::replay::ReplayEngine::new_at_step(recording, summary.steps).unwrap();
        assert_eq!(engine.world().observation(), world.observation());
        assert!(engine.is_finished());
    }
}
