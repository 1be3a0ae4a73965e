//! Scripted policies for driving both teams.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::game::{Action, BattleWorld, Status, Team, Unit};

/// Chooses one action per unit per tick.
pub trait Policy {
    /// Action for the unit at `index` in the current world.
    fn choose(&mut self, world: &BattleWorld, index: usize) -> Action;
}

/// Uniformly random actions from a private seeded stream.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    /// Create a policy with its own seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn choose(&mut self, _world: &BattleWorld, _index: usize) -> Action {
        Action::ALL[self.rng.gen_range(0..Action::ALL.len())]
    }
}

/// Greedy rules: attack, then heal, then escort, otherwise move.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl Policy for HeuristicPolicy {
    fn choose(&mut self, world: &BattleWorld, index: usize) -> Action {
        let Some(unit) = world.unit(index) else {
            return Action::Move;
        };
        if unit.status() != Status::Healthy {
            return Action::Move;
        }
        let config = world.config();
        let units = world.units();

        let within = |other: &Unit, range: f64| unit.pos().distance(other.pos()) <= range;

        if unit.attack_cooldown == 0
            && units
                .iter()
                .any(|e| e.team != unit.team && e.is_active() && within(e, config.attack_range))
        {
            return Action::Attack;
        }

        if unit.heal_cooldown == 0
            && unit.is_in_hideout(world.grid())
            && units.iter().any(|a| {
                a.team == unit.team && a.status().is_wounded() && within(a, config.heal_range)
            })
        {
            return Action::Heal;
        }

        if units
            .iter()
            .any(|a| a.team == unit.team && a.status() == Status::CriticallyInjured)
        {
            return Action::Escort;
        }

        Action::Move
    }
}

/// Built-in policy choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// [`RandomPolicy`].
    Random,
    /// [`HeuristicPolicy`].
    Heuristic,
}

impl PolicyKind {
    /// Instantiate the policy. `seed` only matters for stochastic policies.
    #[must_use]
    pub fn build(self, seed: u64) -> Box<dyn Policy + Send> {
        match self {
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Heuristic => Box::new(HeuristicPolicy),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Heuristic => "heuristic",
        }
    }
}

/// One policy per team.
pub struct TeamPolicies {
    left: Box<dyn Policy + Send>,
    right: Box<dyn Policy + Send>,
}

impl std::fmt::Debug for TeamPolicies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamPolicies").finish_non_exhaustive()
    }
}

impl TeamPolicies {
    /// Pair two policies.
    #[must_use]
    pub fn new(left: Box<dyn Policy + Send>, right: Box<dyn Policy + Send>) -> Self {
        Self { left, right }
    }

    /// Build both teams' policies for one episode.
    ///
    /// Each team's stream is derived from the episode seed, so an episode
    /// is reproducible from its seed alone.
    #[must_use]
    pub fn from_kinds(left: PolicyKind, right: PolicyKind, episode_seed: u64) -> Self {
        Self::new(
            left.build(derive_seed(episode_seed, Team::Left)),
            right.build(derive_seed(episode_seed, Team::Right)),
        )
    }

    /// Action vector for the whole roster in roster order.
    pub fn actions(&mut self, world: &BattleWorld) -> Vec<Action> {
        (0..world.units().len())
            .map(|index| {
                let policy = match world.units()[index].team {
                    Team::Left => &mut self.left,
                    Team::Right => &mut self.right,
                };
                policy.choose(world, index)
            })
            .collect()
    }
}

/// Mix the episode seed with the team so the two streams differ.
fn derive_seed(episode_seed: u64, team: Team) -> u64 {
    const TEAM_SALT: [u64; 2] = [0x9E37_79B9_7F4A_7C15, 0xC2B2_AE3D_27D4_EB4F];
    episode_seed ^ TEAM_SALT[team.index()]
}
