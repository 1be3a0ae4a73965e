//! Action resolution for one simulation tick.
//!
//! A tick runs in a fixed order:
//! 1. the step counter advances and every cooldown drops by one,
//! 2. each active unit resolves its action in roster order, seeing the
//!    effects of every earlier unit in the same tick,
//! 3. the capture sweep takes critically injured units off the board,
//! 4. termination is checked and, on the final tick, the victory bonus is
//!    applied.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::StepError;
use crate::game::invariants::assert_invariants;
use crate::game::{BattleWorld, Coord, Observation, Outcome, Status, StepInfo, Unit};

/// Random directions for a Move action: left, right, up, down.
pub const MOVE_DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Per-unit action for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Action {
    /// Step one cell in a random direction.
    Move = 0,
    /// Strike the nearest enemy if it is in range.
    Attack = 1,
    /// Heal the nearest wounded ally, from inside a hideout.
    Heal = 2,
    /// Help the nearest critically injured ally toward a hideout.
    Escort = 3,
}

impl Action {
    /// All actions by code.
    pub const ALL: [Self; 4] = [Self::Move, Self::Attack, Self::Heal, Self::Escort];

    /// Wire code of the action.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<Action> for u8 {
    fn from(action: Action) -> Self {
        action.code()
    }
}

impl TryFrom<u8> for Action {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(usize::from(code)).copied().ok_or(code)
    }
}

/// Result of a successful step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    /// Observation after the tick.
    pub observation: Observation,
    /// Reward earned by each unit during the tick, in roster order.
    pub rewards: Vec<f64>,
    /// Whether the episode ended on this tick.
    pub done: bool,
    /// Counters after the tick.
    pub info: StepInfo,
}

impl BattleWorld {
    /// Advance the world by one tick.
    ///
    /// `actions` holds one action per unit in roster order. Entries for
    /// Captured units are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::EpisodeOver`] after termination and
    /// [`StepError::ActionCountMismatch`] when the vector length differs
    /// from the roster size. The world is untouched in both cases.
    pub fn step(&mut self, actions: &[Action]) -> Result<StepOutcome, StepError> {
        if self.done {
            return Err(StepError::EpisodeOver);
        }
        if actions.len() != self.units.len() {
            return Err(StepError::ActionCountMismatch {
                expected: self.units.len(),
                actual: actions.len(),
            });
        }

        self.step += 1;
        for unit in &mut self.units {
            unit.attack_cooldown = unit.attack_cooldown.saturating_sub(1);
            unit.heal_cooldown = unit.heal_cooldown.saturating_sub(1);
        }

        let mut rewards = vec![0.0; self.units.len()];
        for (index, &action) in actions.iter().enumerate() {
            if !self.units[index].is_active() {
                continue;
            }
            rewards[index] += match action {
                Action::Move => self.resolve_move(index),
                Action::Attack => self.resolve_attack(index),
                Action::Heal => self.resolve_heal(index),
                Action::Escort => self.resolve_escort(index),
            };
        }

        self.capture_sweep(&mut rewards);

        self.done = self
            .counters
            .iter()
            .any(|c| c.captured >= self.config.capture_limit)
            || self.step >= self.config.max_steps;
        if self.done {
            self.apply_victory_bonus(&mut rewards);
        }

        for (total, reward) in self.returns.iter_mut().zip(&rewards) {
            *total += reward;
        }

        assert_invariants(self);

        Ok(StepOutcome {
            observation: self.observation(),
            rewards,
            done: self.done,
            info: self.info(),
        })
    }

    /// Advance by one tick from raw action codes.
    ///
    /// # Errors
    ///
    /// As [`BattleWorld::step`], plus [`StepError::InvalidAction`] for the
    /// first code outside `0..=3`.
    pub fn step_codes(&mut self, codes: &[u8]) -> Result<StepOutcome, StepError> {
        if self.done {
            return Err(StepError::EpisodeOver);
        }
        let actions = codes
            .iter()
            .enumerate()
            .map(|(index, &code)| {
                Action::try_from(code).map_err(|value| StepError::InvalidAction { index, value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.step(&actions)
    }

    fn resolve_move(&mut self, index: usize) -> f64 {
        let direction = MOVE_DIRECTIONS[self.rng.gen_range(0..MOVE_DIRECTIONS.len())];
        let unit = &mut self.units[index];
        let target = unit.pos().offset(direction);
        unit.move_toward(target, &self.grid);
        self.config.rewards.movement
    }

    fn resolve_attack(&mut self, index: usize) -> f64 {
        let attacker = &self.units[index];
        if attacker.status() != Status::Healthy || attacker.attack_cooldown > 0 {
            return 0.0;
        }
        let team = attacker.team;
        let Some((target, distance)) = nearest(&self.units, attacker.pos(), |u| {
            u.team != team && u.is_active()
        }) else {
            return 0.0;
        };
        if distance > self.config.attack_range {
            return 0.0;
        }

        let standing = self.units[target].health() > 0;
        self.units[target].take_damage(self.config.attack_damage);
        self.units[index].attack_cooldown = self.config.attack_cooldown;

        let mut reward = self.config.rewards.attack;
        if standing && self.units[target].health() == 0 {
            reward += self.config.rewards.kill;
            self.counters[team.index()].kills += 1;
            trace!(attacker = index, target, step = self.step, "unit downed");
        }
        reward
    }

    fn resolve_heal(&mut self, index: usize) -> f64 {
        let healer = &self.units[index];
        if healer.status() != Status::Healthy
            || healer.heal_cooldown > 0
            || !healer.is_in_hideout(&self.grid)
        {
            return 0.0;
        }
        let team = healer.team;
        let Some((target, distance)) = nearest(&self.units, healer.pos(), |u| {
            u.team == team && u.status().is_wounded()
        }) else {
            return 0.0;
        };
        if distance > self.config.heal_range {
            return 0.0;
        }

        self.units[target].receive_heal(self.config.heal_amount);
        self.units[index].heal_cooldown = self.config.heal_cooldown;
        self.counters[team.index()].heals += 1;
        self.config.rewards.heal
    }

    fn resolve_escort(&mut self, index: usize) -> f64 {
        let escort = &self.units[index];
        if escort.status() != Status::Healthy {
            return 0.0;
        }
        let team = escort.team;
        let Some((target, distance)) = nearest(&self.units, escort.pos(), |u| {
            u.team == team && u.status() == Status::CriticallyInjured
        }) else {
            return 0.0;
        };

        let ally = self.units[target].pos();
        if distance > self.config.escort_reach {
            self.units[index].move_toward(ally.signed(), &self.grid);
            return self.config.rewards.escort_approach;
        }

        let Some(hideout) = nearest_hideout(&self.hideouts, ally) else {
            return 0.0;
        };
        self.units[index].move_toward(hideout.signed(), &self.grid);
        self.units[target].move_toward(hideout.signed(), &self.grid);

        let mut reward = self.config.rewards.escort_move;
        if self.units[target].is_in_hideout(&self.grid) {
            reward += self.config.rewards.rescue;
            trace!(escort = index, ally = target, step = self.step, "ally reached hideout");
        }
        reward
    }

    /// Capture every critically injured unit with a Healthy enemy in reach.
    ///
    /// Victims are visited in roster order and each is taken by the first
    /// qualifying enemy in roster order.
    fn capture_sweep(&mut self, rewards: &mut [f64]) {
        let reach = self.config.capture_distance;
        for victim in 0..self.units.len() {
            let unit = &self.units[victim];
            if unit.status() != Status::CriticallyInjured {
                continue;
            }
            let team = unit.team;
            let pos = unit.pos();
            let captor = self.units.iter().position(|enemy| {
                enemy.team != team
                    && enemy.status() == Status::Healthy
                    && enemy.pos().distance(pos) <= reach
            });
            if let Some(captor) = captor {
                self.units[victim].capture();
                self.counters[team.index()].captured += 1;
                rewards[captor] += self.config.rewards.capture;
                debug!(victim, captor, step = self.step, "unit captured");
            }
        }
    }

    fn apply_victory_bonus(&self, rewards: &mut [f64]) {
        let outcome = self.standing();
        debug!(
            step = self.step,
            ?outcome,
            left_captured = self.counters[0].captured,
            right_captured = self.counters[1].captured,
            "episode finished"
        );
        let Outcome::Victory(winner) = outcome else {
            return;
        };
        let bonus = self.config.rewards.victory;
        for (unit, reward) in self.units.iter().zip(rewards.iter_mut()) {
            if unit.team == winner {
                *reward += bonus;
            } else {
                *reward -= bonus;
            }
        }
    }
}

/// Index and distance of the closest unit matching `eligible`.
///
/// Ties keep the lowest roster index.
fn nearest(units: &[Unit], from: Coord, eligible: impl Fn(&Unit) -> bool) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, unit) in units.iter().enumerate() {
        if !eligible(unit) {
            continue;
        }
        let distance = from.distance(unit.pos());
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    best
}

/// Closest hideout to `from`; ties keep placement order.
fn nearest_hideout(hideouts: &[Coord], from: Coord) -> Option<Coord> {
    let mut best: Option<(Coord, f64)> = None;
    for &hideout in hideouts {
        let distance = from.distance(hideout);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((hideout, distance));
        }
    }
    best.map(|(hideout, _)| hideout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::game::{Team, TerrainCell, TerrainGrid};

    /// 12x8 open map, one unit per side unless stated otherwise.
    fn config(units_per_team: u16) -> BattleConfig {
        BattleConfig {
            width: 12,
            height: 8,
            units_per_team,
            hideout_band: 4,
            hideout_count: 2,
            ..BattleConfig::default()
        }
    }

    fn world_with(units_per_team: u16, hideouts: &[Coord], positions: &[Coord]) -> BattleWorld {
        let mut grid = TerrainGrid::new(12, 8).unwrap();
        for &h in hideouts {
            grid.set(h, TerrainCell::Hideout);
        }
        BattleWorld::from_layout(config(units_per_team), grid, positions).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_action_codes() {
        assert_eq!(Action::try_from(2), Ok(Action::Heal));
        assert_eq!(Action::try_from(4), Err(4));
        assert_eq!(u8::from(Action::Escort), 3);
        assert_eq!(serde_json::to_string(&Action::Attack).unwrap(), "1");
        assert!(serde_json::from_str::<Action>("9").is_err());
    }

    #[test]
    fn test_wrong_action_count() {
        let mut world = world_with(1, &[], &[Coord::new(2, 2), Coord::new(9, 2)]);
        let err = world.step(&[Action::Move]).unwrap_err();
        assert_eq!(
            err,
            StepError::ActionCountMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(world.step_count(), 0);
    }

    #[test]
    fn test_invalid_code() {
        let mut world = world_with(1, &[], &[Coord::new(2, 2), Coord::new(9, 2)]);
        let err = world.step_codes(&[0, 7]).unwrap_err();
        assert_eq!(err, StepError::InvalidAction { index: 1, value: 7 });
        assert_eq!(world.step_count(), 0);
    }

    #[test]
    fn test_move_always_rewarded() {
        let mut world = world_with(1, &[], &[Coord::new(2, 2), Coord::new(9, 2)]);
        let out = world.step(&[Action::Move, Action::Move]).unwrap();
        assert!(approx(out.rewards[0], 0.1));
        assert!(approx(out.rewards[1], 0.1));
        assert_eq!(out.info.step, 1);
        for unit in world.units() {
            assert!(world.grid().is_passable(unit.pos()));
        }
    }

    #[test]
    fn test_attack_in_range() {
        let mut world = world_with(1, &[], &[Coord::new(3, 3), Coord::new(5, 3)]);
        let out = world.step(&[Action::Attack, Action::Escort]).unwrap();
        assert_eq!(world.units()[1].health(), 85);
        assert_eq!(world.units()[0].attack_cooldown, 3);
        assert!(approx(out.rewards[0], 1.0));
        assert!(approx(out.rewards[1], 0.0));
    }

    #[test]
    fn test_attack_out_of_range() {
        let mut world = world_with(1, &[], &[Coord::new(3, 3), Coord::new(6, 3)]);
        let out = world.step(&[Action::Attack, Action::Escort]).unwrap();
        assert_eq!(world.units()[1].health(), 100);
        assert_eq!(world.units()[0].attack_cooldown, 0);
        assert!(approx(out.rewards[0], 0.0));
    }

    #[test]
    fn test_attack_cooldown_blocks_then_expires() {
        let mut world = world_with(1, &[], &[Coord::new(3, 3), Coord::new(4, 3)]);
        let idle = [Action::Attack, Action::Escort];
        world.step(&idle).unwrap();
        assert_eq!(world.units()[1].health(), 85);

        // Cooldown 3: decrements to 2 and 1 on the next two ticks, then 0.
        world.step(&idle).unwrap();
        world.step(&idle).unwrap();
        assert_eq!(world.units()[1].health(), 85);
        world.step(&idle).unwrap();
        assert_eq!(world.units()[1].health(), 70);
    }

    #[test]
    fn test_units_act_in_roster_order() {
        // Both start Healthy at 100; unit 0 hits first, but 85 is still Healthy,
        // so unit 1 strikes back in the same tick.
        let mut world = world_with(1, &[], &[Coord::new(3, 3), Coord::new(4, 3)]);
        world.step(&[Action::Attack, Action::Attack]).unwrap();
        assert_eq!(world.units()[0].health(), 85);
        assert_eq!(world.units()[1].health(), 85);
    }

    #[test]
    fn test_kill_bonus_and_capture() {
        let mut world = world_with(1, &[], &[Coord::new(3, 3), Coord::new(4, 3)]);
        world.units_mut()[1].take_damage(90);
        assert_eq!(world.units()[1].status(), Status::CriticallyInjured);

        let out = world.step(&[Action::Attack, Action::Escort]).unwrap();
        // Attack 1 + kill 5, then the same unit captures the victim for 4.
        assert!(approx(out.rewards[0], 10.0));
        assert!(!out.done);
        assert_eq!(world.units()[1].status(), Status::Captured);
        assert_eq!(world.counters(Team::Left).kills, 1);
        assert_eq!(world.counters(Team::Right).captured, 1);
        assert_eq!(out.info.team1_captured, 1);
    }

    #[test]
    fn test_zero_health_stays_critical_until_swept() {
        // Attacker at distance 2 downs the target but is too far to capture.
        let mut world = world_with(1, &[], &[Coord::new(3, 3), Coord::new(5, 3)]);
        world.units_mut()[1].take_damage(90);
        let out = world.step(&[Action::Attack, Action::Escort]).unwrap();
        let target = &world.units()[1];
        assert_eq!(target.health(), 0);
        assert_eq!(target.status(), Status::CriticallyInjured);
        assert!(approx(out.rewards[0], 6.0));
        assert_eq!(world.counters(Team::Left).kills, 1);

        // A second blow on a zero-health unit is not another kill.
        for _ in 0..3 {
            world.step(&[Action::Attack, Action::Escort]).unwrap();
        }
        assert_eq!(world.counters(Team::Left).kills, 1);
    }

    #[test]
    fn test_captured_unit_is_inert() {
        let positions = [
            Coord::new(3, 3),
            Coord::new(1, 1),
            Coord::new(4, 3),
            Coord::new(10, 6),
        ];
        let mut world = world_with(2, &[], &positions);
        world.units_mut()[2].take_damage(95);
        world
            .step(&[Action::Escort, Action::Escort, Action::Escort, Action::Escort])
            .unwrap();
        assert_eq!(world.units()[2].status(), Status::Captured);

        let before = world.units()[2];
        let out = world
            .step(&[Action::Escort, Action::Escort, Action::Attack, Action::Escort])
            .unwrap();
        assert_eq!(world.units()[2], before);
        assert!(approx(out.rewards[2], 0.0));

        let out = world
            .step(&[Action::Attack, Action::Escort, Action::Escort, Action::Escort])
            .unwrap();
        assert!(approx(out.rewards[0], 0.0));
    }

    #[test]
    fn test_heal_requires_hideout() {
        let positions = [
            Coord::new(1, 1),
            Coord::new(2, 1),
            Coord::new(10, 6),
            Coord::new(11, 7),
        ];
        let mut world = world_with(2, &[Coord::new(1, 1)], &positions);
        world.units_mut()[1].take_damage(60);

        let idle = [Action::Heal, Action::Escort, Action::Escort, Action::Escort];
        let out = world.step(&idle).unwrap();
        assert_eq!(world.units()[1].health(), 50);
        assert_eq!(world.units()[1].status(), Status::Healthy);
        assert_eq!(world.units()[0].heal_cooldown, 2);
        assert_eq!(world.counters(Team::Left).heals, 1);
        assert!(approx(out.rewards[0], 2.0));

        // Outside a hideout the roles swap and nothing happens.
        let mut world = world_with(2, &[Coord::new(1, 1)], &positions);
        world.units_mut()[0].take_damage(60);
        let idle = [Action::Escort, Action::Heal, Action::Escort, Action::Escort];
        world.step(&idle).unwrap();
        assert_eq!(world.units()[0].health(), 40);
    }

    #[test]
    fn test_heal_skips_healthy_ally() {
        let positions = [
            Coord::new(1, 1),
            Coord::new(2, 1),
            Coord::new(10, 6),
            Coord::new(11, 7),
        ];
        let mut world = world_with(2, &[Coord::new(1, 1)], &positions);
        // Scratched but still above the injured threshold.
        world.units_mut()[1].take_damage(15);
        assert_eq!(world.units()[1].status(), Status::Healthy);

        let out = world
            .step(&[Action::Heal, Action::Escort, Action::Escort, Action::Escort])
            .unwrap();
        assert_eq!(world.units()[1].health(), 85);
        assert_eq!(world.units()[0].heal_cooldown, 0);
        assert_eq!(world.counters(Team::Left).heals, 0);
        assert!(approx(out.rewards[0], 0.0));
    }

    #[test]
    fn test_heal_out_of_range() {
        let positions = [
            Coord::new(1, 1),
            Coord::new(2, 2),
            Coord::new(10, 6),
            Coord::new(11, 7),
        ];
        let mut world = world_with(2, &[Coord::new(1, 1)], &positions);
        world.units_mut()[1].take_damage(60);
        let out = world
            .step(&[Action::Heal, Action::Escort, Action::Escort, Action::Escort])
            .unwrap();
        assert_eq!(world.units()[1].health(), 40);
        assert!(approx(out.rewards[0], 0.0));
    }

    #[test]
    fn test_escort_approach() {
        let positions = [
            Coord::new(2, 4),
            Coord::new(6, 4),
            Coord::new(11, 0),
            Coord::new(11, 7),
        ];
        let mut world = world_with(2, &[Coord::new(0, 0)], &positions);
        world.units_mut()[1].take_damage(85);
        let out = world
            .step(&[Action::Escort, Action::Escort, Action::Escort, Action::Escort])
            .unwrap();
        assert_eq!(world.units()[0].pos(), Coord::new(3, 4));
        assert!(approx(out.rewards[0], 0.5));
    }

    #[test]
    fn test_escort_rescue_into_hideout() {
        // Ally at (2,1) is adjacent to the hideout at (1,1); a critical unit
        // moves 0.3 cells, so (2,1) -> (1.7,1) truncates to (1,1).
        let positions = [
            Coord::new(3, 1),
            Coord::new(2, 1),
            Coord::new(11, 6),
            Coord::new(11, 7),
        ];
        let mut world = world_with(2, &[Coord::new(1, 1)], &positions);
        world.units_mut()[1].take_damage(85);
        let out = world
            .step(&[Action::Escort, Action::Escort, Action::Escort, Action::Escort])
            .unwrap();
        assert_eq!(world.units()[0].pos(), Coord::new(2, 1));
        assert_eq!(world.units()[1].pos(), Coord::new(1, 1));
        assert!(approx(out.rewards[0], 4.0));
    }

    #[test]
    fn test_capture_needs_healthy_enemy() {
        let positions = [Coord::new(3, 3), Coord::new(4, 3)];
        let mut world = world_with(1, &[], &positions);
        world.units_mut()[0].take_damage(60);
        world.units_mut()[1].take_damage(85);
        world.step(&[Action::Escort, Action::Escort]).unwrap();
        assert_eq!(world.units()[1].status(), Status::CriticallyInjured);
        assert_eq!(world.counters(Team::Right).captured, 0);
    }

    #[test]
    fn test_critical_unit_survives_without_healthy_captor() {
        // Adjacent captor is only Injured; Escort is a no-op for both.
        let mut world = world_with(1, &[], &[Coord::new(3, 3), Coord::new(4, 3)]);
        world.units_mut()[0].take_damage(60);
        world.units_mut()[1].take_damage(85);
        let idle = [Action::Escort, Action::Escort];
        while !world.is_done() {
            world.step(&idle).unwrap();
            assert_eq!(world.units()[1].status(), Status::CriticallyInjured);
            assert_eq!(world.counters(Team::Right).captured, 0);
        }
        assert_eq!(world.step_count(), world.config().max_steps);
        assert_eq!(world.outcome(), Some(Outcome::Draw));

        // Healthy enemy that never comes within capture distance.
        let mut world = world_with(1, &[], &[Coord::new(1, 1), Coord::new(10, 6)]);
        world.units_mut()[1].take_damage(85);
        let hold = [Action::Attack, Action::Escort];
        while !world.is_done() {
            world.step(&hold).unwrap();
            assert_eq!(world.units()[0].pos(), Coord::new(1, 1));
            assert_eq!(world.units()[1].status(), Status::CriticallyInjured);
        }
        assert_eq!(world.counters(Team::Right).captured, 0);
        assert_eq!(world.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn test_blocked_move_still_rewarded() {
        // Corner cell walled in on both open sides.
        let mut grid = TerrainGrid::new(12, 8).unwrap();
        grid.set(Coord::new(1, 0), TerrainCell::Obstacle);
        grid.set(Coord::new(0, 1), TerrainCell::Obstacle);
        let mut world =
            BattleWorld::from_layout(config(1), grid, &[Coord::new(0, 0), Coord::new(10, 6)])
                .unwrap();
        let movement = world.config().rewards.movement;

        for _ in 0..12 {
            let out = world.step(&[Action::Move, Action::Escort]).unwrap();
            assert_eq!(world.units()[0].pos(), Coord::new(0, 0));
            assert!(approx(out.rewards[0], movement));
            assert!(approx(out.rewards[0], 0.1));
        }
    }

    #[test]
    fn test_step_limit_and_draw() {
        let mut cfg = config(1);
        cfg.max_steps = 3;
        let grid = TerrainGrid::new(12, 8).unwrap();
        let mut world =
            BattleWorld::from_layout(cfg, grid, &[Coord::new(1, 1), Coord::new(10, 6)]).unwrap();

        let idle = [Action::Escort, Action::Escort];
        assert!(!world.step(&idle).unwrap().done);
        assert!(!world.step(&idle).unwrap().done);
        let last = world.step(&idle).unwrap();
        assert!(last.done);
        assert!(approx(last.rewards[0], 0.0));
        assert_eq!(world.outcome(), Some(Outcome::Draw));
        assert_eq!(world.step(&idle), Err(StepError::EpisodeOver));
        assert_eq!(world.step_codes(&[0, 0]), Err(StepError::EpisodeOver));
    }

    #[test]
    fn test_capture_limit_victory_bonus() {
        let mut cfg = config(1);
        cfg.capture_limit = 1;
        let grid = TerrainGrid::new(12, 8).unwrap();
        let mut world =
            BattleWorld::from_layout(cfg, grid, &[Coord::new(3, 3), Coord::new(4, 3)]).unwrap();
        world.units_mut()[1].take_damage(85);

        let out = world.step(&[Action::Escort, Action::Escort]).unwrap();
        assert!(out.done);
        assert_eq!(world.outcome(), Some(Outcome::Victory(Team::Left)));
        // Capture 4 + victory 10 for the winner, -10 for the loser.
        assert!(approx(out.rewards[0], 14.0));
        assert!(approx(out.rewards[1], -10.0));
        assert!(approx(world.returns()[0], 14.0));
    }

    #[test]
    fn test_nearest_tie_prefers_lowest_index() {
        let profile = crate::game::UnitProfile::from_config(&BattleConfig::default());
        let units = [
            Unit::new(0, Team::Left, Coord::new(5, 5), profile),
            Unit::new(1, Team::Right, Coord::new(6, 5), profile),
            Unit::new(2, Team::Right, Coord::new(4, 5), profile),
        ];
        let found = nearest(&units, Coord::new(5, 5), |u| u.team == Team::Right);
        assert_eq!(found.map(|(i, _)| i), Some(1));
        assert_eq!(
            nearest_hideout(&[Coord::new(0, 0), Coord::new(10, 10)], Coord::new(5, 5)),
            Some(Coord::new(0, 0))
        );
    }
}
