//! World invariants - sanity checks that detect bugs.
//!
//! These should never trigger after a step of a correctly implemented
//! world. Tests and fuzz targets call [`check_invariants`] directly;
//! [`assert_invariants`] runs after every step in debug builds.

use crate::game::{BattleWorld, Status, Team};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &BattleWorld) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut push = |message: String| violations.push(InvariantViolation { message });

    let config = world.config();
    let grid = world.grid();

    for (index, unit) in world.units().iter().enumerate() {
        let pos = unit.pos();
        if !grid.in_bounds(pos) {
            push(format!("Unit {index} at {pos:?} is outside the grid"));
        } else if !grid.is_passable(pos) {
            push(format!("Unit {index} stands on an obstacle at {pos:?}"));
        }

        if unit.health() > config.max_health {
            push(format!(
                "Unit {index} health {} exceeds max {}",
                unit.health(),
                config.max_health
            ));
        }

        if unit.status() != Status::Captured {
            let expected = Status::from_health(unit.health(), unit.profile());
            if unit.status() != expected {
                push(format!(
                    "Unit {index} status {:?} disagrees with health {} (expected {expected:?})",
                    unit.status(),
                    unit.health()
                ));
            }
        }

        if unit.attack_cooldown > config.attack_cooldown || unit.heal_cooldown > config.heal_cooldown
        {
            push(format!(
                "Unit {index} cooldowns ({}, {}) exceed configured maxima",
                unit.attack_cooldown, unit.heal_cooldown
            ));
        }

        if usize::from(unit.id) != index {
            push(format!("Unit at roster index {index} has id {}", unit.id));
        }
    }

    for team in Team::ALL {
        let captured_units = world
            .units()
            .iter()
            .filter(|u| u.team == team && u.status() == Status::Captured)
            .count();
        let counter = world.counters(team).captured;
        if u32::try_from(captured_units).ok() != Some(counter) {
            push(format!(
                "Team {team:?} counts {counter} captured but {captured_units} units are captured"
            ));
        }
    }

    if world.step_count() > config.max_steps {
        push(format!(
            "Step {} is past the limit {}",
            world.step_count(),
            config.max_steps
        ));
    }

    let limit_hit = Team::ALL
        .iter()
        .any(|&t| world.counters(t).captured >= config.capture_limit);
    let should_end = limit_hit || world.step_count() >= config.max_steps;
    if should_end != world.is_done() {
        push(format!(
            "Done flag {} disagrees with step {} and captures",
            world.is_done(),
            world.step_count()
        ));
    }

    violations
}

/// Assert all world invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(world: &BattleWorld) {
    let violations = check_invariants(world);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("World invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_world: &BattleWorld) {}
