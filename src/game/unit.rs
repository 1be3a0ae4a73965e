//! Unit state and unit-local behaviour.

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::game::{Coord, TerrainCell, TerrainGrid};

/// Distance below which a unit counts as already at its move target.
const ARRIVAL_EPSILON: f64 = 1e-5;

/// Roster index of a unit.
pub type UnitId = u16;

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Team 0, spawning on the low-x edge.
    Left,
    /// Team 1, spawning on the high-x edge.
    Right,
}

impl Team {
    /// Both teams in roster order.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Numeric team id (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// The opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Combat capability tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Status {
    /// May attack, heal and escort.
    Healthy = 0,
    /// Slowed; can be healed.
    Injured = 1,
    /// Badly slowed; can be healed, escorted or captured.
    CriticallyInjured = 2,
    /// Out of play until the next reset.
    Captured = 3,
}

impl Status {
    /// Status derived from health alone.
    ///
    /// Zero health is `CriticallyInjured`: only the capture sweep produces
    /// [`Status::Captured`].
    #[must_use]
    pub const fn from_health(health: u32, profile: &UnitProfile) -> Self {
        if health < profile.critical_threshold {
            Self::CriticallyInjured
        } else if health < profile.injured_threshold {
            Self::Injured
        } else {
            Self::Healthy
        }
    }

    /// Observation code of this status.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether the unit is still in play.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Captured)
    }

    /// Whether the unit can be targeted by a heal.
    #[must_use]
    pub const fn is_wounded(self) -> bool {
        matches!(self, Self::Injured | Self::CriticallyInjured)
    }
}

/// Per-unit constants shared by the whole roster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitProfile {
    /// Starting and maximum health.
    pub max_health: u32,
    /// Health below this is Injured.
    pub injured_threshold: u32,
    /// Health below this is `CriticallyInjured`.
    pub critical_threshold: u32,
    /// Cells per step while Healthy.
    pub base_speed: f64,
    /// Speed multiplier while Injured.
    pub injured_speed: f64,
    /// Speed multiplier while `CriticallyInjured`.
    pub critical_speed: f64,
}

impl UnitProfile {
    /// Extract the unit constants from a battle configuration.
    #[must_use]
    pub const fn from_config(config: &BattleConfig) -> Self {
        Self {
            max_health: config.max_health,
            injured_threshold: config.injured_threshold,
            critical_threshold: config.critical_threshold,
            base_speed: config.base_move_speed,
            injured_speed: config.injured_speed,
            critical_speed: config.critical_speed,
        }
    }

    /// Move speed for a status.
    #[must_use]
    pub fn speed_for(&self, status: Status) -> f64 {
        match status {
            Status::Healthy => self.base_speed,
            Status::Injured => self.base_speed * self.injured_speed,
            Status::CriticallyInjured => self.base_speed * self.critical_speed,
            Status::Captured => 0.0,
        }
    }
}

/// One soldier on the roster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    /// Roster index.
    pub id: UnitId,
    /// Owning team.
    pub team: Team,
    pos: Coord,
    health: u32,
    status: Status,
    move_speed: f64,
    /// Steps until the next attack is allowed.
    pub attack_cooldown: u32,
    /// Steps until the next heal is allowed.
    pub heal_cooldown: u32,
    profile: UnitProfile,
}

impl Unit {
    /// Create a fresh unit at full health.
    #[must_use]
    pub fn new(id: UnitId, team: Team, pos: Coord, profile: UnitProfile) -> Self {
        Self {
            id,
            team,
            pos,
            health: profile.max_health,
            status: Status::Healthy,
            move_speed: profile.base_speed,
            attack_cooldown: 0,
            heal_cooldown: 0,
            profile,
        }
    }

    /// Restore health, status and cooldowns and place the unit at `pos`.
    pub fn respawn(&mut self, pos: Coord) {
        *self = Self::new(self.id, self.team, pos, self.profile);
    }

    /// Current cell.
    #[must_use]
    pub const fn pos(&self) -> Coord {
        self.pos
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Cells per step before terrain is applied.
    #[must_use]
    pub const fn move_speed(&self) -> f64 {
        self.move_speed
    }

    /// Shared unit constants.
    #[must_use]
    pub const fn profile(&self) -> &UnitProfile {
        &self.profile
    }

    /// Whether the unit is still in play.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Recompute status and speed from current health.
    ///
    /// Captured units stay Captured.
    pub fn update_status_from_health(&mut self) {
        if !self.status.is_active() {
            return;
        }
        self.status = Status::from_health(self.health, &self.profile);
        self.move_speed = self.profile.speed_for(self.status);
    }

    /// Lose `amount` health, floored at zero.
    pub fn take_damage(&mut self, amount: u32) {
        if !self.is_active() {
            return;
        }
        self.health = self.health.saturating_sub(amount);
        self.update_status_from_health();
    }

    /// Regain `amount` health, capped at the maximum.
    pub fn receive_heal(&mut self, amount: u32) {
        if !self.is_active() {
            return;
        }
        self.health = self.health.saturating_add(amount).min(self.profile.max_health);
        self.update_status_from_health();
    }

    /// Take the unit out of play.
    pub(crate) fn capture(&mut self) {
        self.status = Status::Captured;
        self.move_speed = 0.0;
    }

    /// Step toward `target` at the current speed.
    ///
    /// The step length is the unit's speed times the terrain multiplier of
    /// the cell it stands on. The new position is clamped to the grid and
    /// truncated toward zero; the unit stays put if that cell is an
    /// Obstacle. Returns whether the position changed.
    pub fn move_toward(&mut self, target: (i32, i32), grid: &TerrainGrid) -> bool {
        if !self.is_active() {
            return false;
        }

        let x = f64::from(self.pos.x);
        let y = f64::from(self.pos.y);
        let dx = f64::from(target.0) - x;
        let dy = f64::from(target.1) - y;
        let norm = dx.hypot(dy);
        if norm < ARRIVAL_EPSILON {
            return false;
        }

        let step = self.move_speed * grid.speed_at(self.pos);
        let nx = (x + dx / norm * step).clamp(0.0, f64::from(grid.width() - 1));
        let ny = (y + dy / norm * step).clamp(0.0, f64::from(grid.height() - 1));

        // Clamped to the grid, so the casts are in range and truncate toward zero.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let dest = Coord::new(nx as u16, ny as u16);

        if dest == self.pos || !grid.is_passable(dest) {
            return false;
        }
        self.pos = dest;
        true
    }

    /// Place the unit directly, bypassing movement rules.
    #[cfg(test)]
    pub(crate) fn teleport(&mut self, pos: Coord) {
        self.pos = pos;
    }

    /// Whether the unit stands on a hideout.
    #[must_use]
    pub fn is_in_hideout(&self, grid: &TerrainGrid) -> bool {
        grid.get(self.pos) == Some(TerrainCell::Hideout)
    }
}
