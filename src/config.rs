//! Battle configuration.
//!
//! Every constant of the simulation is a named, overridable field. The
//! defaults reproduce the reference 20x20, ten-a-side setup; JSON files may
//! override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::UnitId;

/// Largest roster whose every unit has a distinct [`UnitId`].
pub const MAX_ROSTER: usize = 1 << UnitId::BITS;

/// Reward shaping weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Granted for every Move action, blocked or not.
    pub movement: f64,
    /// Granted for every attack that lands.
    pub attack: f64,
    /// Extra reward for the blow that takes a target to zero health.
    pub kill: f64,
    /// Granted for every successful heal.
    pub heal: f64,
    /// Escort closing in on a critically injured ally.
    pub escort_approach: f64,
    /// Escort moving together with the ally toward a hideout.
    pub escort_move: f64,
    /// Extra reward when the escorted ally ends the move in a hideout.
    pub rescue: f64,
    /// Granted to the unit that captures an enemy.
    pub capture: f64,
    /// Added to every winner unit (and subtracted from every loser) at the end.
    pub victory: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            movement: 0.1,
            attack: 1.0,
            kill: 5.0,
            heal: 2.0,
            escort_approach: 0.5,
            escort_move: 1.0,
            rescue: 3.0,
            capture: 4.0,
            victory: 10.0,
        }
    }
}

/// Full configuration for a battle world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Grid width (x axis).
    pub width: u16,
    /// Grid height (y axis).
    pub height: u16,
    /// Units on each team.
    pub units_per_team: u16,
    /// Starting and maximum health.
    pub max_health: u32,
    /// Health below this is Injured.
    pub injured_threshold: u32,
    /// Health below this is `CriticallyInjured`.
    pub critical_threshold: u32,
    /// Cells moved per step at full speed.
    pub base_move_speed: f64,
    /// Speed multiplier while Injured.
    pub injured_speed: f64,
    /// Speed multiplier while `CriticallyInjured`.
    pub critical_speed: f64,
    /// Maximum Euclidean distance for an attack.
    pub attack_range: f64,
    /// Health removed per attack.
    pub attack_damage: u32,
    /// Steps an attacker waits after attacking.
    pub attack_cooldown: u32,
    /// Maximum Euclidean distance for a heal.
    pub heal_range: f64,
    /// Health restored per heal.
    pub heal_amount: u32,
    /// Steps a healer waits after healing.
    pub heal_cooldown: u32,
    /// Maximum distance at which a Healthy enemy captures a critical unit.
    pub capture_distance: f64,
    /// Distance within which an escort moves together with its ally.
    pub escort_reach: f64,
    /// Hideouts on the map, split evenly between the two sides.
    pub hideout_count: u16,
    /// Width of each side's hideout band, measured from the map edge.
    pub hideout_band: u16,
    /// Distance of each spawn band from its map edge (also used on y).
    pub spawn_inset: u16,
    /// Width of each spawn band.
    pub spawn_depth: u16,
    /// Probability that a cell is an obstacle.
    pub obstacle_ratio: f64,
    /// Probability that a non-obstacle cell is a hill.
    pub hill_ratio: f64,
    /// Episode step cap.
    pub max_steps: u32,
    /// Captures of one team that end the episode.
    pub capture_limit: u32,
    /// Seed for terrain generation and the initial roster.
    pub terrain_seed: u64,
    /// Reward weights.
    pub rewards: RewardConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            units_per_team: 10,
            max_health: 100,
            injured_threshold: 50,
            critical_threshold: 20,
            base_move_speed: 1.0,
            injured_speed: 0.6,
            critical_speed: 0.3,
            attack_range: 2.0,
            attack_damage: 15,
            attack_cooldown: 3,
            heal_range: 1.0,
            heal_amount: 10,
            heal_cooldown: 2,
            capture_distance: 1.0,
            escort_reach: 1.0,
            hideout_count: 4,
            hideout_band: 6,
            spawn_inset: 1,
            spawn_depth: 3,
            obstacle_ratio: 0.1,
            hill_ratio: 0.2,
            max_steps: 200,
            capture_limit: 8,
            terrain_seed: 0,
            rewards: RewardConfig::default(),
        }
    }
}

impl BattleConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Total number of units on the roster.
    #[must_use]
    pub fn roster_size(&self) -> usize {
        usize::from(self.units_per_team) * 2
    }

    /// Hideouts placed on each side.
    #[must_use]
    pub const fn hideouts_per_team(&self) -> u16 {
        self.hideout_count / 2
    }

    /// Check that the configuration describes a playable battle.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid_error = |reason| ConfigError::InvalidGridSize {
            width: self.width,
            height: self.height,
            reason,
        };

        if self.width == 0 || self.height == 0 {
            return Err(grid_error("dimensions must be non-zero"));
        }
        if self.spawn_depth == 0 {
            return Err(grid_error("spawn_depth must be at least 1"));
        }
        let spawn_extent = u32::from(self.spawn_inset) + u32::from(self.spawn_depth);
        if spawn_extent * 2 > u32::from(self.width) {
            return Err(grid_error("spawn bands do not fit side by side"));
        }
        if u32::from(self.spawn_inset) * 2 >= u32::from(self.height) {
            return Err(grid_error("spawn inset leaves no rows"));
        }
        if self.hideout_band == 0 || self.hideout_band > self.width {
            return Err(grid_error("hideout_band must be within 1..=width"));
        }

        if self.units_per_team == 0 {
            return Err(ConfigError::NoUnits);
        }
        if self.roster_size() > MAX_ROSTER {
            return Err(ConfigError::RosterTooLarge {
                units_per_team: self.units_per_team,
                max: MAX_ROSTER,
            });
        }

        if self.critical_threshold == 0
            || self.critical_threshold >= self.injured_threshold
            || self.injured_threshold > self.max_health
        {
            return Err(ConfigError::ThresholdOrder {
                critical: self.critical_threshold,
                injured: self.injured_threshold,
                max: self.max_health,
            });
        }

        for (name, value) in [
            ("obstacle_ratio", self.obstacle_ratio),
            ("hill_ratio", self.hill_ratio),
            ("obstacle_ratio + hill_ratio", self.obstacle_ratio + self.hill_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidRatio { name, value });
            }
        }

        for (name, value) in [
            ("base_move_speed", self.base_move_speed),
            ("injured_speed", self.injured_speed),
            ("critical_speed", self.critical_speed),
            ("attack_range", self.attack_range),
            ("heal_range", self.heal_range),
            ("capture_distance", self.capture_distance),
            ("escort_reach", self.escort_reach),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDistance { name, value });
            }
        }

        if self.hideouts_per_team() == 0 {
            return Err(ConfigError::NoHideouts(self.hideout_count));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroLimit { name: "max_steps" });
        }
        if self.capture_limit == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "capture_limit",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BattleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.roster_size(), 20);
        assert_eq!(config.hideouts_per_team(), 2);
    }

    #[test]
    fn test_zero_grid_rejected() {
        let config = BattleConfig {
            width: 0,
            ..BattleConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGridSize { .. })
        ));
    }

    #[test]
    fn test_narrow_grid_rejected() {
        // Spawn bands need 2 * (inset + depth) = 8 columns.
        let config = BattleConfig {
            width: 7,
            ..BattleConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGridSize { .. })
        ));
    }

    #[test]
    fn test_zero_units_rejected() {
        let config = BattleConfig {
            units_per_team: 0,
            ..BattleConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoUnits)));
    }

    #[test]
    fn test_roster_limited_by_unit_ids() {
        let at_limit = BattleConfig {
            units_per_team: 32_768,
            ..BattleConfig::default()
        };
        assert_eq!(at_limit.roster_size(), MAX_ROSTER);
        assert!(at_limit.validate().is_ok());

        let over = BattleConfig {
            units_per_team: 32_769,
            ..BattleConfig::default()
        };
        assert!(matches!(
            over.validate(),
            Err(ConfigError::RosterTooLarge {
                units_per_team: 32_769,
                max: MAX_ROSTER
            })
        ));
    }

    #[test]
    fn test_threshold_order() {
        let inverted = BattleConfig {
            critical_threshold: 60,
            ..BattleConfig::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));

        let above_max = BattleConfig {
            injured_threshold: 150,
            ..BattleConfig::default()
        };
        assert!(matches!(
            above_max.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn test_ratio_sum_rejected() {
        let config = BattleConfig {
            obstacle_ratio: 0.7,
            hill_ratio: 0.5,
            ..BattleConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRatio { .. })
        ));
    }

    #[test]
    fn test_negative_range_rejected() {
        let config = BattleConfig {
            attack_range: -1.0,
            ..BattleConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDistance {
                name: "attack_range",
                ..
            })
        ));
    }

    #[test]
    fn test_single_hideout_rejected() {
        let config = BattleConfig {
            hideout_count: 1,
            ..BattleConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoHideouts(1))));
    }

    #[test]
    fn test_partial_json_override() {
        let config =
            BattleConfig::from_json_str(r#"{ "units_per_team": 4, "rewards": { "victory": 2.5 } }"#)
                .unwrap();
        assert_eq!(config.units_per_team, 4);
        assert!((config.rewards.victory - 2.5).abs() < f64::EPSILON);
        assert!((config.rewards.capture - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.width, 20);
    }

    #[test]
    fn test_invalid_json_override() {
        let result = BattleConfig::from_json_str(r#"{ "max_steps": 0 }"#);
        assert!(matches!(
            result,
            Err(ConfigError::ZeroLimit { name: "max_steps" })
        ));
    }
}
