//! Observation and info encoding for the learner.

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::game::{Status, Team, Unit};

/// Columns per observation row: x, y, health, status, attack cooldown, heal cooldown.
pub const OBS_COLUMNS: usize = 6;

/// Number of discrete actions per unit.
pub const NUM_ACTIONS: usize = 4;

/// One observation row.
pub type ObservationRow = [i64; OBS_COLUMNS];

/// Fixed-shape world observation, one row per unit in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    rows: Vec<ObservationRow>,
}

impl Observation {
    /// Encode the roster.
    #[must_use]
    pub fn encode(units: &[Unit]) -> Self {
        let rows = units
            .iter()
            .map(|unit| {
                [
                    i64::from(unit.pos().x),
                    i64::from(unit.pos().y),
                    i64::from(unit.health()),
                    i64::from(unit.status().code()),
                    i64::from(unit.attack_cooldown),
                    i64::from(unit.heal_cooldown),
                ]
            })
            .collect();
        Self { rows }
    }

    /// Rows in roster order.
    #[must_use]
    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    /// Row of one unit.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&ObservationRow> {
        self.rows.get(index)
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), OBS_COLUMNS)
    }

    /// Row-major flattening, for learners that want a flat vector.
    #[must_use]
    pub fn to_flat(&self) -> Vec<i64> {
        self.rows.iter().flatten().copied().collect()
    }
}

/// Shape and bounds of the observation and action spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpaceSpec {
    /// Observation rows (one per unit).
    pub rows: usize,
    /// Observation columns.
    pub columns: usize,
    /// Lower bound of every observation entry.
    pub low: i64,
    /// Upper bound of every observation entry.
    pub high: i64,
    /// Discrete actions per unit.
    pub actions: usize,
}

/// Upper bound shared by every observation column.
#[must_use]
pub fn observation_high(config: &BattleConfig) -> i64 {
    [
        i64::from(config.width),
        i64::from(config.height),
        i64::from(config.max_health),
        i64::from(Status::Captured.code()),
        i64::from(config.attack_cooldown),
        i64::from(config.heal_cooldown),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

impl SpaceSpec {
    /// Spaces for a configuration.
    #[must_use]
    pub fn for_config(config: &BattleConfig) -> Self {
        Self {
            rows: config.roster_size(),
            columns: OBS_COLUMNS,
            low: 0,
            high: observation_high(config),
            actions: NUM_ACTIONS,
        }
    }
}

/// Episode counters of one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCounters {
    /// Units of this team captured by the enemy.
    pub captured: u32,
    /// Downing blows dealt by this team.
    pub kills: u32,
    /// Heals performed by this team.
    pub heals: u32,
}

/// Step count plus the per-team counters, keyed like the learner expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Steps taken this episode.
    pub step: u32,
    /// Team 0 units captured.
    pub team0_captured: u32,
    /// Team 1 units captured.
    pub team1_captured: u32,
    /// Team 0 downing blows.
    pub team0_kills: u32,
    /// Team 1 downing blows.
    pub team1_kills: u32,
    /// Team 0 heals.
    pub team0_heals: u32,
    /// Team 1 heals.
    pub team1_heals: u32,
}

impl StepInfo {
    /// Build from the step counter and both teams' counters.
    #[must_use]
    pub const fn new(step: u32, counters: &[TeamCounters; 2]) -> Self {
        Self {
            step,
            team0_captured: counters[0].captured,
            team1_captured: counters[1].captured,
            team0_kills: counters[0].kills,
            team1_kills: counters[1].kills,
            team0_heals: counters[0].heals,
            team1_heals: counters[1].heals,
        }
    }

    /// Counters of one team.
    #[must_use]
    pub const fn team(&self, team: Team) -> TeamCounters {
        match team {
            Team::Left => TeamCounters {
                captured: self.team0_captured,
                kills: self.team0_kills,
                heals: self.team0_heals,
            },
            Team::Right => TeamCounters {
                captured: self.team1_captured,
                kills: self.team1_kills,
                heals: self.team1_heals,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Coord, UnitProfile};

    #[test]
    fn test_encode_rows() {
        let profile = UnitProfile::from_config(&BattleConfig::default());
        let mut a = Unit::new(0, Team::Left, Coord::new(2, 7), profile);
        a.take_damage(60);
        a.attack_cooldown = 3;
        let b = Unit::new(1, Team::Right, Coord::new(17, 1), profile);

        let obs = Observation::encode(&[a, b]);
        assert_eq!(obs.shape(), (2, OBS_COLUMNS));
        assert_eq!(obs.row(0), Some(&[2, 7, 40, 1, 3, 0]));
        assert_eq!(obs.row(1), Some(&[17, 1, 100, 0, 0, 0]));
        assert_eq!(obs.to_flat().len(), 12);
    }

    #[test]
    fn test_space_spec_default() {
        let spec = SpaceSpec::for_config(&BattleConfig::default());
        assert_eq!(spec.rows, 20);
        assert_eq!(spec.columns, 6);
        assert_eq!(spec.high, 100);
        assert_eq!(spec.actions, 4);

        let tiny = BattleConfig {
            width: 9,
            height: 9,
            max_health: 5,
            injured_threshold: 4,
            critical_threshold: 2,
            attack_cooldown: 1,
            heal_cooldown: 1,
            ..BattleConfig::default()
        };
        assert_eq!(observation_high(&tiny), 9);
    }

    #[test]
    fn test_info_json_keys() {
        let counters = [
            TeamCounters {
                captured: 2,
                kills: 1,
                heals: 4,
            },
            TeamCounters::default(),
        ];
        let info = StepInfo::new(17, &counters);
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"step\":17"));
        assert!(json.contains("\"team0_captured\":2"));
        assert!(json.contains("\"team0_heals\":4"));
        assert_eq!(info.team(Team::Left), counters[0]);
    }
}
