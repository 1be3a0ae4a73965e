//! Error types for battle construction and stepping.

use thiserror::Error;

/// Errors raised while building or loading a [`BattleConfig`](crate::BattleConfig).
///
/// All of these are detected before the first episode starts; a world that
/// was created successfully never produces one mid-episode.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Grid dimensions are zero or too small for both teams' bands.
    #[error("invalid grid size {width}x{height}: {reason}")]
    InvalidGridSize {
        /// Requested width.
        width: u16,
        /// Requested height.
        height: u16,
        /// Why the size was rejected.
        reason: &'static str,
    },
    /// A team was configured with no units.
    #[error("units_per_team must be at least 1")]
    NoUnits,
    /// The roster holds more units than unit ids can address.
    #[error("units_per_team {units_per_team} gives more than {max} units in total")]
    RosterTooLarge {
        /// Configured units per team.
        units_per_team: u16,
        /// Largest supported roster.
        max: usize,
    },
    /// Health thresholds are not ordered `0 < critical < injured <= max`.
    #[error(
        "health thresholds out of order: need 0 < critical ({critical}) < injured ({injured}) <= max ({max})"
    )]
    ThresholdOrder {
        /// Critical threshold.
        critical: u32,
        /// Injured threshold.
        injured: u32,
        /// Maximum health.
        max: u32,
    },
    /// A probability is outside `[0, 1]` or the terrain ratios sum past 1.
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidRatio {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A range, distance or speed multiplier is negative or not finite.
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidDistance {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A counter limit that must be positive was zero.
    #[error("{name} must be at least 1")]
    ZeroLimit {
        /// Field name.
        name: &'static str,
    },
    /// Fewer than one hideout per team was requested.
    #[error("hideout_count must provide at least one hideout per team, got {0}")]
    NoHideouts(u16),
    /// Random placement did not find a legal cell within the retry budget.
    #[error("could not place {what} after {attempts} attempts (too many obstacles?)")]
    Placement {
        /// What was being placed.
        what: &'static str,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// A caller-supplied layout does not match the configuration.
    #[error("layout mismatch: {0}")]
    Layout(String),
    /// Reading a configuration file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// A configuration file is not valid JSON for [`BattleConfig`](crate::BattleConfig).
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Caller contract violations reported by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// The action vector length differs from the roster size.
    #[error("expected {expected} actions (one per unit), got {actual}")]
    ActionCountMismatch {
        /// Roster size.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
    /// A raw action code is not one of 0..=3.
    #[error("unit {index}: action code {value} is not in 0..=3")]
    InvalidAction {
        /// Roster index of the unit.
        index: usize,
        /// Code supplied.
        value: u8,
    },
    /// The episode already terminated; call `reset` first.
    #[error("episode is over, reset before stepping again")]
    EpisodeOver,
}
