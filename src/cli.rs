//! CLI command implementations for skirmish.

pub(crate) mod check;
pub(crate) mod replay;
pub(crate) mod rollout;
pub(crate) mod run;
pub(crate) mod watch;

mod output;

use std::path::Path;

use clap::ValueEnum;
use skirmish::rollout::PolicyKind;
use skirmish::BattleConfig;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `replay` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReplayFormat {
    /// Interactive TUI.
    Tui,
    /// Plain text output.
    Text,
}

/// Output format for the `rollout` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RolloutFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Scripted policy driving one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum PolicyArg {
    /// Uniformly random actions.
    Random,
    /// Attack, heal, escort, otherwise move.
    Heuristic,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Random => Self::Random,
            PolicyArg::Heuristic => Self::Heuristic,
        }
    }
}

/// CLI error type.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::ConfigError> for CliError {
    fn from(e: skirmish::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::StepError> for CliError {
    fn from(e: skirmish::StepError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::replay::ReplayError> for CliError {
    fn from(e: skirmish::replay::ReplayError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::rollout::RolloutError> for CliError {
    fn from(e: skirmish::rollout::RolloutError) -> Self {
        Self::new(e.to_string())
    }
}

/// Load the configuration file if one was given, then apply flag overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the result is invalid.
pub(crate) fn load_config(
    path: Option<&Path>,
    max_steps: Option<u32>,
    terrain_seed: Option<u64>,
) -> Result<BattleConfig, CliError> {
    let mut config = match path {
        Some(path) => BattleConfig::from_json_file(path).map_err(|e| {
            CliError::new(format!("Failed to load config {}: {e}", path.display()))
        })?,
        None => BattleConfig::default(),
    };
    if let Some(steps) = max_steps {
        config.max_steps = steps;
    }
    if let Some(seed) = terrain_seed {
        config.terrain_seed = seed;
    }
    config.validate()?;
    Ok(config)
}

/// Seed from the clock when none was given.
pub(crate) fn seed_or_clock(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
            .unwrap_or(42)
    })
}
