//! Run command implementation.

use super::output::{JsonEpisodeResult, format_episode_text};
use super::{CliError, OutputFormat, PolicyArg};
use skirmish::rollout::{PolicyKind, TeamPolicies, run_episode};
use skirmish::{BattleWorld, Recording, ReplayEngine};
use std::path::Path;
use tracing::info;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the world cannot be built or the episode fails.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    config_path: Option<&Path>,
    seed: Option<u64>,
    max_steps: Option<u32>,
    left: PolicyArg,
    right: PolicyArg,
    format: OutputFormat,
    save: Option<&Path>,
    render: bool,
) -> Result<(), CliError> {
    let config = super::load_config(config_path, max_steps, None)?;
    let seed = super::seed_or_clock(seed);
    let policies = [PolicyKind::from(left), PolicyKind::from(right)];

    if format == OutputFormat::Text {
        println!(
            "Running episode with seed {seed} ({} vs {})...",
            policies[0].name(),
            policies[1].name()
        );
        println!();
    }

    let mut world = BattleWorld::create(config)?;
    let mut team_policies = TeamPolicies::from_kinds(policies[0], policies[1], seed);
    let summary = run_episode(&mut world, seed, &mut team_policies)?;
    info!(seed, steps = summary.steps, "episode finished");

    let recording = summary.to_recording(&config);

    if render {
        print_frames(&recording)?;
    }

    if let Some(save_path) = save {
        recording
            .save(save_path)
            .map_err(|e| CliError::new(format!("Failed to save recording: {e}")))?;
        if format == OutputFormat::Text {
            println!("Recording saved to: {}", save_path.display());
            println!();
        }
    }

    match format {
        OutputFormat::Text => {
            print!("{}", format_episode_text(&summary, policies));
        }
        OutputFormat::Json => {
            let json_result = JsonEpisodeResult::from_summary(&summary, policies);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Print every frame of the episode, starting from the reset state.
fn print_frames(recording: &Recording) -> Result<(), CliError> {
    let mut engine = ReplayEngine::new(recording.clone())?;
    println!("{}", engine.render());
    while !engine.is_finished() {
        engine.step_forward()?;
        println!("{}", engine.render());
    }
    println!();
    Ok(())
}
