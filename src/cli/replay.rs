//! Replay command implementation.

use super::{CliError, ReplayFormat};
use skirmish::replay::{Recording, ReplayEngine};
use std::path::Path;

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded or replayed.
pub(crate) fn execute(
    recording_path: &Path,
    format: ReplayFormat,
    step: Option<u32>,
    speed: u64,
) -> Result<(), CliError> {
    let recording = Recording::load(recording_path).map_err(|e| {
        CliError::new(format!(
            "Failed to load recording {}: {e}",
            recording_path.display()
        ))
    })?;
    let seed = recording.seed;

    let engine = ReplayEngine::new_at_step(recording, step.unwrap_or(0))?;

    match format {
        ReplayFormat::Tui => {
            let title = format!("Skirmish Replay (seed {seed})");
            super::watch::run_tui(engine, title, speed)
        }
        ReplayFormat::Text => print_text_replay(engine),
    }
}

fn print_text_replay(mut engine: ReplayEngine) -> Result<(), CliError> {
    println!("{}", engine.render());
    while !engine.is_finished() {
        engine.step_forward()?;
        println!("{}", engine.render());
    }

    let world = engine.world();
    match world.outcome() {
        Some(outcome) => println!("Episode over after {} steps: {outcome:?}", world.step_count()),
        None => println!("Recording ends at step {}", engine.step()),
    }
    Ok(())
}
