//! Rollout command implementation.

// Episodes per second is a display value.
#![allow(clippy::cast_precision_loss)]

use super::output::{JsonRolloutResult, format_rollout_csv, format_rollout_text};
use super::{CliError, PolicyArg, RolloutFormat};
use indicatif::{ProgressBar, ProgressStyle};
use skirmish::rollout::{PolicyKind, run_rollouts_with};
use std::path::Path;
use std::time::Instant;

/// Execute the rollout command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or an episode fails.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    config_path: Option<&Path>,
    episodes: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    max_steps: Option<u32>,
    left: PolicyArg,
    right: PolicyArg,
    format: RolloutFormat,
    progress: bool,
) -> Result<(), CliError> {
    let config = super::load_config(config_path, max_steps, None)?;
    let policies = [PolicyKind::from(left), PolicyKind::from(right)];

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = super::seed_or_clock(seed);

    let pb = if progress {
        let pb = ProgressBar::new(episodes);
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} episodes ({per_sec})",
            )
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let stats = run_rollouts_with(
        &config,
        base_seed,
        episodes,
        policies[0],
        policies[1],
        &|_| {
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        },
    )?;

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let episodes_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.episodes as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        RolloutFormat::Text => {
            println!();
            print!("{}", format_rollout_text(&stats, policies));
            println!();
            println!(
                "Seeds: {base_seed}..{}  Duration: {:.2}s ({episodes_per_sec:.0} episodes/sec)",
                base_seed.wrapping_add(episodes),
                duration.as_secs_f64()
            );
        }
        RolloutFormat::Json => {
            let json_result = JsonRolloutResult::from_stats(&stats, policies);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        RolloutFormat::Csv => {
            print!("{}", format_rollout_csv(&stats, policies));
        }
    }

    Ok(())
}
