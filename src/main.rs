//! Skirmish CLI - Command-line interface for running and viewing battles.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Skirmish - A deterministic two-team grid battle simulator
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Battle configuration file (JSON; default: built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single episode between two scripted policies
    Run {
        /// Episode seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum steps (overrides the config)
        #[arg(short = 't', long)]
        max_steps: Option<u32>,

        /// Policy for team 0
        #[arg(long, default_value = "heuristic")]
        left: cli::PolicyArg,

        /// Policy for team 1
        #[arg(long, default_value = "random")]
        right: cli::PolicyArg,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save recording to file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print every frame as text
        #[arg(short, long)]
        render: bool,
    },

    /// Interactive TUI to watch an episode
    Watch {
        /// Episode seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum steps (overrides the config)
        #[arg(short = 't', long)]
        max_steps: Option<u32>,

        /// Policy for team 0
        #[arg(long, default_value = "heuristic")]
        left: cli::PolicyArg,

        /// Policy for team 1
        #[arg(long, default_value = "random")]
        right: cli::PolicyArg,

        /// Step delay in milliseconds (default: 200)
        #[arg(long, default_value = "200")]
        speed: u64,
    },

    /// Replay a recorded episode
    Replay {
        /// Recording file (JSON)
        #[arg(required = true)]
        recording: PathBuf,

        /// Output format: tui or text
        #[arg(short, long, default_value = "tui")]
        format: cli::ReplayFormat,

        /// Start at specific step
        #[arg(long)]
        step: Option<u32>,

        /// Step delay in milliseconds (default: 200)
        #[arg(long, default_value = "200")]
        speed: u64,
    },

    /// Run many episodes in parallel and aggregate statistics
    Rollout {
        /// Number of episodes to run (default: 1000)
        #[arg(short = 'n', long, default_value = "1000")]
        episodes: u64,

        /// Starting seed (increments for each episode)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum steps per episode (overrides the config)
        #[arg(short = 't', long)]
        max_steps: Option<u32>,

        /// Policy for team 0
        #[arg(long, default_value = "heuristic")]
        left: cli::PolicyArg,

        /// Policy for team 1
        #[arg(long, default_value = "random")]
        right: cli::PolicyArg,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::RolloutFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Validate a configuration and summarize the world it builds
    Check {
        /// Terrain seed (overrides the config)
        #[arg(long)]
        terrain_seed: Option<u64>,

        /// Print the effective configuration as JSON
        #[arg(long)]
        print_config: bool,

        /// Print the initial frame as text
        #[arg(short, long)]
        render: bool,
    },
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "skirmish=debug",
        _ => "skirmish=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = args.config.as_deref();

    let result = match args.command {
        Commands::Run {
            seed,
            max_steps,
            left,
            right,
            format,
            save,
            render,
        } => cli::run::execute(
            config,
            seed,
            max_steps,
            left,
            right,
            format,
            save.as_deref(),
            render,
        ),

        Commands::Watch {
            seed,
            max_steps,
            left,
            right,
            speed,
        } => cli::watch::execute(config, seed, max_steps, left, right, speed),

        Commands::Replay {
            recording,
            format,
            step,
            speed,
        } => cli::replay::execute(&recording, format, step, speed),

        Commands::Rollout {
            episodes,
            seed,
            threads,
            max_steps,
            left,
            right,
            format,
            progress,
        } => cli::rollout::execute(
            config, episodes, seed, threads, max_steps, left, right, format, progress,
        ),

        Commands::Check {
            terrain_seed,
            print_config,
            render,
        } => cli::check::execute(config, terrain_seed, print_config, render),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let args = Args::try_parse_from([
            "skirmish", "rollout", "-n", "10", "--config", "battle.json", "-vv",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("battle.json")));
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, Commands::Rollout { episodes: 10, .. }));
    }

    #[test]
    fn test_policy_flags_parse() {
        let args = Args::try_parse_from(["skirmish", "run", "--left", "random", "--right", "heuristic"])
            .unwrap();
        assert!(matches!(
            args.command,
            Commands::Run {
                left: cli::PolicyArg::Random,
                right: cli::PolicyArg::Heuristic,
                ..
            }
        ));
    }
}
