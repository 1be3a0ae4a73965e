//! Check command implementation - validate a configuration and preview its world.

use super::CliError;
use skirmish::{BattleWorld, MultiAgentEnv, TerrainCell};
use std::path::Path;

/// Execute the check command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or no world can be built from it.
pub(crate) fn execute(
    config_path: Option<&Path>,
    terrain_seed: Option<u64>,
    print_config: bool,
    render: bool,
) -> Result<(), CliError> {
    match config_path {
        Some(path) => println!("Checking: {}", path.display()),
        None => println!("Checking: built-in defaults"),
    }
    println!();

    let config = match super::load_config(config_path, None, terrain_seed) {
        Ok(config) => {
            print_check("Configuration", true);
            config
        }
        Err(e) => {
            print_check("Configuration", false);
            return Err(e);
        }
    };

    let world = match BattleWorld::create(config) {
        Ok(world) => {
            print_check("Terrain and spawn placement", true);
            world
        }
        Err(e) => {
            print_check("Terrain and spawn placement", false);
            return Err(e.into());
        }
    };

    let grid = world.grid();
    let half = config.width / 2;
    let left_hideouts = world.hideouts().iter().filter(|h| h.x < half).count();
    let spaces = world.spaces();

    println!();
    println!("Summary:");
    println!("  Grid:         {} x {}", grid.width(), grid.height());
    println!("  Terrain seed: {}", config.terrain_seed);
    println!(
        "  Cells:        {} plain, {} hill, {} obstacle, {} hideout",
        grid.count(TerrainCell::Plain),
        grid.count(TerrainCell::Hill),
        grid.count(TerrainCell::Obstacle),
        grid.count(TerrainCell::Hideout)
    );
    println!(
        "  Hideouts:     {} left, {} right",
        left_hideouts,
        world.hideouts().len() - left_hideouts
    );
    println!(
        "  Roster:       {} units ({} per team)",
        world.num_agents(),
        config.units_per_team
    );
    println!(
        "  Observation:  {} x {} in [{}, {}]",
        spaces.rows, spaces.columns, spaces.low, spaces.high
    );
    println!("  Actions:      {} per unit", spaces.actions);
    println!("  Max steps:    {}", config.max_steps);

    if print_config {
        let json = serde_json::to_string_pretty(&config)
            .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
        println!();
        println!("{json}");
    }

    if render {
        println!();
        println!("{}", world.render());
    }

    println!();
    println!("Check successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
