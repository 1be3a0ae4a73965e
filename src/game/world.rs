//! Battle world construction, reset and accessors.

use std::ops::RangeInclusive;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::BattleConfig;
use crate::error::ConfigError;
use crate::game::{
    Coord, Observation, StepInfo, Team, TeamCounters, TerrainCell, TerrainGrid, Unit, UnitId,
    UnitProfile,
};

/// How a finished episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Outcome {
    /// The team that lost fewer units to capture.
    Victory(Team),
    /// Both teams lost the same number of units.
    Draw,
}

/// The whole simulation: terrain, roster, counters and the random stream.
///
/// Terrain and hideouts are fixed at creation. Everything else is restored
/// by [`BattleWorld::reset`].
#[derive(Debug, Clone)]
pub struct BattleWorld {
    pub(crate) config: BattleConfig,
    pub(crate) grid: TerrainGrid,
    pub(crate) hideouts: Vec<Coord>,
    /// Team Left units first, then team Right, indexed by [`UnitId`].
    pub(crate) units: Vec<Unit>,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) step: u32,
    pub(crate) counters: [TeamCounters; 2],
    pub(crate) returns: Vec<f64>,
    pub(crate) done: bool,
    /// First passable spawn cell per team, used when random draws run out.
    spawn_fallback: [Coord; 2],
}

impl BattleWorld {
    /// Build a world from a configuration.
    ///
    /// The random stream is seeded from `terrain_seed` and drives, in order,
    /// terrain generation, hideout placement (Left band first) and the
    /// initial spawn of every unit in roster order.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a hideout or
    /// spawn cell cannot be placed within the retry budget.
    pub fn create(config: BattleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.terrain_seed);

        let invalid = ConfigError::InvalidGridSize {
            width: config.width,
            height: config.height,
            reason: "dimensions must be non-zero",
        };
        let mut grid = TerrainGrid::generate(
            config.width,
            config.height,
            config.obstacle_ratio,
            config.hill_ratio,
            &mut rng,
        )
        .ok_or(invalid)?;

        let mut hideouts = Vec::with_capacity(usize::from(config.hideout_count));
        for team in Team::ALL {
            let band = hideout_columns(&config, team);
            hideouts.extend(grid.place_hideouts(
                *band.start(),
                *band.end(),
                config.hideouts_per_team(),
                &mut rng,
            )?);
        }

        let spawn_fallback = spawn_fallbacks(&config, &grid)?;
        let profile = UnitProfile::from_config(&config);
        let mut units = Vec::with_capacity(config.roster_size());
        for (id, team) in roster_teams(&config).enumerate() {
            let pos = grid.draw_cell(
                "spawn cell",
                spawn_columns(&config, team),
                spawn_rows(&config),
                &mut rng,
                TerrainCell::is_passable,
            )?;
            units.push(Unit::new(unit_id(id), team, pos, profile));
        }

        debug!(
            width = config.width,
            height = config.height,
            units = units.len(),
            obstacles = grid.count(TerrainCell::Obstacle),
            hills = grid.count(TerrainCell::Hill),
            hideouts = hideouts.len(),
            seed = config.terrain_seed,
            "battle world created"
        );

        Ok(Self::assemble(config, grid, hideouts, units, rng, spawn_fallback))
    }

    /// Build a world on a caller-supplied map.
    ///
    /// Hideouts are read from the grid in row-major order. `positions` holds
    /// one starting cell per unit in roster order. The random stream is
    /// still seeded from `terrain_seed`; it only feeds later resets and
    /// Move directions.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the grid size does
    /// not match it, the position count differs from the roster size, a
    /// position is off-grid or on an Obstacle, or a spawn band has no
    /// passable cell.
    pub fn from_layout(
        config: BattleConfig,
        grid: TerrainGrid,
        positions: &[Coord],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if grid.width() != config.width || grid.height() != config.height {
            return Err(ConfigError::Layout(format!(
                "grid is {}x{} but config expects {}x{}",
                grid.width(),
                grid.height(),
                config.width,
                config.height
            )));
        }
        if positions.len() != config.roster_size() {
            return Err(ConfigError::Layout(format!(
                "{} positions for a roster of {}",
                positions.len(),
                config.roster_size()
            )));
        }
        if let Some(bad) = positions.iter().find(|&&pos| !grid.is_passable(pos)) {
            return Err(ConfigError::Layout(format!(
                "unit position ({}, {}) is off-grid or blocked",
                bad.x, bad.y
            )));
        }

        let hideouts: Vec<Coord> = grid
            .iter()
            .filter(|&(_, cell)| cell == TerrainCell::Hideout)
            .map(|(coord, _)| coord)
            .collect();
        let spawn_fallback = spawn_fallbacks(&config, &grid)?;
        let profile = UnitProfile::from_config(&config);
        let units = roster_teams(&config)
            .zip(positions)
            .enumerate()
            .map(|(id, (team, &pos))| Unit::new(unit_id(id), team, pos, profile))
            .collect();
        let rng = ChaCha8Rng::seed_from_u64(config.terrain_seed);

        Ok(Self::assemble(config, grid, hideouts, units, rng, spawn_fallback))
    }

    fn assemble(
        config: BattleConfig,
        grid: TerrainGrid,
        hideouts: Vec<Coord>,
        units: Vec<Unit>,
        rng: ChaCha8Rng,
        spawn_fallback: [Coord; 2],
    ) -> Self {
        let roster = units.len();
        Self {
            config,
            grid,
            hideouts,
            units,
            rng,
            step: 0,
            counters: [TeamCounters::default(); 2],
            returns: vec![0.0; roster],
            done: false,
            spawn_fallback,
        }
    }

    /// Start a new episode on the same terrain.
    ///
    /// With `Some(seed)` the random stream is reseeded first, so equal seeds
    /// give equal episodes. With `None` the current stream continues.
    /// Every unit is respawned at full health in its team's band.
    pub fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        if let Some(seed) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }

        let rows = spawn_rows(&self.config);
        for unit in &mut self.units {
            let team = unit.team;
            let pos = self
                .grid
                .draw_cell(
                    "spawn cell",
                    spawn_columns(&self.config, team),
                    rows.clone(),
                    &mut self.rng,
                    TerrainCell::is_passable,
                )
                .unwrap_or(self.spawn_fallback[team.index()]);
            unit.respawn(pos);
        }

        self.step = 0;
        self.counters = [TeamCounters::default(); 2];
        self.returns.iter_mut().for_each(|r| *r = 0.0);
        self.done = false;

        debug!(?seed, units = self.units.len(), "episode reset");
        (self.observation(), self.info())
    }

    /// Current observation.
    #[must_use]
    pub fn observation(&self) -> Observation {
        Observation::encode(&self.units)
    }

    /// Current step count and team counters.
    #[must_use]
    pub const fn info(&self) -> StepInfo {
        StepInfo::new(self.step, &self.counters)
    }

    /// Configuration the world was built from.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Terrain.
    #[must_use]
    pub const fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    /// Hideout cells in placement order.
    #[must_use]
    pub fn hideouts(&self) -> &[Coord] {
        &self.hideouts
    }

    /// The roster.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// One unit by roster index.
    #[must_use]
    pub fn unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    /// Steps taken this episode.
    #[must_use]
    pub const fn step_count(&self) -> u32 {
        self.step
    }

    /// Counters of one team.
    #[must_use]
    pub const fn counters(&self, team: Team) -> TeamCounters {
        self.counters[team.index()]
    }

    /// Summed rewards per unit since the last reset.
    #[must_use]
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Whether the episode has terminated.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Result of the episode, once it is over.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.done.then(|| self.standing())
    }

    /// Who is ahead right now: fewer captured units wins.
    #[must_use]
    pub fn standing(&self) -> Outcome {
        let [left, right] = self.counters;
        match left.captured.cmp(&right.captured) {
            std::cmp::Ordering::Less => Outcome::Victory(Team::Left),
            std::cmp::Ordering::Greater => Outcome::Victory(Team::Right),
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// Units of one team that are still in play.
    #[must_use]
    pub fn active_units(&self, team: Team) -> usize {
        self.units
            .iter()
            .filter(|u| u.team == team && u.is_active())
            .count()
    }

    #[cfg(test)]
    pub(crate) fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }
}

/// Team of every roster slot: `units_per_team` Left, then as many Right.
fn roster_teams(config: &BattleConfig) -> impl Iterator<Item = Team> {
    let n = usize::from(config.units_per_team);
    std::iter::repeat_n(Team::Left, n).chain(std::iter::repeat_n(Team::Right, n))
}

fn unit_id(index: usize) -> UnitId {
    // Validation caps the roster at MAX_ROSTER, so every index fits.
    UnitId::try_from(index).unwrap_or(UnitId::MAX)
}

/// Columns in which a team's hideouts are placed.
pub(crate) fn hideout_columns(config: &BattleConfig, team: Team) -> RangeInclusive<u16> {
    let band = config.hideout_band;
    match team {
        Team::Left => 0..=band - 1,
        Team::Right => config.width - band..=config.width - 1,
    }
}

/// Columns in which a team's units spawn.
pub(crate) fn spawn_columns(config: &BattleConfig, team: Team) -> RangeInclusive<u16> {
    let inset = config.spawn_inset;
    let depth = config.spawn_depth;
    match team {
        Team::Left => inset..=inset + depth - 1,
        Team::Right => config.width - inset - depth..=config.width - 1 - inset,
    }
}

/// Rows in which units of either team spawn.
pub(crate) fn spawn_rows(config: &BattleConfig) -> RangeInclusive<u16> {
    config.spawn_inset..=config.height - 1 - config.spawn_inset
}

fn spawn_fallbacks(config: &BattleConfig, grid: &TerrainGrid) -> Result<[Coord; 2], ConfigError> {
    let first_open = |team: Team| {
        spawn_columns(config, team)
            .flat_map(|x| spawn_rows(config).map(move |y| Coord::new(x, y)))
            .find(|&c| grid.is_passable(c))
            .ok_or(ConfigError::Placement {
                what: "spawn cell",
                attempts: 0,
            })
    };
    Ok([first_open(Team::Left)?, first_open(Team::Right)?])
}
