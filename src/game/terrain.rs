//! Terrain grid and coordinate types.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on random draws when placing a hideout or a spawn cell.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another coordinate.
    #[must_use]
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// Signed form, usable as a move target.
    #[must_use]
    pub fn signed(self) -> (i32, i32) {
        (i32::from(self.x), i32::from(self.y))
    }

    /// Offset by a signed step, without bounds checks.
    #[must_use]
    pub fn offset(self, (dx, dy): (i32, i32)) -> (i32, i32) {
        (i32::from(self.x) + dx, i32::from(self.y) + dy)
    }
}

/// Terrain classification of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainCell {
    /// Open ground, full speed.
    Plain = 0,
    /// Slows movement to 70%.
    Hill = 1,
    /// Impassable, never occupied.
    Obstacle = 2,
    /// Healing site, slows movement to 50%.
    Hideout = 3,
}

impl TerrainCell {
    /// Movement-speed multiplier for a unit standing on this cell.
    #[must_use]
    pub const fn speed_multiplier(self) -> f64 {
        match self {
            Self::Plain => 1.0,
            Self::Hill => 0.7,
            Self::Hideout => 0.5,
            Self::Obstacle => 0.0,
        }
    }

    /// Whether units may stand on this cell.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Obstacle)
    }
}

/// Immutable-after-creation terrain of the battlefield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainGrid {
    width: u16,
    height: u16,
    /// Cells in row-major order.
    cells: Vec<TerrainCell>,
}

impl TerrainGrid {
    /// Create a grid filled with Plain cells.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            cells: vec![TerrainCell::Plain; size],
        })
    }

    /// Generate random terrain.
    ///
    /// Each cell draws once: below `obstacle_ratio` it becomes an Obstacle,
    /// below `obstacle_ratio + hill_ratio` a Hill, otherwise it stays Plain.
    /// Cells are visited column by column (x outer, y inner).
    #[must_use]
    pub fn generate<R: Rng>(
        width: u16,
        height: u16,
        obstacle_ratio: f64,
        hill_ratio: f64,
        rng: &mut R,
    ) -> Option<Self> {
        let mut grid = Self::new(width, height)?;
        for x in 0..width {
            for y in 0..height {
                let roll: f64 = rng.r#gen();
                let cell = if roll < obstacle_ratio {
                    TerrainCell::Obstacle
                } else if roll < obstacle_ratio + hill_ratio {
                    TerrainCell::Hill
                } else {
                    continue;
                };
                grid.set(Coord::new(x, y), cell);
            }
        }
        Some(grid)
    }

    /// Mark `count` random cells with x in `x_min..=x_max` as hideouts.
    ///
    /// A draw is retried while it lands on an Obstacle or an existing
    /// Hideout, up to [`MAX_PLACEMENT_ATTEMPTS`] times per hideout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Placement`] when the retry budget runs out.
    pub fn place_hideouts<R: Rng>(
        &mut self,
        x_min: u16,
        x_max: u16,
        count: u16,
        rng: &mut R,
    ) -> Result<Vec<Coord>, ConfigError> {
        let mut placed = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let coord = self.draw_cell("hideout", x_min..=x_max, 0..=self.height - 1, rng, |cell| {
                cell.is_passable() && cell != TerrainCell::Hideout
            })?;
            self.set(coord, TerrainCell::Hideout);
            placed.push(coord);
        }
        Ok(placed)
    }

    /// Draw uniform cells from the given ranges until one satisfies `accept`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Placement`] when the retry budget runs out.
    pub fn draw_cell<R: Rng>(
        &self,
        what: &'static str,
        xs: std::ops::RangeInclusive<u16>,
        ys: std::ops::RangeInclusive<u16>,
        rng: &mut R,
        accept: impl Fn(TerrainCell) -> bool,
    ) -> Result<Coord, ConfigError> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let coord = Coord::new(rng.gen_range(xs.clone()), rng.gen_range(ys.clone()));
            if self.get(coord).is_some_and(&accept) {
                return Ok(coord);
            }
        }
        Err(ConfigError::Placement {
            what,
            attempts: MAX_PLACEMENT_ATTEMPTS,
        })
    }

    /// Width of the grid.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height of the grid.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Check if a coordinate is within the grid.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
    }

    /// Terrain at the given coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<TerrainCell> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    /// Set the terrain at a coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set(&mut self, coord: Coord, cell: TerrainCell) -> bool {
        if let Some(idx) = self.index(coord) {
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    /// Movement-speed multiplier at a coordinate (0.0 outside the grid).
    #[must_use]
    pub fn speed_at(&self, coord: Coord) -> f64 {
        self.get(coord).map_or(0.0, TerrainCell::speed_multiplier)
    }

    /// Whether a unit may stand at the coordinate.
    #[must_use]
    pub fn is_passable(&self, coord: Coord) -> bool {
        self.get(coord).is_some_and(TerrainCell::is_passable)
    }

    /// Iterate over all coordinates and cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, TerrainCell)> + '_ {
        let width = usize::from(self.width);
        self.cells.iter().enumerate().map(move |(idx, &cell)| {
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coord::new((idx % width) as u16, (idx / width) as u16);
            (coord, cell)
        })
    }

    /// Count cells of one terrain type.
    #[must_use]
    pub fn count(&self, cell: TerrainCell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }
}
