//! Plain-text renderer for terminal viewing.

use std::fmt::Write as _;

use crate::game::{BattleWorld, Coord, Status, TerrainCell};

/// Width of the `=` rules framing a frame.
const RULE_WIDTH: usize = 50;

/// Render the world to plain text.
///
/// Output format (one text row per x index, cells separated by a space):
/// ```text
/// ==================================================
/// Step: 12 | Team0 Captured: 1 | Team1 Captured: 0
/// Team0 Kills: 2 | Team1 Kills: 1 | Heals: 3/0
/// H . . X . . .
/// . 0 . . 0' . .
/// . . X . . 1'' .
/// ==================================================
/// ```
///
/// `X` is an obstacle, `H` a hideout. A living unit replaces its cell with
/// its team digit, followed by `'` when Injured or `''` when critically
/// injured. Captured units are not drawn; later roster entries overwrite
/// earlier ones sharing a cell.
#[must_use]
pub fn render_ascii(world: &BattleWorld) -> String {
    let grid = world.grid();
    let width = usize::from(grid.width());
    let height = usize::from(grid.height());

    let mut cells: Vec<Vec<String>> = (0..width)
        .map(|_| Vec::with_capacity(height))
        .collect();
    for x in 0..grid.width() {
        for y in 0..grid.height() {
            let glyph = match grid.get(Coord::new(x, y)) {
                Some(TerrainCell::Obstacle) => "X",
                Some(TerrainCell::Hideout) => "H",
                _ => ".",
            };
            cells[usize::from(x)].push(glyph.to_string());
        }
    }

    for unit in world.units() {
        let suffix = match unit.status() {
            Status::Captured => continue,
            Status::Healthy => "",
            Status::Injured => "'",
            Status::CriticallyInjured => "''",
        };
        let pos = unit.pos();
        if let Some(cell) = cells
            .get_mut(usize::from(pos.x))
            .and_then(|col| col.get_mut(usize::from(pos.y)))
        {
            *cell = format!("{}{suffix}", unit.team.index());
        }
    }

    let info = world.info();
    let rule = "=".repeat(RULE_WIDTH);
    let mut output = String::new();
    let _ = writeln!(output, "{rule}");
    let _ = writeln!(
        output,
        "Step: {} | Team0 Captured: {} | Team1 Captured: {}",
        info.step, info.team0_captured, info.team1_captured
    );
    let _ = writeln!(
        output,
        "Team0 Kills: {} | Team1 Kills: {} | Heals: {}/{}",
        info.team0_kills, info.team1_kills, info.team0_heals, info.team1_heals
    );
    for row in &cells {
        let _ = writeln!(output, "{}", row.join(" "));
    }
    let _ = writeln!(output, "{rule}");
    output
}
