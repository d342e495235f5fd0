//! Initial fields. Placement wraps around the torus like every other access.

use crate::{Cell, ConfigError, Grid};
use rand::{Rng, SeedableRng};

/// Glider heading towards increasing rows and columns, bounding box at
/// `(row, col)`.
pub fn glider(grid: &mut Grid, row: isize, col: isize) {
    for (dr, dc) in [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)] {
        grid.set(row + dr, col + dc, Cell::Alive);
    }
}

pub fn r_pentomino(grid: &mut Grid, row: isize, col: isize) {
    for (dr, dc) in [(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)] {
        grid.set(row + dr, col + dc, Cell::Alive);
    }
}

/// Default field: a glider at `(1, 1)` and an R-pentomino at `(10, 30)`.
pub fn classic_seed(rows: usize, cols: usize) -> Result<Grid, ConfigError> {
    let mut grid = Grid::blank(rows, cols)?;
    glider(&mut grid, 1, 1);
    r_pentomino(&mut grid, 10, 30);
    Ok(grid)
}

/// Field with every cell alive with probability `density`.
///
/// `seed` - random seed (if `None`, then random seed is generated)
pub fn random_seed(
    rows: usize,
    cols: usize,
    density: f64,
    seed: Option<u64>,
) -> Result<Grid, ConfigError> {
    let mut rng = if let Some(x) = seed {
        rand_chacha::ChaCha8Rng::seed_from_u64(x)
    } else {
        rand_chacha::ChaCha8Rng::from_entropy()
    };
    let density = density.clamp(0., 1.);
    let mut grid = Grid::blank(rows, cols)?;
    for cell in grid.cells_mut() {
        *cell = Cell::from(rng.gen_bool(density));
    }
    Ok(grid)
}
