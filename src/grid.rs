use crate::{ConfigError, Partition};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Dead = 0,
    Alive = 1,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive {
            Cell::Alive
        } else {
            Cell::Dead
        }
    }
}

/// Fixed-size toroidal field stored row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Creates a field with all cells dead.
    ///
    /// Fails instead of aborting when the cell buffer cannot be allocated.
    pub fn blank(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        let too_large = ConfigError::GridTooLarge { rows, cols };
        let size = rows.checked_mul(cols).ok_or(too_large.clone())?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(size).map_err(|_| too_large)?;
        cells.resize(size, Cell::Dead);
        Ok(Self { cells, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: isize, col: isize) -> usize {
        let row = row.rem_euclid(self.rows as isize) as usize;
        let col = col.rem_euclid(self.cols as isize) as usize;
        row * self.cols + col
    }

    /// Indices wrap around both axes, so `-1` is the last row/column.
    pub fn get(&self, row: isize, col: isize) -> Cell {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: isize, col: isize, state: Cell) {
        let i = self.index(row, col);
        self.cells[i] = state;
    }

    /// `row` must be in `0..rows`.
    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn rows_slice(&self, partition: Partition) -> &[Cell] {
        &self.cells[partition.start * self.cols..partition.end * self.cols]
    }

    pub(crate) fn rows_slice_mut(&mut self, partition: Partition) -> &mut [Cell] {
        &mut self.cells[partition.start * self.cols..partition.end * self.cols]
    }

    /// Overwrites the rows of `partition` with `src`, which must hold exactly
    /// `partition.len() * cols` cells.
    pub fn copy_rows_from(&mut self, partition: Partition, src: &[Cell]) {
        self.rows_slice_mut(partition).copy_from_slice(src);
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    pub fn alive_count_in(&self, partition: Partition) -> usize {
        self.rows_slice(partition)
            .iter()
            .filter(|c| c.is_alive())
            .count()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}", self.rows, self.cols)?;
        for row in self.cells.chunks_exact(self.cols) {
            let line: String = row
                .iter()
                .map(|c| if c.is_alive() { '#' } else { '.' })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// The `current` field is only read during a step, `next` is fully
/// overwritten; `swap` exchanges the roles without copying cells.
pub struct DoubleBuffer {
    current: Grid,
    next: Grid,
}

impl DoubleBuffer {
    pub fn new(seed: Grid) -> Result<Self, ConfigError> {
        let next = Grid::blank(seed.rows, seed.cols)?;
        Ok(Self {
            current: seed,
            next,
        })
    }

    pub fn current(&self) -> &Grid {
        &self.current
    }

    pub fn next(&self) -> &Grid {
        &self.next
    }

    pub fn next_mut(&mut self) -> &mut Grid {
        &mut self.next
    }

    /// Read access to `current` together with write access to `next`.
    pub fn split(&mut self) -> (&Grid, &mut Grid) {
        (&self.current, &mut self.next)
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    pub fn into_current(self) -> Grid {
        self.current
    }
}
