//! B3/S23 transition over the toroidal Moore neighborhood.

use crate::{Cell, Grid, Partition};

fn wrap_prev(i: usize, n: usize) -> usize {
    if i == 0 {
        n - 1
    } else {
        i - 1
    }
}

fn wrap_next(i: usize, n: usize) -> usize {
    if i == n - 1 {
        0
    } else {
        i + 1
    }
}

fn sum_around(above: &[Cell], here: &[Cell], below: &[Cell], col: usize) -> u8 {
    let cols = here.len();
    let (x1, x2) = (wrap_prev(col, cols), wrap_next(col, cols));
    above[x1] as u8
        + above[col] as u8
        + above[x2] as u8
        + here[x1] as u8
        + here[x2] as u8
        + below[x1] as u8
        + below[col] as u8
        + below[x2] as u8
}

fn neighborhood(grid: &Grid, row: usize) -> [&[Cell]; 3] {
    let rows = grid.rows();
    [
        grid.row(wrap_prev(row, rows)),
        grid.row(row),
        grid.row(wrap_next(row, rows)),
    ]
}

/// Number of alive cells among the 8 neighbors of `(row, col)`.
pub fn count_alive_neighbors(grid: &Grid, row: usize, col: usize) -> u8 {
    let [above, here, below] = neighborhood(grid, row % grid.rows());
    sum_around(above, here, below, col % grid.cols())
}

pub fn next_state(cell: Cell, alive_neighbors: u8) -> Cell {
    match (cell, alive_neighbors) {
        (Cell::Alive, 2 | 3) | (Cell::Dead, 3) => Cell::Alive,
        _ => Cell::Dead,
    }
}

/// Writes the next state of every cell in `partition` into `out`, which
/// holds exactly the partition's rows.
pub fn evolve_rows(current: &Grid, partition: Partition, out: &mut [Cell]) {
    let cols = current.cols();
    debug_assert_eq!(out.len(), partition.len() * cols);
    for (row, out_row) in partition.rows().zip(out.chunks_exact_mut(cols)) {
        let [above, here, below] = neighborhood(current, row);
        for (col, dst) in out_row.iter_mut().enumerate() {
            *dst = next_state(here[col], sum_around(above, here, below, col));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_table() {
        for n in 0..=8u8 {
            let survives = next_state(Cell::Alive, n);
            let born = next_state(Cell::Dead, n);
            assert_eq!(survives.is_alive(), n == 2 || n == 3, "alive with {n}");
            assert_eq!(born.is_alive(), n == 3, "dead with {n}");
        }
    }

    #[test]
    fn neighbors_wrap_around_corners() {
        let mut grid = Grid::blank(5, 7).unwrap();
        grid.set(4, 6, Cell::Alive);
        grid.set(4, 0, Cell::Alive);
        grid.set(0, 6, Cell::Alive);
        grid.set(1, 1, Cell::Alive);
        assert_eq!(count_alive_neighbors(&grid, 0, 0), 4);
        // the cell itself is not counted
        assert_eq!(count_alive_neighbors(&grid, 1, 1), 0);
        assert_eq!(count_alive_neighbors(&grid, 4, 6), 2);
    }

    #[test]
    fn full_grid_counts_eight() {
        let mut grid = Grid::blank(3, 3).unwrap();
        for r in 0..3 {
            for c in 0..3 {
                grid.set(r, c, Cell::Alive);
            }
        }
        assert_eq!(count_alive_neighbors(&grid, 1, 1), 8);
    }

    #[test]
    fn blinker_oscillates() {
        let mut grid = Grid::blank(5, 5).unwrap();
        for c in 1..4 {
            grid.set(2, c, Cell::Alive);
        }
        let all = Partition { start: 0, end: 5 };
        let mut out = vec![Cell::Dead; 25];
        evolve_rows(&grid, all, &mut out);
        let alive: Vec<usize> = (0..25).filter(|&i| out[i].is_alive()).collect();
        assert_eq!(alive, vec![7, 12, 17]);
    }

    #[test]
    fn evolve_matches_pointwise_rule() {
        let grid = crate::random_seed(9, 11, 0.4, Some(7)).unwrap();
        let part = Partition { start: 3, end: 9 };
        let mut out = vec![Cell::Dead; part.len() * grid.cols()];
        evolve_rows(&grid, part, &mut out);
        for r in part.rows() {
            for c in 0..grid.cols() {
                let expected = next_state(
                    grid.get(r as isize, c as isize),
                    count_alive_neighbors(&grid, r, c),
                );
                assert_eq!(out[(r - part.start) * grid.cols() + c], expected);
            }
        }
    }
}
