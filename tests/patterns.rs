use torus_life::{
    classic_seed, glider, parse_rle, run, BackendKind, Cell, Grid, SimConfig,
};

fn alive_cells(grid: &Grid) -> Vec<(isize, isize)> {
    let mut out = vec![];
    for r in 0..grid.rows() as isize {
        for c in 0..grid.cols() as isize {
            if grid.get(r, c) == Cell::Alive {
                out.push((r, c));
            }
        }
    }
    out
}

fn shifted(grid: &Grid, dr: isize, dc: isize) -> Grid {
    let mut out = Grid::blank(grid.rows(), grid.cols()).unwrap();
    for (r, c) in alive_cells(grid) {
        out.set(r + dr, c + dc, Cell::Alive);
    }
    out
}

#[test]
fn glider_moves_diagonally() {
    for kind in BackendKind::ALL {
        let mut seed = Grid::blank(20, 20).unwrap();
        glider(&mut seed, 5, 7);
        let (_, grid) = run(kind, SimConfig::square(20, 4, 4), seed.clone(), None).unwrap();
        assert_eq!(grid, shifted(&seed, 1, 1), "{kind}");
    }
}

#[test]
fn glider_wraps_around_the_torus() {
    for kind in BackendKind::ALL {
        let mut seed = Grid::blank(10, 12).unwrap();
        glider(&mut seed, 8, 10);
        // a full lap takes 4 generations per cell on each axis
        let config = SimConfig {
            rows: 10,
            cols: 12,
            generations: 4,
            workers: 3,
        };
        let (_, grid) = run(kind, config, seed.clone(), None).unwrap();
        assert_eq!(grid, shifted(&seed, 1, 1), "{kind}");
        assert_eq!(grid.alive_count(), 5);
    }
}

#[test]
fn glider_returns_home_after_full_lap() {
    let mut seed = Grid::blank(8, 8).unwrap();
    glider(&mut seed, 0, 0);
    let (report, grid) = run(
        BackendKind::WorkerPool,
        SimConfig::square(8, 32, 2),
        seed.clone(),
        None,
    )
    .unwrap();
    assert_eq!(grid, seed);
    assert_eq!(report.alive, Some(5));
}

#[test]
fn rle_seed_behaves_like_builtin() {
    let data = b"x = 3, y = 3\nbo$2bo$3o!\n";
    let from_rle = parse_rle(data, 16, 16).unwrap();
    let mut builtin = Grid::blank(16, 16).unwrap();
    glider(&mut builtin, 0, 0);
    assert_eq!(from_rle, builtin);
}

#[test]
fn classic_field_on_small_torus() {
    let seed = classic_seed(50, 50).unwrap();
    let (report, _) = run(
        BackendKind::SharedMemory,
        SimConfig::square(50, 0, 5),
        seed.clone(),
        None,
    )
    .unwrap();
    assert_eq!(report.alive, Some(10));
}
