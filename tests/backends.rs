#[cfg(test)]
mod tests {
    use torus_life::{
        compute_partitions, random_seed, run, BackendKind, Grid, Report, SimConfig,
    };

    const SEED: u64 = 42;
    const FILL_RATE: f64 = 0.3;

    fn assert_grids_equal(expected: &Grid, actual: &Grid, what: &str) {
        assert_eq!((expected.rows(), expected.cols()), (actual.rows(), actual.cols()));
        if expected == actual {
            return;
        }
        let (rows, cols) = (expected.rows() as isize, expected.cols() as isize);
        const K: isize = 10;
        for y in 0..rows {
            for x in 0..cols {
                if expected.get(y, x) == actual.get(y, x) {
                    continue;
                }
                let mut picture = String::new();
                for y in (y - K).max(0)..(y + K).min(rows) {
                    for grid in [expected, actual] {
                        picture.push('|');
                        picture.extend(
                            ((x - K).max(0)..(x + K).min(cols))
                                .map(|x| if grid.get(y, x).is_alive() { '#' } else { ' ' }),
                        );
                    }
                    picture.push_str("|\n");
                }
                panic!("{what}: mismatch at ({x}, {y}):\n{picture}");
            }
        }
    }

    fn run_all(config: SimConfig, seed: &Grid) -> Vec<(BackendKind, Report, Grid)> {
        BackendKind::ALL
            .into_iter()
            .map(|kind| {
                let (report, grid) = run(kind, config, seed.clone(), None).unwrap();
                (kind, report, grid)
            })
            .collect()
    }

    #[test]
    fn backends_agree_on_random_fields() {
        for (rows, cols, workers) in [(64, 64, 4), (61, 47, 3), (33, 80, 7), (16, 16, 16)] {
            let seed = random_seed(rows, cols, FILL_RATE, Some(SEED)).unwrap();
            let config = SimConfig {
                rows,
                cols,
                generations: 40,
                workers,
            };
            let results = run_all(config, &seed);
            let (_, expected_report, expected_grid) = &results[0];
            assert_eq!(expected_report.alive, Some(expected_grid.alive_count()));
            for (kind, report, grid) in &results[1..] {
                let what = format!("{kind} on {rows}x{cols} with {workers} workers");
                assert_grids_equal(expected_grid, grid, &what);
                assert_eq!(report.alive, expected_report.alive, "{what}");
                assert_eq!(report.generations_run, 40, "{what}");
            }
        }
    }

    #[test]
    fn worker_count_does_not_change_result() {
        let seed = random_seed(50, 50, FILL_RATE, Some(SEED + 1)).unwrap();
        let reference = run(
            BackendKind::SharedMemory,
            SimConfig::square(50, 25, 1),
            seed.clone(),
            None,
        )
        .unwrap()
        .1;
        for workers in [2, 3, 7, 50] {
            for kind in BackendKind::ALL {
                let config = SimConfig::square(50, 25, workers);
                let (_, grid) = run(kind, config, seed.clone(), None).unwrap();
                assert_grids_equal(&reference, &grid, &format!("{kind} x{workers}"));
            }
        }
    }

    #[test]
    fn partition_counts_sum_to_total() {
        let seed = random_seed(45, 30, FILL_RATE, Some(SEED)).unwrap();
        let (report, grid) = run(
            BackendKind::Distributed,
            SimConfig {
                rows: 45,
                cols: 30,
                generations: 15,
                workers: 4,
            },
            seed,
            None,
        )
        .unwrap();
        let partial_sum: usize = compute_partitions(45, 4)
            .unwrap()
            .into_iter()
            .map(|p| grid.alive_count_in(p))
            .sum();
        assert_eq!(partial_sum, grid.alive_count());
        assert_eq!(report.alive, Some(partial_sum));
    }

    #[test]
    fn invalid_configurations_fail_fast() {
        let seed = random_seed(4, 4, FILL_RATE, Some(SEED)).unwrap();
        for kind in BackendKind::ALL {
            assert!(run(kind, SimConfig::square(4, 3, 0), seed.clone(), None).is_err());
            assert!(run(kind, SimConfig::square(4, 3, 5), seed.clone(), None).is_err());
        }
    }
}
