use torus_life::{random_seed, run, BackendKind, NiceInt, SimConfig};
use std::time::Instant;

const SIDE: usize = 1 << 10;
const GENERATIONS: u64 = 100;
const SEED: u64 = 42;
const FILL_RATE: f64 = 0.3;

fn main() {
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    let timer = Instant::now();
    let seed = random_seed(SIDE, SIDE, FILL_RATE, Some(SEED)).unwrap();
    println!("Time on building field: {:?}", timer.elapsed());

    let mut reference = None;
    for workers in [1, 2, threads] {
        for kind in BackendKind::ALL {
            let config = SimConfig::square(SIDE, GENERATIONS, workers);
            let timer = Instant::now();
            let (report, grid) = run(kind, config, seed.clone(), None).unwrap();
            let elapsed = timer.elapsed();
            let cell_updates = (SIDE * SIDE) as f64 * GENERATIONS as f64;
            println!(
                "{kind:>14} x{workers:<3} {elapsed:>10.3?}  {} cells/s  alive={}",
                NiceInt::from_f64(cell_updates / elapsed.as_secs_f64()),
                NiceInt::from_usize(report.alive.unwrap_or_default()),
            );
            match &reference {
                None => reference = Some(grid),
                Some(expected) => assert!(expected == &grid, "{kind} x{workers} diverged"),
            }
        }
    }
}
