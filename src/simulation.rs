use crate::{
    Backend, BackendKind, Cluster, ConfigError, DistributedBackend, DoubleBuffer, Elapsed, Grid,
    NiceInt, SharedMemoryBackend, SimError, WorkerPoolBackend,
};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Immutable run parameters handed to every component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimConfig {
    pub rows: usize,
    pub cols: usize,
    /// Number of generations computed unconditionally. `0` runs no step.
    pub generations: u64,
    /// Worker threads, or ranks for the distributed backend.
    pub workers: usize,
}

impl SimConfig {
    /// Square field of `size x size` cells.
    pub fn square(size: usize, generations: u64, workers: usize) -> Self {
        Self {
            rows: size,
            cols: size,
            generations,
            workers,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (rows, cols, workers) = (self.rows, self.cols, self.workers);
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if rows < workers {
            return Err(ConfigError::TooFewRows { rows, workers });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop,
}

/// Render collaborator. Only the coordinator calls it, and never while a
/// generation is being computed.
pub trait Observer {
    /// Called after every generation, e.g. to pump window events.
    fn poll(&mut self) -> Control {
        Control::Continue
    }

    /// Called for the generations selected by [`should_render`].
    fn draw(&mut self, grid: &Grid, generation: u64) -> Control;

    /// Called once after the final reduction.
    fn finish(&mut self, _report: &Report) {}
}

/// The first five generations and the last one are rendered.
pub fn should_render(generation: u64, generations: u64) -> bool {
    generation < 5 || generation + 1 == generations
}

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub backend: BackendKind,
    pub generations_run: u64,
    pub interrupted: bool,
    /// Total alive cells; `None` on non-coordinating ranks.
    pub alive: Option<usize>,
    pub elapsed: Duration,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alive) = self.alive {
            writeln!(f, "Alive cells: {alive}")?;
        }
        write!(f, "Elapsed: {}", Elapsed(self.elapsed))
    }
}

/// Drives a fixed number of generations over a double buffer.
pub struct Simulation<B: Backend> {
    config: SimConfig,
    buffers: DoubleBuffer,
    backend: B,
}

impl<B: Backend> Simulation<B> {
    pub fn new(config: SimConfig, seed: Grid, backend: B) -> Result<Self, SimError> {
        config.validate()?;
        if (seed.rows(), seed.cols()) != (config.rows, config.cols) {
            return Err(ConfigError::SeedMismatch {
                rows: config.rows,
                cols: config.cols,
                actual_rows: seed.rows(),
                actual_cols: seed.cols(),
            }
            .into());
        }
        let buffers = DoubleBuffer::new(seed)?;
        Ok(Self {
            config,
            buffers,
            backend,
        })
    }

    pub fn grid(&self) -> &Grid {
        self.buffers.current()
    }

    pub fn into_grid(self) -> Grid {
        self.buffers.into_current()
    }

    /// Runs every generation, then reduces the alive-cell count once.
    ///
    /// `observer` is ignored on non-coordinating participants. A stop request
    /// ends the loop between generations unless the backend is not
    /// interruptible, in which case it is logged and the run continues.
    pub fn run(&mut self, mut observer: Option<&mut dyn Observer>) -> Result<Report, SimError> {
        let SimConfig {
            rows,
            cols,
            generations,
            workers,
        } = self.config;
        let kind = self.backend.kind();
        let coordinator = self.backend.is_coordinator();
        if !coordinator {
            observer = None;
        }
        if coordinator {
            info!(backend = %kind, rows, cols, generations, workers, "starting simulation");
        }

        let timer = Instant::now();
        let mut generations_run = 0;
        let mut interrupted = false;
        let mut stop_ignored = false;

        for generation in 0..generations {
            self.backend.step(&mut self.buffers)?;
            self.buffers.swap();
            generations_run += 1;

            let Some(observer) = observer.as_deref_mut() else {
                continue;
            };
            let mut control = observer.poll();
            if control == Control::Continue && should_render(generation, generations) {
                control = observer.draw(self.buffers.current(), generation);
            }
            if control == Control::Stop {
                if self.backend.interruptible() {
                    info!(generation, "stop requested, ending run early");
                    interrupted = true;
                    break;
                }
                if !stop_ignored {
                    warn!(
                        backend = %kind,
                        generation,
                        "stop requested but backend runs to completion"
                    );
                    stop_ignored = true;
                }
            }
        }

        let alive = self.backend.alive_cells(self.buffers.current())?;
        let report = Report {
            backend: kind,
            generations_run,
            interrupted,
            alive,
            elapsed: timer.elapsed(),
        };
        if coordinator {
            info!(
                alive = %NiceInt::from_usize(alive.unwrap_or_default()),
                generations_run,
                elapsed = %Elapsed(report.elapsed),
                "simulation finished"
            );
        } else {
            debug!(generations_run, "rank finished");
        }
        if let Some(observer) = observer {
            observer.finish(&report);
        }
        Ok(report)
    }
}

/// Runs the distributed backend with `config.workers` ranks. Each rank
/// starts from its own copy of `seed`; rank 0 drives `observer` and its
/// report and final grid are returned.
pub fn run_distributed(
    config: SimConfig,
    seed: Grid,
    observer: Option<&mut dyn Observer>,
) -> Result<(Report, Grid), SimError> {
    config.validate()?;
    let peer_seed = seed.clone();
    let (root, _) = Cluster::launch(
        config.workers,
        |comm| {
            let backend = DistributedBackend::new(comm, &config)?;
            let mut simulation = Simulation::new(config, seed, backend)?;
            let report = simulation.run(observer)?;
            Ok((report, simulation.into_grid()))
        },
        |comm| {
            let backend = DistributedBackend::new(comm, &config)?;
            let mut simulation = Simulation::new(config, peer_seed.clone(), backend)?;
            simulation.run(None)?;
            Ok(())
        },
    )?;
    Ok(root)
}

/// Runs one whole simulation with the selected backend.
pub fn run(
    kind: BackendKind,
    config: SimConfig,
    seed: Grid,
    observer: Option<&mut dyn Observer>,
) -> Result<(Report, Grid), SimError> {
    let backend: Box<dyn Backend> = match kind {
        BackendKind::Distributed => return run_distributed(config, seed, observer),
        BackendKind::SharedMemory => Box::new(SharedMemoryBackend::new(&config)?),
        BackendKind::WorkerPool => Box::new(WorkerPoolBackend::new(&config)?),
    };
    let mut simulation = Simulation::new(config, seed, backend)?;
    let report = simulation.run(observer)?;
    Ok((report, simulation.into_grid()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        drawn: Vec<u64>,
        polls: usize,
        stop_after: Option<usize>,
        finished: Option<Report>,
    }

    impl Observer for Recorder {
        fn poll(&mut self) -> Control {
            self.polls += 1;
            match self.stop_after {
                Some(n) if self.polls > n => Control::Stop,
                _ => Control::Continue,
            }
        }

        fn draw(&mut self, _grid: &Grid, generation: u64) -> Control {
            self.drawn.push(generation);
            Control::Continue
        }

        fn finish(&mut self, report: &Report) {
            self.finished = Some(report.clone());
        }
    }

    #[test]
    fn render_policy() {
        let drawn: Vec<u64> = (0..20).filter(|&g| should_render(g, 20)).collect();
        assert_eq!(drawn, vec![0, 1, 2, 3, 4, 19]);
        let drawn: Vec<u64> = (0..3).filter(|&g| should_render(g, 3)).collect();
        assert_eq!(drawn, vec![0, 1, 2]);
    }

    #[test]
    fn observer_sees_policy_generations() {
        let config = SimConfig::square(16, 12, 2);
        let seed = crate::classic_seed(16, 16).unwrap();
        let mut recorder = Recorder::default();
        let (report, _) = run(BackendKind::WorkerPool, config, seed, Some(&mut recorder)).unwrap();
        assert_eq!(recorder.drawn, vec![0, 1, 2, 3, 4, 11]);
        assert_eq!(recorder.polls, 12);
        assert_eq!(report.generations_run, 12);
        assert!(!report.interrupted);
        assert_eq!(recorder.finished, Some(report));
    }

    #[test]
    fn stop_interrupts_local_backends() {
        for kind in [BackendKind::SharedMemory, BackendKind::WorkerPool] {
            let config = SimConfig::square(16, 100, 2);
            let seed = crate::classic_seed(16, 16).unwrap();
            let mut recorder = Recorder {
                stop_after: Some(3),
                ..Default::default()
            };
            let (report, grid) = run(kind, config, seed, Some(&mut recorder)).unwrap();
            assert!(report.interrupted);
            assert_eq!(report.generations_run, 4);
            assert_eq!(recorder.drawn, vec![0, 1, 2]);
            assert_eq!(report.alive, Some(grid.alive_count()));
        }
    }

    #[test]
    fn distributed_ignores_stop() {
        let config = SimConfig::square(16, 10, 3);
        let seed = crate::classic_seed(16, 16).unwrap();
        let mut recorder = Recorder {
            stop_after: Some(0),
            ..Default::default()
        };
        let (report, _) = run(BackendKind::Distributed, config, seed, Some(&mut recorder)).unwrap();
        assert!(!report.interrupted);
        assert_eq!(report.generations_run, 10);
        assert_eq!(recorder.polls, 10);
    }

    #[test]
    fn zero_generations_keep_seed() {
        let seed = crate::random_seed(12, 12, 0.5, Some(5)).unwrap();
        for kind in BackendKind::ALL {
            let config = SimConfig::square(12, 0, 3);
            let mut recorder = Recorder::default();
            let (report, grid) = run(kind, config, seed.clone(), Some(&mut recorder)).unwrap();
            assert_eq!(grid, seed, "{kind}");
            assert_eq!(report.generations_run, 0);
            assert_eq!(report.alive, Some(seed.alive_count()));
            assert!(recorder.drawn.is_empty());
        }
    }

    #[test]
    fn seed_must_match_config() {
        let config = SimConfig::square(8, 1, 1);
        let seed = Grid::blank(8, 9).unwrap();
        let backend = WorkerPoolBackend::new(&config).unwrap();
        assert!(matches!(
            Simulation::new(config, seed, backend),
            Err(SimError::Config(ConfigError::SeedMismatch { .. }))
        ));
    }

    #[test]
    fn report_formatting() {
        let report = Report {
            backend: BackendKind::SharedMemory,
            generations_run: 2000,
            interrupted: false,
            alive: Some(1234),
            elapsed: Duration::from_millis(75_250),
        };
        assert_eq!(report.to_string(), "Alive cells: 1234\nElapsed: 1m15.250s");
    }
}
