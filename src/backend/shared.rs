use super::{Backend, BackendKind};
use crate::{
    compute_partitions, evolve_rows, split_rows_mut, DoubleBuffer, Grid, Partition, SimConfig,
    SimError,
};
use rayon::prelude::*;
use tracing::debug;

/// Fork-join stepping: each generation is one parallel region over the
/// partitions; `current` is shared read-only and every task writes only its
/// own rows of `next`.
pub struct SharedMemoryBackend {
    pool: rayon::ThreadPool,
    partitions: Vec<Partition>,
}

impl SharedMemoryBackend {
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let partitions = compute_partitions(config.rows, config.workers)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("life-shared-{i}"))
            .build()
            .map_err(|err| SimError::ThreadPool(err.to_string()))?;
        debug!(workers = config.workers, "built shared-memory pool");
        Ok(Self { pool, partitions })
    }
}

impl Backend for SharedMemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::SharedMemory
    }

    fn step(&mut self, buffers: &mut DoubleBuffer) -> Result<(), SimError> {
        let (current, next) = buffers.split();
        let slices = split_rows_mut(next.cells_mut(), current.cols(), &self.partitions);
        let partitions = &self.partitions;
        self.pool.install(|| {
            partitions
                .par_iter()
                .zip(slices)
                .for_each(|(&partition, out)| evolve_rows(current, partition, out));
        });
        Ok(())
    }

    fn alive_cells(&mut self, grid: &Grid) -> Result<Option<usize>, SimError> {
        let partitions = &self.partitions;
        let total = self.pool.install(|| {
            partitions
                .par_iter()
                .map(|&partition| grid.alive_count_in(partition))
                .sum()
        });
        Ok(Some(total))
    }
}
