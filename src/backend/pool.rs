use super::{Backend, BackendKind};
use crate::{
    compute_partitions, evolve_rows, split_rows_mut, Cell, DoubleBuffer, Grid, Partition,
    SimConfig, SimError,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Barrier;
use std::thread::{self, Scope, ScopedJoinHandle};
use tracing::{error, trace};

/// Everything one worker thread needs for a single generation.
pub struct WorkerContext<'a> {
    pub id: usize,
    pub partition: Partition,
    pub current: &'a Grid,
    /// The worker's rows of `next`.
    pub out: &'a mut [Cell],
}

impl WorkerContext<'_> {
    /// Computes the partition, then waits for the other workers.
    ///
    /// The barrier is reached even if the computation panics, so a failing
    /// worker cannot leave its peers blocked; the panic is re-raised after.
    fn run(self, barrier: &Barrier) {
        let Self {
            id,
            partition,
            current,
            out,
        } = self;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            evolve_rows(current, partition, out);
        }));
        trace!(worker = id, start = partition.start, end = partition.end, "rows done");
        barrier.wait();
        if let Err(payload) = outcome {
            panic::resume_unwind(payload);
        }
    }
}

fn spawn_worker<'scope, 'env, T, F>(
    scope: &'scope Scope<'scope, 'env>,
    id: usize,
    body: F,
) -> ScopedJoinHandle<'scope, T>
where
    T: Send + 'scope,
    F: FnOnce() -> T + Send + 'scope,
{
    match thread::Builder::new()
        .name(format!("life-worker-{id}"))
        .spawn_scoped(scope, body)
    {
        Ok(handle) => handle,
        Err(err) => {
            // Peers already waiting at the barrier could never be released.
            error!(worker = id, %err, "failed to spawn worker thread");
            std::process::abort();
        }
    }
}

/// Joins every handle, even after a failure, and reports the first worker
/// that panicked.
fn join_all<T>(handles: Vec<ScopedJoinHandle<'_, T>>) -> Result<Vec<T>, SimError> {
    let mut values = Vec::with_capacity(handles.len());
    let mut panicked = None;
    for (id, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(value) => values.push(value),
            Err(_) => {
                error!(worker = id, "worker thread panicked");
                panicked.get_or_insert(id);
            }
        }
    }
    match panicked {
        Some(id) => Err(SimError::WorkerPanicked(id)),
        None => Ok(values),
    }
}

/// Explicit threads: every generation spawns one thread per partition, each
/// worker meets the others at a barrier and the coordinator joins them all
/// before the buffers may be swapped.
pub struct WorkerPoolBackend {
    workers: usize,
}

impl WorkerPoolBackend {
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        compute_partitions(config.rows, config.workers)?;
        Ok(Self {
            workers: config.workers,
        })
    }
}

impl Backend for WorkerPoolBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::WorkerPool
    }

    fn step(&mut self, buffers: &mut DoubleBuffer) -> Result<(), SimError> {
        let (current, next) = buffers.split();
        let partitions = compute_partitions(current.rows(), self.workers)?;
        let slices = split_rows_mut(next.cells_mut(), current.cols(), &partitions);
        let barrier = Barrier::new(self.workers);

        thread::scope(|scope| {
            let handles: Vec<_> = partitions
                .iter()
                .zip(slices)
                .enumerate()
                .map(|(id, (&partition, out))| {
                    let context = WorkerContext {
                        id,
                        partition,
                        current,
                        out,
                    };
                    let barrier = &barrier;
                    spawn_worker(scope, id, move || context.run(barrier))
                })
                .collect();
            join_all(handles).map(|_| ())
        })
    }

    fn alive_cells(&mut self, grid: &Grid) -> Result<Option<usize>, SimError> {
        let partitions = compute_partitions(grid.rows(), self.workers)?;
        thread::scope(|scope| -> Result<_, SimError> {
            let handles: Vec<_> = partitions
                .iter()
                .enumerate()
                .map(|(id, &partition)| {
                    spawn_worker(scope, id, move || grid.alive_count_in(partition))
                })
                .collect();
            Ok(Some(join_all(handles)?.into_iter().sum()))
        })
    }
}
