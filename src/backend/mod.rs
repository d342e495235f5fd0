mod distributed;
mod pool;
mod shared;

pub use distributed::{ChannelCommunicator, Cluster, Communicator, DistributedBackend};
pub use pool::{WorkerContext, WorkerPoolBackend};
pub use shared::SharedMemoryBackend;

use crate::{DoubleBuffer, Grid, SimError};
use std::fmt;

/// Strategy used to compute a generation in parallel. Chosen once per run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Ranks without shared memory exchanging rows through messages.
    Distributed,
    /// Fork-join over a rayon pool.
    SharedMemory,
    /// Explicitly spawned threads meeting at a barrier.
    WorkerPool,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [
        BackendKind::Distributed,
        BackendKind::SharedMemory,
        BackendKind::WorkerPool,
    ];
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Distributed => "distributed",
            BackendKind::SharedMemory => "shared-memory",
            BackendKind::WorkerPool => "worker-pool",
        };
        f.write_str(name)
    }
}

/// One participant's view of the generation-stepping engine.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Computes `next` from `current` and synchronizes so that, on return,
    /// `next` holds the complete new generation for this participant.
    /// Does not swap the buffers.
    fn step(&mut self, buffers: &mut DoubleBuffer) -> Result<(), SimError>;

    /// Final alive-cell reduction. Only the coordinator gets `Some`.
    fn alive_cells(&mut self, grid: &Grid) -> Result<Option<usize>, SimError>;

    /// Whether this participant renders and reports.
    fn is_coordinator(&self) -> bool {
        true
    }

    /// Whether a stop request from the renderer ends the run early.
    fn interruptible(&self) -> bool {
        true
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn step(&mut self, buffers: &mut DoubleBuffer) -> Result<(), SimError> {
        (**self).step(buffers)
    }

    fn alive_cells(&mut self, grid: &Grid) -> Result<Option<usize>, SimError> {
        (**self).alive_cells(grid)
    }

    fn is_coordinator(&self) -> bool {
        (**self).is_coordinator()
    }

    fn interruptible(&self) -> bool {
        (**self).interruptible()
    }
}
