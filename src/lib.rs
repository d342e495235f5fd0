#![warn(clippy::all)]

mod backend;
mod error;
mod grid;
mod gui;
mod partition;
mod patterns;
mod rule;
mod simulation;
mod utils;

pub use backend::{
    Backend, BackendKind, ChannelCommunicator, Cluster, Communicator, DistributedBackend,
    SharedMemoryBackend, WorkerContext, WorkerPoolBackend,
};
pub use error::{ConfigError, PatternError, SimError};
pub use grid::{Cell, DoubleBuffer, Grid};
pub use gui::{run_observed, App, Config, TextObserver, ViewerEvent, WindowObserver};
pub use partition::{compute_partitions, partition_for_rank, split_rows_mut, Partition};
pub use patterns::{classic_seed, glider, r_pentomino, random_seed};
pub use rule::{count_alive_neighbors, evolve_rows, next_state};
pub use simulation::{
    run, run_distributed, should_render, Control, Observer, Report, SimConfig, Simulation,
};
pub use utils::{parse_rle, Elapsed, NiceInt};
