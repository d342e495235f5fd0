//! Message-passing backend.
//!
//! Every rank owns a complete private copy of the field and computes only
//! its own partition. Per generation:
//!
//! 1. each rank evolves its rows into its local `next`;
//! 2. barrier;
//! 3. rank 0 receives the rows of every other rank into its `next`;
//! 4. barrier;
//! 5. rank 0 broadcasts the assembled field, so every rank starts the next
//!    generation from an identical grid.
//!
//! Ranks share no memory: [`ChannelCommunicator`] moves owned buffers between
//! rank threads over crossbeam channels, one channel per ordered pair of
//! ranks. Any send/receive failure is fatal for the whole group.

use super::{Backend, BackendKind};
use crate::{
    compute_partitions, evolve_rows, partition_for_rank, Cell, ConfigError, DoubleBuffer, Grid,
    Partition, SimConfig, SimError,
};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::thread;
use tracing::{debug, trace};

/// Message tag used for partition rows sent to the coordinator.
pub const ROWS_TAG: u32 = 12;

/// Rank that assembles, broadcasts and reports.
pub const ROOT: usize = 0;

/// Collective and point-to-point operations needed by the distributed step.
///
/// All operations block until they complete; none has a timeout.
pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    /// Returns once every rank of the group has entered the barrier.
    fn barrier(&mut self) -> Result<(), SimError>;

    fn send_rows(&mut self, dest: usize, tag: u32, cells: Vec<Cell>) -> Result<(), SimError>;

    fn recv_rows(&mut self, source: usize, tag: u32) -> Result<Vec<Cell>, SimError>;

    /// Copies `cells` of `root` into `cells` of every other rank.
    fn broadcast_cells(&mut self, root: usize, cells: &mut [Cell]) -> Result<(), SimError>;

    /// Sum of `value` over all ranks, delivered to `root` only.
    fn reduce_sum(&mut self, root: usize, value: u64) -> Result<Option<u64>, SimError>;
}

#[derive(Debug)]
enum Message {
    Barrier,
    Rows { tag: u32, cells: Vec<Cell> },
    Broadcast(Vec<Cell>),
    Partial(u64),
}

impl Message {
    fn name(&self) -> &'static str {
        match self {
            Message::Barrier => "barrier",
            Message::Rows { .. } => "rows",
            Message::Broadcast(_) => "broadcast",
            Message::Partial(_) => "partial sum",
        }
    }
}

/// In-process communicator. Messages from one rank to another arrive in the
/// order they were sent.
pub struct ChannelCommunicator {
    rank: usize,
    /// `outboxes[dest]`, `None` for `rank` itself.
    outboxes: Vec<Option<Sender<Message>>>,
    /// `inboxes[source]`, `None` for `rank` itself.
    inboxes: Vec<Option<Receiver<Message>>>,
}

impl ChannelCommunicator {
    /// Creates the fully connected communicators of a group of `size` ranks,
    /// ordered by rank.
    pub fn group(size: usize) -> Result<Vec<Self>, ConfigError> {
        if size == 0 {
            return Err(ConfigError::NoWorkers);
        }
        let mut outboxes: Vec<Vec<Option<Sender<Message>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        let mut inboxes: Vec<Vec<Option<Receiver<Message>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        for source in 0..size {
            for dest in (0..size).filter(|&dest| dest != source) {
                let (tx, rx) = unbounded();
                outboxes[source][dest] = Some(tx);
                inboxes[dest][source] = Some(rx);
            }
        }
        Ok(outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| Self {
                rank,
                outboxes,
                inboxes,
            })
            .collect())
    }

    fn send(&self, dest: usize, op: &'static str, message: Message) -> Result<(), SimError> {
        let tx = self
            .outboxes
            .get(dest)
            .and_then(Option::as_ref)
            .ok_or_else(|| SimError::comm(self.rank, op, format!("no route to rank {dest}")))?;
        tx.send(message)
            .map_err(|_| SimError::comm(self.rank, op, format!("rank {dest} is gone")))
    }

    fn recv(&self, source: usize, op: &'static str) -> Result<Message, SimError> {
        let rx = self
            .inboxes
            .get(source)
            .and_then(Option::as_ref)
            .ok_or_else(|| SimError::comm(self.rank, op, format!("no route from rank {source}")))?;
        rx.recv()
            .map_err(|_| SimError::comm(self.rank, op, format!("rank {source} is gone")))
    }

    fn unexpected(&self, op: &'static str, source: usize, got: &Message) -> SimError {
        SimError::comm(
            self.rank,
            op,
            format!("unexpected {} message from rank {source}", got.name()),
        )
    }

    fn peers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size()).filter(move |&r| r != self.rank)
    }
}

impl Communicator for ChannelCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.outboxes.len()
    }

    fn barrier(&mut self) -> Result<(), SimError> {
        const OP: &str = "barrier";
        // Gather at the root, then release everybody.
        if self.rank == ROOT {
            for source in self.peers() {
                match self.recv(source, OP)? {
                    Message::Barrier => {}
                    other => return Err(self.unexpected(OP, source, &other)),
                }
            }
            for dest in self.peers() {
                self.send(dest, OP, Message::Barrier)?;
            }
        } else {
            self.send(ROOT, OP, Message::Barrier)?;
            match self.recv(ROOT, OP)? {
                Message::Barrier => {}
                other => return Err(self.unexpected(OP, ROOT, &other)),
            }
        }
        Ok(())
    }

    fn send_rows(&mut self, dest: usize, tag: u32, cells: Vec<Cell>) -> Result<(), SimError> {
        self.send(dest, "send", Message::Rows { tag, cells })
    }

    fn recv_rows(&mut self, source: usize, tag: u32) -> Result<Vec<Cell>, SimError> {
        const OP: &str = "recv";
        match self.recv(source, OP)? {
            Message::Rows { tag: got, cells } if got == tag => Ok(cells),
            other => Err(self.unexpected(OP, source, &other)),
        }
    }

    fn broadcast_cells(&mut self, root: usize, cells: &mut [Cell]) -> Result<(), SimError> {
        const OP: &str = "broadcast";
        if self.rank == root {
            for dest in self.peers() {
                self.send(dest, OP, Message::Broadcast(cells.to_vec()))?;
            }
            return Ok(());
        }
        match self.recv(root, OP)? {
            Message::Broadcast(data) if data.len() == cells.len() => {
                cells.copy_from_slice(&data);
                Ok(())
            }
            Message::Broadcast(data) => Err(SimError::comm(
                self.rank,
                OP,
                format!("expected {} cells, got {}", cells.len(), data.len()),
            )),
            other => Err(self.unexpected(OP, root, &other)),
        }
    }

    fn reduce_sum(&mut self, root: usize, value: u64) -> Result<Option<u64>, SimError> {
        const OP: &str = "reduce";
        if self.rank != root {
            self.send(root, OP, Message::Partial(value))?;
            return Ok(None);
        }
        let mut total = value;
        for source in self.peers() {
            match self.recv(source, OP)? {
                Message::Partial(partial) => total += partial,
                other => return Err(self.unexpected(OP, source, &other)),
            }
        }
        Ok(Some(total))
    }
}

/// Launches a group of ranks connected by [`ChannelCommunicator`]s.
pub struct Cluster;

impl Cluster {
    /// Runs `coordinator` as rank 0 on the calling thread and `peer` on one
    /// thread per remaining rank, then joins them.
    ///
    /// A failing or panicking rank drops its channels, which makes every
    /// rank waiting on it fail as well: the whole group aborts. The
    /// coordinator's error takes precedence over the peers' errors.
    pub fn launch<T, U, C, P>(size: usize, coordinator: C, peer: P) -> Result<(T, Vec<U>), SimError>
    where
        C: FnOnce(ChannelCommunicator) -> Result<T, SimError>,
        P: Fn(ChannelCommunicator) -> Result<U, SimError> + Sync,
        U: Send + 'static,
    {
        let mut comms = ChannelCommunicator::group(size)?.into_iter();
        let Some(root) = comms.next() else {
            return Err(ConfigError::NoWorkers.into());
        };
        debug!(size, "launching cluster");

        thread::scope(|scope| -> Result<(T, Vec<U>), SimError> {
            let peer = &peer;
            let mut handles = Vec::with_capacity(size - 1);
            let mut spawn_error = None;
            for comm in comms {
                let rank = comm.rank();
                match thread::Builder::new()
                    .name(format!("life-rank-{rank}"))
                    .spawn_scoped(scope, move || peer(comm))
                {
                    Ok(handle) => handles.push((rank, handle)),
                    Err(source) => {
                        // Dropping the remaining communicators unblocks the others.
                        spawn_error = Some(SimError::Spawn {
                            what: format!("rank {rank}"),
                            source,
                        });
                        break;
                    }
                }
            }

            let root_result = match spawn_error {
                Some(err) => {
                    drop(root);
                    Err(err)
                }
                None => coordinator(root),
            };

            let mut peer_results = Vec::with_capacity(handles.len());
            let mut peer_error = None;
            for (rank, handle) in handles {
                match handle.join() {
                    Ok(Ok(value)) => peer_results.push(value),
                    Ok(Err(err)) => {
                        peer_error.get_or_insert(err);
                    }
                    Err(_) => {
                        peer_error.get_or_insert(SimError::RankPanicked(rank));
                    }
                }
            }

            let root_value = root_result?;
            match peer_error {
                Some(err) => Err(err),
                None => Ok((root_value, peer_results)),
            }
        })
    }
}

/// One rank's stepping engine.
pub struct DistributedBackend<C: Communicator> {
    comm: C,
    /// Rows computed by this rank.
    own: Partition,
    /// Every rank's rows, used by the root to place received rows.
    partitions: Vec<Partition>,
}

impl<C: Communicator> DistributedBackend<C> {
    /// The worker count is the size of the communicator's group; the
    /// configured `workers` value is not consulted.
    pub fn new(comm: C, config: &SimConfig) -> Result<Self, SimError> {
        let own = partition_for_rank(config.rows, comm.rank(), comm.size())?;
        let partitions = compute_partitions(config.rows, comm.size())?;
        debug!(rank = comm.rank(), start = own.start, end = own.end, "rank partition");
        Ok(Self {
            comm,
            own,
            partitions,
        })
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn own_partition(&self) -> Partition {
        self.own
    }

    fn assemble(&mut self, next: &mut Grid) -> Result<(), SimError> {
        let rank = self.comm.rank();
        if rank != ROOT {
            let rows = next.rows_slice(self.own_partition()).to_vec();
            return self.comm.send_rows(ROOT, ROWS_TAG, rows);
        }
        for source in (0..self.comm.size()).filter(|&r| r != ROOT) {
            let partition = self.partitions[source];
            let rows = self.comm.recv_rows(source, ROWS_TAG)?;
            let expected = partition.len() * next.cols();
            if rows.len() != expected {
                return Err(SimError::comm(
                    rank,
                    "recv",
                    format!("rank {source} sent {} cells, expected {expected}", rows.len()),
                ));
            }
            next.copy_rows_from(partition, &rows);
        }
        Ok(())
    }
}

impl<C: Communicator> Backend for DistributedBackend<C> {
    fn kind(&self) -> BackendKind {
        BackendKind::Distributed
    }

    fn step(&mut self, buffers: &mut DoubleBuffer) -> Result<(), SimError> {
        let partition = self.own_partition();
        let (current, next) = buffers.split();
        evolve_rows(current, partition, next.rows_slice_mut(partition));
        trace!(rank = self.comm.rank(), "partition computed");

        self.comm.barrier()?;
        self.assemble(next)?;
        self.comm.barrier()?;
        self.comm.broadcast_cells(ROOT, next.cells_mut())
    }

    fn alive_cells(&mut self, grid: &Grid) -> Result<Option<usize>, SimError> {
        let partial = grid.alive_count_in(self.own_partition()) as u64;
        let total = self.comm.reduce_sum(ROOT, partial)?;
        Ok(total.map(|total| total as usize))
    }

    fn is_coordinator(&self) -> bool {
        self.comm.rank() == ROOT
    }

    fn interruptible(&self) -> bool {
        false
    }
}
