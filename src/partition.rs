use crate::ConfigError;
use std::ops::Range;

/// Half-open row range `[start, end)` computed by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

fn check(rows: usize, workers: usize) -> Result<(), ConfigError> {
    if workers == 0 {
        return Err(ConfigError::NoWorkers);
    }
    if rows < workers {
        return Err(ConfigError::TooFewRows { rows, workers });
    }
    Ok(())
}

fn nth_partition(rows: usize, i: usize, workers: usize) -> Partition {
    let chunk = rows / workers;
    let start = i * chunk;
    let end = if i == workers - 1 { rows } else { start + chunk };
    Partition { start, end }
}

/// Splits `rows` into `workers` contiguous ranges of `rows / workers` rows;
/// the last range also takes the remainder.
pub fn compute_partitions(rows: usize, workers: usize) -> Result<Vec<Partition>, ConfigError> {
    check(rows, workers)?;
    Ok((0..workers)
        .map(|i| nth_partition(rows, i, workers))
        .collect())
}

/// The partition owned by `rank` in a group of `size` participants.
pub fn partition_for_rank(rows: usize, rank: usize, size: usize) -> Result<Partition, ConfigError> {
    check(rows, size)?;
    if rank >= size {
        return Err(ConfigError::RankOutOfRange { rank, size });
    }
    Ok(nth_partition(rows, rank, size))
}

/// Cuts a row-major buffer into one disjoint mutable slice per partition.
///
/// `partitions` must be ordered and cover the buffer without gaps, as
/// returned by [`compute_partitions`].
pub fn split_rows_mut<'a, T>(
    mut cells: &'a mut [T],
    cols: usize,
    partitions: &[Partition],
) -> Vec<&'a mut [T]> {
    let mut slices = Vec::with_capacity(partitions.len());
    let mut expected_start = 0;
    for partition in partitions {
        debug_assert_eq!(partition.start, expected_start);
        let (head, tail) = std::mem::take(&mut cells).split_at_mut(partition.len() * cols);
        slices.push(head);
        cells = tail;
        expected_start = partition.end;
    }
    debug_assert!(cells.is_empty());
    slices
}
