use thiserror::Error;

/// Rejected run parameters. Raised before any generation is computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("cannot allocate a {rows}x{cols} grid")]
    GridTooLarge { rows: usize, cols: usize },

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("{rows} rows cannot be split among {workers} workers")]
    TooFewRows { rows: usize, workers: usize },

    #[error("rank {rank} is outside of a group of {size}")]
    RankOutOfRange { rank: usize, size: usize },

    #[error("seed grid is {actual_rows}x{actual_cols}, expected {rows}x{cols}")]
    SeedMismatch {
        rows: usize,
        cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("RLE header line `x = .., y = ..` is missing")]
    MissingHeader,

    #[error("invalid number in RLE data at byte {0}")]
    BadNumber(usize),

    #[error("unexpected symbol {symbol:?} in RLE data at byte {offset}")]
    UnexpectedSymbol { symbol: char, offset: usize },

    #[error("pattern of {width}x{height} does not fit on a {rows}x{cols} grid")]
    TooLarge {
        width: usize,
        height: usize,
        rows: usize,
        cols: usize,
    },
}

/// Fatal failure of a run. There is no recoverable path: callers abort.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("rank {rank}: {op} failed: {reason}")]
    Communication {
        rank: usize,
        op: &'static str,
        reason: String,
    },

    #[error("failed to spawn {what}: {source}")]
    Spawn {
        what: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("rank {0} panicked")]
    RankPanicked(usize),
}

impl SimError {
    pub(crate) fn comm(rank: usize, op: &'static str, reason: impl ToString) -> Self {
        Self::Communication {
            rank,
            op,
            reason: reason.to_string(),
        }
    }
}
