//! Error types for Reed-Solomon operations

use thiserror::Error;

/// Result type for Reed-Solomon operations
pub type RsResult<T> = Result<T, RsError>;

/// Broad classification of an [`RsError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Type, range or shape violation detected before any computation
    Argument,
    /// The configuration cannot be reconstructed (singular matrix, bad field)
    State,
    /// The redundancy budget is too small for the requested recovery
    Capacity,
}

/// Errors that can occur during Reed-Solomon operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RsError {
    /// A numeric argument does not fit the 32-bit argument range
    #[error("{name} must be a 32-bit integer: {value}")]
    InvalidArgument { name: &'static str, value: u64 },

    /// Matrix element access outside the matrix
    #[error("index ({row}, {col}) is out of range for a {rows}x{cols} matrix")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Inner dimensions of a matrix product disagree
    #[error("number of columns on left ({left_cols}) must equal number of rows on right ({right_rows})")]
    DimensionMismatch { left_cols: usize, right_rows: usize },

    /// Data/parity shard counts outside the supported range
    #[error("invalid shard count: data={data}, parity={parity}, limit={limit}")]
    InvalidShardCount {
        data: usize,
        parity: usize,
        limit: usize,
    },

    /// Byte range reaches past the end of a shard or buffer
    #[error("offset={offset} + size={size} > length={length}")]
    InvalidRange {
        offset: usize,
        size: usize,
        length: usize,
    },

    /// Caller supplied the wrong number of shards
    #[error("expected {expected} shards, got {actual}")]
    ShardCountMismatch { expected: usize, actual: usize },

    /// Shards do not all have the same length
    #[error("shard {index} has length {actual}, expected {expected}")]
    ShardLengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// A selection mask names a shard that does not exist
    #[error("shard index {index} is out of range for {total} shards")]
    ShardOutOfRange { index: usize, total: usize },

    /// A shard is selected both as a source and as a target
    #[error("shard {index} cannot be both a source and a target")]
    SourcesAreTargets { index: usize },

    /// Division by the zero element
    #[error("divisor cannot be 0")]
    DivisionByZero,

    /// Rows handed to a matrix constructor differ in length
    #[error("all rows must have the same number of columns: row {row} has {actual}, expected {expected}")]
    InconsistentRowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Augmenting matrices with different row counts
    #[error("matrices do not have the same number of rows: {left} != {right}")]
    RowCountMismatch { left: usize, right: usize },

    /// Inverting a non-square matrix
    #[error("only square matrices can be inverted: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Gaussian elimination found no usable pivot
    #[error("matrix is singular")]
    SingularMatrix,

    /// The generating polynomial does not yield a full multiplicative group
    #[error("detected a duplicate logarithm for polynomial {polynomial}")]
    DuplicateLogarithm { polynomial: u8 },

    /// Fewer than K shards are available as sources
    #[error("not enough shards present to recover data: need {needed}, have {present}")]
    InsufficientShards { needed: usize, present: usize },

    /// More shards requested than the parity budget can recover
    #[error("too many targets: {targets} > {parity} parity shards")]
    TooManyTargets { targets: usize, parity: usize },

    /// Scratch buffer shorter than one shard
    #[error("scratch buffer of {actual} bytes is shorter than shard length {needed}")]
    ScratchTooSmall { needed: usize, actual: usize },
}

impl RsError {
    /// Classify the error as an argument, state or capacity failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            RsError::SingularMatrix | RsError::DuplicateLogarithm { .. } => ErrorKind::State,
            RsError::InsufficientShards { .. } | RsError::TooManyTargets { .. } => {
                ErrorKind::Capacity
            }
            _ => ErrorKind::Argument,
        }
    }
}

/// Reject values that do not fit the 32-bit argument range
pub(crate) fn check_u32(name: &'static str, value: usize) -> RsResult<()> {
    if value as u64 > u64::from(u32::MAX) {
        return Err(RsError::InvalidArgument {
            name,
            value: value as u64,
        });
    }
    Ok(())
}
