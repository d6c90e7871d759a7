//! Error types for connectivity construction and device transfers

use thiserror::Error;

use crate::device::DeviceError;

/// Defects detected in a derived backward view.
///
/// A fault never invalidates the forward view. The backward view should be
/// treated as unreliable until the matrix is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityFault {
    /// The closing offset of `col_ptr` disagrees with the forward non-zero count.
    #[error("backward view holds {derived} entries but the forward view declares {non_zeros}")]
    CountMismatch { non_zeros: usize, derived: usize },

    /// `col_idx[inv_idx[position]]` does not name the column owning `position`.
    #[error("cross-index entry {position} in column {column} points at forward position {forward} (column {found:?})")]
    CrossIndexMismatch {
        position: usize,
        column: usize,
        forward: usize,
        found: Option<usize>,
    },

    /// `row_idx[position]` does not own forward position `inv_idx[position]`.
    #[error("backward entry {position} names row {row} but forward position {forward} is outside that row")]
    RowMismatch {
        position: usize,
        row: usize,
        forward: usize,
    },

    /// A row rank, position or offset of the backward view exceeds the rank index type.
    #[error("backward view value {value} does not fit in the rank index type")]
    Unrepresentable { value: usize },
}

/// Errors raised while building or transferring connectivity.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("row index {row} out of bounds (num_rows = {num_rows})")]
    RowOutOfBounds { row: usize, num_rows: usize },

    #[error("column index {column} in row {row} out of bounds (num_columns = {num_columns})")]
    ColumnOutOfBounds {
        row: usize,
        column: usize,
        num_columns: usize,
    },

    #[error("{rows} row indices but {columns} column lists")]
    LengthMismatch { rows: usize, columns: usize },

    #[error("value {value} does not fit in the rank index type")]
    IndexOverflow { value: usize },

    #[error("malformed forward view: {0}")]
    MalformedForwardView(String),

    #[error("cannot draw {requested} distinct pre ranks from {available}")]
    PatternTooDense { requested: usize, available: usize },

    #[error("connection probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    #[error("integrity fault: {0}")]
    Integrity(#[from] IntegrityFault),

    #[error("{op}: {source}")]
    Device {
        op: &'static str,
        #[source]
        source: DeviceError,
    },
}

/// Result type for connectivity operations.
pub type Result<T> = std::result::Result<T, ConnectivityError>;
