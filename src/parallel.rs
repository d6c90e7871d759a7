//! # Parallel verification of the backward view
//!
//! Read-only traversal of a fully built matrix is safe from several threads,
//! so the cross-index check runs column-parallel using Rayon once a matrix is
//! large enough to benefit.

use rayon::prelude::*;

use crate::error::IntegrityFault;
use crate::matrix::config::ConnectivityConfig;
use crate::matrix::csrc::CsrcMatrix;
use crate::matrix::index::RankIndex;

/// Checks every backward entry against the forward view.
///
/// For each column `c` and every position `k` in its span, the forward entry
/// `inv_idx[k]` must sit in row `row_idx[k]` and its column must be `c`.
/// Returns the first fault found; with parallel traversal that is the first
/// fault of whichever column reported first.
///
/// # Examples
///
/// ```
/// use conngraph::{CsrcMatrix, ConnectivityConfig, verify_backward_view};
///
/// let mut m = CsrcMatrix::<u32>::new(3, 3);
/// m.init_matrix_from_lil(&[0, 2], &[vec![1, 2], vec![0]]).unwrap();
///
/// assert!(verify_backward_view(&m, &ConnectivityConfig::default()).is_ok());
/// ```
pub fn verify_backward_view<I: RankIndex>(
    matrix: &CsrcMatrix<I>,
    config: &ConnectivityConfig,
) -> Result<(), IntegrityFault> {
    let num_columns = matrix.col_ptr().len().saturating_sub(1);

    if !config.use_parallel(matrix.num_non_zeros()) {
        return (0..num_columns).try_for_each(|c| check_column(matrix, c));
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(config.n_threads)
        .build()
    {
        Ok(pool) => pool.install(|| {
            (0..num_columns)
                .into_par_iter()
                .try_for_each(|c| check_column(matrix, c))
        }),
        Err(err) => {
            log::debug!("verify_backward_view: falling back to global pool ({})", err);
            (0..num_columns)
                .into_par_iter()
                .try_for_each(|c| check_column(matrix, c))
        }
    }
}

fn check_column<I: RankIndex>(matrix: &CsrcMatrix<I>, column: usize) -> Result<(), IntegrityFault> {
    let forward = matrix.forward();
    let col_idx = forward.col_idx();
    let start = matrix.col_ptr()[column].index();
    let end = matrix.col_ptr()[column + 1].index();

    for position in start..end {
        let fwd = matrix.inv_idx()[position].index();
        let found = col_idx.get(fwd).map(|c| c.index());
        if found != Some(column) {
            return Err(IntegrityFault::CrossIndexMismatch {
                position,
                column,
                forward: fwd,
                found,
            });
        }

        let row = matrix.row_idx()[position].index();
        let (row_start, row_end) = forward.row_span(row);
        if !(row_start..row_end).contains(&fwd) {
            return Err(IntegrityFault::RowMismatch {
                position,
                row,
                forward: fwd,
            });
        }
    }

    Ok(())
}
