//! Utilities for exporting connectivity to external libraries

use ndarray::Array2;
use sprs::{CsMat, TriMat};

use crate::matrix::{CsrcMatrix, DenseMatrix, RankIndex};

/// Exports the forward view as an sprs CSR matrix
///
/// Connectivity carries no values, so each stored cell holds the number of
/// entries for that (row, column) pair; duplicates are summed.
pub fn to_sprs_forward<I: RankIndex>(matrix: &CsrcMatrix<I>) -> CsMat<u32> {
    let mut triplets = TriMat::new((matrix.num_rows(), matrix.num_columns()));

    for row in 0..matrix.forward().row_begin().len().saturating_sub(1) {
        for (col, _) in matrix.row_iter(row) {
            triplets.add_triplet(row, col, 1u32);
        }
    }

    triplets.to_csr()
}

/// Exports the backward view as an sprs CSC matrix
///
/// Built from `col_ptr`/`row_idx` only, so comparing it with
/// [`to_sprs_forward`] checks both views describe the same pattern.
pub fn to_sprs_backward<I: RankIndex>(matrix: &CsrcMatrix<I>) -> CsMat<u32> {
    let mut triplets = TriMat::new((matrix.num_rows(), matrix.num_columns()));

    for col in 0..matrix.col_ptr().len().saturating_sub(1) {
        for (row, _) in matrix.col_iter(col) {
            triplets.add_triplet(row, col, 1u32);
        }
    }

    triplets.to_csc()
}

/// Exports a dense presence mask as a boolean array
pub fn mask_to_array<I: RankIndex>(matrix: &DenseMatrix<I>) -> Array2<bool> {
    matrix.to_mask_array()
}
