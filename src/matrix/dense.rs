//! Dense connectivity stored as a presence bitmask
//!
//! Contrary to the other formats this is not a sparse matrix: every
//! (row, column) cell owns one bit, packed row-major into 64-bit words.

use std::marker::PhantomData;
use std::mem::size_of;

use ndarray::Array2;

use crate::error::{ConnectivityError, Result};
use crate::matrix::index::RankIndex;

const WORD_BITS: usize = u64::BITS as usize;

/// Full connectivity matrix with one presence bit per cell
///
/// `I` is the rank type used for the row and column bounds; it only affects
/// byte accounting since the mask itself does not store ranks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseMatrix<I = u32> {
    num_rows: usize,
    num_columns: usize,
    mask: Vec<u64>,
    _rank: PhantomData<I>,
}

impl<I: RankIndex> DenseMatrix<I> {
    /// # Panics
    ///
    /// Panics if `num_rows * num_columns` overflows `usize`.
    pub fn new(num_rows: usize, num_columns: usize) -> Self {
        assert!(
            num_rows.checked_mul(num_columns).is_some(),
            "dense matrix of {} x {} cells overflows usize",
            num_rows,
            num_columns
        );
        Self {
            num_rows,
            num_columns,
            mask: Vec::new(),
            _rank: PhantomData,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Number of cells, present or not
    pub fn num_cells(&self) -> usize {
        self.num_rows * self.num_columns
    }

    /// Packed mask words, row-major, least significant bit first
    pub fn mask_words(&self) -> &[u64] {
        &self.mask
    }

    /// Sets the presence bits from row/column lists
    ///
    /// Cells not named by the lists are absent. Repeated pairs set the same
    /// bit. Input is validated before the mask is replaced.
    pub fn init_matrix_from_lil(&mut self, row_indices: &[I], column_indices: &[Vec<I>]) -> Result<()> {
        log::debug!("DenseMatrix::init_matrix_from_lil");

        if row_indices.len() != column_indices.len() {
            return Err(ConnectivityError::LengthMismatch {
                rows: row_indices.len(),
                columns: column_indices.len(),
            });
        }

        let num_cells = self.num_cells();
        let num_words = num_cells / WORD_BITS + usize::from(num_cells % WORD_BITS != 0);
        let mut mask = vec![0u64; num_words];

        for (&row, columns) in row_indices.iter().zip(column_indices) {
            let r = row.index();
            if r >= self.num_rows {
                return Err(ConnectivityError::RowOutOfBounds {
                    row: r,
                    num_rows: self.num_rows,
                });
            }
            for &col in columns {
                let c = col.index();
                if c >= self.num_columns {
                    return Err(ConnectivityError::ColumnOutOfBounds {
                        row: r,
                        column: c,
                        num_columns: self.num_columns,
                    });
                }
                let cell = r * self.num_columns + c;
                mask[cell / WORD_BITS] |= 1u64 << (cell % WORD_BITS);
            }
        }

        self.mask = mask;
        Ok(())
    }

    /// Whether the cell (row, column) holds an edge
    pub fn get(&self, row: usize, column: usize) -> bool {
        assert!(
            row < self.num_rows && column < self.num_columns,
            "Cell ({}, {}) out of bounds",
            row,
            column
        );
        let cell = row * self.num_columns + column;
        self.mask
            .get(cell / WORD_BITS)
            .map_or(false, |word| word & (1u64 << (cell % WORD_BITS)) != 0)
    }

    /// Columns present in `row`, ascending
    pub fn row_columns(&self, row: usize) -> Vec<usize> {
        (0..self.num_columns).filter(|&c| self.get(row, c)).collect()
    }

    /// Number of present cells
    pub fn nb_synapses(&self) -> usize {
        self.mask.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Exports the mask as a `num_rows × num_columns` boolean array
    pub fn to_mask_array(&self) -> Array2<bool> {
        Array2::from_shape_fn((self.num_rows, self.num_columns), |(r, c)| self.get(r, c))
    }

    /// Releases the mask; the row/column bounds are kept
    pub fn clear(&mut self) {
        log::debug!("DenseMatrix::clear");
        self.mask = Vec::new();
    }

    /// Bytes held by the bounds and the mask, counting reserved capacity
    pub fn size_in_bytes(&self) -> usize {
        2 * size_of::<I>() + self.mask.capacity() * size_of::<u64>()
    }
}
