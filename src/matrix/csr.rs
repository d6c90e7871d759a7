//! Compressed Sparse Row (CSR) forward view

use std::fmt;
use std::mem::size_of;

use crate::error::{ConnectivityError, Result};
use crate::matrix::index::RankIndex;
use crate::utils::{exclusive_scan, is_offset_array};

/// A connectivity pattern in Compressed Sparse Row (CSR) format
///
/// The CSR format stores the forward view using two arrays:
/// - row_begin: Array of size num_rows + 1 containing offsets into col_idx
/// - col_idx: Array of size nnz containing the columns reachable from each row
///
/// `col_idx[row_begin[r]..row_begin[r + 1]]` lists the columns of row `r`.
/// No values are stored; numeric payloads live in parallel arrays owned by
/// the simulation.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrMatrix<I = u32> {
    num_rows: usize,
    num_columns: usize,
    num_non_zeros: usize,
    row_begin: Vec<I>,
    col_idx: Vec<I>,
}

impl<I: RankIndex> CsrMatrix<I> {
    /// Creates an empty matrix with the given capacity bounds
    pub fn new(num_rows: usize, num_columns: usize) -> Self {
        Self {
            num_rows,
            num_columns,
            num_non_zeros: 0,
            row_begin: vec![I::zero(); num_rows + 1],
            col_idx: Vec::new(),
        }
    }

    /// Creates a matrix from prebuilt arrays
    ///
    /// Only the structure is checked: `row_begin` must have `num_rows + 1`
    /// non-decreasing offsets starting at 0 and ending at `col_idx.len()`.
    /// Column values are taken as given; an out-of-range column shows up as
    /// an integrity fault once a backward view is derived.
    pub fn from_raw_parts(
        num_rows: usize,
        num_columns: usize,
        row_begin: Vec<I>,
        col_idx: Vec<I>,
    ) -> Result<Self> {
        if row_begin.len() != num_rows + 1 {
            return Err(ConnectivityError::MalformedForwardView(format!(
                "row_begin has {} offsets, expected {}",
                row_begin.len(),
                num_rows + 1
            )));
        }
        let offsets: Vec<usize> = row_begin.iter().map(|r| r.index()).collect();
        if !is_offset_array(&offsets, col_idx.len()) {
            return Err(ConnectivityError::MalformedForwardView(format!(
                "row_begin is not a non-decreasing offset array ending at {}",
                col_idx.len()
            )));
        }

        Ok(Self {
            num_rows,
            num_columns,
            num_non_zeros: col_idx.len(),
            row_begin,
            col_idx,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Returns the number of stored entries
    pub fn num_non_zeros(&self) -> usize {
        self.num_non_zeros
    }

    /// Row offsets, `num_rows + 1` of them once built; empty after [`clear`](Self::clear)
    pub fn row_begin(&self) -> &[I] {
        &self.row_begin
    }

    pub fn col_idx(&self) -> &[I] {
        &self.col_idx
    }

    /// Builds the forward view from row/column lists
    ///
    /// Rows may come in any order and may repeat; entries of a repeated row
    /// are concatenated in input order. Duplicate (row, column) pairs are
    /// kept. Input is validated before any state changes.
    pub fn init_matrix_from_lil(&mut self, row_indices: &[I], column_indices: &[Vec<I>]) -> Result<()> {
        log::debug!(
            "CsrMatrix::init_matrix_from_lil: {} rows given ({} x {})",
            row_indices.len(),
            self.num_rows,
            self.num_columns
        );

        if row_indices.len() != column_indices.len() {
            return Err(ConnectivityError::LengthMismatch {
                rows: row_indices.len(),
                columns: column_indices.len(),
            });
        }

        // Count entries per row
        let mut row_counts = vec![0usize; self.num_rows];
        for (&row, columns) in row_indices.iter().zip(column_indices) {
            let r = row.index();
            if r >= self.num_rows {
                return Err(ConnectivityError::RowOutOfBounds {
                    row: r,
                    num_rows: self.num_rows,
                });
            }
            if let Some(&col) = columns.iter().find(|c| c.index() >= self.num_columns) {
                return Err(ConnectivityError::ColumnOutOfBounds {
                    row: r,
                    column: col.index(),
                    num_columns: self.num_columns,
                });
            }
            row_counts[r] += columns.len();
        }

        // Row offsets via prefix sum
        let offsets = exclusive_scan(&row_counts);
        let nnz = offsets[self.num_rows];
        let mut row_begin = Vec::with_capacity(offsets.len());
        for &off in &offsets {
            row_begin.push(I::try_from_index(off)?);
        }

        // Scatter columns into place
        let mut col_idx = vec![I::zero(); nnz];
        let mut cursor = offsets;
        for (&row, columns) in row_indices.iter().zip(column_indices) {
            let r = row.index();
            let start = cursor[r];
            col_idx[start..start + columns.len()].copy_from_slice(columns);
            cursor[r] += columns.len();
        }

        self.row_begin = row_begin;
        self.col_idx = col_idx;
        self.num_non_zeros = nnz;
        Ok(())
    }

    /// Returns an iterator over the entries of row `row`
    ///
    /// Each item is `(column, forward_position)`.
    pub fn row_iter(&self, row: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        assert!(row < self.num_rows, "Row index out of bounds");

        let (start, end) = self.row_span(row);

        self.col_idx[start..end]
            .iter()
            .enumerate()
            .map(move |(k, &col)| (col.index(), start + k))
    }

    /// Forward positions `[start, end)` of `row`; empty once cleared
    pub fn row_span(&self, row: usize) -> (usize, usize) {
        match (self.row_begin.get(row), self.row_begin.get(row + 1)) {
            (Some(start), Some(end)) => (start.index(), end.index()),
            _ => (0, 0),
        }
    }

    /// Number of entries stored for `row`
    pub fn nb_synapses(&self, row: usize) -> usize {
        let (start, end) = self.row_span(row);
        end - start
    }

    /// Rows holding at least one entry, ascending
    pub fn post_ranks(&self) -> Vec<usize> {
        (0..self.num_rows).filter(|&r| self.nb_synapses(r) > 0).collect()
    }

    /// Releases the stored entries; the capacity bounds are kept
    ///
    /// Both `row_begin` and `col_idx` are left empty and without capacity
    /// until the next build. Every row then reads as empty.
    pub fn clear(&mut self) {
        log::debug!("CsrMatrix::clear");
        self.row_begin = Vec::new();
        self.col_idx = Vec::new();
        self.num_non_zeros = 0;
    }

    /// Bytes held by the forward view, counting reserved capacity
    pub fn size_in_bytes(&self) -> usize {
        let mut size = 3 * size_of::<I>();
        size += self.row_begin.capacity() * size_of::<I>();
        size += self.col_idx.capacity() * size_of::<I>();
        size
    }
}

impl<I: RankIndex> fmt::Debug for CsrMatrix<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CsrMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.num_rows, self.num_columns)?;
        writeln!(f, "  nnz: {}", self.num_non_zeros)?;

        // Print a sample of the matrix content
        let max_rows_to_print = 5.min(self.num_rows);

        if max_rows_to_print > 0 && self.row_begin.len() == self.num_rows + 1 {
            writeln!(f, "  content sample:")?;

            for i in 0..max_rows_to_print {
                write!(f, "    row {}: ", i)?;
                let start = self.row_begin[i].index();
                let end = self.row_begin[i + 1].index();

                if start == end {
                    writeln!(f, "(empty)")?;
                } else {
                    let max_elements = 5.min(end - start);

                    for j in start..(start + max_elements) {
                        write!(f, "{:?} ", self.col_idx[j])?;
                    }

                    if end - start > max_elements {
                        write!(f, "... ({} more)", end - start - max_elements)?;
                    }

                    writeln!(f)?;
                }
            }

            if self.num_rows > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.num_rows - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_from_unsorted_rows() {
        let mut matrix = CsrMatrix::<u32>::new(4, 3);
        matrix
            .init_matrix_from_lil(&[3, 0], &[vec![2, 0], vec![1]])
            .unwrap();

        assert_eq!(matrix.num_non_zeros(), 3);
        assert_eq!(matrix.row_begin(), &[0, 1, 1, 1, 3]);
        assert_eq!(matrix.col_idx(), &[1, 2, 0]);
        assert_eq!(matrix.post_ranks(), vec![0, 3]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut matrix = CsrMatrix::<u32>::new(2, 2);
        matrix
            .init_matrix_from_lil(&[1, 1], &[vec![0, 0], vec![1]])
            .unwrap();

        assert_eq!(matrix.row_begin(), &[0, 0, 3]);
        assert_eq!(matrix.col_idx(), &[0, 0, 1]);
    }

    #[test]
    fn test_row_iter() {
        let mut matrix = CsrMatrix::<u16>::new(3, 3);
        matrix
            .init_matrix_from_lil(&[0, 2], &[vec![1, 2], vec![0]])
            .unwrap();

        let row0: Vec<_> = matrix.row_iter(0).collect();
        assert_eq!(row0, vec![(1, 0), (2, 1)]);

        assert_eq!(matrix.row_iter(1).count(), 0);

        let row2: Vec<_> = matrix.row_iter(2).collect();
        assert_eq!(row2, vec![(0, 2)]);
    }

    #[test]
    fn test_invalid_input_leaves_state_untouched() {
        let mut matrix = CsrMatrix::<u32>::new(2, 2);
        matrix.init_matrix_from_lil(&[0], &[vec![1]]).unwrap();

        let err = matrix.init_matrix_from_lil(&[1], &[vec![0, 2]]).unwrap_err();
        assert!(matches!(
            err,
            ConnectivityError::ColumnOutOfBounds { row: 1, column: 2, num_columns: 2 }
        ));
        assert_eq!(matrix.col_idx(), &[1]);
    }

    #[test]
    fn test_index_overflow() {
        // 300 entries do not fit in u8 offsets
        let mut matrix = CsrMatrix::<u8>::new(1, 2);
        let columns = vec![vec![0u8; 300]];
        assert!(matches!(
            matrix.init_matrix_from_lil(&[0], &columns),
            Err(ConnectivityError::IndexOverflow { value: 300 })
        ));
    }

    #[test]
    fn test_from_raw_parts_checks_structure() {
        assert!(CsrMatrix::<u32>::from_raw_parts(2, 2, vec![0, 1, 2], vec![1, 0]).is_ok());
        assert!(CsrMatrix::<u32>::from_raw_parts(2, 2, vec![0, 2], vec![1, 0]).is_err());
        assert!(CsrMatrix::<u32>::from_raw_parts(2, 2, vec![0, 2, 1], vec![1, 0]).is_err());
        assert!(CsrMatrix::<u32>::from_raw_parts(2, 2, vec![0, 1, 3], vec![1, 0]).is_err());
    }

    #[test]
    fn test_clear_and_size() {
        let mut matrix = CsrMatrix::<u32>::new(3, 3);
        matrix
            .init_matrix_from_lil(&[0, 2], &[vec![1, 2], vec![0]])
            .unwrap();
        assert_eq!(matrix.size_in_bytes(), (3 + 4 + 3) * 4);

        matrix.clear();
        matrix.clear();
        assert_eq!(matrix.num_non_zeros(), 0);
        assert_eq!(matrix.size_in_bytes(), 3 * 4);

        // Cleared rows read as empty
        assert!(matrix.row_begin().is_empty());
        assert_eq!(matrix.row_span(2), (0, 0));
        assert_eq!(matrix.row_iter(0).count(), 0);
        assert!(matrix.post_ranks().is_empty());
    }
}
