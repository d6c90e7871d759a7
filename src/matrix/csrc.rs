//! Compressed Sparse Row and Column (CSRC) connectivity
//!
//! The CSRC format extends the forward view of CSR by a backward view that
//! allows column-oriented traversal, as needed when values are propagated
//! from a source column to all rows it reaches. A detailed description of
//! the format can be found in
//!
//!   Brette, R. and Goodman, D. F. M. (2011). Vectorized algorithms for
//!   spiking neural network simulation. Neural Computation, 23(6):1503–1535.
//!
//! The backward view is three arrays:
//! - col_ptr: Array of size num_columns + 1 containing offsets into row_idx
//! - row_idx: Array of size nnz containing the rows reached from each column
//! - inv_idx: Array of size nnz mapping each backward entry to its position
//!   in the forward `col_idx` array

use std::collections::BTreeMap;
use std::fmt;
use std::mem::size_of;

use rand::Rng;

use crate::error::{ConnectivityError, IntegrityFault, Result};
use crate::matrix::config::ConnectivityConfig;
use crate::matrix::csr::CsrMatrix;
use crate::matrix::index::RankIndex;
use crate::matrix::lil::LilMatrix;
use crate::parallel::verify_backward_view;

/// Rows and forward positions collected for one column during pass 1
struct ColumnAccumulator<I> {
    rows: Vec<I>,
    positions: Vec<I>,
}

fn narrow<I: RankIndex>(value: usize) -> std::result::Result<I, IntegrityFault> {
    I::try_from_index(value).map_err(|_| IntegrityFault::Unrepresentable { value })
}

/// Sparse connectivity with both a forward (CSR) and a backward (CSC) view.
///
/// The forward view is an owned [`CsrMatrix`]; the backward view is derived
/// from it every time it is rebuilt. Read access to both views is available
/// through shared references, so a built matrix can be traversed by several
/// threads at once.
#[derive(Clone)]
pub struct CsrcMatrix<I = u32> {
    forward: CsrMatrix<I>,
    col_ptr: Vec<I>,
    row_idx: Vec<I>,
    inv_idx: Vec<I>,
    fault: Option<IntegrityFault>,
    config: ConnectivityConfig,
}

impl<I: RankIndex> CsrcMatrix<I> {
    /// Creates an empty matrix with the default configuration
    pub fn new(num_rows: usize, num_columns: usize) -> Self {
        Self::with_config(num_rows, num_columns, ConnectivityConfig::default())
    }

    pub fn with_config(num_rows: usize, num_columns: usize, config: ConnectivityConfig) -> Self {
        Self {
            forward: CsrMatrix::new(num_rows, num_columns),
            col_ptr: Vec::new(),
            row_idx: Vec::new(),
            inv_idx: Vec::new(),
            fault: None,
            config,
        }
    }

    /// Takes ownership of a forward view built elsewhere and derives the
    /// backward view for it.
    ///
    /// A derivation fault does not prevent construction; it is logged and
    /// can be inspected with [`integrity_fault`](Self::integrity_fault).
    pub fn from_forward(forward: CsrMatrix<I>, config: ConnectivityConfig) -> Self {
        let mut matrix = Self {
            forward,
            col_ptr: Vec::new(),
            row_idx: Vec::new(),
            inv_idx: Vec::new(),
            fault: None,
            config,
        };
        // The fault is recorded on the matrix
        let _ = matrix.inverse_connectivity_matrix();
        matrix
    }

    /// Builds the forward view from row/column lists and derives the backward view
    ///
    /// # Arguments
    ///
    /// * `row_indices` - Rows holding entries, any order, each `< num_rows`
    /// * `column_indices` - Columns for each row, each `< num_columns`
    ///
    /// Duplicate (row, column) pairs are stored as distinct entries. Invalid
    /// input is rejected and leaves the matrix untouched. If the derived
    /// backward view fails its consistency check the error is returned, the
    /// forward view is kept and the fault stays recorded on the matrix.
    /// Only rows holding entries need to fit `I`.
    pub fn init_matrix_from_lil(&mut self, row_indices: &[I], column_indices: &[Vec<I>]) -> Result<()> {
        log::debug!("CsrcMatrix::init_matrix_from_lil");

        // create forward view
        self.forward.init_matrix_from_lil(row_indices, column_indices)?;

        // compute backward view
        self.inverse_connectivity_matrix()
    }

    /// Rebuilds from a staging matrix
    pub fn init_matrix_from_lil_matrix(&mut self, lil: &LilMatrix<I>) -> Result<()> {
        self.init_matrix_from_lil(lil.post_rank(), lil.pre_ranks())
    }

    /// Every row in `post_ranks` receives `nnz_per_row` distinct columns drawn
    /// from `pre_ranks`.
    pub fn fixed_number_pre_pattern<R: Rng + ?Sized>(
        &mut self,
        post_ranks: &[I],
        pre_ranks: &[I],
        nnz_per_row: usize,
        rng: &mut R,
    ) -> Result<()> {
        self.clear();
        log::debug!("CsrcMatrix::fixed_number_pre_pattern");

        let mut lil = LilMatrix::new(self.num_rows(), self.num_columns());
        lil.fixed_number_pre_pattern(post_ranks, pre_ranks, nnz_per_row, rng)?;

        self.init_matrix_from_lil_matrix(&lil)
    }

    /// Every (row, column) pair drawn from `post_ranks` x `pre_ranks` is
    /// connected with probability `p`.
    pub fn fixed_probability_pattern<R: Rng + ?Sized>(
        &mut self,
        post_ranks: &[I],
        pre_ranks: &[I],
        p: f64,
        allow_self_connections: bool,
        rng: &mut R,
    ) -> Result<()> {
        self.clear();
        log::debug!("CsrcMatrix::fixed_probability_pattern");

        let mut lil = LilMatrix::new(self.num_rows(), self.num_columns());
        lil.fixed_probability_pattern(post_ranks, pre_ranks, p, allow_self_connections, rng)?;

        self.init_matrix_from_lil_matrix(&lil)
    }

    /// Derives the backward view from the current forward view.
    ///
    /// Two passes: the first collects, for every touched column, the rows
    /// reaching it and their forward positions (rows ascending). The second
    /// lays these lists out column by column and records the offsets.
    ///
    /// A cleared forward view derives an empty backward view. If a derived
    /// value does not fit `I` the backward view is emptied and the fault is
    /// recorded, so a stale view is never paired with a new forward view.
    pub fn inverse_connectivity_matrix(&mut self) -> Result<()> {
        self.fault = None;

        let derived = if self.forward.row_begin().is_empty() {
            Ok((Vec::new(), Vec::new(), Vec::new(), 0))
        } else {
            self.derive_backward_view()
        };

        let curr_off = match derived {
            Ok((col_ptr, row_idx, inv_idx, curr_off)) => {
                self.col_ptr = col_ptr;
                self.row_idx = row_idx;
                self.inv_idx = inv_idx;
                curr_off
            }
            Err(fault) => {
                self.col_ptr = Vec::new();
                self.row_idx = Vec::new();
                self.inv_idx = Vec::new();
                return Err(self.record_fault(fault));
            }
        };

        let non_zeros = self.forward.num_non_zeros();
        if non_zeros != curr_off {
            return Err(self.record_fault(IntegrityFault::CountMismatch {
                non_zeros,
                derived: curr_off,
            }));
        }

        if self.config.verify_after_build {
            if let Err(fault) = verify_backward_view(self, &self.config) {
                return Err(self.record_fault(fault));
            }
        }

        Ok(())
    }

    fn derive_backward_view(&self) -> std::result::Result<(Vec<I>, Vec<I>, Vec<I>, usize), IntegrityFault> {
        let num_columns = self.forward.num_columns();
        let num_rows_stored = self.forward.row_begin().len() - 1;

        // Pass 1: per-column lists keyed by the columns actually present
        let mut by_column: BTreeMap<usize, ColumnAccumulator<I>> = BTreeMap::new();
        for row in 0..num_rows_stored {
            let mut entries = self.forward.row_iter(row).peekable();
            if entries.peek().is_none() {
                continue;
            }
            let rank = narrow::<I>(row)?;
            for (col, pos) in entries {
                let acc = by_column.entry(col).or_insert_with(|| ColumnAccumulator {
                    rows: Vec::new(),
                    positions: Vec::new(),
                });
                acc.rows.push(rank);
                acc.positions.push(narrow(pos)?);
            }
        }

        // Pass 2: store as compressed columns
        let mut col_ptr = Vec::with_capacity(num_columns + 1);
        let mut row_idx = Vec::with_capacity(self.forward.num_non_zeros());
        let mut inv_idx = Vec::with_capacity(self.forward.num_non_zeros());
        let mut curr_off = 0usize;

        for col in 0..num_columns {
            col_ptr.push(narrow(curr_off)?);
            if let Some(acc) = by_column.get(&col) {
                row_idx.extend_from_slice(&acc.rows);
                inv_idx.extend_from_slice(&acc.positions);
                curr_off += acc.rows.len();
            }
        }
        col_ptr.push(narrow(curr_off)?);

        Ok((col_ptr, row_idx, inv_idx, curr_off))
    }

    fn record_fault(&mut self, fault: IntegrityFault) -> ConnectivityError {
        log::error!("CsrcMatrix::inverse_connectivity_matrix: {}", fault);
        self.fault = Some(fault.clone());
        ConnectivityError::Integrity(fault)
    }

    /// Runs the full cross-index check against the forward view
    pub fn verify(&self) -> std::result::Result<(), IntegrityFault> {
        verify_backward_view(self, &self.config)
    }

    /// Fault found by the last derivation, if any
    pub fn integrity_fault(&self) -> Option<&IntegrityFault> {
        self.fault.as_ref()
    }

    /// False when the last derivation reported a fault
    pub fn is_backward_view_reliable(&self) -> bool {
        self.fault.is_none()
    }

    /// Clears both views and releases their storage
    pub fn clear(&mut self) {
        self.forward.clear();
        log::debug!("CsrcMatrix::clear");

        self.col_ptr = Vec::new();
        self.row_idx = Vec::new();
        self.inv_idx = Vec::new();
        self.fault = None;
    }

    /// Returns size in bytes for connectivity, both views included.
    ///
    /// Reserved capacity counts, not only the used length.
    pub fn size_in_bytes(&self) -> usize {
        let mut size = self.forward.size_in_bytes();

        size += self.col_ptr.capacity() * size_of::<I>();
        size += self.row_idx.capacity() * size_of::<I>();
        size += self.inv_idx.capacity() * size_of::<I>();

        size
    }

    /// The owned forward view
    pub fn forward(&self) -> &CsrMatrix<I> {
        &self.forward
    }

    pub fn config(&self) -> &ConnectivityConfig {
        &self.config
    }

    pub fn num_rows(&self) -> usize {
        self.forward.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.forward.num_columns()
    }

    pub fn num_non_zeros(&self) -> usize {
        self.forward.num_non_zeros()
    }

    pub fn row_begin(&self) -> &[I] {
        self.forward.row_begin()
    }

    pub fn col_idx(&self) -> &[I] {
        self.forward.col_idx()
    }

    pub fn col_ptr(&self) -> &[I] {
        &self.col_ptr
    }

    pub fn row_idx(&self) -> &[I] {
        &self.row_idx
    }

    pub fn inv_idx(&self) -> &[I] {
        &self.inv_idx
    }

    /// Entries of row `row` as `(column, forward_position)`
    pub fn row_iter(&self, row: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.forward.row_iter(row)
    }

    /// Entries of column `column` as `(row, forward_position)`
    pub fn col_iter(&self, column: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        assert!(column < self.num_columns(), "Column index out of bounds");

        let (start, end) = self.col_span(column);

        self.row_idx[start..end]
            .iter()
            .zip(&self.inv_idx[start..end])
            .map(|(&row, &pos)| (row.index(), pos.index()))
    }

    /// Backward positions `[start, end)` of `column`; empty once cleared
    pub fn col_span(&self, column: usize) -> (usize, usize) {
        match (self.col_ptr.get(column), self.col_ptr.get(column + 1)) {
            (Some(start), Some(end)) => (start.index(), end.index()),
            _ => (0, 0),
        }
    }

    /// Number of rows reached from `column`
    pub fn nb_targets(&self, column: usize) -> usize {
        let (start, end) = self.col_span(column);
        end - start
    }
}

impl<I: RankIndex> fmt::Debug for CsrcMatrix<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CsrcMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.num_rows(), self.num_columns())?;
        writeln!(f, "  nnz: {}", self.num_non_zeros())?;
        writeln!(f, "  backward view reliable: {}", self.is_backward_view_reliable())?;

        let max_cols_to_print = 5.min(self.col_ptr.len().saturating_sub(1));
        for c in 0..max_cols_to_print {
            let rows: Vec<usize> = self.col_iter(c).map(|(row, _)| row).take(5).collect();
            writeln!(f, "    column {}: {:?}", c, rows)?;
        }

        write!(f, "}}")
    }
}
