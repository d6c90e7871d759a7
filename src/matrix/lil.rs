//! List-of-lists (LIL) staging format and random connectivity patterns
//!
//! A `LilMatrix` keeps, for every non-empty row (post-synaptic rank), the list
//! of columns (pre-synaptic ranks) it receives from. It is only used while a
//! compressed format is being built.

use std::mem::size_of;

use rand::seq::index;
use rand::Rng;

use crate::error::{ConnectivityError, Result};
use crate::matrix::index::RankIndex;

/// Row-wise staging structure: `post_rank[k]` receives from `pre_rank[k]`.
#[derive(Debug, Clone, Default)]
pub struct LilMatrix<I = u32> {
    num_rows: usize,
    num_columns: usize,
    post_rank: Vec<I>,
    pre_rank: Vec<Vec<I>>,
}

impl<I: RankIndex> LilMatrix<I> {
    /// Creates an empty staging matrix with the given capacity bounds
    pub fn new(num_rows: usize, num_columns: usize) -> Self {
        Self {
            num_rows,
            num_columns,
            post_rank: Vec::new(),
            pre_rank: Vec::new(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Row ranks that hold at least one list
    pub fn post_rank(&self) -> &[I] {
        &self.post_rank
    }

    /// Column lists, parallel to [`post_rank`](Self::post_rank)
    pub fn pre_ranks(&self) -> &[Vec<I>] {
        &self.pre_rank
    }

    /// Consumes the matrix and returns `(row_indices, column_indices)`
    pub fn into_parts(self) -> (Vec<I>, Vec<Vec<I>>) {
        (self.post_rank, self.pre_rank)
    }

    /// Total number of stored entries
    pub fn nb_synapses(&self) -> usize {
        self.pre_rank.iter().map(Vec::len).sum()
    }

    /// Replaces the content with the given row/column lists
    pub fn init_matrix_from_lil(&mut self, row_indices: Vec<I>, column_indices: Vec<Vec<I>>) -> Result<()> {
        if row_indices.len() != column_indices.len() {
            return Err(ConnectivityError::LengthMismatch {
                rows: row_indices.len(),
                columns: column_indices.len(),
            });
        }
        for (&row, columns) in row_indices.iter().zip(&column_indices) {
            if row.index() >= self.num_rows {
                return Err(ConnectivityError::RowOutOfBounds {
                    row: row.index(),
                    num_rows: self.num_rows,
                });
            }
            if let Some(&col) = columns.iter().find(|c| c.index() >= self.num_columns) {
                return Err(ConnectivityError::ColumnOutOfBounds {
                    row: row.index(),
                    column: col.index(),
                    num_columns: self.num_columns,
                });
            }
        }

        self.post_rank = row_indices;
        self.pre_rank = column_indices;
        Ok(())
    }

    /// Every post rank receives exactly `nnz_per_row` distinct pre ranks,
    /// drawn uniformly without replacement and stored in ascending order.
    pub fn fixed_number_pre_pattern<R: Rng + ?Sized>(
        &mut self,
        post_ranks: &[I],
        pre_ranks: &[I],
        nnz_per_row: usize,
        rng: &mut R,
    ) -> Result<()> {
        if nnz_per_row > pre_ranks.len() {
            return Err(ConnectivityError::PatternTooDense {
                requested: nnz_per_row,
                available: pre_ranks.len(),
            });
        }

        let mut rows = Vec::with_capacity(post_ranks.len());
        let mut columns = Vec::with_capacity(post_ranks.len());

        for &post in post_ranks {
            let mut picked: Vec<I> = index::sample(rng, pre_ranks.len(), nnz_per_row)
                .into_iter()
                .map(|k| pre_ranks[k])
                .collect();
            picked.sort_unstable();

            rows.push(post);
            columns.push(picked);
        }

        log::debug!(
            "fixed_number_pre_pattern: {} rows x {} pre ranks",
            rows.len(),
            nnz_per_row
        );
        self.init_matrix_from_lil(rows, columns)
    }

    /// Every (post, pre) pair is connected independently with probability `p`.
    ///
    /// Pairs with `pre == post` are skipped unless `allow_self_connections`
    /// is set. Rows that receive no connection are not stored.
    pub fn fixed_probability_pattern<R: Rng + ?Sized>(
        &mut self,
        post_ranks: &[I],
        pre_ranks: &[I],
        p: f64,
        allow_self_connections: bool,
        rng: &mut R,
    ) -> Result<()> {
        if !(0.0..=1.0).contains(&p) {
            return Err(ConnectivityError::InvalidProbability(p));
        }

        let mut rows = Vec::new();
        let mut columns = Vec::new();

        for &post in post_ranks {
            let picked: Vec<I> = pre_ranks
                .iter()
                .copied()
                .filter(|&pre| allow_self_connections || pre != post)
                .filter(|_| rng.gen::<f64>() < p)
                .collect();

            if !picked.is_empty() {
                rows.push(post);
                columns.push(picked);
            }
        }

        log::debug!(
            "fixed_probability_pattern: p = {}, {} non-empty rows",
            p,
            rows.len()
        );
        self.init_matrix_from_lil(rows, columns)
    }

    pub fn clear(&mut self) {
        self.post_rank = Vec::new();
        self.pre_rank = Vec::new();
    }

    /// Bytes held by the rank lists, counting reserved capacity
    pub fn size_in_bytes(&self) -> usize {
        let mut size = 2 * size_of::<I>();
        size += self.post_rank.capacity() * size_of::<I>();
        size += self.pre_rank.capacity() * size_of::<Vec<I>>();
        size += self
            .pre_rank
            .iter()
            .map(|cols| cols.capacity() * size_of::<I>())
            .sum::<usize>();
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_init_rejects_out_of_bounds() {
        let mut lil = LilMatrix::<u32>::new(2, 2);
        assert!(matches!(
            lil.init_matrix_from_lil(vec![2], vec![vec![0]]),
            Err(ConnectivityError::RowOutOfBounds { row: 2, num_rows: 2 })
        ));
        assert!(matches!(
            lil.init_matrix_from_lil(vec![1], vec![vec![0, 5]]),
            Err(ConnectivityError::ColumnOutOfBounds { row: 1, column: 5, .. })
        ));
        assert!(matches!(
            lil.init_matrix_from_lil(vec![0, 1], vec![vec![0]]),
            Err(ConnectivityError::LengthMismatch { rows: 2, columns: 1 })
        ));
        assert_eq!(lil.nb_synapses(), 0);
    }

    #[test]
    fn test_fixed_number_pre() {
        let mut rng = StdRng::seed_from_u64(7);
        let post: Vec<u32> = (0..10).collect();
        let pre: Vec<u32> = (0..20).collect();

        let mut lil = LilMatrix::new(10, 20);
        lil.fixed_number_pre_pattern(&post, &pre, 5, &mut rng).unwrap();

        assert_eq!(lil.post_rank(), post.as_slice());
        for cols in lil.pre_ranks() {
            assert_eq!(cols.len(), 5);
            assert!(cols.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(lil.nb_synapses(), 50);
    }

    #[test]
    fn test_fixed_number_pre_too_dense() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut lil = LilMatrix::<u32>::new(2, 2);
        let err = lil
            .fixed_number_pre_pattern(&[0, 1], &[0, 1], 3, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            ConnectivityError::PatternTooDense { requested: 3, available: 2 }
        ));
    }

    #[test]
    fn test_fixed_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let ranks: Vec<u16> = (0..8).collect();

        let mut lil = LilMatrix::new(8, 8);
        lil.fixed_probability_pattern(&ranks, &ranks, 1.0, false, &mut rng)
            .unwrap();
        assert_eq!(lil.nb_synapses(), 8 * 7);
        for (&post, cols) in lil.post_rank().iter().zip(lil.pre_ranks()) {
            assert!(!cols.contains(&post));
        }

        lil.fixed_probability_pattern(&ranks, &ranks, 1.0, true, &mut rng)
            .unwrap();
        assert_eq!(lil.nb_synapses(), 64);

        lil.fixed_probability_pattern(&ranks, &ranks, 0.0, true, &mut rng)
            .unwrap();
        assert!(lil.post_rank().is_empty());

        assert!(matches!(
            lil.fixed_probability_pattern(&ranks, &ranks, 1.5, true, &mut rng),
            Err(ConnectivityError::InvalidProbability(_))
        ));
    }

    #[test]
    fn test_clear_releases_lists() {
        let mut lil = LilMatrix::<u32>::new(3, 3);
        lil.init_matrix_from_lil(vec![0, 2], vec![vec![1, 2], vec![0]])
            .unwrap();
        assert!(lil.size_in_bytes() > 2 * size_of::<u32>());

        lil.clear();
        assert_eq!(lil.nb_synapses(), 0);
        assert_eq!(lil.size_in_bytes(), 2 * size_of::<u32>());
    }
}
