//! Property tests for the derived backward view

use conngraph::{ConnectivityConfig, CsrcMatrix};
use proptest::prelude::*;

/// Random LIL input: (num_rows, num_columns, rows, columns per row)
fn lil_input() -> impl Strategy<Value = (usize, usize, Vec<u32>, Vec<Vec<u32>>)> {
    (1usize..24, 1usize..24).prop_flat_map(|(num_rows, num_columns)| {
        let entry = (
            0..num_rows as u32,
            prop::collection::vec(0..num_columns as u32, 0..8),
        );
        prop::collection::vec(entry, 0..12).prop_map(move |entries| {
            let (rows, cols): (Vec<u32>, Vec<Vec<u32>>) = entries.into_iter().unzip();
            (num_rows, num_columns, rows, cols)
        })
    })
}

fn build(num_rows: usize, num_columns: usize, rows: &[u32], cols: &[Vec<u32>]) -> CsrcMatrix<u32> {
    let mut m = CsrcMatrix::with_config(num_rows, num_columns, ConnectivityConfig::unverified());
    m.init_matrix_from_lil(rows, cols).unwrap();
    m
}

fn forward_pairs(m: &CsrcMatrix<u32>) -> Vec<(usize, usize)> {
    let mut pairs: Vec<_> = (0..m.num_rows())
        .flat_map(|r| m.row_iter(r).map(move |(c, _)| (r, c)))
        .collect();
    pairs.sort_unstable();
    pairs
}

fn backward_pairs(m: &CsrcMatrix<u32>) -> Vec<(usize, usize)> {
    let mut pairs: Vec<_> = (0..m.num_columns())
        .flat_map(|c| m.col_iter(c).map(move |(r, _)| (r, c)))
        .collect();
    pairs.sort_unstable();
    pairs
}

fn is_offsets(offsets: &[u32], total: usize) -> bool {
    offsets.first() == Some(&0)
        && offsets.last().map(|&v| v as usize) == Some(total)
        && offsets.windows(2).all(|w| w[0] <= w[1])
}

proptest! {
    #[test]
    fn views_hold_the_same_multiset((num_rows, num_columns, rows, cols) in lil_input()) {
        let m = build(num_rows, num_columns, &rows, &cols);

        let mut input: Vec<(usize, usize)> = rows
            .iter()
            .zip(&cols)
            .flat_map(|(&r, cs)| cs.iter().map(move |&c| (r as usize, c as usize)))
            .collect();
        input.sort_unstable();

        prop_assert_eq!(forward_pairs(&m), input.clone());
        prop_assert_eq!(backward_pairs(&m), input);
    }

    #[test]
    fn cross_index_points_at_same_edge((num_rows, num_columns, rows, cols) in lil_input()) {
        let m = build(num_rows, num_columns, &rows, &cols);

        for c in 0..num_columns {
            let start = m.col_ptr()[c] as usize;
            let end = m.col_ptr()[c + 1] as usize;
            for k in start..end {
                let fwd = m.inv_idx()[k] as usize;
                prop_assert_eq!(m.col_idx()[fwd] as usize, c);

                let row = m.row_idx()[k] as usize;
                let row_start = m.row_begin()[row] as usize;
                let row_end = m.row_begin()[row + 1] as usize;
                prop_assert!(row_start <= fwd && fwd < row_end);
            }
        }
        prop_assert!(m.verify().is_ok());
    }

    #[test]
    fn offsets_are_monotonic((num_rows, num_columns, rows, cols) in lil_input()) {
        let m = build(num_rows, num_columns, &rows, &cols);

        prop_assert_eq!(m.row_begin().len(), num_rows + 1);
        prop_assert_eq!(m.col_ptr().len(), num_columns + 1);
        prop_assert!(is_offsets(m.row_begin(), m.num_non_zeros()));
        prop_assert!(is_offsets(m.col_ptr(), m.num_non_zeros()));
        prop_assert_eq!(m.row_idx().len(), m.num_non_zeros());
        prop_assert_eq!(m.inv_idx().len(), m.num_non_zeros());
        prop_assert!(m.is_backward_view_reliable());
    }

    #[test]
    fn rows_ascend_within_each_column((num_rows, num_columns, rows, cols) in lil_input()) {
        let m = build(num_rows, num_columns, &rows, &cols);

        for c in 0..num_columns {
            let in_column: Vec<usize> = m.col_iter(c).map(|(r, _)| r).collect();
            prop_assert!(in_column.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}

#[test]
fn test_large_ring_verifies_in_parallel() {
    let n = 20_000u32;
    let rows: Vec<u32> = (0..n).collect();
    let cols: Vec<Vec<u32>> = rows
        .iter()
        .map(|&r| vec![(r + 1) % n, (r + 7) % n, (r + 31) % n])
        .collect();

    let config = ConnectivityConfig {
        verify_after_build: true,
        parallel_threshold: 1_000,
        n_threads: 4,
    };
    let mut m = CsrcMatrix::with_config(n as usize, n as usize, config);
    m.init_matrix_from_lil(&rows, &cols).unwrap();

    assert_eq!(m.num_non_zeros(), 60_000);
    for c in 0..n as usize {
        assert_eq!(m.nb_targets(c), 3);
    }
}
