//! Tests for pattern-driven construction

use conngraph::{ConnectivityConfig, ConnectivityError, CsrcMatrix};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn ranks(n: u32) -> Vec<u32> {
    (0..n).collect()
}

#[test]
fn test_fixed_number_pre_fan_in() {
    let mut rng = StdRng::seed_from_u64(2024);
    let post = ranks(50);
    let pre = ranks(80);

    let mut m = CsrcMatrix::with_config(50, 80, ConnectivityConfig::verified());
    m.fixed_number_pre_pattern(&post, &pre, 10, &mut rng).unwrap();

    assert_eq!(m.num_non_zeros(), 500);
    for row in 0..50 {
        let mut cols: Vec<usize> = m.row_iter(row).map(|(c, _)| c).collect();
        assert_eq!(cols.len(), 10);
        cols.dedup();
        assert_eq!(cols.len(), 10, "row {} has repeated pre ranks", row);
    }
    let total: usize = (0..80).map(|c| m.nb_targets(c)).sum();
    assert_eq!(total, 500);
}

#[test]
fn test_patterns_are_deterministic_for_a_seed() {
    let post = ranks(30);
    let pre = ranks(30);

    let build = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut m = CsrcMatrix::<u32>::new(30, 30);
        m.fixed_probability_pattern(&post, &pre, 0.3, false, &mut rng)
            .unwrap();
        m
    };

    let a = build(9);
    let b = build(9);
    assert_eq!(a.row_begin(), b.row_begin());
    assert_eq!(a.col_idx(), b.col_idx());
    assert_eq!(a.col_ptr(), b.col_ptr());
    assert_eq!(a.row_idx(), b.row_idx());
    assert_eq!(a.inv_idx(), b.inv_idx());
}

#[test]
fn test_fixed_probability_without_self_connections() {
    let mut rng = StdRng::seed_from_u64(5);
    let all = ranks(40);

    let mut m = CsrcMatrix::with_config(40, 40, ConnectivityConfig::verified());
    m.fixed_probability_pattern(&all, &all, 0.5, false, &mut rng)
        .unwrap();

    assert!(m.num_non_zeros() > 0);
    for c in 0..40 {
        assert!(m.col_iter(c).all(|(r, _)| r != c));
    }
}

#[test]
fn test_subset_of_ranks() {
    let mut rng = StdRng::seed_from_u64(11);
    let post = vec![1u32, 5, 7];
    let pre = vec![2u32, 3];

    let mut m = CsrcMatrix::new(8, 4);
    m.fixed_probability_pattern(&post, &pre, 1.0, true, &mut rng)
        .unwrap();

    assert_eq!(m.forward().post_ranks(), vec![1, 5, 7]);
    assert_eq!(m.col_ptr(), &[0, 0, 0, 3, 6]);
    assert_eq!(m.row_idx(), &[1, 5, 7, 1, 5, 7]);
}

#[test]
fn test_pattern_replaces_previous_content() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut m = CsrcMatrix::<u32>::new(4, 4);
    m.init_matrix_from_lil(&[0, 1, 2, 3], &[vec![0], vec![1], vec![2], vec![3]])
        .unwrap();

    m.fixed_probability_pattern(&ranks(4), &ranks(4), 0.0, true, &mut rng)
        .unwrap();
    assert_eq!(m.num_non_zeros(), 0);
    assert_eq!(m.col_ptr(), &[0, 0, 0, 0, 0]);
}

#[test]
fn test_invalid_probability() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut m = CsrcMatrix::<u32>::new(4, 4);
    let err = m
        .fixed_probability_pattern(&ranks(4), &ranks(4), -0.1, true, &mut rng)
        .unwrap_err();
    assert!(matches!(err, ConnectivityError::InvalidProbability(_)));
}

#[test]
fn test_out_of_range_post_rank() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut m = CsrcMatrix::<u32>::new(4, 4);
    let err = m
        .fixed_number_pre_pattern(&[9], &ranks(4), 2, &mut rng)
        .unwrap_err();
    assert!(matches!(
        err,
        ConnectivityError::RowOutOfBounds { row: 9, num_rows: 4 }
    ));
}
