//! Utility functions and helpers

pub mod formats;

pub use formats::{mask_to_array, to_sprs_backward, to_sprs_forward};

/// Computes an exclusive prefix sum (scan) for a vector
///
/// The result has one more element than the input; its last element is the
/// total.
pub fn exclusive_scan(input: &[usize]) -> Vec<usize> {
    let mut result = Vec::with_capacity(input.len() + 1);
    let mut sum = 0;

    result.push(0);

    for &val in input {
        sum += val;
        result.push(sum);
    }

    result
}

/// Checks that `offsets` is a valid compressed offset array for `len` entries:
/// it starts at zero, never decreases and ends at `len`.
pub fn is_offset_array(offsets: &[usize], len: usize) -> bool {
    offsets.first() == Some(&0)
        && offsets.last() == Some(&len)
        && offsets.windows(2).all(|w| w[0] <= w[1])
}
