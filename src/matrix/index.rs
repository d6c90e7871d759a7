//! Rank index types used for offsets and neuron ranks

use std::fmt::Debug;
use std::hash::Hash;

use num_traits::{PrimInt, Unsigned};

use crate::error::{ConnectivityError, Result};

/// Unsigned integer type used to store ranks and offsets inside a matrix.
///
/// The chosen type bounds the number of rows, columns and stored entries:
/// `u8` covers `[0, 255]`, `u16` covers `[0, 65_535]` and so on.
pub trait RankIndex:
    PrimInt + Unsigned + Hash + Debug + Default + Send + Sync + 'static
{
    /// Widens the rank to `usize` for indexing.
    fn index(self) -> usize;

    /// Narrows `value`, returning `None` if it does not fit.
    fn from_index(value: usize) -> Option<Self>;

    /// Narrows `value` or reports `IndexOverflow`.
    fn try_from_index(value: usize) -> Result<Self> {
        Self::from_index(value).ok_or(ConnectivityError::IndexOverflow { value })
    }
}

macro_rules! impl_rank_index {
    ($($t:ty),*) => {
        $(
            impl RankIndex for $t {
                #[inline]
                fn index(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_index(value: usize) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_rank_index!(u8, u16, u32, usize);

#[cfg(target_pointer_width = "64")]
impl_rank_index!(u64);
