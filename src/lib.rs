//! # conngraph: connectivity storage for simulation runtimes
//!
//! Storage formats for large sparse (and optionally dense) directed
//! connectivity, traversed both forward ("row → all columns") and backward
//! ("column → all rows").
//!
//! ## Overview
//!
//! - **LIL**: per-row column lists, used only while building. Random
//!   fixed-fan-in and fixed-probability patterns are generated here.
//! - **CSR**: the forward view, a monotonic offset array per row plus a flat
//!   column array.
//! - **CSRC**: a CSR forward view plus a derived backward view (`col_ptr`,
//!   `row_idx`) and a cross-index (`inv_idx`) mapping each backward entry to
//!   the position of the same edge in the forward view.
//! - **Dense**: one presence bit per cell, with a variant whose mask is
//!   mirrored into accelerator memory and which transfers per-cell variables
//!   on demand.
//!
//! ## Usage
//!
//! ```
//! use conngraph::CsrcMatrix;
//!
//! let mut m = CsrcMatrix::<u32>::new(3, 3);
//! m.init_matrix_from_lil(&[0, 2], &[vec![1, 2], vec![0]]).unwrap();
//!
//! assert_eq!(m.col_ptr(), &[0, 1, 2, 3]);
//! assert_eq!(m.row_idx(), &[2, 0, 0]);
//! assert_eq!(m.inv_idx(), &[2, 0, 1]);
//! ```
//!
//! Dense connectivity on a device:
//!
//! ```
//! use conngraph::{DenseMatrixDevice, HostDevice, DeviceBuffer};
//!
//! let mut m = DenseMatrixDevice::<u32, _>::new(2, 2, HostDevice::new());
//! m.init_matrix_from_lil(&[1], &[vec![0, 1]]).unwrap();
//!
//! let weights = m.init_matrix_variable_gpu(&[0.5f32; 4]).unwrap();
//! assert_eq!(weights.len(), 4);
//! ```

pub mod device;
pub mod error;
pub mod matrix;
pub mod parallel;
pub mod utils;

// Re-export primary components
pub use device::{
    DenseMatrixDevice, Device, DeviceBuffer, DeviceElement, DeviceError, DeviceResult, HostBuffer,
    HostDevice,
};
pub use error::{ConnectivityError, IntegrityFault, Result};
pub use matrix::{ConnectivityConfig, CsrMatrix, CsrcMatrix, DenseMatrix, LilMatrix, RankIndex};
pub use parallel::verify_backward_view;
pub use utils::{mask_to_array, to_sprs_backward, to_sprs_forward};

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
