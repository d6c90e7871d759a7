// Connectivity data structures

pub mod config;
pub mod csr;
pub mod csrc;
pub mod dense;
pub mod index;
pub mod lil;

pub use config::ConnectivityConfig;
pub use csr::CsrMatrix;
pub use csrc::CsrcMatrix;
pub use dense::DenseMatrix;
pub use index::RankIndex;
pub use lil::LilMatrix;
