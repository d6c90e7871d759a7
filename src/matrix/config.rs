//! Configuration for connectivity construction

/// Number of stored entries above which verification runs in parallel
const PARALLEL_VERIFY_THRESHOLD: usize = 1 << 16;

/// Configuration shared by the sparse connectivity formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityConfig {
    /// Run a full cross-index check after every backward-view derivation.
    /// The entry-count check always runs.
    pub verify_after_build: bool,

    /// Entries above which verification is spread over worker threads
    pub parallel_threshold: usize,

    /// Number of threads to use for parallel verification
    pub n_threads: usize,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            verify_after_build: cfg!(debug_assertions),
            parallel_threshold: PARALLEL_VERIFY_THRESHOLD,
            n_threads: num_cpus::get(), // Use all available cores
        }
    }
}

impl ConnectivityConfig {
    /// Config with the full cross-index check enabled
    pub fn verified() -> Self {
        Self {
            verify_after_build: true,
            ..Self::default()
        }
    }

    /// Config that only performs the entry-count check
    pub fn unverified() -> Self {
        Self {
            verify_after_build: false,
            ..Self::default()
        }
    }

    /// Whether a structure with `nnz` entries should be verified in parallel
    pub fn use_parallel(&self, nnz: usize) -> bool {
        self.n_threads > 1 && nnz >= self.parallel_threshold
    }
}
