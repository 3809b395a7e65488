use crate::core::{ClusteringError, ClusteringResult};
use std::fmt;

/// Training parameters for the k-medoids trainer.
///
/// Setters follow a copy-on-write style: each `with_*` call consumes the value
/// and returns an updated copy. Nothing is checked until [`validate`] runs,
/// which the trainer builder does before any work starts.
///
/// [`validate`]: KMedoidsParams::validate
#[derive(Debug, Clone, PartialEq)]
pub struct KMedoidsParams {
    /// Number of clusters; `0` selects k automatically by minimum description length.
    pub k: usize,
    /// Refinement iterations per run; in auto-k mode also the number of
    /// candidate cluster counts attempted.
    pub max_iterations: usize,
    /// Halt when the cost improves by no more than this absolute amount.
    pub epsilon: f64,
    /// Halt when the cost improves by no more than this fraction of the previous cost.
    pub fraction_epsilon: f64,
    /// Expected size of the working set sampled from the input.
    pub sample_size: usize,
    /// Width of the worker pool.
    pub num_threads: usize,
    pub seed: u64,
}

impl Default for KMedoidsParams {
    fn default() -> Self {
        Self {
            k: 2,
            max_iterations: 25,
            epsilon: 0.0,
            fraction_epsilon: 0.0001,
            sample_size: 1000,
            num_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            seed: 42,
        }
    }
}

impl KMedoidsParams {
    pub fn with_k(self, k: usize) -> Self {
        Self { k, ..self }
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    pub fn with_epsilon(self, epsilon: f64) -> Self {
        Self { epsilon, ..self }
    }

    pub fn with_fraction_epsilon(self, fraction_epsilon: f64) -> Self {
        Self {
            fraction_epsilon,
            ..self
        }
    }

    pub fn with_sample_size(self, sample_size: usize) -> Self {
        Self {
            sample_size,
            ..self
        }
    }

    pub fn with_num_threads(self, num_threads: usize) -> Self {
        Self {
            num_threads,
            ..self
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    /// `true` when the number of clusters is chosen by model selection.
    pub fn auto_k(&self) -> bool {
        self.k == 0
    }

    pub fn validate(&self) -> ClusteringResult<()> {
        if self.max_iterations == 0 {
            return Err(ClusteringError::invalid(
                "max_iterations",
                "must be greater than 0",
            ));
        }
        if !(self.epsilon >= 0.0) {
            return Err(ClusteringError::invalid(
                "epsilon",
                format!("must be a non-negative number, got {}", self.epsilon),
            ));
        }
        if !(self.fraction_epsilon >= 0.0) {
            return Err(ClusteringError::invalid(
                "fraction_epsilon",
                format!(
                    "must be a non-negative number, got {}",
                    self.fraction_epsilon
                ),
            ));
        }
        if self.sample_size == 0 {
            return Err(ClusteringError::invalid(
                "sample_size",
                "must be greater than 0",
            ));
        }
        if self.k > self.sample_size {
            return Err(ClusteringError::invalid(
                "k",
                format!(
                    "must not exceed sample_size ({}), got {}",
                    self.sample_size, self.k
                ),
            ));
        }
        if self.num_threads == 0 {
            return Err(ClusteringError::invalid(
                "num_threads",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for KMedoidsParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.auto_k() {
            write!(f, "k=auto")?;
        } else {
            write!(f, "k={}", self.k)?;
        }
        write!(
            f,
            ", max_iterations={}, epsilon={}, fraction_epsilon={}, sample_size={}, num_threads={}, seed={}",
            self.max_iterations,
            self.epsilon,
            self.fraction_epsilon,
            self.sample_size,
            self.num_threads,
            self.seed
        )
    }
}
