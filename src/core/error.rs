use std::error::Error;
use std::fmt;

/// Errors raised by the clustering trainer.
///
/// Every variant is a precondition failure surfaced before optimisation starts.
/// Degenerate data met during a run (empty clusters, zero-distance split seeds,
/// zero densities) is absorbed by fallbacks and never reported here.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusteringError {
    /// A configuration value is out of range
    InvalidParameter { name: String, reason: String },
    /// Fewer distinct elements than requested medoids
    InsufficientDistinct { requested: usize, available: usize },
    /// The sampled working set has no elements
    EmptySample,
    /// The worker pool could not be created
    ThreadPool(String),
    /// The configuration file could not be read or parsed
    Config(String),
}

impl ClusteringError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ClusteringError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ClusteringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusteringError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter `{}`: {}", name, reason)
            }
            ClusteringError::InsufficientDistinct {
                requested,
                available,
            } => write!(
                f,
                "Requested {} distinct elements but only {} are available",
                requested, available
            ),
            ClusteringError::EmptySample => write!(f, "Sampled working set is empty"),
            ClusteringError::ThreadPool(msg) => write!(f, "Thread pool error: {}", msg),
            ClusteringError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for ClusteringError {}

impl From<rayon::ThreadPoolBuildError> for ClusteringError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        ClusteringError::ThreadPool(e.to_string())
    }
}

pub type ClusteringResult<T> = Result<T, ClusteringError>;
