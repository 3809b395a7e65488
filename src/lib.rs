/// kmedoids: K-Medoids clustering over arbitrary distance functions.
///
/// Medoids are always elements of the data, so any type with a distance
/// function can be clustered. The number of clusters is either fixed or
/// chosen by minimum description length.
///
/// # Modules
/// - `clustering`: Parameters, sampling, the refinement loop, the trainer and model selection.
/// - `distances`: The distance metric seam and reference metrics for feature vectors.
/// - `stats`: Distance density fitting and goodness-of-fit used by model selection.
pub mod clustering;
pub mod core;
pub mod distances;
pub mod stats;
pub mod visualization;
