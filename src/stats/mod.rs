pub mod density;
pub mod goodness_of_fit;

pub use density::{fit_distance_density, DensityFit, DistanceDensity, DEGENERATE_DENSITY};
pub use goodness_of_fit::ks_two_sample;
