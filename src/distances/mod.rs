pub mod distance;

pub use distance::{
    ChebyshevDistance, DistanceMetric, EuclideanDistance, FeatureVector, ManhattanDistance,
};
