use crate::core::float::MetricFloat;
use ndarray::{Array1, ArrayView1};
use ndarray_stats::DeviationExt;
use std::hash::{Hash, Hasher};

/// Trait defining the interface for distance metrics.
///
/// A metric must be pure and deterministic, return a non-negative value and
/// report zero for identical elements. Symmetry and the triangle inequality
/// are assumed by the clustering algorithms but never checked.
pub trait DistanceMetric<T>: Send + Sync {
    /// Computes the distance between two elements.
    fn compute(&self, a: &T, b: &T) -> f64;
}

impl<T, Func> DistanceMetric<T> for Func
where
    Func: Fn(&T, &T) -> f64 + Send + Sync,
{
    #[inline]
    fn compute(&self, a: &T, b: &T) -> f64 {
        self(a, b)
    }
}

/// A dense feature vector usable as a clustering element.
///
/// Equality and hashing are bit-exact on the components, so two vectors are
/// the same element only if every component has the same representation.
/// Signed zeros are the exception: `-0.0` and `0.0` are the same component.
#[derive(Debug, Clone)]
pub struct FeatureVector<F: MetricFloat>(Array1<F>);

impl<F: MetricFloat> FeatureVector<F> {
    pub fn new(values: Array1<F>) -> Self {
        Self(values)
    }

    pub fn view(&self) -> ArrayView1<'_, F> {
        self.0.view()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<F: MetricFloat> From<Vec<F>> for FeatureVector<F> {
    fn from(values: Vec<F>) -> Self {
        Self(Array1::from(values))
    }
}

impl<F: MetricFloat> PartialEq for FeatureVector<F> {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| component_key(*a) == component_key(*b))
    }
}

impl<F: MetricFloat> Eq for FeatureVector<F> {}

impl<F: MetricFloat> Hash for FeatureVector<F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for value in self.0.iter() {
            component_key(*value).hash(state);
        }
    }
}

fn component_key<F: MetricFloat>(value: F) -> (u64, i16, i8) {
    if value == F::zero() {
        F::zero().integer_decode()
    } else {
        value.integer_decode()
    }
}

/// [Euclidean Distance](https://en.wikipedia.org/wiki/Euclidean_distance)
#[derive(Debug, Clone, Copy)]
pub struct EuclideanDistance;

impl<F: MetricFloat> DistanceMetric<FeatureVector<F>> for EuclideanDistance {
    /// Panics if the vectors have different dimensions.
    #[inline]
    fn compute(&self, a: &FeatureVector<F>, b: &FeatureVector<F>) -> f64 {
        let squared = a
            .view()
            .sq_l2_dist(&b.view())
            .expect("feature vectors must share a dimension");
        squared.to_f64().unwrap_or(f64::NAN).sqrt()
    }
}

/// [Manhattan Distance](https://en.wikipedia.org/wiki/Taxicab_geometry)
#[derive(Debug, Clone, Copy)]
pub struct ManhattanDistance;

impl<F: MetricFloat> DistanceMetric<FeatureVector<F>> for ManhattanDistance {
    /// Panics if the vectors have different dimensions.
    #[inline]
    fn compute(&self, a: &FeatureVector<F>, b: &FeatureVector<F>) -> f64 {
        a.view()
            .l1_dist(&b.view())
            .expect("feature vectors must share a dimension")
            .to_f64()
            .unwrap_or(f64::NAN)
    }
}

/// [Chebyshev Distance](https://en.wikipedia.org/wiki/Chebyshev_distance)
#[derive(Debug, Clone, Copy)]
pub struct ChebyshevDistance;

impl<F: MetricFloat> DistanceMetric<FeatureVector<F>> for ChebyshevDistance {
    /// Panics if the vectors have different dimensions.
    #[inline]
    fn compute(&self, a: &FeatureVector<F>, b: &FeatureVector<F>) -> f64 {
        a.view()
            .linf_dist(&b.view())
            .expect("feature vectors must share a dimension")
            .to_f64()
            .unwrap_or(f64::NAN)
    }
}
