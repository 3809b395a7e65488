use crate::distances::DistanceMetric;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

/// A trained k-medoids model: the medoid sequence and the metric it was trained with.
///
/// Medoids are elements of the training sample, never synthesized points. The
/// model is immutable; predictions only read it.
#[derive(Clone)]
pub struct KMedoidsModel<T> {
    medoids: Vec<T>,
    metric: Arc<dyn DistanceMetric<T>>,
}

impl<T> KMedoidsModel<T> {
    pub fn new(medoids: Vec<T>, metric: Arc<dyn DistanceMetric<T>>) -> Self {
        Self { medoids, metric }
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.medoids.len()
    }

    pub fn medoids(&self) -> &[T] {
        &self.medoids
    }

    pub fn metric(&self) -> &Arc<dyn DistanceMetric<T>> {
        &self.metric
    }

    /// Index of the medoid closest to `x`.
    pub fn predict(&self, x: &T) -> usize {
        closest(x, &self.medoids, self.metric.as_ref()).0
    }

    /// Distance from `x` to its closest medoid.
    pub fn distance_to_medoid(&self, x: &T) -> f64 {
        closest(x, &self.medoids, self.metric.as_ref()).1
    }

    pub fn into_medoids(self) -> Vec<T> {
        self.medoids
    }
}

impl<T: Sync> KMedoidsModel<T> {
    /// Cluster index of every element of `data`, in order.
    pub fn predict_all(&self, data: &[T]) -> Vec<usize> {
        data.par_iter().map(|x| self.predict(x)).collect()
    }

    /// Mean distance from each element of `data` to its closest medoid.
    pub fn cost(&self, data: &[T]) -> f64 {
        model_cost(data, &self.medoids, self.metric.as_ref())
    }
}

impl<T: fmt::Debug> fmt::Debug for KMedoidsModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KMedoidsModel")
            .field("k", &self.k())
            .field("medoids", &self.medoids)
            .finish()
    }
}

/// Index of the medoid nearest to `x` and the distance to it.
///
/// Ties go to the lowest medoid index. An empty medoid list yields
/// `(0, f64::INFINITY)`.
pub fn closest<T, M>(x: &T, medoids: &[T], metric: &M) -> (usize, f64)
where
    M: DistanceMetric<T> + ?Sized,
{
    let mut best = (0, f64::INFINITY);
    for (idx, medoid) in medoids.iter().enumerate() {
        let dist = metric.compute(x, medoid);
        if dist < best.1 {
            best = (idx, dist);
        }
    }
    best
}

/// Distance from each element to its closest medoid, in data order.
pub fn distances_to_medoids<T, M>(data: &[T], medoids: &[T], metric: &M) -> Vec<f64>
where
    T: Sync,
    M: DistanceMetric<T> + ?Sized,
{
    data.par_iter()
        .map(|x| closest(x, medoids, metric).1)
        .collect()
}

/// Mean distance from each element to its closest medoid; `0.0` for no data.
///
/// Distances are computed in parallel but summed in data order, so the cost
/// is bit-for-bit reproducible.
pub fn model_cost<T, M>(data: &[T], medoids: &[T], metric: &M) -> f64
where
    T: Sync,
    M: DistanceMetric<T> + ?Sized,
{
    if data.is_empty() {
        return 0.0;
    }
    let total: f64 = distances_to_medoids(data, medoids, metric).iter().sum();
    total / data.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs_diff(a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }

    fn model() -> KMedoidsModel<f64> {
        KMedoidsModel::new(vec![0.0, 10.0], Arc::new(abs_diff))
    }

    #[test]
    fn test_predict() {
        let model = model();
        assert_eq!(model.k(), 2);
        assert_eq!(model.predict(&1.0), 0);
        assert_eq!(model.predict(&8.0), 1);
        // Equidistant goes to the first medoid
        assert_eq!(model.predict(&5.0), 0);
        assert_eq!(model.predict_all(&[-3.0, 6.0, 12.0]), vec![0, 1, 1]);
        assert_eq!(model.distance_to_medoid(&12.0), 2.0);
    }

    #[test]
    fn test_cost() {
        let model = model();
        assert!((model.cost(&[1.0, 9.0, 10.0, 0.0]) - 0.5).abs() < 1e-12);
        assert_eq!(model.cost(&[]), 0.0);
    }

    #[test]
    fn test_closest_without_medoids() {
        let (idx, dist) = closest(&1.0, &[], &abs_diff);
        assert_eq!(idx, 0);
        assert!(dist.is_infinite());
    }
}
