//! The assignment / medoid-update loop shared by fixed-k training and model selection.

use crate::clustering::medoid::medoid_index;
use crate::clustering::model::{closest, model_cost};
use crate::clustering::params::KMedoidsParams;
use crate::distances::DistanceMetric;
use log::{debug, warn};
use rayon::prelude::*;
use rayon::ThreadPool;

/// Why a refinement run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The cost stopped improving by more than the configured epsilons.
    Converged,
    /// The iteration budget ran out first.
    MaxIterations,
}

/// Final state of a refinement run.
#[derive(Debug, Clone)]
pub struct RefineOutcome<T> {
    pub medoids: Vec<T>,
    /// Mean distance from each element to its closest medoid.
    pub cost: f64,
    /// Refinement steps executed.
    pub iterations: usize,
    pub halt: HaltReason,
    /// Cost of every adopted medoid set, starting with the initial one.
    pub cost_history: Vec<f64>,
}

impl<T> RefineOutcome<T> {
    pub fn converged(&self) -> bool {
        self.halt == HaltReason::Converged
    }
}

/// Alternates cluster assignment and medoid recomputation until the cost
/// settles or the iteration budget is spent.
///
/// All parallel work runs on the borrowed pool and joins before the next
/// iteration starts.
pub struct Refiner<'a, T> {
    metric: &'a dyn DistanceMetric<T>,
    pool: &'a ThreadPool,
    max_iterations: usize,
    epsilon: f64,
    fraction_epsilon: f64,
}

impl<'a, T> Refiner<'a, T>
where
    T: Clone + Send + Sync,
{
    pub fn new(
        metric: &'a dyn DistanceMetric<T>,
        params: &KMedoidsParams,
        pool: &'a ThreadPool,
    ) -> Self {
        Self {
            metric,
            pool,
            max_iterations: params.max_iterations,
            epsilon: params.epsilon,
            fraction_epsilon: params.fraction_epsilon,
        }
    }

    /// Refines `initial` against `data`.
    ///
    /// The returned medoids are never worse than the initial ones: a final step
    /// is only adopted when it strictly lowers the cost.
    pub fn refine(&self, data: &[T], initial: Vec<T>) -> RefineOutcome<T> {
        let mut current = initial;
        let mut current_cost = self.cost(data, &current);
        let mut cost_history = vec![current_cost];

        if data.is_empty() || current.is_empty() {
            warn!(
                "Nothing to refine ({} elements, {} medoids)",
                data.len(),
                current.len()
            );
            return RefineOutcome {
                medoids: current,
                cost: current_cost,
                iterations: 0,
                halt: HaltReason::Converged,
                cost_history,
            };
        }

        let mut iterations = 0;
        loop {
            iterations += 1;
            let next = self.step(data, &current);
            let next_cost = self.cost(data, &next);
            let delta = current_cost - next_cost;

            // A NaN delta counts as converged.
            let halt = if !(delta > self.epsilon) {
                Some(HaltReason::Converged)
            } else if current_cost > 0.0 && delta / current_cost <= self.fraction_epsilon {
                Some(HaltReason::Converged)
            } else if iterations >= self.max_iterations {
                Some(HaltReason::MaxIterations)
            } else {
                None
            };

            debug!(
                "Iteration {}: k={} cost {} -> {} (delta {})",
                iterations,
                next.len(),
                current_cost,
                next_cost,
                delta
            );

            if halt.is_none() || next_cost < current_cost {
                current = next;
                current_cost = next_cost;
                cost_history.push(current_cost);
            }

            if let Some(halt) = halt {
                debug!(
                    "Refinement halted after {} iterations ({:?}) with cost {}",
                    iterations, halt, current_cost
                );
                return RefineOutcome {
                    medoids: current,
                    cost: current_cost,
                    iterations,
                    halt,
                    cost_history,
                };
            }
        }
    }

    /// Mean distance to the closest medoid, computed on the pool.
    pub fn cost(&self, data: &[T], medoids: &[T]) -> f64 {
        self.pool
            .install(|| model_cost(data, medoids, self.metric))
    }

    /// One assignment + update step. Clusters left without elements are dropped.
    fn step(&self, data: &[T], medoids: &[T]) -> Vec<T> {
        let metric = self.metric;
        self.pool.install(|| {
            let clusters = partition(data, medoids, metric);

            let empty = clusters.iter().filter(|c| c.is_empty()).count();
            if empty > 0 {
                debug!("Dropping {} empty clusters", empty);
            }

            clusters
                .par_iter()
                .filter_map(|cluster| {
                    medoid_index(cluster, metric).map(|(idx, _)| cluster[idx].clone())
                })
                .collect()
        })
    }
}

/// Groups `data` by closest medoid (ties to the lowest index). The result has
/// one entry per medoid, possibly empty, each keeping data order.
pub fn partition<T, M>(data: &[T], medoids: &[T], metric: &M) -> Vec<Vec<T>>
where
    T: Clone + Sync,
    M: DistanceMetric<T> + ?Sized,
{
    let assignments: Vec<usize> = data
        .par_iter()
        .map(|x| closest(x, medoids, metric).0)
        .collect();

    let mut clusters: Vec<Vec<T>> = vec![Vec::new(); medoids.len()];
    for (x, cluster_idx) in data.iter().zip(assignments) {
        clusters[cluster_idx].push(x.clone());
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::ThreadPoolBuilder;

    fn abs_diff(a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }

    fn metric() -> &'static dyn DistanceMetric<f64> {
        &abs_diff
    }

    fn line_data() -> Vec<f64> {
        vec![0.0, 1.0, 2.0, 3.0, 4.0, 20.0, 21.0, 22.0, 23.0, 24.0]
    }

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    #[test]
    fn test_partition() {
        let clusters = partition(&line_data(), &[1.0, 22.0], &abs_diff);
        assert_eq!(clusters[0], vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(clusters[1], vec![20.0, 21.0, 22.0, 23.0, 24.0]);

        let clusters = partition(&line_data(), &[1.0, 1.0], &abs_diff);
        assert_eq!(clusters[0].len(), 10);
        assert!(clusters[1].is_empty());
    }

    #[test]
    fn test_refine_finds_cluster_cores() {
        let pool = pool();
        let params = KMedoidsParams::default();
        let refiner = Refiner::new(metric(), &params, &pool);

        let outcome = refiner.refine(&line_data(), vec![0.0, 1.0]);
        assert_eq!(outcome.medoids, vec![2.0, 22.0]);
        assert!((outcome.cost - 1.2).abs() < 1e-12);
        assert!(outcome.converged());
        for pair in outcome.cost_history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn test_refine_respects_iteration_budget() {
        let pool = pool();
        let params = KMedoidsParams::default().with_max_iterations(1);
        let refiner = Refiner::new(metric(), &params, &pool);

        let outcome = refiner.refine(&line_data(), vec![0.0, 1.0]);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.halt, HaltReason::MaxIterations);
        assert!(outcome.cost < outcome.cost_history[0]);
    }

    #[test]
    fn test_refine_identical_points() {
        let pool = pool();
        let params = KMedoidsParams::default();
        let refiner = Refiner::new(metric(), &params, &pool);

        let data = vec![3.0; 10];
        let outcome = refiner.refine(&data, vec![3.0]);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.cost, 0.0);
        assert!(outcome.converged());
        assert_eq!(outcome.medoids, vec![3.0]);
    }

    #[test]
    fn test_refine_empty_input() {
        let pool = pool();
        let params = KMedoidsParams::default();
        let refiner = Refiner::new(metric(), &params, &pool);

        let outcome = refiner.refine(&[], vec![1.0]);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.cost, 0.0);
    }
}
