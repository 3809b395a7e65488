use crate::clustering::model::KMedoidsModel;
use crate::clustering::params::KMedoidsParams;
use crate::clustering::refine::{HaltReason, RefineOutcome, Refiner};
use crate::clustering::sampling::{sample_by_size, sample_distinct, DataSource};
use crate::clustering::selection::{ModelSelection, ModelSelector};
use crate::core::{ClusteringError, ClusteringResult};
use crate::distances::DistanceMetric;
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::hash::Hash;
use std::sync::Arc;

/// Builds a validated [`KMedoids`] trainer.
pub struct KMedoidsBuilder<T> {
    params: KMedoidsParams,
    metric: Arc<dyn DistanceMetric<T>>,
}

impl<T> KMedoidsBuilder<T> {
    /// Create a new builder around a distance metric, with default parameters.
    pub fn new<M>(metric: M) -> Self
    where
        M: DistanceMetric<T> + 'static,
    {
        Self::from_shared(Arc::new(metric))
    }

    pub fn from_shared(metric: Arc<dyn DistanceMetric<T>>) -> Self {
        Self {
            params: KMedoidsParams::default(),
            metric,
        }
    }

    pub fn with_params(mut self, params: KMedoidsParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.params = self.params.with_k(k);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.params = self.params.with_max_iterations(max_iterations);
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.params = self.params.with_epsilon(epsilon);
        self
    }

    pub fn with_fraction_epsilon(mut self, fraction_epsilon: f64) -> Self {
        self.params = self.params.with_fraction_epsilon(fraction_epsilon);
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.params = self.params.with_sample_size(sample_size);
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.params = self.params.with_num_threads(num_threads);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params = self.params.with_seed(seed);
        self
    }

    /// Validates the parameters and returns the trainer.
    pub fn build(self) -> ClusteringResult<KMedoids<T>> {
        self.params.validate()?;
        Ok(KMedoids {
            params: self.params,
            metric: self.metric,
        })
    }
}

/// Everything a training run produced.
#[derive(Debug)]
pub struct TrainingResult<T> {
    pub model: KMedoidsModel<T>,
    /// Mean distance to the closest medoid over the working set.
    pub cost: f64,
    /// Refinement iterations of the run that produced the model.
    pub iterations: usize,
    pub halt: HaltReason,
    /// Size of the sampled working set.
    pub sample_size: usize,
    /// Candidates considered when k was selected automatically.
    pub selection: Option<ModelSelection<T>>,
}

impl<T> TrainingResult<T> {
    pub fn converged(&self) -> bool {
        self.halt == HaltReason::Converged
    }

    pub fn into_model(self) -> KMedoidsModel<T> {
        self.model
    }
}

/// K-medoids trainer over an arbitrary distance metric.
///
/// With a fixed `k` the initial medoids are `k` distinct elements drawn from
/// the working set and then refined. With `k == 0` the number of clusters is
/// chosen by minimum description length over a greedy split search.
pub struct KMedoids<T> {
    params: KMedoidsParams,
    metric: Arc<dyn DistanceMetric<T>>,
}

impl<T> KMedoids<T>
where
    T: Clone + Eq + Hash + Send + Sync,
{
    pub fn params(&self) -> &KMedoidsParams {
        &self.params
    }

    /// Samples a working set of about `sample_size` elements from `source`
    /// and trains on it.
    pub fn run<S>(&self, source: &S) -> ClusteringResult<TrainingResult<T>>
    where
        S: DataSource<T> + ?Sized,
    {
        let data = sample_by_size(source, self.params.sample_size, self.params.seed);
        self.fit(&data)
    }

    /// Trains on `data` as given, without sampling.
    pub fn fit(&self, data: &[T]) -> ClusteringResult<TrainingResult<T>> {
        if data.is_empty() {
            return Err(ClusteringError::EmptySample);
        }
        info!(
            "Training k-medoids on {} elements ({})",
            data.len(),
            self.params
        );

        let pool = self.build_pool()?;
        let refiner = Refiner::new(self.metric.as_ref(), &self.params, &pool);

        let result = if self.params.auto_k() {
            let selector = ModelSelector::new(
                &refiner,
                self.metric.as_ref(),
                &pool,
                self.params.max_iterations,
                self.params.seed,
            );
            let selection = selector.select(data).ok_or(ClusteringError::EmptySample)?;
            let best = selection.best_candidate();
            TrainingResult {
                model: KMedoidsModel::new(best.medoids.clone(), Arc::clone(&self.metric)),
                cost: best.cost,
                iterations: best.iterations,
                halt: best.halt,
                sample_size: data.len(),
                selection: Some(selection),
            }
        } else {
            let mut rng = SmallRng::seed_from_u64(self.params.seed);
            let initial = sample_distinct(data, self.params.k, &mut rng)?;
            let outcome = refiner.refine(data, initial);
            self.to_result(outcome, data.len())
        };

        info!(
            "Trained k={} with cost {} after {} iterations ({:?})",
            result.model.k(),
            result.cost,
            result.iterations,
            result.halt
        );
        Ok(result)
    }

    /// Refines caller-chosen medoids against `data`.
    pub fn refine(&self, data: &[T], initial: Vec<T>) -> ClusteringResult<RefineOutcome<T>> {
        let pool = self.build_pool()?;
        let refiner = Refiner::new(self.metric.as_ref(), &self.params, &pool);
        Ok(refiner.refine(data, initial))
    }

    /// Runs only the automatic k search over `data`.
    pub fn select_model(&self, data: &[T]) -> ClusteringResult<ModelSelection<T>> {
        let pool = self.build_pool()?;
        let refiner = Refiner::new(self.metric.as_ref(), &self.params, &pool);
        ModelSelector::new(
            &refiner,
            self.metric.as_ref(),
            &pool,
            self.params.max_iterations,
            self.params.seed,
        )
        .select(data)
        .ok_or(ClusteringError::EmptySample)
    }

    /// The worker pool is sized once per run and reused by every step.
    fn build_pool(&self) -> ClusteringResult<ThreadPool> {
        Ok(ThreadPoolBuilder::new()
            .num_threads(self.params.num_threads)
            .thread_name(|i| format!("kmedoids-{}", i))
            .build()?)
    }

    fn to_result(&self, outcome: RefineOutcome<T>, sample_size: usize) -> TrainingResult<T> {
        TrainingResult {
            model: KMedoidsModel::new(outcome.medoids, Arc::clone(&self.metric)),
            cost: outcome.cost,
            iterations: outcome.iterations,
            halt: outcome.halt,
            sample_size,
            selection: None,
        }
    }
}
