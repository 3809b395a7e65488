//! Automatic choice of the number of clusters.
//!
//! Candidates are grown greedily from a single medoid by binary splits, each
//! split refined over the whole working set. Every candidate is then scored
//! by a minimum-description-length cost: how well per-cluster distance
//! densities explain the data, plus a charge for the medoids and density
//! parameters. The cheapest description wins.

use crate::clustering::medoid::medoid_index;
use crate::clustering::model::closest;
use crate::clustering::refine::{partition, HaltReason, RefineOutcome, Refiner};
use crate::distances::DistanceMetric;
use crate::stats::density::fit_distance_density;
use fxhash::FxHashSet;
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::cmp::Ordering;
use std::hash::Hash;

/// Charged for an element whose fitted density is zero at its distance.
///
/// A gamma fit with shape above 1 is zero at the origin, so every medoid
/// scored under one pays this for its own zero distance.
pub const ZERO_DENSITY_PENALTY: f64 = 100.0;

/// Description-length cost of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdlCost {
    /// Negative log-likelihood of every element's distance to its medoid.
    pub representation: f64,
    /// `(k + free_params / 2) * ln(n)`.
    pub parameters: f64,
    /// Free parameters summed over the cluster densities.
    pub free_params: usize,
}

impl MdlCost {
    pub fn total(&self) -> f64 {
        self.representation + self.parameters
    }
}

/// A model generated while searching over k.
#[derive(Debug, Clone)]
pub struct Candidate<T> {
    pub medoids: Vec<T>,
    /// Mean distance to the closest medoid over the working set.
    pub cost: f64,
    pub iterations: usize,
    pub halt: HaltReason,
    pub mdl: MdlCost,
}

impl<T> Candidate<T> {
    pub fn k(&self) -> usize {
        self.medoids.len()
    }
}

/// Every candidate generated by the search and the index of the chosen one.
#[derive(Debug, Clone)]
pub struct ModelSelection<T> {
    pub candidates: Vec<Candidate<T>>,
    pub best: usize,
}

impl<T> ModelSelection<T> {
    pub fn best_candidate(&self) -> &Candidate<T> {
        &self.candidates[self.best]
    }

    pub fn into_best(mut self) -> Candidate<T> {
        self.candidates.swap_remove(self.best)
    }
}

pub struct ModelSelector<'a, T> {
    refiner: &'a Refiner<'a, T>,
    metric: &'a dyn DistanceMetric<T>,
    pool: &'a ThreadPool,
    max_candidates: usize,
    seed: u64,
}

impl<'a, T> ModelSelector<'a, T>
where
    T: Clone + Eq + Hash + Send + Sync,
{
    pub fn new(
        refiner: &'a Refiner<'a, T>,
        metric: &'a dyn DistanceMetric<T>,
        pool: &'a ThreadPool,
        max_candidates: usize,
        seed: u64,
    ) -> Self {
        Self {
            refiner,
            metric,
            pool,
            max_candidates,
            seed,
        }
    }

    /// Runs the split search over `data` and picks the minimum-MDL candidate.
    /// Returns `None` only for empty `data`.
    pub fn select(&self, data: &[T]) -> Option<ModelSelection<T>> {
        let metric = self.metric;
        let (first_idx, _) = self.pool.install(|| medoid_index(data, metric))?;

        let initial = vec![data[first_idx].clone()];
        let mut outcomes = vec![RefineOutcome {
            cost: self.refiner.cost(data, &initial),
            medoids: initial,
            iterations: 0,
            halt: HaltReason::Converged,
            cost_history: Vec::new(),
        }];

        while outcomes.len() < self.max_candidates {
            let current = &outcomes[outcomes.len() - 1].medoids;
            let current_k = current.len();
            if current_k >= data.len() {
                break;
            }
            match self.best_split(data, current) {
                Some(next) => outcomes.push(next),
                None => {
                    debug!("No valid split from k={}, stopping the search", current_k);
                    break;
                }
            }
        }

        let candidates: Vec<Candidate<T>> = outcomes
            .into_iter()
            .map(|outcome| {
                let mdl = self.mdl_cost(data, &outcome.medoids);
                debug!(
                    "Candidate k={}: cost {:.6}, representation {:.3}, parameters {:.3}, total {:.3}",
                    outcome.medoids.len(),
                    outcome.cost,
                    mdl.representation,
                    mdl.parameters,
                    mdl.total()
                );
                Candidate {
                    medoids: outcome.medoids,
                    cost: outcome.cost,
                    iterations: outcome.iterations,
                    halt: outcome.halt,
                    mdl,
                }
            })
            .collect();

        let best = candidates
            .iter()
            .enumerate()
            .min_by(|(i, a), (j, b)| {
                a.mdl
                    .total()
                    .total_cmp(&b.mdl.total())
                    .then(i.cmp(j))
            })
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        info!(
            "Selected k={} out of {} candidates",
            candidates[best].k(),
            candidates.len()
        );
        Some(ModelSelection { candidates, best })
    }

    /// Tries a binary split of every current cluster and keeps the one with
    /// the lowest cost over the whole working set.
    fn best_split(&self, data: &[T], medoids: &[T]) -> Option<RefineOutcome<T>> {
        let metric = self.metric;
        let clusters = self.pool.install(|| partition(data, medoids, metric));

        let mut best: Option<RefineOutcome<T>> = None;
        for (j, cluster) in clusters.iter().enumerate() {
            let Some(outcome) = self.try_split(data, medoids, j, cluster) else {
                continue;
            };
            debug!("Splitting cluster {} gives cost {}", j, outcome.cost);
            if best.as_ref().map_or(true, |b| outcome.cost < b.cost) {
                best = Some(outcome);
            }
        }
        best
    }

    /// Splits cluster `j` around its two most distant elements and refines the
    /// spliced medoid set over all of `data`. `None` when the split is invalid.
    fn try_split(
        &self,
        data: &[T],
        medoids: &[T],
        j: usize,
        cluster: &[T],
    ) -> Option<RefineOutcome<T>> {
        let target_k = medoids.len() + 1;
        let metric = self.metric;
        let (a, b, dist) = self.pool.install(|| farthest_pair(cluster, metric))?;
        if !(dist > 0.0) {
            debug!("Cluster {} has no two distinct elements, skipping", j);
            return None;
        }

        let local = self
            .refiner
            .refine(cluster, vec![cluster[a].clone(), cluster[b].clone()]);
        if local.medoids.len() != 2 {
            warn!(
                "Local refinement of cluster {} kept {} medoids, skipping",
                j,
                local.medoids.len()
            );
            return None;
        }

        let mut seed = medoids.to_vec();
        seed.splice(j..=j, local.medoids);
        let outcome = self.refiner.refine(data, seed);

        let distinct: FxHashSet<&T> = outcome.medoids.iter().collect();
        if outcome.medoids.len() != target_k || distinct.len() != target_k {
            debug!(
                "Split of cluster {} collapsed to {} distinct medoids, skipping",
                j,
                distinct.len()
            );
            return None;
        }
        Some(outcome)
    }

    /// Description length of `data` under `medoids`.
    pub fn mdl_cost(&self, data: &[T], medoids: &[T]) -> MdlCost {
        let metric = self.metric;
        let assignments: Vec<(usize, f64)> = self.pool.install(|| {
            data.par_iter()
                .map(|x| closest(x, medoids, metric))
                .collect()
        });

        let mut distances: Vec<Vec<f64>> = vec![Vec::new(); medoids.len()];
        for (cluster_idx, dist) in assignments {
            distances[cluster_idx].push(dist);
        }

        let mut rng = SmallRng::seed_from_u64(self.seed.wrapping_add(medoids.len() as u64));
        let mut representation = 0.0;
        let mut free_params = 0;
        for cluster in distances.iter().filter(|c| !c.is_empty()) {
            let fit = fit_distance_density(cluster, &mut rng);
            free_params += fit.free_params;
            for &d in cluster {
                let p = fit.pdf(d);
                representation += if p > 0.0 {
                    -p.ln()
                } else {
                    ZERO_DENSITY_PENALTY
                };
            }
        }

        let n = data.len().max(1) as f64;
        MdlCost {
            representation,
            parameters: (medoids.len() as f64 + free_params as f64 / 2.0) * n.ln(),
            free_params,
        }
    }
}

/// Indices of the two most mutually distant elements and their distance.
/// Ties resolve to the lexicographically smallest pair. `None` for fewer
/// than two elements.
pub fn farthest_pair<T, M>(cluster: &[T], metric: &M) -> Option<(usize, usize, f64)>
where
    T: Sync,
    M: DistanceMetric<T> + ?Sized,
{
    if cluster.len() < 2 {
        return None;
    }
    (0..cluster.len() - 1)
        .into_par_iter()
        .map(|i| {
            let mut best = (i, i + 1, metric.compute(&cluster[i], &cluster[i + 1]));
            for j in i + 2..cluster.len() {
                let dist = metric.compute(&cluster[i], &cluster[j]);
                if dist > best.2 {
                    best = (i, j, dist);
                }
            }
            best
        })
        .reduce_with(|a, b| match a.2.total_cmp(&b.2) {
            Ordering::Less => b,
            Ordering::Greater => a,
            Ordering::Equal => {
                if (a.0, a.1) <= (b.0, b.1) {
                    a
                } else {
                    b
                }
            }
        })
}
